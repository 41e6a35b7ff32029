//! Application wiring: configuration, token storage, router and client.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use ideabox_core::nav::AccessGuard;
use ideabox_core::{
    Config, FileTokenStore, IdeaClient, KeyringTokenStore, Router, TokenStorage, TokenStore,
};

pub struct App {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub router: Arc<Router>,
    pub client: IdeaClient,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let store = open_store(&config)?;
        let router = Arc::new(Router::new(
            config.route_table(),
            AccessGuard::new(Arc::clone(&store), config.entry_route.clone()),
        ));
        let client = IdeaClient::from_config(&config, Arc::clone(&store), router.clone())?;

        Ok(Self {
            config,
            store,
            router,
            client,
        })
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn TokenStore>> {
    match config.token_storage {
        TokenStorage::File => {
            let cache_dir = config.cache_dir()?;
            let store = FileTokenStore::open(&cache_dir)
                .with_context(|| format!("Failed to open session in {}", cache_dir.display()))?;
            debug!(path = %store.path().display(), "Using file token storage");
            Ok(Arc::new(store))
        }
        TokenStorage::Keyring => {
            debug!("Using keyring token storage");
            Ok(Arc::new(KeyringTokenStore::new()))
        }
    }
}
