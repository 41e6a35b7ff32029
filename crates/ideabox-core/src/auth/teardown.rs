use std::sync::Arc;

use tracing::{info, warn};

use super::token_store::TokenStore;
use crate::nav::Navigator;

/// Ends the session: drops both credentials and forces navigation to the
/// entry destination. Safe to call repeatedly.
#[derive(Clone)]
pub struct SessionTeardown {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    entry: String,
}

impl SessionTeardown {
    pub fn new(
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            entry: entry.into(),
        }
    }

    pub fn run(&self) {
        if let Err(e) = self.store.clear_all() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        info!(entry = %self.entry, "Session ended");
        self.navigator.navigate_to(&self.entry);
    }
}
