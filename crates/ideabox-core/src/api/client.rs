//! API client for the idea board backend.
//!
//! Every call goes through the `RefreshCoordinator`, so callers never see an
//! expired access token unless the session could not be renewed.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::operation::Operation;
use super::refresh::{RefreshCoordinator, DEFAULT_LOGIN_PATH};
use super::transport::HttpTransport;
use super::ApiError;
use crate::auth::{SessionTeardown, Slot, TokenStore};
use crate::config::Config;
use crate::models::{
    Draft, IdeaDetail, IdeaSummary, LoginRequest, MessageResponse, NewIdea, RegisterRequest,
    TokenResponse, UploadResponse,
};
use crate::nav::Navigator;

/// Clone is cheap - clones share the transport, token store and refresh state.
#[derive(Clone)]
pub struct IdeaClient {
    coordinator: RefreshCoordinator,
    login_path: String,
}

impl IdeaClient {
    pub fn new(coordinator: RefreshCoordinator) -> Self {
        Self {
            coordinator,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    /// Wire an HTTP-backed client from configuration.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config.api_base_url, config.request_timeout())
            .context("Failed to build HTTP client")?;
        let teardown = SessionTeardown::new(Arc::clone(&store), navigator, &config.entry_route);
        let coordinator = RefreshCoordinator::new(
            Arc::new(transport),
            store,
            teardown,
            config.refresh_settings(),
        );
        Ok(Self {
            coordinator,
            login_path: config.login_path.clone(),
        })
    }

    fn store(&self) -> &Arc<dyn TokenStore> {
        self.coordinator.store()
    }

    /// True if an access token is stored. Says nothing about whether the
    /// server still accepts it.
    pub fn is_authenticated(&self) -> bool {
        self.store().get(Slot::Access).is_some()
    }

    async fn send<T: DeserializeOwned>(&self, op: Operation) -> Result<T> {
        let label = format!("{} {}", op.method, op.target);
        let response = self
            .coordinator
            .execute(op)
            .await
            .with_context(|| format!("Request failed: {}", label))?;
        response
            .json()
            .with_context(|| format!("Failed to parse JSON response from {}", label))
    }

    async fn send_for_message(&self, op: Operation) -> Result<String> {
        let response: MessageResponse = self.send(op).await?;
        Ok(response.message)
    }

    // ===== Session =====

    /// Exchange email/password for tokens and store them.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let op = Operation::post(self.login_path.as_str()).json(&LoginRequest { email, password })?;

        let tokens: TokenResponse = match self.send(op).await {
            Ok(tokens) => tokens,
            Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) => {
                anyhow::bail!("Invalid email or password");
            }
            Err(e) => return Err(e),
        };

        let store = self.store();
        store
            .set(Slot::Access, tokens.access_token)
            .context("Failed to store access token")?;
        match tokens.refresh_token {
            Some(refresh) => store
                .set(Slot::Refresh, refresh)
                .context("Failed to store refresh token")?,
            // A refresh token from an earlier login belongs to another session
            None => store.clear(Slot::Refresh)?,
        }
        info!("Logged in");
        Ok(())
    }

    pub async fn register(
        &self,
        username: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<String> {
        let op = Operation::post("/register").json(&RegisterRequest {
            username,
            email,
            password,
        })?;
        self.send_for_message(op).await
    }

    /// Drop the session and return to the entry destination.
    pub fn logout(&self) {
        self.coordinator.teardown().run();
    }

    // ===== Ideas =====

    pub async fn list_ideas(&self) -> Result<Vec<IdeaSummary>> {
        let ideas: Vec<IdeaSummary> = self.send(Operation::get("/ideas")).await?;
        debug!(count = ideas.len(), "Ideas fetched");
        Ok(ideas)
    }

    pub async fn idea(&self, id: i64) -> Result<IdeaDetail> {
        self.send(Operation::get(format!("/ideas/{}", id))).await
    }

    /// Upload an image for a new idea. Returns the filename the server
    /// stored it under, which goes into `NewIdea::image_filename`.
    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let size = bytes.len();
        let op = Operation::post("/upload").file("file", filename, bytes);
        let uploaded: UploadResponse = self.send(op).await?;
        debug!(stored = %uploaded.filename, size, "Image uploaded");
        Ok(uploaded.filename)
    }

    pub async fn submit_idea(&self, idea: &NewIdea) -> Result<String> {
        let op = Operation::post("/ideas").json(idea)?;
        self.send_for_message(op).await
    }

    // ===== Drafts =====

    /// The saved draft; the server answers `null` when there is none.
    pub async fn draft(&self) -> Result<Option<Draft>> {
        self.send(Operation::get("/draft")).await
    }

    pub async fn save_draft(&self, draft: &Draft) -> Result<String> {
        let op = Operation::post("/draft").json(draft)?;
        self.send_for_message(op).await
    }

    pub async fn delete_draft(&self) -> Result<String> {
        self.send_for_message(Operation::delete("/draft")).await
    }
}
