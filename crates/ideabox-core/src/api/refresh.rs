//! Transparent access-token refresh.
//!
//! `RefreshCoordinator` wraps every transport call. A 401 on an operation
//! that has not been retried yet triggers a refresh with the stored refresh
//! token, then a single replay with the new access token. Concurrent 401s
//! join the refresh already in flight instead of starting their own.
//!
//! The refresh runs as a detached task: a caller that gives up while waiting
//! does not cancel it, and every other waiter still gets the result. When the
//! refresh fails, or there is no refresh token, the session is torn down and
//! the caller gets the original 401 back.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::augment::RequestAugmenter;
use super::operation::{Operation, Outcome, Response};
use super::transport::Transport;
use super::ApiError;
use crate::auth::{SessionTeardown, Slot, TokenStore};
use crate::models::TokenResponse;

/// Default path of the refresh endpoint, relative to the API base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/refresh";

/// Default path of the login endpoint, relative to the API base URL.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Upper bound for a single refresh call.
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("No refresh token stored")]
    NoCredential,

    #[error("Refresh token rejected (status {0})")]
    Rejected(u16),

    #[error("Refresh request failed: {0}")]
    Transport(String),

    #[error("Refresh timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),

    #[error("Failed to store refreshed token: {0}")]
    Storage(String),

    #[error("Refresh task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub refresh_path: String,
    /// Targets whose 401 means bad credentials rather than an expired
    /// session. The refresh path is always exempt.
    pub exempt_paths: Vec<String>,
    pub timeout: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            exempt_paths: vec![DEFAULT_LOGIN_PATH.to_string()],
            timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
        }
    }
}

type PendingRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

enum RefreshState {
    Idle,
    InFlight(PendingRefresh),
}

type SharedState = Arc<Mutex<RefreshState>>;

fn lock_state(state: &Mutex<RefreshState>) -> MutexGuard<'_, RefreshState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the coordinator to idle when the refresh task ends, however it
/// ends: settled, panicked, or dropped by the runtime.
struct SettleOnDrop(SharedState);

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        *lock_state(&self.0) = RefreshState::Idle;
    }
}

/// Clone is cheap; clones share the same refresh state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    augmenter: RequestAugmenter,
    teardown: SessionTeardown,
    settings: RefreshSettings,
    state: SharedState,
}

impl RefreshCoordinator {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
        teardown: SessionTeardown,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            augmenter: RequestAugmenter::new(Arc::clone(&store)),
            transport,
            store,
            teardown,
            settings,
            state: Arc::new(Mutex::new(RefreshState::Idle)),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn teardown(&self) -> &SessionTeardown {
        &self.teardown
    }

    /// True while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        matches!(*lock_state(&self.state), RefreshState::InFlight(_))
    }

    /// Stamp, send, and on an expired access token refresh once and replay.
    /// Non-success statuses come back as `ApiError`.
    pub async fn execute(&self, op: Operation) -> Result<Response, ApiError> {
        let mut op = self.augmenter.augment(op);
        let response = self.transport.execute(&op).await?;

        if response.classify() != Outcome::AuthExpired
            || self.is_exempt(&op.target)
            || !op.mark_retried()
        {
            return response.error_for_status();
        }

        debug!(path = %op.target, "Access token rejected, refreshing");
        match self.fresh_access_token().await {
            Ok(token) => {
                op.set_bearer(&token);
                let replay = self.transport.execute(&op).await?;
                if replay.classify() == Outcome::AuthExpired {
                    warn!(path = %op.target, "Replayed request still unauthorized");
                }
                replay.error_for_status()
            }
            Err(e) => {
                warn!(path = %op.target, error = %e, "Token refresh failed, ending session");
                self.teardown.run();
                response.error_for_status()
            }
        }
    }

    fn is_exempt(&self, target: &str) -> bool {
        let path = target.split(['?', '#']).next().unwrap_or_default();
        path == self.settings.refresh_path || self.settings.exempt_paths.iter().any(|p| p == path)
    }

    /// Join the in-flight refresh, or start one if idle. The idle check and
    /// the switch to in-flight happen under one lock.
    async fn fresh_access_token(&self) -> Result<String, RefreshError> {
        let pending = {
            let mut state = lock_state(&self.state);
            match &*state {
                RefreshState::InFlight(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                RefreshState::Idle => {
                    let refresh_token =
                        self.store.get(Slot::Refresh).ok_or(RefreshError::NoCredential)?;
                    let pending = self.spawn_refresh(refresh_token);
                    *state = RefreshState::InFlight(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn spawn_refresh(&self, refresh_token: String) -> PendingRefresh {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let path = self.settings.refresh_path.clone();
        let limit = self.settings.timeout;

        let handle = tokio::spawn(async move {
            let _settle = SettleOnDrop(state);
            let call = request_access_token(transport.as_ref(), &path, &refresh_token);
            let result = match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(RefreshError::TimedOut(limit)),
            };
            let result = result.and_then(|tokens| save_tokens(store.as_ref(), tokens));
            if result.is_ok() {
                info!("Access token refreshed");
            }
            result
        });

        handle
            .map(|joined| joined.unwrap_or_else(|e| Err(RefreshError::Aborted(e.to_string()))))
            .boxed()
            .shared()
    }
}

async fn request_access_token(
    transport: &dyn Transport,
    path: &str,
    refresh_token: &str,
) -> Result<TokenResponse, RefreshError> {
    let mut op = Operation::post(path);
    op.set_bearer(refresh_token);

    let response = transport
        .execute(&op)
        .await
        .map_err(|e| RefreshError::Transport(e.to_string()))?;

    match response.classify() {
        Outcome::Success => response
            .json::<TokenResponse>()
            .map_err(|e| RefreshError::InvalidResponse(e.to_string())),
        Outcome::AuthExpired | Outcome::Failure => {
            Err(RefreshError::Rejected(response.status.as_u16()))
        }
    }
}

fn save_tokens(store: &dyn TokenStore, tokens: TokenResponse) -> Result<String, RefreshError> {
    store
        .set(Slot::Access, tokens.access_token.clone())
        .map_err(|e| RefreshError::Storage(e.to_string()))?;
    if let Some(refresh) = tokens.refresh_token {
        // The new access token is already usable
        if let Err(e) = store.set(Slot::Refresh, refresh) {
            warn!(error = %e, "Failed to store rotated refresh token");
        }
    }
    Ok(tokens.access_token)
}
