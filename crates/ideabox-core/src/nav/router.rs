use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::guard::{AccessGuard, Decision};
use super::routes::{Route, RouteTable};
use super::Navigator;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NavError {
    #[error("No route matches {0}")]
    NotFound(String),
}

/// Result of a guarded navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Entered { route: Route, path: String },
    Redirected { to: String },
}

/// Owns the route table and the current location.
///
/// Location changes, guarded or forced, are published on a watch channel so
/// a front end can react to a forced logout redirect.
pub struct Router {
    routes: RouteTable,
    guard: AccessGuard,
    location: watch::Sender<String>,
}

impl Router {
    pub fn new(routes: RouteTable, guard: AccessGuard) -> Self {
        let (location, _) = watch::channel("/".to_string());
        Self {
            routes,
            guard,
            location,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn current(&self) -> String {
        self.location.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location.subscribe()
    }

    /// Navigate to `path`, subject to the access guard.
    pub fn navigate(&self, path: &str) -> Result<Navigation, NavError> {
        let route = self
            .routes
            .resolve(path)
            .ok_or_else(|| NavError::NotFound(path.to_string()))?;

        match self.guard.check(route) {
            Decision::Allowed => {
                debug!(route = %route.name, path = %path, "Navigation allowed");
                self.location.send_replace(path.to_string());
                Ok(Navigation::Entered {
                    route: route.clone(),
                    path: path.to_string(),
                })
            }
            Decision::Denied { redirect } => {
                info!(redirect = %redirect, "Login required, redirecting");
                self.location.send_replace(redirect.clone());
                Ok(Navigation::Redirected { to: redirect })
            }
        }
    }
}

impl Navigator for Router {
    fn navigate_to(&self, path: &str) {
        info!(path = %path, "Forced navigation");
        self.location.send_replace(path.to_string());
    }
}
