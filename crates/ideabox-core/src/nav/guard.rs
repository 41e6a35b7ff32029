//! Navigation-time access check.
//!
//! Every attempt starts in *checking* and ends in *allowed* or *denied*. The
//! guard keeps nothing between attempts; a denied attempt redirects to the
//! entry destination and the original target is dropped.

use std::sync::Arc;

use tracing::debug;

use super::routes::Route;
use crate::auth::{Slot, TokenStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied { redirect: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

#[derive(Clone)]
pub struct AccessGuard {
    store: Arc<dyn TokenStore>,
    entry: String,
}

impl AccessGuard {
    pub fn new(store: Arc<dyn TokenStore>, entry: impl Into<String>) -> Self {
        Self {
            store,
            entry: entry.into(),
        }
    }

    /// Only the access slot is consulted; a refresh token alone does not
    /// grant entry.
    pub fn check(&self, route: &Route) -> Decision {
        if !route.requires_auth {
            return Decision::Allowed;
        }
        if self.store.get(Slot::Access).is_some() {
            Decision::Allowed
        } else {
            debug!(route = %route.name, redirect = %self.entry, "Navigation denied, no access token");
            Decision::Denied {
                redirect: self.entry.clone(),
            }
        }
    }
}
