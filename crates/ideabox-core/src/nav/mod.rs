//! Navigation between logical destinations.
//!
//! - `RouteTable`: static `{name, path, requires_auth}` configuration
//! - `AccessGuard`: blocks protected routes when no access token is stored
//! - `Router`: resolves paths, applies the guard, tracks the current location

pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{AccessGuard, Decision};
pub use router::{NavError, Navigation, Router};
pub use routes::{Route, RouteTable, LOGIN_PATH};

/// Forced navigation, bypassing the guard. Used when a session is torn down.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}
