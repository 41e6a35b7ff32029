//! Client-side session handling for the ideabox idea board.
//!
//! Outgoing requests carry the stored access token; an expired token is
//! refreshed once (shared by every request that hit the expiry) and the
//! request replayed. A failed refresh logs the user out and sends them back
//! to the login route. Protected routes are guarded at navigation time.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nav;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use api::{ApiError, IdeaClient};
pub use auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, Slot, TokenStore};
pub use config::{Config, TokenStorage};
pub use nav::{Navigation, Navigator, Router};
