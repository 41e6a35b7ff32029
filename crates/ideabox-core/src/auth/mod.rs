//! Authentication module for managing credentials and session lifetime.
//!
//! This module provides:
//! - `TokenStore`: the two-slot (access/refresh) credential storage contract
//! - `MemoryTokenStore`, `FileTokenStore`, `KeyringTokenStore`: its backends
//! - `SessionTeardown`: clears credentials and forces a return to login

pub mod credentials;
pub mod session;
pub mod teardown;
pub mod token_store;

pub use credentials::KeyringTokenStore;
pub use session::{FileTokenStore, SessionData};
pub use teardown::SessionTeardown;
pub use token_store::{CredentialPair, MemoryTokenStore, Slot, TokenStore};
