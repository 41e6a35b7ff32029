use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

use super::token_store::{Slot, TokenStore};

const SERVICE_NAME: &str = "ideabox";

/// Token store backed by the OS keychain, one entry per slot.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom keychain service name (one per backend, for instance).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, slot: Slot) -> Result<Entry> {
        Entry::new(&self.service, slot.key()).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, slot: Slot) -> Option<String> {
        let entry = self.entry(slot).ok()?;
        match entry.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                debug!(slot = slot.key(), error = %e, "Failed to read token from keychain");
                None
            }
        }
    }

    fn set(&self, slot: Slot, token: String) -> Result<()> {
        self.entry(slot)?
            .set_password(&token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self, slot: Slot) -> Result<()> {
        match self.entry(slot)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
