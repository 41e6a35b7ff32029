//! Key-value storage for the access and refresh credentials.
//!
//! A `TokenStore` is pure storage: two named slots, no policy. Deciding when
//! to write the access slot belongs to login and to the refresh coordinator.

use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Access,
    Refresh,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Access, Slot::Refresh];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::Access => "access",
            Slot::Refresh => "refresh",
        }
    }
}

/// Snapshot of both credential slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl CredentialPair {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Access => self.access.as_deref(),
            Slot::Refresh => self.refresh.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::Access => &mut self.access,
            Slot::Refresh => &mut self.refresh,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

pub trait TokenStore: Send + Sync {
    fn get(&self, slot: Slot) -> Option<String>;

    fn set(&self, slot: Slot, token: String) -> Result<()>;

    fn clear(&self, slot: Slot) -> Result<()>;

    /// Clear both slots. Every slot is attempted even if one fails; the
    /// first error is returned.
    fn clear_all(&self) -> Result<()> {
        let mut first_err = None;
        for slot in Slot::ALL {
            if let Err(e) = self.clear(slot) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn credentials(&self) -> CredentialPair {
        CredentialPair {
            access: self.get(Slot::Access),
            refresh: self.get(Slot::Refresh),
        }
    }
}

/// Process-local store. Lives as long as the client instance.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RwLock<CredentialPair>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(pair: CredentialPair) -> Self {
        Self {
            pair: RwLock::new(pair),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, slot: Slot) -> Option<String> {
        let pair = self.pair.read().unwrap_or_else(PoisonError::into_inner);
        pair.get(slot).map(str::to_string)
    }

    fn set(&self, slot: Slot, token: String) -> Result<()> {
        let mut pair = self.pair.write().unwrap_or_else(PoisonError::into_inner);
        *pair.slot_mut(slot) = Some(token);
        Ok(())
    }

    fn clear(&self, slot: Slot) -> Result<()> {
        let mut pair = self.pair.write().unwrap_or_else(PoisonError::into_inner);
        *pair.slot_mut(slot) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(Slot::Access), None);

        store.set(Slot::Access, "a1".to_string()).unwrap();
        store.set(Slot::Refresh, "r1".to_string()).unwrap();
        assert_eq!(store.get(Slot::Access).as_deref(), Some("a1"));
        assert_eq!(store.get(Slot::Refresh).as_deref(), Some("r1"));

        store.clear(Slot::Access).unwrap();
        assert_eq!(store.get(Slot::Access), None);
        assert_eq!(store.get(Slot::Refresh).as_deref(), Some("r1"));
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let store = MemoryTokenStore::with_credentials(CredentialPair {
            access: Some("a".to_string()),
            refresh: Some("r".to_string()),
        });

        store.clear_all().unwrap();
        assert!(store.credentials().is_empty());

        store.clear_all().unwrap();
        assert!(store.credentials().is_empty());
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(Slot::Access.key(), "access");
        assert_eq!(Slot::Refresh.key(), "refresh");
    }
}
