use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::token_store::{CredentialPair, Slot, TokenStore};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// On-disk shape of the session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(flatten)]
    pub credentials: CredentialPair,
    pub saved_at: DateTime<Utc>,
}

/// Token store persisted as JSON in the cache directory.
///
/// Reads are served from memory; every write is flushed to disk before it
/// returns. The file is removed once both slots are empty.
pub struct FileTokenStore {
    path: PathBuf,
    pair: RwLock<CredentialPair>,
}

impl FileTokenStore {
    /// Open the session file under `cache_dir`, loading any saved credentials.
    pub fn open(cache_dir: &Path) -> Result<Self> {
        let path = cache_dir.join(SESSION_FILE);
        let pair = Self::load(&path)?;
        debug!(
            has_access = pair.access.is_some(),
            has_refresh = pair.refresh.is_some(),
            "Session loaded"
        );
        Ok(Self {
            path,
            pair: RwLock::new(pair),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<CredentialPair> {
        if !path.exists() {
            return Ok(CredentialPair::default());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(data.credentials)
    }

    fn save(&self, pair: &CredentialPair) -> Result<()> {
        if pair.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = SessionData {
            credentials: pair.clone(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn update(&self, slot: Slot, value: Option<String>) -> Result<()> {
        let mut pair = self.pair.write().unwrap_or_else(PoisonError::into_inner);
        *pair.slot_mut(slot) = value;
        self.save(&pair)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict session file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn get(&self, slot: Slot) -> Option<String> {
        let pair = self.pair.read().unwrap_or_else(PoisonError::into_inner);
        pair.get(slot).map(str::to_string)
    }

    fn set(&self, slot: Slot, token: String) -> Result<()> {
        self.update(slot, Some(token))
    }

    fn clear(&self, slot: Slot) -> Result<()> {
        self.update(slot, None)
    }
}
