use crate::config::StorageConfig;
use crate::constants::{TOKEN_DIR_NAME, TOKEN_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Snapshot of the persisted session credentials.
///
/// The two tokens are independent: a refresh replaces only the access token,
/// so either field can be present without the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl StoredTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Durable client-local storage for the token pair.
///
/// Reads are infallible: anything unreadable is treated as "no stored
/// session" and the user logs in again.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<StoredTokens>;
    fn save(&self, tokens: &StoredTokens) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// JSON file in the platform config directory (or a caller-supplied path).
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        let path = config
            .token_path
            .clone()
            .unwrap_or_else(Self::default_path);
        Self::new(path)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(TOKEN_DIR_NAME)
            .join(TOKEN_FILE_NAME)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<StoredTokens>(&contents) {
            Ok(tokens) if tokens.is_empty() => None,
            Ok(tokens) => {
                debug!("Loaded stored session from {}", self.path.display());
                Some(tokens)
            }
            Err(e) => {
                warn!("Corrupt token file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, tokens: &StoredTokens) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(tokens)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, contents)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-process storage for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    inner: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<StoredTokens> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> io::Result<()> {
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(tokens.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(tokens.clone()),
        }
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match self.inner.lock() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests_file_token_storage {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn storage_in(dir: &TempDir) -> FileTokenStorage {
        FileTokenStorage::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        assert_eq!(storage.load(), None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        let tokens = StoredTokens {
            access_token: Some("access-1".to_string()),
            refresh_token: Some("refresh-1".to_string()),
        };
        storage.save(&tokens).unwrap();

        assert_eq!(storage.load(), Some(tokens));
    }

    #[test]
    fn test_corrupt_file_reads_as_no_session() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileTokenStorage::new(path);
        assert_eq!(storage.load(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);

        storage
            .save(&StoredTokens {
                access_token: Some("access-1".to_string()),
                refresh_token: None,
            })
            .unwrap();
        storage.clear().unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.load(), None);
    }

    #[test]
    fn test_from_config_prefers_explicit_path() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("custom.json");
        let config = StorageConfig {
            token_path: Some(explicit.clone()),
        };
        let storage = FileTokenStorage::from_config(&config);
        assert_eq!(storage.path(), &explicit);
    }
}
