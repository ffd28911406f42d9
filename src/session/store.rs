use crate::config::Config;
use crate::storage::token_storage::{
    FileTokenStorage, MemoryTokenStorage, StoredTokens, TokenStorage,
};
use std::fmt;
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Owned, process-wide session state: the token pair plus the gate that
/// serializes refresh attempts.
///
/// Every outgoing request reads the access token from here, so a mutation
/// (login, refresh, logout) immediately affects all subsequent requests.
/// Each mutation is written through to durable storage; a failed write is
/// logged and the in-memory state stays authoritative for the process.
pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    tokens: RwLock<StoredTokens>,
    refresh_gate: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        let tokens = storage.load().unwrap_or_default();
        if !tokens.is_empty() {
            debug!("Restored session from storage");
        }
        Self {
            storage,
            tokens: RwLock::new(tokens),
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Box::new(FileTokenStorage::from_config(&config.storage)))
    }

    /// Storage-free store, useful for tests and one-shot tools.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStorage::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    /// Install a full token pair (login or social-auth callback).
    pub fn set_tokens(&self, access: &str, refresh: &str) {
        let snapshot = self.write(|tokens| {
            tokens.access_token = Some(access.to_string());
            tokens.refresh_token = Some(refresh.to_string());
        });
        self.persist(&snapshot);
    }

    /// Replace only the access token (successful refresh).
    pub fn set_access_token(&self, access: &str) {
        let snapshot = self.write(|tokens| {
            tokens.access_token = Some(access.to_string());
        });
        self.persist(&snapshot);
    }

    /// Purge the session (logout or unrecoverable refresh failure).
    pub fn clear(&self) {
        self.write(|tokens| *tokens = StoredTokens::default());
        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear token storage: {}", e);
        }
    }

    /// Gate held across the whole check-refresh-persist sequence so that
    /// concurrent 401s share a single in-flight refresh.
    pub(crate) fn refresh_gate(&self) -> &Mutex<()> {
        &self.refresh_gate
    }

    fn read(&self) -> StoredTokens {
        match self.tokens.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write<F: FnOnce(&mut StoredTokens)>(&self, mutate: F) -> StoredTokens {
        let mut guard = match self.tokens.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        mutate(&mut guard);
        guard.clone()
    }

    fn persist(&self, snapshot: &StoredTokens) {
        if let Err(e) = self.storage.save(snapshot) {
            warn!("Failed to persist session tokens: {}", e);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
