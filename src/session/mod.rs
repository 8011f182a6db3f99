//! Session token store.
//!
//! [`SessionStore`] is the single owner of the current bearer token. It is
//! seeded from durable storage when opened, persists every change before
//! publishing it, and notifies subscribers through a `watch` channel.
//! Expiry is never checked here; the server rejects stale tokens.

pub mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::config::{AppConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("session lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct Inner {
    storage: Arc<dyn TokenStorage>,
    sender: watch::Sender<Option<String>>,
    write_lock: Mutex<()>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    pub fn open(storage: Arc<dyn TokenStorage>) -> Result<Self, SessionError> {
        let initial = storage.load()?.filter(|t| !t.is_empty());
        let (sender, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(Inner {
                storage,
                sender,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Store backed by `session.json` in the configured directory.
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let storage = FileTokenStorage::new(config.config_dir()?, config.session.storage_key.clone());
        Self::open(Arc::new(storage))
    }

    pub fn in_memory() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                storage: Arc::new(MemoryTokenStorage::new()),
                sender,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.sender.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.sender.borrow().is_some()
    }

    /// `Some` persists then publishes the token; `None` (or an empty
    /// string) clears storage then publishes the logout.
    pub fn set_token(&self, token: Option<String>) -> Result<(), SessionError> {
        let _guard = self.inner.write_lock.lock().map_err(|_| SessionError::Poisoned)?;
        let token = token.filter(|t| !t.is_empty());

        match &token {
            Some(value) => self.inner.storage.save(value)?,
            None => self.inner.storage.clear()?,
        }

        let authenticated = token.is_some();
        self.inner.sender.send_replace(token);
        tracing::debug!(authenticated, "session token updated");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.set_token(None)
    }

    /// Receiver that observes every subsequent token change.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.sender.subscribe()
    }
}
