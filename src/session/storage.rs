use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SessionError;

/// Durable home of the session token.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub entries: HashMap<String, StoredToken>,
}

/// Token kept in `session.json` under a well-known key.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
    key: String,
}

impl FileTokenStorage {
    pub const FILE_NAME: &'static str = "session.json";

    pub fn new(config_dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            path: config_dir.as_ref().join(Self::FILE_NAME),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<SessionFile, SessionError> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionFile::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_file(&self, file: &SessionFile) -> Result<(), SessionError> {
        if file.entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self
            .read_file()?
            .entries
            .remove(&self.key)
            .map(|stored| stored.value))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut file = self.read_file()?;
        file.entries.insert(
            self.key.clone(),
            StoredToken {
                value: token.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_file(&file)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut file = self.read_file()?;
        if file.entries.remove(&self.key).is_some() {
            self.write_file(&file)?;
        }
        Ok(())
    }
}

/// Process-local storage for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    pub fn peek(&self) -> Option<String> {
        self.token.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.peek())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.token.lock().map_err(|_| SessionError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_storage_round_trips_and_removes_file_on_clear() {
        let dir = tempdir().unwrap();
        // Created on first save
        let storage = FileTokenStorage::new(dir.path().join("org-console"), "token");
        assert_eq!(storage.load().unwrap(), None);

        storage.save("abc.def.ghi").unwrap();
        assert!(storage.path().exists());
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def.ghi"));

        storage.clear().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn keys_are_independent() {
        let dir = tempdir().unwrap();
        let a = FileTokenStorage::new(dir.path(), "token");
        let b = FileTokenStorage::new(dir.path(), "authToken");
        a.save("one").unwrap();
        b.save("two").unwrap();
        a.clear().unwrap();
        assert_eq!(a.load().unwrap(), None);
        assert_eq!(b.load().unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(FileTokenStorage::FILE_NAME), "{not json").unwrap();
        let storage = FileTokenStorage::new(dir.path(), "token");
        assert!(matches!(storage.load(), Err(SessionError::Corrupt(_))));
    }
}
