use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Which of the two tokens is being stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Access,
    Refresh,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 2] = [CredentialKind::Access, CredentialKind::Refresh];

    /// Fixed key the token is persisted under
    pub fn storage_key(&self) -> &'static str {
        match self {
            CredentialKind::Access => "ebbing-console-token",
            CredentialKind::Refresh => "ebbing-console-refresh-token",
        }
    }
}

/// Durable storage for the opaque token strings. No validation, no logic.
pub trait CredentialStore: Send + Sync {
    fn get(&self, kind: CredentialKind) -> Option<String>;

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), StorageError>;

    /// Removing an absent token is not an error
    fn remove(&self, kind: CredentialKind) -> Result<(), StorageError>;
}

/// Process-local store; survives nothing
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<CredentialKind, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, kind: CredentialKind) -> Option<String> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(&kind).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(kind, value.to_string());
        Ok(())
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), StorageError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.remove(&kind);
        Ok(())
    }
}

/// JSON file keyed by [`CredentialKind::storage_key`]. Survives restarts,
/// not a deleted file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, kind: CredentialKind) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.load() {
            Ok(values) => values.get(kind.storage_key()).filter(|v| !v.is_empty()).cloned(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable credentials at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, kind: CredentialKind, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A corrupt file is replaced rather than blocking a fresh login
        let mut values = self.load().unwrap_or_default();
        values.insert(kind.storage_key().to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, kind: CredentialKind) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = self.load().unwrap_or_default();
        if values.remove(kind.storage_key()).is_none() && self.path.exists() {
            return Ok(());
        }
        if values.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        self.save(&values)
    }
}
