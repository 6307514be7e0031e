//! Durable client-side key-value storage
//!
//! - [`MemoryStore`] keeps values for the life of the process
//! - [`FileStore`] keeps values in a JSON object file on disk
//! - [`ScopeIdCache`] is the firm-id cache built on either of them

pub mod scope_cache;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

pub use scope_cache::{ScopeIdCache, DEFAULT_FIRM_ID_KEY};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage contents are not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value storage that survives page loads
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.items.lock() {
            Ok(items) => items.is_empty(),
            Err(_) => true,
        }
    }
}

impl DurableStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self
            .items
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file; a missing file reads as empty
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, items: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename keeps readers from seeing a half-written file
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let items = self.read_all()?;
        let value = items.get(key).and_then(Value::as_str);
        Ok(value.map(ToString::to_string))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Only unparseable contents are replaced; I/O failures leave the file alone
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StoreError::Format(e)) => {
                log::warn!(
                    "Discarding unreadable store at {}: {e}",
                    self.path.display()
                );
                Map::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&items)
    }
}
