//! JSON-file backend; survives process restarts the way `localStorage`
//! survives page reloads.
//!
//! Each operation re-reads the file under a mutex so two handles on the same
//! path observe each other's writes. Writes go to a sibling temp file and are
//! renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::SessionStore;
use crate::error::SessionError;

type Items = BTreeMap<String, String>;

/// `SessionStore` persisted as a flat JSON object of strings.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open (lazily) the store at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Items {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Items::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session file unreadable");
                return Items::new();
            }
        };
        if raw.trim().is_empty() {
            return Items::new();
        }
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "session file corrupt; treating as empty");
            Items::new()
        })
    }

    fn save(&self, items: &Items) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(items).map_err(|e| SessionError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

impl SessionStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        items.insert(key.to_owned(), value.to_owned());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        if items.remove(key).is_none() {
            return;
        }
        if let Err(e) = self.save(&items) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove session key");
        }
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
