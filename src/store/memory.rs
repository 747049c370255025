//! In-process map backend.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::SessionStore;
use crate::error::SessionError;

/// `SessionStore` kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
    }
}
