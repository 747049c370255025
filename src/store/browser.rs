//! Browser `localStorage` backend (hydrate builds only).

use super::SessionStore;
use crate::error::SessionError;

/// `SessionStore` over `window.localStorage`.
///
/// Holds no handle; the storage object is looked up per call so the type
/// stays `Send + Sync`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl SessionStore for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let storage = storage().ok_or_else(|| SessionError::Storage("localStorage unavailable".to_owned()))?;
        storage
            .set_item(key, value)
            .map_err(|e| SessionError::Storage(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = storage() {
            let _ = storage.remove_item(key);
        }
    }
}
