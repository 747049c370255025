//! Credential storage: the key/value seam and the typed namespace wrapper.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every read or write of tokens and cached records goes through
//! [`CredentialStore`]. Backends only implement [`SessionStore`], a synchronous
//! string map with `localStorage` semantics, so the browser, a file on disk,
//! and tests share one code path.
//!
//! TRADE-OFFS
//! ==========
//! Reads never fail: an unreadable backend looks empty. Writes of tokens can
//! fail and report it; removals are best-effort and idempotent.

mod file;
mod memory;
#[cfg(feature = "hydrate")]
mod browser;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::SessionError;
use crate::types::{CachedUser, LOGGING_OUT_KEY, TokenKind};

#[cfg(feature = "hydrate")]
pub use browser::LocalStorage;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous, process-wide string key/value storage.
pub trait SessionStore: Send + Sync {
    /// Value stored under `key`, or `None` when absent or unreadable.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove_item(&self, key: &str);
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Snapshot of one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: Option<String>,
    /// Serialized record exactly as stored; may be corrupt. Empty reads as absent.
    pub raw_user: Option<String>,
}

impl Credentials {
    /// Both a token and a record are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.raw_user.is_some()
    }

    /// Parsed record, or `None` if missing or corrupt.
    #[must_use]
    pub fn user(&self) -> Option<CachedUser> {
        let raw = self.raw_user.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt cached user record");
                None
            }
        }
    }
}

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

/// Typed access to the token/record namespaces and the logout flag.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SessionStore>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(backend: Arc<dyn SessionStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh in-memory map.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist `token` and `user` under `kind`'s namespace. A failed write
    /// leaves the namespace without a token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for an empty token, or a storage /
    /// serialization error from the backend.
    pub fn set<U>(&self, kind: TokenKind, token: &str, user: &U) -> Result<(), SessionError>
    where
        U: Serialize + ?Sized,
    {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let raw = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.backend.set_item(kind.record_key(), &raw)?;
        if let Err(e) = self.backend.set_item(kind.token_key(), token) {
            self.backend.remove_item(kind.record_key());
            return Err(e);
        }
        Ok(())
    }

    /// Overwrite only the cached record for `kind`, keeping its token.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error from the backend.
    pub fn set_record<U>(&self, kind: TokenKind, user: &U) -> Result<(), SessionError>
    where
        U: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(user).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.backend.set_item(kind.record_key(), &raw)
    }

    /// Current contents of `kind`'s namespace.
    #[must_use]
    pub fn get(&self, kind: TokenKind) -> Credentials {
        Credentials {
            token: self.backend.get_item(kind.token_key()).filter(|t| !t.is_empty()),
            raw_user: self.backend.get_item(kind.record_key()).filter(|r| !r.is_empty()),
        }
    }

    /// Token for `kind`, if any.
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Option<String> {
        self.get(kind).token
    }

    /// Remove `kind`'s namespace.
    pub fn clear(&self, kind: TokenKind) {
        self.backend.remove_item(kind.token_key());
        self.backend.remove_item(kind.record_key());
    }

    /// Remove every namespace. The logout flag is left to expire on its own
    /// so a logout in progress keeps its grace window.
    pub fn clear_all(&self) {
        for kind in TokenKind::ALL {
            self.clear(kind);
        }
    }

    /// Raise the logout-in-progress flag for `grace`.
    pub fn begin_logout(&self, grace: Duration) {
        let deadline = now_millis().saturating_add(u64::try_from(grace.as_millis()).unwrap_or(u64::MAX));
        if let Err(e) = self.backend.set_item(LOGGING_OUT_KEY, &deadline.to_string()) {
            tracing::warn!(error = %e, "failed to record logout flag");
        }
    }

    /// Drop the logout flag before its window ends.
    pub fn end_logout(&self) {
        self.backend.remove_item(LOGGING_OUT_KEY);
    }

    /// True while a logout started within its grace window.
    #[must_use]
    pub fn logout_in_progress(&self) -> bool {
        self.backend
            .get_item(LOGGING_OUT_KEY)
            .and_then(|raw| raw.parse::<u64>().ok())
            .is_some_and(|deadline| now_millis() < deadline)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
