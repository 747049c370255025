//! Route awareness for the 401 redirect policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! The response interceptor needs two things from the host: where the user is
//! now, and a way to send them to the login page. [`Navigator`] is that seam.

use std::sync::{Mutex, PoisonError};

/// Route the user is sent to after their session is dropped.
pub const LOGIN_ROUTE: &str = "/login";

/// Routes that work without a session; a 401 here is a form error, not an
/// expired session.
pub const PUBLIC_ROUTES: [&str; 3] = ["/login", "/register", "/seller-login"];

/// True when `path` is one of [`PUBLIC_ROUTES`], ignoring query, fragment, and
/// trailing slash.
#[must_use]
pub fn is_public_route(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    PUBLIC_ROUTES.contains(&trimmed)
}

/// Host navigation hooks.
pub trait Navigator: Send + Sync {
    /// Path component of the current route.
    fn current_path(&self) -> String;

    /// Move to `path`, replacing the current view.
    fn navigate(&self, path: &str);
}

// =============================================================================
// MEMORY NAVIGATOR
// =============================================================================

/// Navigator that records every navigation. Used by the CLI and tests.
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: &str) -> Self {
        Self { history: Mutex::new(vec![start.to_owned()]) }
    }

    /// Every path visited, starting with the initial one.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of navigations performed after construction.
    #[must_use]
    pub fn navigations(&self) -> usize {
        self.history().len().saturating_sub(1)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}

// =============================================================================
// BROWSER NAVIGATOR
// =============================================================================

/// Navigator over `window.location` (hydrate builds only).
#[cfg(feature = "hydrate")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserNavigator;

#[cfg(feature = "hydrate")]
impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    }

    fn navigate(&self, path: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
