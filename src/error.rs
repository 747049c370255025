//! Error type shared by the store, HTTP pipeline, and configuration.
//!
//! ERROR HANDLING
//! ==============
//! Expected session conditions (bad credentials, expired token, corrupt cache)
//! never reach callers as `SessionError`; the facade folds them into
//! [`crate::LoginOutcome`] / [`crate::TokenStatus`]. This type is for the
//! generic request path and for setup failures.

/// Errors produced by session and API client operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// A path or base URL could not be turned into a request URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// No response was received (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// Tokens must be non-empty strings.
    #[error("refusing to store an empty token")]
    EmptyToken,

    /// The persistent store could not be read or written.
    #[error("storage failed: {0}")]
    Storage(String),
}

impl SessionError {
    /// HTTP status carried by this error, if the server responded.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server rejected the request credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
