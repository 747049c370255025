//! The shared request pipeline: wire types, the transport seam, interceptors,
//! and [`ApiClient`].
//!
//! SYSTEM CONTEXT
//! ==============
//! `ApiClient` builds a request from an [`ApiRequest`], adds default JSON
//! headers, runs request interceptors (credential signing), hands it to an
//! [`HttpTransport`], then shows the response to every response interceptor
//! (401 policy) before returning it to the caller unchanged.

mod client;
pub mod interceptor;
mod transport;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SessionError;

pub use client::ApiClient;
pub use interceptor::{BearerAuth, RedirectDecision, RequestInterceptor, ResponseInterceptor, UnauthorizedRedirect};
pub use transport::ReqwestTransport;

// =============================================================================
// TRANSPORT SEAM
// =============================================================================

/// Sends one fully-built request and returns whatever the server answered.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] when no response was received.
    /// Non-success statuses are *not* errors at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SessionError>;
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stored credential signs a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Signing {
    /// Seller token if present, else user token.
    #[default]
    Default,
    /// Delivery token only; used inside the delivery-agent area.
    Delivery,
    /// Send unauthenticated.
    None,
}

/// Outgoing request as transports and interceptors see it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set `name`, replacing any existing value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.into()));
    }
}

/// Raw server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes from `null`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SessionError> {
        if self.body.trim().is_empty() {
            return serde_json::from_value(Value::Null).map_err(|e| SessionError::Decode(e.to_string()));
        }
        serde_json::from_str(&self.body).map_err(|e| SessionError::Decode(e.to_string()))
    }

    /// Server-supplied `message` (or `error`) field, if the body carries one.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let value: Value = serde_json::from_str(&self.body).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned)
    }

    /// Convert a non-success response into [`SessionError::Status`].
    #[must_use]
    pub fn into_error(self) -> SessionError {
        let message = self
            .server_message()
            .unwrap_or_else(|| status_fallback_message(self.status));
        SessionError::Status { status: self.status, message }
    }
}

fn status_fallback_message(status: u16) -> String {
    format!("request failed with status {status}")
}

// =============================================================================
// API REQUEST
// =============================================================================

/// Application-level request: a path relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub signing: Signing,
    /// Extra headers, applied before interceptors run.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, signing: Signing::Default, headers: Vec::new() }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn signing(mut self, signing: Signing) -> Self {
        self.signing = signing;
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
