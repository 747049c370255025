//! Session facade: the only entry point UI code uses for identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wires a [`CredentialStore`], a [`Navigator`], and an [`HttpTransport`] into
//! one [`ApiClient`] with bearer signing and the 401 redirect policy, then
//! exposes login / validation / logout on top of it.
//!
//! ERROR HANDLING
//! ==============
//! Expected failures (bad credentials, rejected token, corrupt cache, network
//! down) come back as [`LoginOutcome`] / [`TokenStatus`] / `None`, never as
//! errors. Storage is only touched on success, except where the 401 policy
//! clears it.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::http::interceptor::select_token;
use crate::http::{ApiClient, ApiRequest, BearerAuth, HttpTransport, ReqwestTransport, Signing, UnauthorizedRedirect};
use crate::nav::{LOGIN_ROUTE, Navigator};
use crate::store::CredentialStore;
use crate::types::{CachedUser, Role, TokenKind};

pub const VERIFY_PATH: &str = "/auth/verify";
pub const LOGOUT_PATH: &str = "/auth/logout";

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const SERVER_UNREACHABLE: &str = "Unable to reach the server. Please try again.";

// =============================================================================
// RESULT SHAPES
// =============================================================================

/// Normalized result of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(CachedUser),
    Rejected { message: String },
}

impl LoginOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn user(&self) -> Option<&CachedUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Authenticated(_) => None,
            Self::Rejected { message } => Some(message),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into() }
    }
}

/// Result of a token validation round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    Valid(CachedUser),
    Invalid,
}

impl TokenStatus {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub fn user(&self) -> Option<&CachedUser> {
        match self {
            Self::Valid(user) => Some(user),
            Self::Invalid => None,
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

// =============================================================================
// SESSION
// =============================================================================

/// Session facade. Cheap to clone; clones share store, navigator, and client.
#[derive(Clone)]
pub struct Session {
    config: SessionConfig,
    store: CredentialStore,
    navigator: Arc<dyn Navigator>,
    client: ApiClient,
}

impl Session {
    /// Assemble a session over an explicit transport.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        store: CredentialStore,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let client = ApiClient::new(&config.api_url, transport)
            .with_request_interceptor(Arc::new(BearerAuth::new(store.clone())))
            .with_response_interceptor(Arc::new(UnauthorizedRedirect::new(store.clone(), navigator.clone())));
        Self { config, store, navigator, client }
    }

    /// Assemble a session over the production `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn connect(
        config: SessionConfig,
        store: CredentialStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, SessionError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::new(config, store, navigator, Arc::new(transport)))
    }

    /// The shared, signed request pipeline for application calls.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Log in as a customer/admin through `POST /auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        self.login_as(TokenKind::User, email, password).await
    }

    /// Log in under `kind`'s endpoint and persist into `kind`'s namespace.
    pub async fn login_as(&self, kind: TokenKind, email: &str, password: &str) -> LoginOutcome {
        let request = ApiRequest::post(kind.login_path())
            .body(json!({ "email": email, "password": password }))
            .signing(Signing::None);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%kind, error = %e, "login request failed");
                return LoginOutcome::rejected(SERVER_UNREACHABLE);
            }
        };
        if !response.is_success() {
            let message = response.server_message().unwrap_or_else(|| LOGIN_FAILED.to_owned());
            tracing::warn!(%kind, %email, status = response.status, "login rejected");
            return LoginOutcome::rejected(message);
        }

        let Some((token, record, user)) = response
            .json::<LoginResponse>()
            .ok()
            .and_then(|body| parse_login(kind, body))
        else {
            tracing::warn!(%kind, "login response missing token or record");
            return LoginOutcome::rejected(LOGIN_FAILED);
        };

        if let Err(e) = self.store.set(kind, &token, &record) {
            tracing::warn!(%kind, error = %e, "failed to persist credentials");
            return LoginOutcome::rejected(LOGIN_FAILED);
        }
        tracing::info!(%kind, %email, role = ?user.role, "login succeeded");
        LoginOutcome::Authenticated(user)
    }

    /// Ask the server whether the cached user token is still good.
    ///
    /// Short-circuits to [`TokenStatus::Invalid`] without a request when no
    /// token or no readable record is cached. Never clears storage itself.
    pub async fn validate_token(&self) -> TokenStatus {
        let creds = self.store.get(TokenKind::User);
        let (Some(_), Some(cached)) = (creds.token.as_ref(), creds.user()) else {
            return TokenStatus::Invalid;
        };

        let response = match self.client.execute(ApiRequest::get(VERIFY_PATH)).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::debug!(status = response.status, "token rejected by server");
                return TokenStatus::Invalid;
            }
            Err(e) => {
                tracing::debug!(error = %e, "token validation failed");
                return TokenStatus::Invalid;
            }
        };

        // Any 2xx confirms the token; only an object `user` refreshes the cache.
        let confirmed = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|mut body| body.get_mut("user").map(Value::take))
            .filter(Value::is_object)
            .and_then(|raw| serde_json::from_value::<CachedUser>(raw.clone()).ok().map(|user| (raw, user)));
        match confirmed {
            Some((raw, user)) => {
                if let Err(e) = self.store.set_record(TokenKind::User, &raw) {
                    tracing::warn!(error = %e, "failed to refresh cached user");
                }
                TokenStatus::Valid(user)
            }
            None => TokenStatus::Valid(cached),
        }
    }

    /// Token and record both cached. Says nothing about server validity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.get(TokenKind::User).is_complete()
    }

    /// Cached user, or `None` when missing or corrupt.
    #[must_use]
    pub fn current_user(&self) -> Option<CachedUser> {
        self.store.get(TokenKind::User).user()
    }

    #[must_use]
    pub fn has_role(&self, role: &Role) -> bool {
        self.current_user().and_then(|user| user.role).as_ref() == Some(role)
    }

    /// Drop every cached credential. No flag, no navigation.
    pub fn logout(&self) {
        self.store.clear_all();
    }

    /// User-initiated logout: raise the logout flag, drop credentials, go to
    /// the login route, then tell the server. The flag keeps the 401 policy
    /// quiet for the configured grace window.
    pub async fn logout_and_redirect(&self) {
        self.store.begin_logout(self.config.logout_grace);
        let token = select_token(&self.store, Signing::Default);

        self.store.clear_all();
        self.navigator.navigate(LOGIN_ROUTE);
        tracing::info!("logged out");

        let Some(token) = token else {
            return;
        };
        let request = ApiRequest::post(LOGOUT_PATH)
            .signing(Signing::None)
            .header("Authorization", format!("Bearer {token}"));
        match self.client.execute(request).await {
            Ok(response) if response.is_success() => {}
            Ok(response) => tracing::debug!(status = response.status, "server logout not acknowledged"),
            Err(e) => tracing::debug!(error = %e, "server logout failed"),
        }
    }
}

/// Pull `(token, raw record, parsed record)` out of a login body.
fn parse_login(kind: TokenKind, body: LoginResponse) -> Option<(String, Value, CachedUser)> {
    let token = body.token.filter(|t| !t.is_empty())?;
    let mut rest = body.rest;
    let record = rest
        .remove(kind.login_record_field())
        .or_else(|| rest.remove("user"))
        .filter(Value::is_object)?;
    let user = serde_json::from_value(record.clone()).ok()?;
    Some((token, record, user))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
