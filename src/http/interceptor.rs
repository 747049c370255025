//! Request signing and the 401 redirect policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`BearerAuth`] is the only code that turns a stored token into an
//! `Authorization` header. [`UnauthorizedRedirect`] is the only code that
//! reacts to a 401: it drops every credential and sends the user to the login
//! route, unless they are already on a public route or a logout is underway.
//! Interceptors observe; they never swallow or replace a response.

use std::sync::Arc;

use super::{HttpRequest, HttpResponse, Signing};
use crate::nav::{LOGIN_ROUTE, Navigator, is_public_route};
use crate::store::CredentialStore;
use crate::types::TokenKind;

/// Runs on every outgoing request before it reaches the transport.
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: &mut HttpRequest, signing: Signing);
}

/// Runs on every response before it is returned to the caller.
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, request: &HttpRequest, response: &HttpResponse);
}

// =============================================================================
// REQUEST SIGNING
// =============================================================================

/// Pick the token that signs a request under `signing`.
///
/// Default signing prefers the seller token over the user token. The delivery
/// token never joins that chain; it signs only delivery-scoped requests.
#[must_use]
pub fn select_token(store: &CredentialStore, signing: Signing) -> Option<String> {
    match signing {
        Signing::Default => store
            .token(TokenKind::Seller)
            .or_else(|| store.token(TokenKind::User)),
        Signing::Delivery => store.token(TokenKind::Delivery),
        Signing::None => None,
    }
}

/// Adds `Authorization: Bearer <token>` from the credential store.
#[derive(Clone)]
pub struct BearerAuth {
    store: CredentialStore,
}

impl BearerAuth {
    #[must_use]
    pub fn new(store: CredentialStore) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerAuth {
    fn on_request(&self, request: &mut HttpRequest, signing: Signing) {
        if let Some(token) = select_token(&self.store, signing) {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
    }
}

// =============================================================================
// 401 POLICY
// =============================================================================

/// What the 401 policy did with one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectDecision {
    /// Not a 401.
    PassThrough,
    /// 401 on a public route; the caller shows its own error.
    SuppressedPublicRoute,
    /// 401 while a deliberate logout is in flight.
    SuppressedLoggingOut,
    /// Credentials cleared and the user sent to the login route.
    Redirected,
}

/// Clears the session and redirects to login on 401.
#[derive(Clone)]
pub struct UnauthorizedRedirect {
    store: CredentialStore,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedRedirect {
    #[must_use]
    pub fn new(store: CredentialStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Apply the policy for a response with `status`.
    pub fn handle(&self, status: u16) -> RedirectDecision {
        if status != 401 {
            return RedirectDecision::PassThrough;
        }
        let path = self.navigator.current_path();
        if is_public_route(&path) {
            tracing::debug!(%path, "401 on public route; leaving session alone");
            return RedirectDecision::SuppressedPublicRoute;
        }
        if self.store.logout_in_progress() {
            tracing::debug!(%path, "401 during logout; skipping redirect");
            return RedirectDecision::SuppressedLoggingOut;
        }
        tracing::info!(%path, "session rejected by server; clearing credentials");
        self.store.clear_all();
        self.navigator.navigate(LOGIN_ROUTE);
        RedirectDecision::Redirected
    }
}

impl ResponseInterceptor for UnauthorizedRedirect {
    fn on_response(&self, _request: &HttpRequest, response: &HttpResponse) {
        self.handle(response.status);
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod tests;
