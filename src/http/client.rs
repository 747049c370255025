//! The single configured request pipeline.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::interceptor::{RequestInterceptor, ResponseInterceptor};
use super::{ApiRequest, HttpRequest, HttpResponse, HttpTransport, Signing};
use crate::error::SessionError;

const JSON: &str = "application/json";

/// Shared HTTP client: base URL, default JSON headers, and interceptors.
///
/// Cheap to clone; clones share the transport and interceptors.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    transport: Arc<dyn HttpTransport>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
    /// Client without interceptors. Trailing slashes on `base_url` are dropped.
    #[must_use]
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            transport,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Absolute `http(s)` URLs pass through; they are
    /// only signed when they share the base URL's origin.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] if `path` contains whitespace.
    pub fn url_for(&self, path: &str) -> Result<String, SessionError> {
        if path.chars().any(char::is_whitespace) {
            return Err(SessionError::InvalidUrl(path.to_owned()));
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_owned());
        }
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Ok(self.base_url.to_string());
        }
        Ok(format!("{}/{path}", self.base_url))
    }

    /// Run `request` through the pipeline and return the raw response,
    /// whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the URL is invalid or no response arrived.
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, SessionError> {
        let mut http = HttpRequest::new(request.method, self.url_for(&request.path)?);
        http.set_header("Content-Type", JSON);
        http.set_header("Accept", JSON);
        for (name, value) in &request.headers {
            http.set_header(name, value.as_str());
        }
        http.body = request.body;
        let signing = if same_origin(&http.url, &self.base_url) {
            request.signing
        } else {
            tracing::debug!(url = %http.url, "foreign origin; sending unsigned");
            Signing::None
        };
        for interceptor in &self.request_interceptors {
            interceptor.on_request(&mut http, signing);
        }

        tracing::debug!(method = %http.method, url = %http.url, "api request");
        let response = self.transport.send(http.clone()).await?;
        tracing::debug!(method = %http.method, url = %http.url, status = response.status, "api response");

        for interceptor in &self.response_interceptors {
            interceptor.on_response(&http, &response);
        }
        Ok(response)
    }

    /// Run `request` and decode a successful JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Status`] for non-2xx responses (after
    /// interceptors have seen them), plus transport and decode errors.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, SessionError> {
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        response.json()
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.send(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).body(to_body(body)?)).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).body(to_body(body)?)).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, SessionError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).body(to_body(body)?)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        self.send(ApiRequest::delete(path)).await
    }
}

/// `scheme://authority` prefix of an absolute URL.
fn origin(url: &str) -> &str {
    let start = url.find("://").map_or(0, |i| i + 3);
    let end = url[start..].find(['/', '?', '#']).map_or(url.len(), |i| start + i);
    &url[..end]
}

fn same_origin(url: &str, base_url: &str) -> bool {
    origin(url).eq_ignore_ascii_case(origin(base_url))
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, SessionError> {
    serde_json::to_value(body).map_err(|e| SessionError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
