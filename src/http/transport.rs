//! Production transport over `reqwest`.

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::config::SessionConfig;
use crate::error::SessionError;

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honoring the configured timeouts. Unset timeouts keep
    /// `reqwest`'s defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HttpClientBuild`] if the TLS backend or client
    /// cannot be initialized.
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SessionError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SessionError> {
        let mut builder = self.http.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| SessionError::Decode(e.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
