//! Thin HTTP client for the administration API.
//!
//! Every call is one-shot: no retry, no timeout beyond the transport
//! default, no caching. Failures never surface as `Err`; they are encoded
//! in the returned [`FetchResult`] and classified with
//! [`FetchResult::failure`].

pub mod auth;
pub mod collection;
pub mod envelope;
pub mod profile;

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::{AppConfig, ConfigError};

/// Uniform result of one request.
///
/// `ok` mirrors transport-level success (2xx). `data` is the parsed JSON
/// body, or `{}` when there was no body or it was not JSON; in that case
/// `body_error` says why. The server's own `status` flag lives inside
/// `data` and must be checked separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    pub ok: bool,
    pub status: Option<u16>,
    pub data: Value,
    #[serde(skip)]
    pub transport_error: Option<String>,
    #[serde(skip)]
    pub body_error: Option<String>,
}

impl FetchResult {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status: Some(status),
            data,
            transport_error: None,
            body_error: None,
        }
    }

    /// Response that arrived but whose body could not be read as JSON.
    pub fn unreadable(status: u16, reason: impl Into<String>) -> Self {
        Self {
            body_error: Some(reason.into()),
            ..Self::new(status, json!({}))
        }
    }

    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: None,
            data: json!({}),
            transport_error: Some(reason.into()),
            body_error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    log_requests: bool,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            log_requests: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.base_url()?).with_request_logging(config.api.log_requests))
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL joined with an absolute API path, keeping any path prefix
    /// the base carries.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> FetchResult {
        self.send::<()>(Method::GET, path, token, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> FetchResult {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> FetchResult {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> FetchResult {
        self.send::<()>(Method::DELETE, path, token, None).await
    }

    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> FetchResult {
        let url = self.endpoint(path);
        if self.log_requests {
            tracing::debug!(%method, %url, authenticated = token.is_some(), "api request");
        }

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%method, %url, error = %e, "api request failed");
                return FetchResult::transport_failure(e.to_string());
            }
        };

        let status = response.status().as_u16();
        let result = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => {
                tracing::warn!(%url, status, "response body is empty");
                FetchResult::unreadable(status, "empty response body")
            }
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => FetchResult::new(status, data),
                Err(e) => {
                    tracing::warn!(%url, status, error = %e, "response body is not JSON");
                    FetchResult::unreadable(status, format!("response body is not JSON: {}", e))
                }
            },
            Err(e) => {
                tracing::warn!(%url, status, error = %e, "failed to read response body");
                FetchResult::unreadable(status, format!("failed to read response body: {}", e))
            }
        };

        if self.log_requests {
            tracing::debug!(%method, %url, status, "api response");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap())
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            client("http://api.test/").endpoint("/api/roles"),
            "http://api.test/api/roles"
        );
        assert_eq!(
            client("http://api.test/v2").endpoint("/api/roles"),
            "http://api.test/v2/api/roles"
        );
    }

    #[test]
    fn ok_tracks_2xx_only() {
        assert!(FetchResult::new(201, json!({})).ok);
        assert!(!FetchResult::new(404, json!({})).ok);
        let failed = FetchResult::transport_failure("refused");
        assert!(!failed.ok);
        assert_eq!(failed.data, json!({}));
        assert_eq!(failed.status, None);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let port = portpicker::pick_unused_port().expect("free port");
        let api = client(&format!("http://127.0.0.1:{}", port));
        let result = api.get("/api/roles", Some("t")).await;
        assert!(!result.ok);
        assert_eq!(result.data, json!({}));
        assert!(result.transport_error.is_some());
    }
}
