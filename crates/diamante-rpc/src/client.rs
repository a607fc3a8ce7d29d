//! Base REST client.
//!
//! Provides `get()` for idempotent reads and `post_json()` / `post_empty()`
//! for backend actions. Reads may be retried with exponential backoff;
//! posts are always sent exactly once, since every backend action has a
//! remote side effect and carries no idempotency key.

use crate::error::RpcError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest error body kept in [`RpcError::HttpStatus`].
const MAX_ERROR_BODY: usize = 500;

/// Configuration for a REST client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL (e.g., `https://diamtestnet.diamcircle.io`).
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Number of retry attempts for GET requests on transient failure.
    pub retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: diamante_types::constants::TESTNET_LEDGER_URL.to_string(),
            timeout: Duration::from_secs(30),
            retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Async JSON-over-HTTP client bound to one base URL.
pub struct RestClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RestClient {
    /// Create a new client with the given URL and default settings.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(ClientConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(mut config: ClientConfig) -> Result<Self, RpcError> {
        config.url = config.url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(RpcError::Client)?;

        Ok(Self { client, config })
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// GET a JSON resource, retrying transient failures per the config.
    pub async fn get(&self, endpoint: &str) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        let attempts = self.config.retries + 1;

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.config.retry_delay * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            log::debug!("GET {}", url);
            let req = self.client.get(&url).headers(self.build_headers());
            match self.execute(req, endpoint, &url).await {
                Ok(val) => return Ok(val),
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    log::debug!("retrying {} after transient error: {}", endpoint, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// POST a JSON body to an endpoint. Sent once, never retried.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        log::debug!("POST {}", url);
        let req = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(body);
        self.execute(req, endpoint, &url).await
    }

    /// POST with no body. Sent once, never retried.
    pub async fn post_empty(&self, endpoint: &str) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        log::debug!("POST {}", url);
        let req = self.client.post(&url).headers(self.build_headers());
        self.execute(req, endpoint, &url).await
    }

    async fn execute(
        &self,
        req: reqwest::RequestBuilder,
        endpoint: &str,
        url: &str,
    ) -> Result<Value, RpcError> {
        let resp = req.send().await.map_err(|e| RpcError::Http {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            source: e,
        })?;

        let status = resp.status().as_u16();

        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(endpoint, url, status, &body));
        }

        resp.json().await.map_err(|e| RpcError::Http {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            source: e,
        })
    }
}

/// Classify an error-status response, keeping the server's explanation when
/// the body carries one (`message` from the backend, `detail` from the
/// ledger's problem documents).
fn status_error(endpoint: &str, url: &str, status: u16, body: &str) -> RpcError {
    let explained = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "detail"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
    });

    match explained {
        Some(message) => RpcError::Rejected {
            endpoint: endpoint.to_string(),
            status,
            message,
        },
        None => RpcError::HttpStatus {
            endpoint: endpoint.to_string(),
            url: url.to_string(),
            status,
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{MockResponse, MockServer};
    use serde_json::json;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "https://diamtestnet.diamcircle.io");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_client_url_trimmed() {
        let client = RestClient::new("http://example.com:3001/").unwrap();
        assert_eq!(client.url(), "http://example.com:3001");
    }

    #[test]
    fn test_status_error_keeps_message() {
        let e = status_error("/fund-account", "u", 400, r#"{"message":"already funded"}"#);
        assert_eq!(e.server_message(), Some("already funded"));

        let e = status_error(
            "/accounts/G",
            "u",
            404,
            r#"{"title":"Resource Missing","detail":"not found"}"#,
        );
        assert!(e.is_not_found());
        assert_eq!(e.server_message(), Some("not found"));

        let e = status_error("/x", "u", 500, "upstream exploded");
        assert!(matches!(e, RpcError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start(vec![(
            "POST",
            "/echo",
            MockResponse::ok(json!({ "message": "ok" })),
        )])
        .await;
        let client = RestClient::new(&server.url()).unwrap();

        let val = client
            .post_json("/echo", &json!({ "publicKey": "GABC" }))
            .await
            .unwrap();
        assert_eq!(val["message"], "ok");

        let reqs = server.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "POST");
        let body: Value = serde_json::from_str(&reqs[0].body).unwrap();
        assert_eq!(body, json!({ "publicKey": "GABC" }));
    }

    #[tokio::test]
    async fn test_post_is_not_retried() {
        let server = MockServer::start(vec![(
            "POST",
            "/busy",
            MockResponse::status(503, "busy"),
        )])
        .await;
        let client = RestClient::with_config(ClientConfig {
            url: server.url(),
            retries: 3,
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        })
        .unwrap();

        let err = client.post_empty("/busy").await.unwrap_err();
        assert!(matches!(err, RpcError::HttpStatus { status: 503, .. }));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_get_retries_transient_status() {
        let server = MockServer::start(vec![(
            "GET",
            "/busy",
            MockResponse::status(503, "busy"),
        )])
        .await;
        let client = RestClient::with_config(ClientConfig {
            url: server.url(),
            retries: 2,
            retry_delay: Duration::from_millis(1),
            ..Default::default()
        })
        .unwrap();

        assert!(client.get("/busy").await.is_err());
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let client = RestClient::new(&MockServer::unreachable_url()).unwrap();
        let err = client.get("/anything").await.unwrap_err();
        assert!(matches!(err, RpcError::Http { .. }));
    }
}
