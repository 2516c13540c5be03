//! reqwest-backed [`Transport`] and its configuration.

use crate::client::Transport;
use crate::error::{NqError, NqResult};
use crate::result::error_message;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default API base.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Header carrying the API key (header names are case-insensitive).
pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client configuration.
///
/// # Example
///
/// ```ignore
/// use nqorm::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .base_url("https://db.example.com/api/v1")
///     .api_key("nq_live_...")
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all paths are joined to
    pub base_url: String,
    /// Sent as `X-API-Key` when set
    pub api_key: Option<String>,
    /// Total request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("nqorm/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `NEUROQUANTUM_URL`, `NEUROQUANTUM_API_KEY` and `NEUROQUANTUM_TIMEOUT_SECS`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> NqResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> NqResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("NEUROQUANTUM_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(key) = lookup("NEUROQUANTUM_API_KEY").filter(|v| !v.trim().is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(secs) = lookup("NEUROQUANTUM_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                NqError::Other(format!("NEUROQUANTUM_TIMEOUT_SECS is not a number: '{secs}'"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the total timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
}

/// [`Transport`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a client from config.
    pub fn new(config: ClientConfig) -> NqResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| NqError::Other("API key is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()?;

        // Keep a trailing slash so joined paths extend the base instead of replacing its last segment.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, path: &str) -> NqResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> NqResult<Value> {
        let url = self.url(path)?;
        debug!(target: "nqorm.http", method = %method, path, "request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => v,
                Err(e) if status.is_success() => {
                    return Err(NqError::decode(format!("invalid JSON from {path}: {e}")));
                }
                Err(_) => Value::String(text.clone()),
            }
        };

        if !status.is_success() {
            let message = failure_message(status, &parsed);
            warn!(target: "nqorm.http", method = %method, path, status = status.as_u16(), %message, "request failed");
            return Err(NqError::Http {
                status: status.as_u16(),
                message,
            });
        }
        debug!(target: "nqorm.http", method = %method, path, status = status.as_u16(), "response");
        Ok(parsed)
    }
}

fn failure_message(status: StatusCode, body: &Value) -> String {
    let from_body = match body {
        Value::Object(map) => map
            .get("error")
            .and_then(error_message)
            .or_else(|| map.get("message").and_then(error_message)),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    };
    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    })
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        self.send(Method::GET, path, None)
    }

    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        self.send(Method::POST, path, Some(body))
    }

    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        self.send(Method::PUT, path, Some(body))
    }

    fn delete(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        self.send(Method::DELETE, path, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.timeout, Duration::from_secs(30));
        assert_eq!(c.connect_timeout, Duration::from_secs(10));
        assert!(c.api_key.is_none());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("NEUROQUANTUM_URL", "https://db.example.com/api/v1"),
            ("NEUROQUANTUM_API_KEY", "secret"),
            ("NEUROQUANTUM_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let c = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.base_url, "https://db.example.com/api/v1");
        assert_eq!(c.api_key.as_deref(), Some("secret"));
        assert_eq!(c.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_invalid_timeout() {
        let err = ClientConfig::from_lookup(|k| {
            (k == "NEUROQUANTUM_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("NEUROQUANTUM_TIMEOUT_SECS"));
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let t = HttpTransport::new(ClientConfig::new().base_url("http://localhost:8080/api/v1/"))
            .unwrap();
        assert_eq!(
            t.url("/tables/query").unwrap().as_str(),
            "http://localhost:8080/api/v1/tables/query"
        );
        assert_eq!(t.url("query").unwrap().as_str(), "http://localhost:8080/api/v1/query");
    }

    #[test]
    fn test_failure_message() {
        let msg = failure_message(
            StatusCode::BAD_REQUEST,
            &json!({"success": false, "error": {"BadRequest": "bad table"}}),
        );
        assert_eq!(msg, "BadRequest: bad table");
        assert_eq!(failure_message(StatusCode::NOT_FOUND, &Value::Null), "Not Found");
    }
}
