//! Outbound request execution.
//!
//! # Responsibilities
//! - Derive endpoint and cache keys from method + URL
//! - Enforce client-side rate limits before any network I/O
//! - Serve fresh cached GET responses without a network call
//! - Bound every call with its own timeout
//! - Decode bodies by content type (JSON or raw text)
//! - Surface each failure once: notice to the user, full context to the log
//!
//! # Design Decisions
//! - No automatic retries; callers re-invoke explicitly
//! - Sends no ambient credentials; only the fixed security header set

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;

use crate::net::cache::{CachedResponse, ResponseCache, DEFAULT_TTL};
use crate::net::notify::{LogNotifier, Notice, Notifier};
use crate::net::rate_limit::{Admission, RateLimiter, DEFAULT_LIMIT, DEFAULT_WINDOW};
use crate::observability::metrics;

/// Default total timeout for a call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

const SECURITY_HEADER: &str = "X-Requested-With";
const SECURITY_HEADER_VALUE: &str = "XMLHttpRequest";

/// Errors a call can fail with. All are recoverable by the caller.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Denied locally; no network call was issued.
    #[error("Rate limit exceeded, retry in {retry_after_secs} seconds")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// The network call exceeded its timeout and was aborted.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The server responded with a failure status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Transport-level failure (DNS, connect, reset).
    #[error("Network error: {0}")]
    Network(String),
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Deserialize the body into a typed value.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value.clone()).map_err(|e| RequestError::Decode(e.to_string()))
            }
            ResponseBody::Text(text) => {
                serde_json::from_str(text).map_err(|e| RequestError::Decode(e.to_string()))
            }
        }
    }
}

/// Result of a successful call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub data: ResponseBody,
    pub status: StatusCode,
    pub from_cache: bool,
}

/// Per-endpoint rate limit rule.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimitRule {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Per-call configuration. Domain clients fix these per endpoint.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// `None` disables rate limiting for this call.
    pub rate_limit: Option<RateLimitRule>,
    /// Consult/populate the cache (GET only; ignored otherwise).
    pub use_cache: bool,
    pub cache_ttl: Duration,
    pub timeout: Duration,
    /// Skip the user-facing notice on failure (background calls).
    pub suppress_notices: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            rate_limit: Some(RateLimitRule::default()),
            use_cache: false,
            cache_ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            suppress_notices: false,
        }
    }
}

impl CallConfig {
    pub fn with_rate_limit(mut self, limit: u32, window: Duration) -> Self {
        self.rate_limit = Some(RateLimitRule { limit, window });
        self
    }

    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    pub fn cached(mut self, ttl: Duration) -> Self {
        self.use_cache = true;
        self.cache_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.suppress_notices = true;
        self
    }
}

/// Request shape passed by domain clients.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }
}

/// Owns the rate limiter, the response cache and the HTTP client.
///
/// Constructed once and shared (`Arc`) by every domain client, so all
/// endpoints see the same windows and cache; tests construct fresh
/// instances for isolation.
pub struct NetworkClient {
    http: reqwest::Client,
    limits: RateLimiter,
    cache: ResponseCache,
    notifier: Arc<dyn Notifier>,
}

impl NetworkClient {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            http: reqwest::Client::new(),
            limits: RateLimiter::new(),
            cache: ResponseCache::new(),
            notifier,
        }
    }

    /// Issue a call with rate limiting, caching and timeout applied.
    pub async fn execute(
        &self,
        url: &str,
        opts: RequestOptions,
        cfg: &CallConfig,
    ) -> Result<ApiResponse, RequestError> {
        let endpoint_key = endpoint_key(&opts.method, url);
        let cache_key = format!("{}:{}", opts.method, url);

        if let Some(rule) = &cfg.rate_limit {
            if let Admission::Denied { retry_after_secs } =
                self.limits.admit(&endpoint_key, rule.limit, rule.window)
            {
                let err = RequestError::RateLimitExceeded { retry_after_secs };
                self.surface(&opts.method, url, &endpoint_key, &err, cfg);
                return Err(err);
            }
        }

        let cacheable = cfg.use_cache && opts.method == Method::GET;
        if cacheable {
            if let Some(hit) = self.cache.get(&cache_key) {
                tracing::debug!(method = %opts.method, url = %url, "Serving from cache");
                return Ok(ApiResponse {
                    data: hit.body,
                    status: StatusCode::from_u16(hit.status).unwrap_or(StatusCode::OK),
                    from_cache: true,
                });
            }
        }

        let mut headers = opts.headers;
        headers.insert(SECURITY_HEADER, HeaderValue::from_static(SECURITY_HEADER_VALUE));

        let mut builder = self.http.request(opts.method.clone(), url).headers(headers);
        if let Some(body) = &opts.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %opts.method, url = %url, "API request");

        let outcome = timeout(cfg.timeout, async {
            let response = builder
                .send()
                .await
                .map_err(|e| RequestError::Network(e.to_string()))?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let text = response
                .text()
                .await
                .map_err(|e| RequestError::Network(e.to_string()))?;
            Ok::<_, RequestError>((status, content_type, text))
        })
        .await;

        let (status, content_type, text) = match outcome {
            Ok(Ok(parts)) => parts,
            Ok(Err(err)) => {
                self.surface(&opts.method, url, &endpoint_key, &err, cfg);
                return Err(err);
            }
            Err(_elapsed) => {
                let err = RequestError::Timeout(cfg.timeout.as_millis() as u64);
                self.surface(&opts.method, url, &endpoint_key, &err, cfg);
                return Err(err);
            }
        };

        if !status.is_success() {
            let err = RequestError::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            };
            self.surface(&opts.method, url, &endpoint_key, &err, cfg);
            return Err(err);
        }

        let data = match decode_body(&content_type, text) {
            Ok(data) => data,
            Err(err) => {
                self.surface(&opts.method, url, &endpoint_key, &err, cfg);
                return Err(err);
            }
        };

        if cacheable {
            self.cache.set(
                cache_key,
                CachedResponse {
                    body: data.clone(),
                    status: status.as_u16(),
                },
                cfg.cache_ttl,
            );
        }

        metrics::record_request(&endpoint_key, "success");
        tracing::debug!(method = %opts.method, url = %url, status = status.as_u16(), "API response");

        Ok(ApiResponse {
            data,
            status,
            from_cache: false,
        })
    }

    /// GET convenience wrapper.
    pub async fn get(&self, url: &str, cfg: &CallConfig) -> Result<ApiResponse, RequestError> {
        self.execute(url, RequestOptions::get(), cfg).await
    }

    /// POST-JSON convenience wrapper.
    pub async fn post(
        &self,
        url: &str,
        body: Value,
        cfg: &CallConfig,
    ) -> Result<ApiResponse, RequestError> {
        self.execute(url, RequestOptions::post_json(body), cfg).await
    }

    /// One notice, one log line, one metric per failure.
    fn surface(
        &self,
        method: &Method,
        url: &str,
        endpoint_key: &str,
        err: &RequestError,
        cfg: &CallConfig,
    ) {
        tracing::error!(method = %method, url = %url, error = %err, "API request failed");
        metrics::record_request(endpoint_key, outcome_label(err));

        if cfg.suppress_notices {
            return;
        }
        self.notifier.notify(notice_for(err));
    }

    /// Surface a failure raised after a successful exchange, such as a
    /// typed decode of a 2xx body. Same log/metric/notice shape as
    /// `execute`'s own failures.
    pub fn surface_error(&self, method: &Method, url: &str, err: &RequestError) {
        tracing::error!(method = %method, url = %url, error = %err, "API request failed");
        metrics::record_request(&endpoint_key(method, url), outcome_label(err));
        self.notifier.notify(notice_for(err));
    }

    /// Emit a user-facing notice through the configured sink.
    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Rate-limit bucket key: method plus URL without its query string.
fn endpoint_key(method: &Method, url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    format!("{method}:{without_query}")
}

/// Map a failure to its user-facing notice.
fn notice_for(err: &RequestError) -> Notice {
    match err {
        RequestError::RateLimitExceeded { retry_after_secs } => Notice::new(
            "Too many requests",
            format!("Please wait {retry_after_secs} seconds before trying again."),
        ),
        RequestError::Http { .. } => Notice::new("Request failed", err.to_string()),
        _ => Notice::new("Request error", err.to_string()),
    }
}

fn outcome_label(err: &RequestError) -> &'static str {
    match err {
        RequestError::RateLimitExceeded { .. } => "rate_limited",
        RequestError::Timeout(_) => "timeout",
        RequestError::Http { .. } => "http_error",
        RequestError::Decode(_) => "decode_error",
        RequestError::Network(_) => "network_error",
    }
}

/// Non-2xx bodies may carry a JSON `message`; fall back to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    format!(
        "Error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

fn decode_body(content_type: &str, text: String) -> Result<ResponseBody, RequestError> {
    if content_type.contains("application/json") {
        let value = serde_json::from_str(&text).map_err(|e| RequestError::Decode(e.to_string()))?;
        Ok(ResponseBody::Json(value))
    } else {
        Ok(ResponseBody::Text(text))
    }
}
