//! HttpClient used by the provider and relay clients
//!
//! Responsible for
//!  - handing all HTTP api requests
//!  - auth and version headers
//!  - logging/tracing
//!  - mapping non-success responses into `LinksError::Provider`
//!
//! Requests are sent exactly once. There are no retries: a failure is
//! reported to the caller, who decides whether to try again.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use bytes::Bytes;
use reqwest::{ClientBuilder, Method};
use serde::{Serialize, de::DeserializeOwned};
use snafu::prelude::*;
use tracing::{debug, error, trace};

use crate::{
    Result,
    credentials::SecretKey,
    error::{HttpSnafu, LinksError, SerializationSnafu},
};

/// HTTP metrics tracked using atomic counters for thread-safe access.
/// These counters are cumulative and never reset during the client's lifetime.
#[derive(Debug, Default)]
pub struct HttpMetrics {
    /// Total number of HTTP requests sent
    total_requests: AtomicU64,
    /// Total number of successful responses (2xx status codes)
    successful_responses: AtomicU64,
    /// Total number of failed requests (non-2xx status or transport error)
    errors: AtomicU64,
    /// Total bytes sent in request bodies
    bytes_sent: AtomicU64,
    /// Total bytes received in response bodies
    bytes_received: AtomicU64,
}

impl HttpMetrics {
    /// Returns a snapshot of current metrics as plain u64 values
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_responses: self.successful_responses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }

    fn record_request(&self, body_len: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(body_len, Ordering::Relaxed);
    }

    fn record_success(&self, body_len: u64) {
        self.successful_responses.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(body_len, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of HTTP metrics with plain u64 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    /// Total number of HTTP requests sent
    pub total_requests: u64,
    /// Total number of successful responses (2xx status codes)
    pub successful_responses: u64,
    /// Total number of failed requests
    pub errors: u64,
    /// Total bytes sent in request bodies
    pub bytes_sent: u64,
    /// Total bytes received in response bodies
    pub bytes_received: u64,
}

impl fmt::Display for HttpMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests={} success={} errors={} sent={} recv={}",
            self.total_requests,
            self.successful_responses,
            self.errors,
            format_bytes(self.bytes_sent),
            format_bytes(self.bytes_received),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// How requests are authenticated.
#[derive(Clone, Debug)]
pub(crate) enum Auth {
    /// No credentials (the relay)
    None,
    /// `Authorization: Bearer <key>` (Notion)
    Bearer(SecretKey),
    /// Key sent in a named header (completion api)
    Header(&'static str, SecretKey),
}

#[derive(Clone, Default)]
pub(crate) struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body.as_ref().map_or(0, Bytes::len))
            .finish()
    }
}

impl HttpRequest {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            ..Default::default()
        }
    }

    pub(crate) fn post_json<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(Bytes::from(
                serde_json::to_vec(body).context(SerializationSnafu)?,
            )),
        })
    }

    #[must_use]
    pub(crate) fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Create a new request continuing from `cursor`.
    /// This replaces any existing `start_cursor` query parameter.
    pub(crate) fn with_cursor(&self, cursor: &str) -> Self {
        let mut query: Vec<(String, String)> = self
            .query
            .iter()
            .filter(|(key, _)| key != "start_cursor")
            .cloned()
            .collect();
        query.push(("start_cursor".to_string(), cursor.to_string()));
        Self {
            method: self.method.clone(),
            path: self.path.clone(),
            query,
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    pub client: reqwest::Client,

    /// Base URL for api requests (e.g., "https://api.notion.com")
    pub base_url: String,

    auth: Auth,

    /// Fixed headers sent with every request (api version headers)
    headers: Vec<(&'static str, &'static str)>,

    /// HTTP request/response metrics
    pub metrics: Arc<HttpMetrics>,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder, base_url: &str, auth: Auth) -> Result<Self> {
        let client = builder.build().context(HttpSnafu {
            method: "client-init",
            url: "",
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            headers: Vec::new(),
            metrics: Arc::new(HttpMetrics::default()),
        })
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Returns a snapshot of current HTTP metrics
    pub fn metrics_snapshot(&self) -> HttpMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Sends a request and deserializes the json response body into `T`.
    ///
    /// - non-success status codes become `LinksError::Provider`, carrying the
    ///   response text and, if the body is json, the parsed body as `details`
    /// - connection and timeout errors become `LinksError::Http`
    pub(crate) async fn send<T: DeserializeOwned>(&self, req: HttpRequest) -> Result<T> {
        let full_url = format!("{}{}", self.base_url, req.path);
        let mut builder = self
            .client
            .request(req.method.clone(), &full_url)
            .query(&req.query);
        for (name, value) in &self.headers {
            builder = builder.header(*name, *value);
        }
        builder = match &self.auth {
            Auth::None => builder,
            Auth::Bearer(key) => builder.bearer_auth(key.expose()),
            Auth::Header(name, key) => builder.header(*name, key.expose()),
        };
        if let Some(body) = &req.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        // debug log (if tracing enabled)
        log_request(&req);
        let body_size = req.body.as_ref().map_or(0, |b| b.len() as u64);
        self.metrics.record_request(body_size);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(source=?e, ?req, "http");
                self.metrics.record_error();
                return Err(LinksError::Http {
                    method: req.method.to_string(),
                    url: req.path,
                    source: e,
                });
            }
        };

        let code = response.status();
        if !code.is_success() {
            self.metrics.record_error();
            let message = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<serde_json::Value>(&message).ok();
            error!(?code, ?req, message = %message, "http");
            return Err(LinksError::Provider {
                code: code.as_u16(),
                method: req.method.to_string(),
                url: req.path,
                message,
                details,
            });
        }

        let body = response.bytes().await.context(HttpSnafu {
            method: req.method.to_string(),
            url: req.path.clone(),
        })?;
        self.metrics.record_success(body.len() as u64);
        log_response(&req.path, &body);
        deserialize_json(&body)
    }
}

// dump request
// requires RUST_LOG=sentinel_links::http_json=trace
fn log_request(req: &HttpRequest) {
    debug!(method = %req.method, path = %req.path, "request");
    if tracing::enabled!(target: "sentinel_links::http_json", tracing::Level::TRACE) {
        let body = req
            .body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
            .unwrap_or_default();
        // don't log headers so we don't leak api keys
        trace!(target: "sentinel_links::http_json", "{} path={} query={:?} body={body}",
            req.method, req.path, req.query);
    }
}

// dump json response, for debugging
fn log_response(path: &str, body: &Bytes) {
    if tracing::enabled!(target: "sentinel_links::http_json", tracing::Level::TRACE) {
        trace!(target: "sentinel_links::http_json", "Response path={path} body={}",
            String::from_utf8_lossy(body)
        );
    }
}

// deserialize, reporting errors with 'serde_path_to_error', which provides
// detailed json path to the error
pub(crate) fn deserialize_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(value) => Ok(value),
        Err(err) => {
            error!("Deserialization failed at {}: {}", err.path(), err);
            Err(LinksError::Deserialization {
                source: err.into_inner(),
            })
        }
    }
}
