//! LLM completion relay
//!
//! Asks a completion model, equipped with a Notion fetch tool, to return a
//! page's raw content. The response payload is passed through unchanged; the
//! page text is in `content[0].text` and is parsed with
//! [`links_from_text`](crate::extract::links_from_text).

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    Result,
    client::ClientConfig,
    config::{COMPLETION_API_VERSION, COMPLETION_KEY_HEADER, COMPLETION_VERSION_HEADER},
    credentials::SecretKey,
    error::LinksError,
    extract::{Extracted, links_from_text},
    http_client::{Auth, HttpClient, HttpMetricsSnapshot, HttpRequest},
};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message; 1],
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

fn page_content_prompt(page_id: &str) -> String {
    format!(
        "Using the Notion fetch tool, get the full content of page ID: {page_id}. \
         Return ONLY the raw content text from inside the <content> tags, nothing else."
    )
}

/// Text of the first content item of a completion payload.
///
/// Returns [`LinksError::EmptyContent`] if `content[0].text` is missing or
/// not a string.
pub fn completion_text(payload: &Value) -> Result<&str> {
    payload
        .get("content")
        .and_then(|content| content.get(0))
        .and_then(|first| first.get("text"))
        .and_then(Value::as_str)
        .ok_or(LinksError::EmptyContent)
}

/// Client for the completion (messages) api.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Arc<HttpClient>,
    config: ClientConfig,
}

impl CompletionClient {
    /// Creates a client with default configuration.
    pub fn new(key: SecretKey) -> Result<Self> {
        Self::with_config(key, ClientConfig::default())
    }

    /// Creates a client with the provided configuration.
    pub fn with_config(key: SecretKey, config: ClientConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::builder(), key, config)
    }

    /// Creates a client from a `reqwest::ClientBuilder` and configuration.
    pub fn with_client(
        builder: reqwest::ClientBuilder,
        key: SecretKey,
        config: ClientConfig,
    ) -> Result<Self> {
        debug!(url = %config.completion_url, model = %config.completion_model, "new completion client");
        let client = HttpClient::new(
            builder,
            &config.completion_url,
            Auth::Header(COMPLETION_KEY_HEADER, key),
        )?
        .with_header(COMPLETION_VERSION_HEADER, COMPLETION_API_VERSION);
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Returns the configuration.
    pub fn get_config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a snapshot of current HTTP metrics.
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        self.client.metrics_snapshot()
    }

    /// Requests a page's raw content and returns the provider's payload unchanged.
    pub async fn fetch_page_content(&self, page_id: &str) -> Result<Value> {
        let page_id = page_id.trim();
        if page_id.is_empty() {
            return Err(LinksError::Validation {
                message: "Notion page ID is required".to_string(),
            });
        }
        let body = CompletionRequest {
            model: &self.config.completion_model,
            max_tokens: self.config.max_tokens,
            messages: [Message {
                role: "user",
                content: page_content_prompt(page_id),
            }],
        };
        let request = HttpRequest::post_json("/v1/messages", &body)?;
        self.client.send(request).await
    }

    /// Requests a page's content and extracts its links and categories.
    pub async fn fetch_links(&self, page_id: &str) -> Result<Extracted> {
        let payload = self.fetch_page_content(page_id).await?;
        let extracted = links_from_text(completion_text(&payload)?);
        info!(page_id, links = extracted.len(), "fetched");
        Ok(extracted)
    }
}
