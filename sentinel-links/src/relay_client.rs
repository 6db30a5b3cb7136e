//! Client for the sync relay
//!
//! The relay answers `POST /api/sync-notion` in one of two shapes:
//!
//! - direct Notion mode: `{links, categories, total}` ([`SyncResponse`])
//! - completion mode: the raw completion payload, whose `content[0].text`
//!   holds the page text
//!
//! [`RelayClient::sync`] accepts either and returns the extracted links.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    Result,
    completion::completion_text,
    error::{DeserializationSnafu, LinksError},
    extract::{Extracted, links_from_text},
    http_client::{Auth, HttpClient, HttpMetricsSnapshot, HttpRequest},
    links::{CategoryIndex, Link, Source},
};

/// Path of the relay's sync endpoint.
pub const SYNC_PATH: &str = "/api/sync-notion";

/// Body of a sync request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub notion_page_id: String,
}

/// Sync response in direct Notion mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub links: Vec<Link>,
    pub categories: CategoryIndex,
    pub total: usize,
}

impl SyncResponse {
    pub fn new(links: Vec<Link>) -> Self {
        let categories = CategoryIndex::from_links(&links);
        let total = links.len();
        Self {
            links,
            categories,
            total,
        }
    }
}

impl From<SyncResponse> for Extracted {
    // the index is rebuilt from the links rather than trusted
    fn from(response: SyncResponse) -> Self {
        let links = response
            .links
            .into_iter()
            .map(|link| Link {
                source: Source::Notion,
                ..link
            })
            .collect();
        Extracted::from_links(links)
    }
}

/// Interprets a relay response body in either shape.
pub fn extract_sync_payload(payload: Value) -> Result<Extracted> {
    if payload.get("links").is_some_and(Value::is_array) {
        let response: SyncResponse =
            serde_json::from_value(payload).context(DeserializationSnafu)?;
        debug!(total = response.total, "direct sync response");
        return Ok(response.into());
    }
    Ok(links_from_text(completion_text(&payload)?))
}

/// Client for a running relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Arc<HttpClient>,
}

impl RelayClient {
    /// Creates a client for the relay at `base_url` (for example "http://localhost:3001").
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::builder(), base_url)
    }

    /// Creates a client from a `reqwest::ClientBuilder`.
    pub fn with_client(builder: reqwest::ClientBuilder, base_url: &str) -> Result<Self> {
        debug!(url = base_url, "new relay client");
        let client = HttpClient::new(builder, base_url, Auth::None)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.client.base_url
    }

    /// Returns a snapshot of current HTTP metrics.
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        self.client.metrics_snapshot()
    }

    /// Posts a sync request and returns the response body unchanged.
    ///
    /// A non-success status becomes [`LinksError::Provider`] whose message is
    /// the relay's `error` field.
    pub async fn sync_payload(&self, page_id: &str) -> Result<Value> {
        let body = SyncRequest {
            notion_page_id: page_id.to_string(),
        };
        let request = HttpRequest::post_json(SYNC_PATH, &body)?;
        self.client.send(request).await.map_err(relay_error)
    }

    /// Posts a sync request and extracts links from the response.
    pub async fn sync(&self, page_id: &str) -> Result<Extracted> {
        let extracted = extract_sync_payload(self.sync_payload(page_id).await?)?;
        info!(page_id, links = extracted.len(), "synced through relay");
        Ok(extracted)
    }
}

// replace the raw body with the relay's error text, keeping the details
fn relay_error(err: LinksError) -> LinksError {
    match err {
        LinksError::Provider {
            code,
            method,
            url,
            message,
            details,
        } => {
            let message = details
                .as_ref()
                .and_then(|details| details.get("error"))
                .and_then(Value::as_str)
                .map_or(message, |error| match details_message(details.as_ref()) {
                    Some(detail) => format!("{error}: {detail}"),
                    None => error.to_string(),
                });
            LinksError::Provider {
                code,
                method,
                url,
                message,
                details,
            }
        }
        other => other,
    }
}

fn details_message(details: Option<&Value>) -> Option<&str> {
    details?.get("message").and_then(Value::as_str)
}
