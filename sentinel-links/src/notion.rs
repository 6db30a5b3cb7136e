//! Notion api client
//!
//! Reads the block children of a page and turns them into links.
//!
//! - [new](NotionClient::new) - create a client with default configuration
//! - [with_config](NotionClient::with_config) - create a client with custom configuration
//! - [with_client](NotionClient::with_client) - configuration and a custom reqwest client
//!
//! - [block_children](NotionClient::block_children) - first page of a page's blocks, with a stream of the rest
//! - [fetch_all_blocks](NotionClient::fetch_all_blocks) - every block, following cursors
//! - [fetch_links](NotionClient::fetch_links) - every block, run through the block extractor
//!

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    Result,
    blocks::Block,
    client::ClientConfig,
    config::{NOTION_API_VERSION, NOTION_VERSION_HEADER, PAGE_ID_MAX_LEN},
    credentials::SecretKey,
    error::LinksError,
    extract::links_from_blocks,
    http_client::{Auth, HttpClient, HttpMetricsSnapshot, HttpRequest},
    links::Link,
    paged::{CursorPage, PagedResult},
};

/// Checks a page id before it is sent anywhere.
///
/// The id must be non-blank, at most 200 characters, and contain only
/// ascii letters, digits, and dashes. Returns the trimmed id.
pub fn validate_page_id(page_id: &str) -> Result<&str> {
    let page_id = page_id.trim();
    if page_id.is_empty() {
        return Err(LinksError::Validation {
            message: "Notion page ID is required".to_string(),
        });
    }
    if page_id.len() > PAGE_ID_MAX_LEN {
        return Err(LinksError::Validation {
            message: format!("Notion page ID exceeds {PAGE_ID_MAX_LEN} characters"),
        });
    }
    if !page_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(LinksError::Validation {
            message: format!("Notion page ID contains invalid characters: {page_id}"),
        });
    }
    Ok(page_id)
}

/// Client for the Notion block api.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Arc<HttpClient>,
    config: ClientConfig,
}

impl NotionClient {
    /// Creates a client with default configuration.
    pub fn new(key: SecretKey) -> Result<Self> {
        Self::with_config(key, ClientConfig::default())
    }

    /// Creates a client with the provided configuration.
    pub fn with_config(key: SecretKey, config: ClientConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::builder(), key, config)
    }

    /// Creates a client from a `reqwest::ClientBuilder` and configuration.
    /// ClientBuilder can be customized with timeouts, proxies, user_agent, etc.
    pub fn with_client(
        builder: reqwest::ClientBuilder,
        key: SecretKey,
        config: ClientConfig,
    ) -> Result<Self> {
        debug!(url = %config.notion_url, "new notion client");
        let client = HttpClient::new(builder, &config.notion_url, Auth::Bearer(key))?
            .with_header(NOTION_VERSION_HEADER, NOTION_API_VERSION);
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

    /// Requests the first page of a page's block children.
    /// Use `into_stream()` or `collect_all()` on the result for the rest.
    pub async fn block_children(&self, page_id: &str) -> Result<PagedResult<Block>> {
        let page_id = validate_page_id(page_id)?;
        let request = HttpRequest::get(format!("/v1/blocks/{page_id}/children"))
            .query("page_size", self.config.page_size);
        let page: CursorPage<Block> = self.client.send(request.clone()).await?;
        debug!(
            page_id,
            count = page.len(),
            has_more = page.has_more,
            "block children"
        );
        Ok(PagedResult::new(page, self.client.clone(), request))
    }

    /// Fetches every block child of a page, following cursors until the last page.
    pub async fn fetch_all_blocks(&self, page_id: &str) -> Result<Vec<Block>> {
        self.block_children(page_id).await?.collect_all().await
    }

    /// Fetches every block of a page and extracts its links, in document order.
    pub async fn fetch_links(&self, page_id: &str) -> Result<Vec<Link>> {
        let blocks = self.fetch_all_blocks(page_id).await?;
        let links = links_from_blocks(&blocks);
        info!(page_id, blocks = blocks.len(), links = links.len(), "fetched");
        Ok(links)
    }
}
