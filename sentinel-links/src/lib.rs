/*
 * Sentinel Links
 *
 * SPDX-License-Identifier: Apache-2.0
 */
//! # Sentinel Links
//!
//! Link extraction, merge, and storage for a personal link-curation viewer
//! backed by a Notion page.
//!
//! ## Features
//!
//! - Notion block client with cursor pagination and async Streams
//! - relay through an LLM completion call that returns the page as text
//! - block-based and text-pattern link extractors
//! - merge policy that replaces fetched links and keeps user-added links
//! - category index always rebuilt from the flat link list
//! - key/value persistence with sample-data fallback
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sentinel_links::prelude::*;
//! # async fn example() -> Result<(), LinksError> {
//!
//! let client = NotionClient::new(SecretKey::from_env(NOTION_API_KEY_ENV)?)?;
//! let fetched = client.fetch_links("11f46694-4091-8028-9320-e734a64f47c2").await?;
//!
//! let store = LinkStore::new(FileStore::new("/tmp/sentinel"));
//! let mut state = store.load();
//! let summary = state.merge_fetched(fetched);
//! store.save(&state)?;
//! println!("{} fetched, {} kept", summary.fetched, summary.retained);
//!
//! for link in state.filtered(&LinkFilter::default().search("robot")) {
//!     println!("{} {}", link.title, link.open_url());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Data model
//!
//! - [`Link`](links::Link) is a single curated reference with a provenance tag.
//! - [`CategoryIndex`](links::CategoryIndex) groups links by category; it is
//!   derived data, reconstructed from the flat list after every mutation.
//! - [`SyncState`](state::SyncState) holds both plus the time of the last sync.
//!
#![allow(clippy::missing_errors_doc)] // pedantic
#![allow(clippy::missing_const_for_fn)] //  nursery function
#![allow(clippy::must_use_candidate)] // pedantic
#![warn(clippy::default_trait_access)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::implicit_clone)]
#![warn(clippy::match_same_arms)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::option_if_let_else)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::redundant_closure)]
#![warn(clippy::uninlined_format_args)]
#![warn(clippy::unused_async)]

pub mod blocks;
pub mod client;
pub mod completion;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod filters;
mod http_client;
pub mod links;
pub mod notion;
pub mod paged;
pub mod relay_client;
pub mod sample;
pub mod state;
pub mod storage;

/// Result type alias using `LinksError` as the default error.
pub type Result<T, E = crate::error::LinksError> = std::result::Result<T, E>;

/// Prelude module - import the common types with `use sentinel_links::prelude::*;`
pub mod prelude {
    pub use super::{
        ANTHROPIC_API_KEY_ENV, DEFAULT_CATEGORY, DEFAULT_NOTION_PAGE_ID, NOTION_API_KEY_ENV,
        NOTION_PAGE_ID_ENV, STORAGE_KEY,
    };
    pub use crate::error::*;
    pub use crate::{
        // Content blocks
        blocks::{Block, BlockKind, RichText},
        // Client configuration
        client::ClientConfig,
        // Completion relay
        completion::{CompletionClient, completion_text},
        // Api keys
        credentials::SecretKey,
        // Extractors
        extract::{Extracted, links_from_blocks, links_from_text, notion_page_url},
        // Search and category filter
        filters::LinkFilter,
        // HTTP metrics
        http_client::HttpMetricsSnapshot,
        // Links and categories
        links::{CategoryIndex, Link, LinkId, NewLink, Source},
        // Notion api
        notion::NotionClient,
        // Pagination
        paged::{CursorPage, PagedResult},
        // Relay
        relay_client::{RelayClient, SyncRequest, SyncResponse},
        // State and merge policy
        state::{MergeSummary, SyncState},
        // Persistence
        storage::{FileStore, KeyValueStore, LinkStore, MemoryStore},
    };
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// Category assigned to links that appear before any heading.
pub const DEFAULT_CATEGORY: &str = "General";

/// Storage key holding the serialized `SyncState`.
pub const STORAGE_KEY: &str = "sentinel_links_data";

/// Page synced when no page id is configured.
pub const DEFAULT_NOTION_PAGE_ID: &str = "11f46694-4091-8028-9320-e734a64f47c2";

/// Environment variable naming the page to sync.
pub const NOTION_PAGE_ID_ENV: &str = "NOTION_PAGE_ID";

/// Environment variable holding the Notion integration token.
pub const NOTION_API_KEY_ENV: &str = "NOTION_API_KEY";

/// Environment variable holding the completion api key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub(crate) mod config {
    /// Notion REST api endpoint
    pub const NOTION_API_URL: &str = "https://api.notion.com";

    /// Environment variable overriding the Notion api endpoint
    pub const NOTION_URL_ENV: &str = "SENTINEL_NOTION_URL";

    /// Notion version header
    pub const NOTION_VERSION_HEADER: &str = "Notion-Version";

    /// Notion api version
    pub const NOTION_API_VERSION: &str = "2022-06-28";

    /// Page addresses are built by appending an id (without dashes) to this prefix
    pub const NOTION_PAGE_BASE_URL: &str = "https://www.notion.so/";

    /// Completion (messages) api endpoint
    pub const COMPLETION_API_URL: &str = "https://api.anthropic.com";

    /// Environment variable overriding the completion api endpoint
    pub const COMPLETION_URL_ENV: &str = "SENTINEL_COMPLETION_URL";

    /// Environment variable overriding the completion model
    pub const COMPLETION_MODEL_ENV: &str = "SENTINEL_COMPLETION_MODEL";

    /// Completion api version header
    pub const COMPLETION_VERSION_HEADER: &str = "anthropic-version";

    /// Completion api version
    pub const COMPLETION_API_VERSION: &str = "2023-06-01";

    /// Completion api key header
    pub const COMPLETION_KEY_HEADER: &str = "x-api-key";

    /// Model used for the relay call
    pub const COMPLETION_MODEL: &str = "claude-sonnet-4-20250514";

    /// Token cap for the relay call
    pub const COMPLETION_MAX_TOKENS: u32 = 4000;

    /// Block children requested per page (Notion maximum: 100)
    pub const DEFAULT_PAGE_SIZE: u32 = 100;

    /// Longest page id accepted before a request is sent
    pub const PAGE_ID_MAX_LEN: usize = 200;

    /// Characters of a page id shown in a link-to-page title
    pub const PAGE_PREVIEW_LEN: usize = 8;
}
