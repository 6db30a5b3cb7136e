//! Configuration shared by the provider clients
//!
//! - [`ClientConfig::default`] reads endpoint overrides from the environment
//! - builder methods replace individual settings
//!
//! ```rust
//! use sentinel_links::prelude::*;
//!
//! let config = ClientConfig::default()
//!     .notion_url("http://127.0.0.1:9000")
//!     .page_size(50);
//! assert_eq!(config.page_size, 50);
//! ```

use crate::config::{
    COMPLETION_API_URL, COMPLETION_MAX_TOKENS, COMPLETION_MODEL, COMPLETION_MODEL_ENV,
    COMPLETION_URL_ENV, DEFAULT_PAGE_SIZE, NOTION_API_URL, NOTION_URL_ENV,
};

/// Endpoints and request settings for [`NotionClient`](crate::notion::NotionClient)
/// and [`CompletionClient`](crate::completion::CompletionClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base url of the Notion api.
    /// Defaults to the env override SENTINEL_NOTION_URL, or "https://api.notion.com"
    pub notion_url: String,

    /// Base url of the completion (messages) api.
    /// Defaults to the env override SENTINEL_COMPLETION_URL, or "https://api.anthropic.com"
    pub completion_url: String,

    /// Model named in the completion request.
    pub completion_model: String,

    /// Token cap for the completion request.
    pub max_tokens: u32,

    /// Block children requested per page (1..=100).
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            notion_url: env_or(NOTION_URL_ENV, NOTION_API_URL),
            completion_url: env_or(COMPLETION_URL_ENV, COMPLETION_API_URL),
            completion_model: env_or(COMPLETION_MODEL_ENV, COMPLETION_MODEL),
            max_tokens: COMPLETION_MAX_TOKENS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ClientConfig {
    #[must_use]
    pub fn notion_url(self, url: impl Into<String>) -> Self {
        ClientConfig {
            notion_url: url.into(),
            ..self
        }
    }

    #[must_use]
    pub fn completion_url(self, url: impl Into<String>) -> Self {
        ClientConfig {
            completion_url: url.into(),
            ..self
        }
    }

    #[must_use]
    pub fn completion_model(self, model: impl Into<String>) -> Self {
        ClientConfig {
            completion_model: model.into(),
            ..self
        }
    }

    #[must_use]
    pub fn max_tokens(self, max_tokens: u32) -> Self {
        ClientConfig { max_tokens, ..self }
    }

    /// Sets the page size, clamped to the range Notion accepts.
    #[must_use]
    pub fn page_size(self, page_size: u32) -> Self {
        ClientConfig {
            page_size: page_size.clamp(1, DEFAULT_PAGE_SIZE),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::default()
            .notion_url("http://localhost:1")
            .completion_url("http://localhost:2")
            .completion_model("m")
            .max_tokens(10);
        assert_eq!(config.notion_url, "http://localhost:1");
        assert_eq!(config.completion_url, "http://localhost:2");
        assert_eq!(config.completion_model, "m");
        assert_eq!(config.max_tokens, 10);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(ClientConfig::default().page_size(0).page_size, 1);
        assert_eq!(ClientConfig::default().page_size(500).page_size, 100);
    }
}
