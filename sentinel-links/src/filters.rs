//! Search and category filter for the link list
//!
//! ```rust
//! use sentinel_links::prelude::*;
//!
//! let filter = LinkFilter::default().search("robot").category("Robotics");
//! let link = Link::fetched("Humanoid Robots", "https://x", "Robotics");
//! assert!(filter.matches(&link));
//! ```

use serde::{Deserialize, Serialize};

use crate::links::Link;

/// Category selector value that matches every category.
pub const ALL_CATEGORIES: &str = "all";

/// Filter applied to the link list before display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFilter {
    /// Case-insensitive text matched against title or category. Empty matches everything.
    #[serde(default)]
    pub search: String,

    /// Exact category to show. `None` or `"all"` shows every category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LinkFilter {
    #[must_use]
    pub fn search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    #[must_use]
    pub fn category(self, category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..self
        }
    }

    /// True if the link passes both the search and the category check.
    pub fn matches(&self, link: &Link) -> bool {
        self.matches_search(link) && self.matches_category(link)
    }

    fn matches_search(&self, link: &Link) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        link.title.to_lowercase().contains(&needle)
            || link.category.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, link: &Link) -> bool {
        match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => link.category == category,
        }
    }
}
