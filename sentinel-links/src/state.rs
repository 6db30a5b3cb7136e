//! Viewer state and the merge policy
//!
//! [`SyncState`] owns the flat link list, the category index derived from it,
//! and the time of the last successful sync. Every mutation leaves the two
//! collections consistent: each link sits in exactly one category bucket (its
//! own), and every bucket entry is in the list.
//!
//! - [`merge_fetched`](SyncState::merge_fetched) replaces all fetched links
//!   with a new set and keeps everything else
//! - [`add_link`](SyncState::add_link) validates and appends a hand-added link
//! - [`delete_link`](SyncState::delete_link) removes a link and rebuilds the index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Result,
    error::LinksError,
    filters::{ALL_CATEGORIES, LinkFilter},
    links::{CategoryIndex, Link, NewLink},
};

/// Links, their category index, and the last sync time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredState")]
pub struct SyncState {
    links: Vec<Link>,
    categories: CategoryIndex,
    last_sync: Option<DateTime<Utc>>,
}

// Persisted form. The stored category index is ignored: it is rebuilt from
// the link list on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    last_sync: Option<DateTime<Utc>>,
}

impl From<StoredState> for SyncState {
    fn from(stored: StoredState) -> Self {
        Self::new(stored.links, stored.last_sync)
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Links in the new fetched set
    pub fetched: usize,
    /// Previously fetched links that were dropped
    pub replaced: usize,
    /// Hand-added and sample links kept
    pub retained: usize,
}

impl SyncState {
    /// Creates state from a link list, building the category index.
    pub fn new(links: Vec<Link>, last_sync: Option<DateTime<Utc>>) -> Self {
        let categories = CategoryIndex::from_links(&links);
        Self {
            links,
            categories,
            last_sync,
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Finds a link by id.
    pub fn find(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.id == *id)
    }

    /// Replaces every fetched link with `fetched` and records the sync time.
    ///
    /// Links that were not fetched (hand-added or sample) are kept, unchanged,
    /// after the new links. The category index is rebuilt from the result.
    pub fn merge_fetched(&mut self, fetched: Vec<Link>) -> MergeSummary {
        self.merge_fetched_at(fetched, Utc::now())
    }

    /// Same as [`merge_fetched`](Self::merge_fetched), with an explicit sync time.
    pub fn merge_fetched_at(&mut self, fetched: Vec<Link>, synced_at: DateTime<Utc>) -> MergeSummary {
        let previous = std::mem::take(&mut self.links);
        let (replaced, retained): (Vec<Link>, Vec<Link>) =
            previous.into_iter().partition(Link::is_fetched);

        let summary = MergeSummary {
            fetched: fetched.len(),
            replaced: replaced.len(),
            retained: retained.len(),
        };

        let mut links = fetched;
        links.extend(retained);
        *self = Self::new(links, Some(synced_at));

        debug!(?summary, "merged fetched links");
        summary
    }

    /// Adds a hand-added link.
    ///
    /// Title, url, and category are required; if any is blank, returns a
    /// validation error and leaves the state unchanged.
    pub fn add_link(&mut self, new_link: NewLink) -> Result<&Link> {
        let missing = new_link.missing_fields();
        if !missing.is_empty() {
            return Err(LinksError::Validation {
                message: format!("Please fill in all fields (missing: {})", missing.join(", ")),
            });
        }
        let link = new_link.into_link();
        debug!(id = %link.id, category = %link.category, "add link");
        self.categories.push(link.clone());
        self.links.push(link);
        Ok(&self.links[self.links.len() - 1])
    }

    /// Deletes the link with `id` and rebuilds the category index.
    ///
    /// An unknown id returns `NotFound` and leaves the state unchanged.
    pub fn delete_link(&mut self, id: &str) -> Result<Link> {
        let position = self
            .links
            .iter()
            .position(|link| link.id == *id)
            .ok_or_else(|| LinksError::NotFound { id: id.to_string() })?;
        let removed = self.links.remove(position);
        self.categories = CategoryIndex::from_links(&self.links);
        debug!(id, category = %removed.category, "deleted link");
        Ok(removed)
    }

    /// Links passing `filter`, in list order.
    pub fn filtered(&self, filter: &LinkFilter) -> Vec<&Link> {
        self.links.iter().filter(|link| filter.matches(link)).collect()
    }

    /// Values for a category selector: `"all"`, then every category.
    pub fn category_names(&self) -> Vec<&str> {
        std::iter::once(ALL_CATEGORIES)
            .chain(self.categories.names())
            .collect()
    }

    /// Each category with its number of links.
    pub fn category_counts(&self) -> Vec<(&str, usize)> {
        self.categories
            .iter()
            .map(|(name, links)| (name, links.len()))
            .collect()
    }

    /// Checks that the list and the index hold exactly the same links.
    ///
    /// Returns a description of the first inconsistency found.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        for link in &self.links {
            let in_bucket = self
                .categories
                .get(&link.category)
                .map_or(0, |bucket| bucket.iter().filter(|l| l.id == link.id).count());
            if in_bucket != 1 {
                return Err(format!(
                    "link {} appears {in_bucket} times in category {:?}",
                    link.id, link.category
                ));
            }
        }
        for (name, bucket) in self.categories.iter() {
            if bucket.is_empty() {
                return Err(format!("category {name:?} is empty"));
            }
            for link in bucket {
                if link.category != name {
                    return Err(format!("link {} filed under {name:?}", link.id));
                }
                let in_list = self.links.iter().filter(|l| l.id == link.id).count();
                if in_list != 1 {
                    return Err(format!("link {} appears {in_list} times in list", link.id));
                }
            }
        }
        Ok(())
    }
}
