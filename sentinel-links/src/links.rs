//! Links and the category index
//!
//! A [`Link`] is one curated reference. Its [`Source`] records where it came
//! from: fetched from Notion, added by hand, or part of the built-in sample data.
//!
//! A [`CategoryIndex`] maps each category label to the links in that category,
//! in list order. It is derived data: build it with [`CategoryIndex::from_links`]
//! and never edit it apart from the flat list it was built from.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::DEFAULT_CATEGORY;

/// Unique link identifier.
///
/// New ids are random (UUID v4). Sample links and stored links without an id
/// get a name-based id (UUID v5) from their category, url and title, so the
/// same record has the same id on every load. Ids persisted as json numbers
/// are accepted and kept as their decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Generates a new random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Id derived from a link's content; equal inputs give equal ids.
    pub fn derived(category: &str, url: &str, title: &str) -> Self {
        let name = format!("{category}\n{url}\n{title}");
        Self(uuid::Uuid::new_v5(&LINK_ID_NAMESPACE, name.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// namespace of derived link ids
const LINK_ID_NAMESPACE: uuid::Uuid =
    uuid::Uuid::from_u128(0x5e6f_1a2b_7c3d_4e8f_9a0b_1c2d_3e4f_5a6b);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for LinkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for LinkId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'de> Deserialize<'de> for LinkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StoredId {
            Text(String),
            Number(serde_json::Number),
        }
        Ok(match StoredId::deserialize(deserializer)? {
            StoredId::Text(text) => Self(text),
            StoredId::Number(number) => Self(number.to_string()),
        })
    }
}

/// Provenance of a link.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    /// Extracted from the Notion page. Replaced wholesale on every sync.
    Notion,
    /// Added by hand. Kept across syncs, and can be deleted.
    Local,
    /// Built-in sample data, or stored without a source tag. Kept across syncs.
    #[default]
    Sample,
}

/// A single curated reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredLink")]
pub struct Link {
    pub id: LinkId,

    pub title: String,

    pub url: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Preferred address for opening the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_url: Option<String>,

    #[serde(default)]
    pub source: Source,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

// stored form of a link; older records may lack an id
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLink {
    #[serde(default)]
    id: Option<LinkId>,
    title: String,
    url: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    notion_url: Option<String>,
    #[serde(default)]
    source: Source,
}

impl From<StoredLink> for Link {
    fn from(stored: StoredLink) -> Self {
        let id = stored
            .id
            .unwrap_or_else(|| LinkId::derived(&stored.category, &stored.url, &stored.title));
        Self {
            id,
            title: stored.title,
            url: stored.url,
            category: stored.category,
            notion_url: stored.notion_url,
            source: stored.source,
        }
    }
}

impl Link {
    /// Creates a link fetched from Notion, opened at its own url.
    pub fn fetched(
        title: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let url = url.into();
        Self {
            id: LinkId::generate(),
            title: title.into(),
            notion_url: Some(url.clone()),
            url,
            category: category.into(),
            source: Source::Notion,
        }
    }

    /// Sets the preferred address for opening the link.
    #[must_use]
    pub fn with_notion_url(mut self, notion_url: impl Into<String>) -> Self {
        self.notion_url = Some(notion_url.into());
        self
    }

    /// Address used when opening the link: `notion_url`, falling back to `url`.
    pub fn open_url(&self) -> &str {
        self.notion_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.url)
    }

    /// True if the link was fetched from Notion.
    pub fn is_fetched(&self) -> bool {
        self.source == Source::Notion
    }

    /// True if the viewer should offer to delete this link (hand-added links only).
    pub fn is_deletable(&self) -> bool {
        self.source == Source::Local
    }
}

/// Fields for a hand-added link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub category: String,
}

impl NewLink {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            category: category.into(),
        }
    }

    /// Names of required fields that are empty (after trimming whitespace).
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("url", &self.url),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Converts into a local link. Caller must check `missing_fields` first.
    pub(crate) fn into_link(self) -> Link {
        let url = self.url.trim().to_string();
        Link {
            id: LinkId::generate(),
            title: self.title.trim().to_string(),
            notion_url: Some(url.clone()),
            url,
            category: self.category.trim().to_string(),
            source: Source::Local,
        }
    }
}

/// Mapping from category label to the links in that category.
///
/// Categories are kept in order of first appearance; links within a category
/// keep their list order. Empty categories are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIndex(IndexMap<String, Vec<Link>>);

impl CategoryIndex {
    /// Groups `links` by category.
    pub fn from_links<'a>(links: impl IntoIterator<Item = &'a Link>) -> Self {
        let mut index = Self::default();
        for link in links {
            index.push(link.clone());
        }
        index
    }

    /// Appends a link to its category, creating the category if new.
    pub(crate) fn push(&mut self, link: Link) {
        self.0.entry(link.category.clone()).or_default().push(link);
    }

    /// Links in `category`, if the category exists.
    pub fn get(&self, category: &str) -> Option<&[Link]> {
        self.0.get(category).map(Vec::as_slice)
    }

    /// Category names in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Link])> {
        self.0
            .iter()
            .map(|(name, links)| (name.as_str(), links.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of links across all categories.
    pub fn link_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
