//! Notion content blocks
//!
//! Notion returns each block as an object with a `type` tag and a field of the
//! same name holding the type-specific payload:
//!
//! ```json
//! {"object": "block", "id": "…", "type": "heading_1",
//!  "heading_1": {"rich_text": [{"plain_text": "AI", "href": null}]}}
//! ```
//!
//! Only the block types that can carry links or categories are modeled.
//! Everything else deserializes to [`BlockKind::Unsupported`] and is ignored
//! by the extractor.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One content block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
}

/// Type-specific block content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// `heading_1`, `heading_2`, or `heading_3`
    Heading { level: u8, rich_text: Vec<RichText> },
    Paragraph { rich_text: Vec<RichText> },
    Bookmark {
        url: Option<String>,
        caption: Vec<RichText>,
    },
    /// Link to another page (or database), by id
    LinkToPage { page_id: String },
    /// Any other block type, by its `type` tag
    Unsupported { block_type: String },
}

/// An inline text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,

    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub link: Option<TextLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextLink {
    pub url: String,
}

impl RichText {
    /// Plain, unlinked text run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Default::default()
        }
    }

    /// Text run linking to `url`.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            href: Some(url.into()),
            text: None,
        }
    }

    /// Display text of the run.
    pub fn display_text(&self) -> &str {
        if self.plain_text.is_empty() {
            self.text.as_ref().map_or("", |text| text.content.as_str())
        } else {
            &self.plain_text
        }
    }

    /// Hyperlink target of the run, if any.
    pub fn target(&self) -> Option<&str> {
        self.href
            .as_deref()
            .or_else(|| {
                self.text
                    .as_ref()
                    .and_then(|text| text.link.as_ref())
                    .map(|link| link.url.as_str())
            })
            .filter(|url| !url.trim().is_empty())
    }
}

/// Concatenated display text of a run sequence.
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter().map(RichText::display_text).collect()
}

impl Block {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::from_kind(BlockKind::Heading {
            level,
            rich_text: vec![RichText::plain(text)],
        })
    }

    pub fn paragraph(rich_text: Vec<RichText>) -> Self {
        Self::from_kind(BlockKind::Paragraph { rich_text })
    }

    pub fn bookmark(url: impl Into<String>, caption: Option<&str>) -> Self {
        Self::from_kind(BlockKind::Bookmark {
            url: Some(url.into()),
            caption: caption.map(RichText::plain).into_iter().collect(),
        })
    }

    pub fn link_to_page(page_id: impl Into<String>) -> Self {
        Self::from_kind(BlockKind::LinkToPage {
            page_id: page_id.into(),
        })
    }

    pub fn unsupported(block_type: impl Into<String>) -> Self {
        Self::from_kind(BlockKind::Unsupported {
            block_type: block_type.into(),
        })
    }

    fn from_kind(kind: BlockKind) -> Self {
        Self {
            id: String::new(),
            kind,
        }
    }
}

// Wire form of a block: the type tag plus every other field, so the payload
// can be looked up by the tag's name.
#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct TextPayload {
    #[serde(default)]
    rich_text: Vec<RichText>,
}

#[derive(Deserialize)]
struct BookmarkPayload {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize)]
struct LinkToPagePayload {
    #[serde(default)]
    page_id: Option<String>,
    #[serde(default)]
    database_id: Option<String>,
}

impl From<RawBlock> for Block {
    fn from(mut raw: RawBlock) -> Self {
        let payload = raw.fields.remove(&raw.block_type).unwrap_or(Value::Null);
        let kind = match parse_kind(&raw.block_type, payload) {
            Ok(kind) => kind,
            Err(e) => {
                debug!(block_type = %raw.block_type, id = %raw.id, "unreadable block payload: {e}");
                BlockKind::Unsupported {
                    block_type: raw.block_type.clone(),
                }
            }
        };
        Self { id: raw.id, kind }
    }
}

fn parse_kind(block_type: &str, payload: Value) -> Result<BlockKind, serde_json::Error> {
    Ok(match block_type {
        "heading_1" | "heading_2" | "heading_3" => {
            let level = block_type
                .strip_prefix("heading_")
                .and_then(|n| n.parse().ok())
                .unwrap_or(1);
            let TextPayload { rich_text } = serde_json::from_value(payload)?;
            BlockKind::Heading { level, rich_text }
        }
        "paragraph" => {
            let TextPayload { rich_text } = serde_json::from_value(payload)?;
            BlockKind::Paragraph { rich_text }
        }
        "bookmark" => {
            let BookmarkPayload { url, caption } = serde_json::from_value(payload)?;
            BlockKind::Bookmark { url, caption }
        }
        "link_to_page" => {
            let LinkToPagePayload {
                page_id,
                database_id,
            } = serde_json::from_value(payload)?;
            match page_id.or(database_id) {
                Some(page_id) => BlockKind::LinkToPage { page_id },
                None => BlockKind::Unsupported {
                    block_type: block_type.to_string(),
                },
            }
        }
        other => BlockKind::Unsupported {
            block_type: other.to_string(),
        },
    })
}
