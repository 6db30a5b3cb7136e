//! Link extraction
//!
//! Two extractors turn page content into a flat list of [`Link`]s, each
//! tagged with the category heading that precedes it:
//!
//! - [`links_from_blocks`] walks structured Notion blocks.
//! - [`links_from_text`] scans the raw text returned by the completion relay,
//!   line by line.
//!
//! Both are a single fold over their input. The fold carries the current
//! category (initially [`DEFAULT_CATEGORY`]) and the links emitted so far.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    DEFAULT_CATEGORY,
    blocks::{Block, BlockKind, RichText, plain_text},
    config::{NOTION_PAGE_BASE_URL, PAGE_PREVIEW_LEN},
    links::{CategoryIndex, Link},
};

/// Links extracted from one page, with their category index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub links: Vec<Link>,
    pub categories: CategoryIndex,
}

impl Extracted {
    /// Wraps a link list, building its category index.
    pub fn from_links(links: Vec<Link>) -> Self {
        let categories = CategoryIndex::from_links(&links);
        Self { links, categories }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// fold state: current category and links emitted so far
struct Scan {
    category: String,
    links: Vec<Link>,
}

impl Scan {
    fn new() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            links: Vec::new(),
        }
    }

    fn emit(&mut self, title: &str, url: &str) {
        self.links.push(Link::fetched(title, url, self.category.as_str()));
    }
}

/// Canonical Notion address for a page id: dashes removed, appended to `https://www.notion.so/`.
pub fn notion_page_url(page_id: &str) -> String {
    format!("{NOTION_PAGE_BASE_URL}{}", page_id.replace('-', ""))
}

/// Extracts links from a sequence of content blocks, in block order.
///
/// - headings with non-blank text set the current category
/// - every linked text run in a paragraph becomes a link
/// - bookmarks become a link titled by their caption, or their url
/// - links to pages become a link to the page's canonical address
/// - other blocks are ignored
pub fn links_from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Vec<Link> {
    blocks
        .into_iter()
        .fold(Scan::new(), |mut scan, block| {
            match &block.kind {
                BlockKind::Heading { rich_text, .. } => {
                    let text = plain_text(rich_text);
                    let text = text.trim();
                    if !text.is_empty() {
                        scan.category = text.to_string();
                    }
                }
                BlockKind::Paragraph { rich_text } => {
                    for (run, target) in linked_runs(rich_text) {
                        let title = run.display_text().trim();
                        scan.emit(if title.is_empty() { target } else { title }, target);
                    }
                }
                BlockKind::Bookmark {
                    url: Some(url),
                    caption,
                } if !url.trim().is_empty() => {
                    let caption = plain_text(caption);
                    let caption = caption.trim();
                    scan.emit(if caption.is_empty() { url.as_str() } else { caption }, url);
                }
                BlockKind::LinkToPage { page_id } => {
                    let preview: String = page_id.chars().take(PAGE_PREVIEW_LEN).collect();
                    scan.emit(&format!("Page {preview}"), &notion_page_url(page_id));
                }
                BlockKind::Bookmark { .. } | BlockKind::Unsupported { .. } => {}
            }
            scan
        })
        .links
}

fn linked_runs(runs: &[RichText]) -> impl Iterator<Item = (&RichText, &str)> {
    runs.iter()
        .filter_map(|run| run.target().map(|target| (run, target)))
}

// A category line starts with an uppercase letter and holds only letters, whitespace, and '&'.
static CATEGORY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z\s&]+$").expect("category regex"));

// <page url="{{URL}}">TITLE</page>
static PAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<page url="\{\{([^}]+)\}\}">(.*?)</page>"#).expect("page tag regex")
});

/// Extracts links from raw page text, as returned by the completion relay.
///
/// Each line is checked twice, independently:
/// - a category line (`^[A-Z][a-zA-Z\s&]+$`, no `<`) sets the current category
/// - the first `<page url="{{URL}}">TITLE</page>` tag on the line becomes a link;
///   `\|` in the title is unescaped, and tags with a blank title are skipped
///
/// The category index is built in the same pass.
pub fn links_from_text(content: &str) -> Extracted {
    let (scan, categories) = content.lines().fold(
        (Scan::new(), CategoryIndex::default()),
        |(mut scan, mut categories), line| {
            if !line.contains('<') && CATEGORY_LINE.is_match(line) {
                scan.category = line.trim().to_string();
            }
            if let Some(caps) = PAGE_TAG.captures(line) {
                let url = &caps[1];
                let title = caps[2].replace("\\|", "|");
                let title = title.trim();
                if !title.is_empty() {
                    let last_segment = url.rsplit('/').next().unwrap_or(url);
                    let link = Link::fetched(title, url, scan.category.as_str())
                        .with_notion_url(format!("{NOTION_PAGE_BASE_URL}{last_segment}"));
                    categories.push(link.clone());
                    scan.links.push(link);
                }
            }
            (scan, categories)
        },
    );
    Extracted {
        links: scan.links,
        categories,
    }
}
