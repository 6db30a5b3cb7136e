//! Cursor-paginated results
//!
//! Notion returns block children in pages of at most 100, with `has_more`
//! and a `next_cursor` to pass back as `start_cursor`.
//!
//! `PagedResult<T>` holds the first page and what is needed to request the
//! rest. Fetch all pages as a stream with [`into_stream()`](PagedResult::into_stream),
//! or collect them into a vector with [`collect_all()`](PagedResult::collect_all).
//! Pages are requested one at a time, in order.

use std::{fmt, ops::Deref, sync::Arc};

use futures::{
    StreamExt,
    stream::{BoxStream, unfold},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned, ser::Serializer};

use crate::{
    Result,
    http_client::{HttpClient, HttpRequest},
};

/// One page of a cursor-paginated list.
#[derive(Debug, Deserialize, Serialize)]
pub struct CursorPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if there are no items in this page.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }

    /// Cursor for the next page. `None` when this is the last page:
    /// `has_more` is false or the cursor is null or empty.
    pub fn continuation(&self) -> Option<&str> {
        if !self.has_more {
            return None;
        }
        self.next_cursor.as_deref().filter(|cursor| !cursor.is_empty())
    }
}

impl<'a, T> IntoIterator for &'a CursorPage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// A cursor-paginated result that can be converted into a stream of all items.
///
/// Implements `Deref` to [`CursorPage<T>`], so `.results`, `.has_more`,
/// `.len()` of the first page are available directly.
///
/// # Example
///
/// ```rust,no_run
/// use sentinel_links::prelude::*;
/// use futures::StreamExt;
///
/// # async fn example(client: NotionClient) -> Result<(), LinksError> {
/// let mut stream = client.block_children("my-page").await?.into_stream();
/// while let Some(block) = stream.next().await {
///     println!("{:?}", block?.kind);
/// }
/// # Ok(())
/// # }
/// ```
pub struct PagedResult<T> {
    page: CursorPage<T>,
    refill: Option<Refill>,
}

// client and request needed to get the next page
#[derive(Clone)]
struct Refill {
    client: Arc<HttpClient>,
    request: HttpRequest,
}

impl<T> PagedResult<T> {
    pub(crate) fn new(page: CursorPage<T>, client: Arc<HttpClient>, request: HttpRequest) -> Self {
        Self {
            page,
            refill: Some(Refill { client, request }),
        }
    }

    /// A single, final page holding `items`.
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            page: CursorPage {
                results: items,
                next_cursor: None,
                has_more: false,
            },
            refill: None,
        }
    }

    /// Consumes this result and returns the first page.
    pub fn into_page(self) -> CursorPage<T> {
        self.page
    }
}

impl<T> Deref for PagedResult<T> {
    type Target = CursorPage<T>;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl<T: fmt::Debug> fmt::Debug for PagedResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedResult")
            .field("page", &self.page)
            .finish()
    }
}

// serializes as the first page
impl<T: Serialize> Serialize for PagedResult<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.page.serialize(serializer)
    }
}

impl<'a, T> IntoIterator for &'a PagedResult<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.page.results.iter()
    }
}

impl<T: DeserializeOwned + Send + 'static> PagedResult<T> {
    /// Converts this result into a stream of all items across all pages.
    ///
    /// Items from the first page are yielded immediately. The next page is
    /// requested when the current one is exhausted and has a continuation
    /// cursor. Empty intermediate pages are skipped. The stream ends after
    /// the first error.
    pub fn into_stream(self) -> BoxStream<'static, Result<T>> {
        let cursor = self.page.continuation().map(str::to_string);
        let items = self.page.results.into_iter();

        unfold(
            (items, cursor, self.refill, false),
            |(mut items, mut cursor, refill, errored)| async move {
                if errored {
                    return None;
                }
                loop {
                    if let Some(item) = items.next() {
                        return Some((Ok(item), (items, cursor, refill, false)));
                    }
                    let next = cursor.take()?;
                    let source = refill.as_ref()?;
                    let fetched = source
                        .client
                        .send::<CursorPage<T>>(source.request.with_cursor(&next))
                        .await;
                    match fetched {
                        Ok(page) => {
                            cursor = page.continuation().map(str::to_string);
                            items = page.results.into_iter();
                        }
                        Err(e) => return Some((Err(e), (items, None, refill, true))),
                    }
                }
            },
        )
        .boxed()
    }

    /// Collects all items from all pages into a vector.
    /// Stops on the first error encountered.
    pub async fn collect_all(self) -> Result<Vec<T>> {
        let mut stream = self.into_stream();
        let mut items = Vec::new();

        while let Some(result) = stream.next().await {
            items.push(result?);
        }

        Ok(items)
    }
}
