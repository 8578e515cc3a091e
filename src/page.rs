use std::fmt;

use serde::{Deserialize, Serialize};

/// Continuation token of a paged listing.
///
/// The service hands out the full URL of the next page. The value is opaque: it is sent back
/// exactly as received and never parsed or rebuilt, since it already encodes the filter and
/// page size of the original request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NextLink(String);

impl NextLink {
    /// Wraps a continuation token returned by the service.
    pub fn new(link: impl Into<String>) -> Self {
        Self(link.into())
    }

    /// Returns the token as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NextLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NextLink {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NextLink {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One page of a listing.
///
/// A page without a next link is the last one. Pages are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    next_link: Option<NextLink>,
}

impl<T> Page<T> {
    /// Creates a page from its items and the continuation token, if any.
    pub fn new(items: Vec<T>, next_link: Option<NextLink>) -> Self {
        Self { items, next_link }
    }

    /// Creates a final page.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// The items of this page in server order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The continuation token, `None` on the last page.
    pub fn next_link(&self) -> Option<&NextLink> {
        self.next_link.as_ref()
    }

    /// Returns whether this is the final page.
    pub fn is_last(&self) -> bool {
        self.next_link.is_none()
    }

    /// Returns the number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether this page has no items.
    ///
    /// An empty page may still have a next link.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page and returns its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Consumes the page and returns its items and continuation token.
    pub fn into_parts(self) -> (Vec<T>, Option<NextLink>) {
        (self.items, self.next_link)
    }

    // Hands the items to a consuming reader while the page keeps its link.
    pub(crate) fn take_items(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

/// Trait for decoded list envelopes.
///
/// This allows the cursor to work with any response structure, as long as it can be turned
/// into a page.
pub trait PagedResponse<T> {
    /// Converts the envelope into a page.
    fn into_page(self) -> Page<T>;
}

/// The default list envelope: `{ "value": [...], "odata.nextLink": "..." }`.
///
/// A missing or `null` list decodes to an empty page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    /// The items of the page.
    #[serde(rename = "value")]
    pub list: Option<Vec<T>>,
    /// The continuation token.
    #[serde(rename = "odata.nextLink", alias = "nextLink")]
    pub next_link: Option<NextLink>,
}

impl<T> PagedResponse<T> for ListResponse<T> {
    fn into_page(self) -> Page<T> {
        Page::new(self.list.unwrap_or_default(), self.next_link)
    }
}

impl<T> PagedResponse<T> for Page<T> {
    fn into_page(self) -> Page<T> {
        self
    }
}
