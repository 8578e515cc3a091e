use std::num::NonZeroUsize;

use futures::stream::{self, Stream};

use crate::error::BatchError;
use crate::fetch::PageFetcher;
use crate::options::{ListOptions, NextPageOptions};
use crate::page::Page;
use crate::BatchResult;

/// Limits applied while following next links.
///
/// The service is expected to end every listing with a page that has no next link. By default
/// there is no ceiling. Setting `max_pages` turns a listing that keeps returning next links into
/// a [`BatchError::PageLimitExceeded`] once that many pages, the first one included, have been
/// fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingConfig {
    /// Maximum number of pages fetched for one listing.
    pub max_pages: Option<NonZeroUsize>,
}

impl PagingConfig {
    /// Creates a config without a page ceiling.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a config that stops after `max_pages` pages.
    pub fn with_max_pages(max_pages: NonZeroUsize) -> Self {
        Self {
            max_pages: Some(max_pages),
        }
    }

    pub(crate) fn check(&self, pages_fetched: usize) -> BatchResult<()> {
        match self.max_pages {
            Some(limit) if pages_fetched >= limit.get() => Err(BatchError::PageLimitExceeded {
                limit: limit.get(),
            }),
            _ => Ok(()),
        }
    }
}

/// Pull style cursor over a paged listing.
///
/// The cursor always holds exactly one current page. [`advance`](Self::advance) replaces it with
/// the page behind its next link. Once the current page has no next link the cursor is ended and
/// advancing is a no-op that never reaches the transport.
///
/// A cursor cannot be rewound. To read a listing again, keep the first page and build a new
/// cursor with [`from_first_page`](Self::from_first_page).
///
/// ## Example
///
/// ```rust,no_run
/// use batchsvc_rs::{BatchClient, ListOptions};
///
/// # async fn run(client: BatchClient) -> batchsvc_rs::BatchResult<()> {
/// let mut cursor = client
///     .job_schedules()
///     .list::<serde_json::Value>(Some(ListOptions::builder().max_results(100).build()))
///     .await?;
///
/// println!("first page: {} items", cursor.current_page().len());
/// while let Some(items) = cursor.advance().await? {
///     println!("next page: {} items", items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct PagedCursor<T, F> {
    fetcher: F,
    current: Page<T>,
    options: NextPageOptions,
    config: PagingConfig,
    pages_fetched: usize,
}

impl<T, F> PagedCursor<T, F>
where
    F: PageFetcher<T>,
{
    /// Validates the options, fetches the first page and returns a cursor positioned on it.
    ///
    /// Nothing is sent if the options are invalid.
    pub async fn start(fetcher: F, options: Option<ListOptions>) -> BatchResult<Self> {
        Self::start_with(fetcher, options, PagingConfig::default()).await
    }

    /// Same as [`start`](Self::start) with explicit paging limits.
    pub async fn start_with(
        fetcher: F,
        options: Option<ListOptions>,
        config: PagingConfig,
    ) -> BatchResult<Self> {
        let options = options.unwrap_or_default();
        options.validate()?;

        let first = fetcher.fetch_first(&options).await?;
        tracing::debug!(
            items = first.len(),
            last = first.is_last(),
            "fetched first page"
        );
        Ok(Self::from_first_page(first, fetcher, options.continuation()).with_config(config))
    }

    /// Builds a cursor on an already fetched first page.
    pub fn from_first_page(first: Page<T>, fetcher: F, options: NextPageOptions) -> Self {
        Self {
            fetcher,
            current: first,
            options,
            config: PagingConfig::default(),
            pages_fetched: 1,
        }
    }

    /// Replaces the paging limits.
    pub fn with_config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns whether the current page has a next link.
    pub fn has_more(&self) -> bool {
        !self.current.is_last()
    }

    /// The page the cursor is positioned on.
    pub fn current_page(&self) -> &Page<T> {
        &self.current
    }

    /// Number of pages fetched so far, the first one included.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetches the next page and returns its items.
    ///
    /// Returns `Ok(None)` without any request once the cursor has ended, however often it is
    /// called. On failure the error is returned and the cursor stays on the last page that was
    /// fetched successfully.
    pub async fn advance(&mut self) -> BatchResult<Option<&[T]>> {
        if self.fetch_next_page().await? {
            Ok(Some(self.current.items()))
        } else {
            Ok(None)
        }
    }

    /// Reads all remaining items, starting with the ones of the current page.
    pub async fn collect_all(mut self) -> BatchResult<Vec<T>> {
        let mut all_items = self.current.take_items();
        while self.fetch_next_page().await? {
            all_items.extend(self.current.take_items());
        }
        Ok(all_items)
    }

    /// Turns the cursor into a stream of items, starting with the ones of the current page.
    ///
    /// A failed fetch is yielded as an error and ends the stream.
    pub fn into_stream(mut self) -> impl Stream<Item = BatchResult<T>> {
        let buffer = self.current.take_items().into_iter();
        stream::unfold(Some((self, buffer)), |state| async move {
            let (mut cursor, mut buffer) = state?;
            loop {
                if let Some(item) = buffer.next() {
                    return Some((Ok(item), Some((cursor, buffer))));
                }
                match cursor.fetch_next_page().await {
                    Ok(true) => buffer = cursor.current.take_items().into_iter(),
                    Ok(false) => return None,
                    Err(err) => return Some((Err(err), None)),
                }
            }
        })
    }

    async fn fetch_next_page(&mut self) -> BatchResult<bool> {
        let Some(next_link) = self.current.next_link() else {
            return Ok(false);
        };
        self.config.check(self.pages_fetched)?;

        tracing::debug!(page = self.pages_fetched + 1, "fetching next page");
        let page = match self.fetcher.fetch_next(next_link, &self.options).await {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(page = self.pages_fetched + 1, error = %err, "page fetch failed");
                return Err(err);
            }
        };
        self.pages_fetched += 1;
        self.current = page;
        Ok(true)
    }
}
