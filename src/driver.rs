use std::fmt;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cursor::PagingConfig;
use crate::error::BatchError;
use crate::fetch::PageFetcher;
use crate::options::{ListOptions, NextPageOptions};
use crate::page::{NextLink, Page};
use crate::BatchResult;

/// What the consumer wants after a page was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagingDecision {
    /// Fetch and deliver the next page, if there is one.
    Continue,
    /// Stop fetching. The listing is reported as successfully ended.
    Stop,
}

/// Receives the pages of a push style listing.
///
/// Closures of the form `FnMut(&[T]) -> PagingDecision` are consumers too.
pub trait PageConsumer<T>: Send {
    /// Called with the items of every page, in server order, before [`page_completed`](Self::page_completed).
    fn items_received(&mut self, _items: &[T]) {}

    /// Called once all items of a page were handed over. The decision is only acted upon if the
    /// page has a next link.
    fn page_completed(&mut self, items: &[T]) -> PagingDecision;
}

impl<T, F> PageConsumer<T> for F
where
    F: FnMut(&[T]) -> PagingDecision + Send,
{
    fn page_completed(&mut self, items: &[T]) -> PagingDecision {
        self(items)
    }
}

/// Progress of a push style listing. Pages are counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing has been fetched yet.
    Pending,
    /// The request for a page is in flight.
    Fetching {
        /// The page being fetched.
        page: usize,
    },
    /// A page was handed to the consumer.
    Delivered {
        /// The delivered page.
        page: usize,
    },
    /// The listing ended successfully.
    Completed {
        /// Number of pages delivered.
        pages: usize,
        /// Whether the consumer stopped before the last page.
        stopped: bool,
    },
    /// A page could not be fetched.
    Failed {
        /// The page that failed.
        page: usize,
    },
}

impl DriverState {
    /// Returns whether the listing has ended, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, DriverState::Completed { .. } | DriverState::Failed { .. })
    }
}

/// Result of a listing that ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingSummary<T> {
    /// Every item delivered, in page order.
    pub items: Vec<T>,
    /// Number of pages delivered.
    pub pages: usize,
    /// Whether the consumer stopped before the last page.
    pub stopped_early: bool,
}

/// Result of a listing that failed.
///
/// The items of the pages delivered before the failure are kept.
#[derive(Debug)]
pub struct PagingFailure<T> {
    /// The cause.
    pub error: BatchError,
    /// Every item delivered before the failure, in page order.
    pub items: Vec<T>,
    /// The page that could not be fetched, counted from 1.
    pub failed_page: usize,
}

impl<T> PagingFailure<T> {
    /// Drops the collected items and returns the cause.
    pub fn into_error(self) -> BatchError {
        self.error
    }
}

impl<T> fmt::Display for PagingFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fetching page {} failed: {}", self.failed_page, self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for PagingFailure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of a push style listing.
pub type PagingOutcome<T> = Result<PagingSummary<T>, PagingFailure<T>>;

enum Start<T> {
    Options(ListOptions),
    Page(Page<T>, NextPageOptions),
}

/// Push style driver for a paged listing.
///
/// The driver hands each page to a [`PageConsumer`] and fetches the next one only after the
/// consumer answered [`PagingDecision::Continue`]. There is never more than one request in
/// flight. A [`PagingDecision::Stop`] takes effect between pages; a running request is not
/// aborted.
///
/// ## Example
///
/// ```rust,no_run
/// use batchsvc_rs::{BatchClient, PagingDecision, PushDriver};
///
/// # async fn run(client: BatchClient) -> batchsvc_rs::BatchResult<()> {
/// let endpoint = client.tasks().endpoint::<serde_json::Value>("job-1")?;
/// let mut seen = 0;
/// let handle = PushDriver::new(endpoint, move |items: &[serde_json::Value]| {
///     seen += items.len();
///     if seen >= 500 { PagingDecision::Stop } else { PagingDecision::Continue }
/// })
/// .spawn(None)?;
///
/// match handle.join().await {
///     Ok(summary) => println!("{} tasks on {} pages", summary.items.len(), summary.pages),
///     Err(failure) => eprintln!("{failure}"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct PushDriver<T, F, C> {
    fetcher: F,
    consumer: C,
    config: PagingConfig,
    state: watch::Sender<DriverState>,
    items: Vec<T>,
    pages: usize,
}

impl<T, F, C> PushDriver<T, F, C>
where
    F: PageFetcher<T>,
    C: PageConsumer<T>,
{
    /// Creates a driver for the listing behind `fetcher`.
    pub fn new(fetcher: F, consumer: C) -> Self {
        let (state, _) = watch::channel(DriverState::Pending);
        Self {
            fetcher,
            consumer,
            config: PagingConfig::default(),
            state,
            items: Vec::new(),
            pages: 0,
        }
    }

    /// Replaces the paging limits.
    pub fn with_config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribes to the state of the driver.
    pub fn subscribe(&self) -> watch::Receiver<DriverState> {
        self.state.subscribe()
    }

    /// Fetches the first page with `options` and delivers pages until the listing ends.
    ///
    /// Invalid options fail page 1 without any request being sent.
    pub async fn run(self, options: Option<ListOptions>) -> PagingOutcome<T> {
        let options = options.unwrap_or_default();
        if let Err(error) = options.validate() {
            return Err(self.fail(error));
        }
        self.drive(Start::Options(options)).await
    }

    /// Delivers `first` and the pages following it until the listing ends.
    pub async fn run_from(self, first: Page<T>, options: NextPageOptions) -> PagingOutcome<T> {
        self.drive(Start::Page(first, options)).await
    }

    async fn drive(mut self, start: Start<T>) -> PagingOutcome<T> {
        let (mut page, carried) = match start {
            Start::Page(page, carried) => (page, carried),
            Start::Options(options) => {
                self.transition(DriverState::Fetching { page: 1 });
                let fetched = self.fetcher.fetch_first(&options).await;
                match fetched {
                    Ok(page) => (page, options.continuation()),
                    Err(error) => return Err(self.fail(error)),
                }
            }
        };

        loop {
            let (next_link, decision) = self.deliver(page);
            let next_link = match (next_link, decision) {
                (Some(link), PagingDecision::Continue) => link,
                (link, _) => return Ok(self.complete(link.is_some())),
            };

            if let Err(error) = self.config.check(self.pages) {
                return Err(self.fail(error));
            }
            self.transition(DriverState::Fetching {
                page: self.pages + 1,
            });
            let fetched = self.fetcher.fetch_next(&next_link, &carried).await;
            page = match fetched {
                Ok(page) => page,
                Err(error) => return Err(self.fail(error)),
            };
        }
    }

    // Hands the page to the consumer and keeps its items.
    fn deliver(&mut self, page: Page<T>) -> (Option<NextLink>, PagingDecision) {
        let (items, next_link) = page.into_parts();
        self.consumer.items_received(&items);
        let decision = self.consumer.page_completed(&items);
        self.pages += 1;
        self.items.extend(items);
        self.transition(DriverState::Delivered { page: self.pages });
        (next_link, decision)
    }

    fn complete(self, stopped: bool) -> PagingSummary<T> {
        self.transition(DriverState::Completed {
            pages: self.pages,
            stopped,
        });
        PagingSummary {
            items: self.items,
            pages: self.pages,
            stopped_early: stopped,
        }
    }

    fn fail(self, error: BatchError) -> PagingFailure<T> {
        let failed_page = self.pages + 1;
        tracing::debug!(page = failed_page, error = %error, "paging failed");
        self.transition(DriverState::Failed { page: failed_page });
        PagingFailure {
            error,
            items: self.items,
            failed_page,
        }
    }

    fn transition(&self, state: DriverState) {
        tracing::trace!(?state, "paging state changed");
        self.state.send_replace(state);
    }
}

impl<T, F, C> PushDriver<T, F, C>
where
    T: Send + 'static,
    F: PageFetcher<T> + 'static,
    C: PageConsumer<T> + 'static,
{
    /// Validates the options and runs the driver on a tokio task.
    ///
    /// Validation errors are returned right away and no task is spawned.
    pub fn spawn(self, options: Option<ListOptions>) -> BatchResult<PagingHandle<T>> {
        let options = options.unwrap_or_default();
        options.validate()?;
        let state = self.subscribe();
        let join = tokio::spawn(self.drive(Start::Options(options)));
        Ok(PagingHandle { join, state })
    }

    /// Runs the driver from an already fetched first page on a tokio task.
    pub fn spawn_from(self, first: Page<T>, options: NextPageOptions) -> PagingHandle<T> {
        let state = self.subscribe();
        let join = tokio::spawn(self.drive(Start::Page(first, options)));
        PagingHandle { join, state }
    }
}

/// Handle of a push style listing running on a tokio task.
pub struct PagingHandle<T> {
    join: JoinHandle<PagingOutcome<T>>,
    state: watch::Receiver<DriverState>,
}

impl<T> PagingHandle<T> {
    /// The latest state of the driver.
    pub fn state(&self) -> DriverState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn watch_state(&self) -> watch::Receiver<DriverState> {
        self.state.clone()
    }

    /// Waits for the listing to end.
    pub async fn join(self) -> PagingOutcome<T> {
        let PagingHandle { join, state } = self;
        match join.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                tracing::debug!(error = %join_error, "paging task did not finish");
                let failed_page = match *state.borrow() {
                    DriverState::Fetching { page } | DriverState::Failed { page } => page,
                    DriverState::Delivered { page } => page + 1,
                    DriverState::Completed { pages, .. } => pages + 1,
                    DriverState::Pending => 1,
                };
                Err(PagingFailure {
                    error: BatchError::DriverAborted,
                    items: Vec::new(),
                    failed_page,
                })
            }
        }
    }
}
