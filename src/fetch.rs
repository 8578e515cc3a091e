use std::sync::Arc;

use async_trait::async_trait;

use crate::options::{ListOptions, NextPageOptions};
use crate::page::{NextLink, Page};
use crate::BatchResult;

/// Fetches the pages of one listing.
///
/// Implementations are bound to a single endpoint. They fail with
/// [`BatchError::Transport`](crate::BatchError::Transport),
/// [`BatchError::Service`](crate::BatchError::Service) or
/// [`BatchError::Decode`](crate::BatchError::Decode).
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetches the first page, built from the options of the initiating call.
    ///
    /// The options have already been validated.
    async fn fetch_first(&self, options: &ListOptions) -> BatchResult<Page<T>>;

    /// Fetches the page behind `next_link`.
    ///
    /// The link must be passed to the transport verbatim. Only the carried-forward options
    /// are sent along with it.
    async fn fetch_next(
        &self,
        next_link: &NextLink,
        options: &NextPageOptions,
    ) -> BatchResult<Page<T>>;
}

#[async_trait]
impl<T, F> PageFetcher<T> for Arc<F>
where
    F: PageFetcher<T> + ?Sized,
    T: Send + 'static,
{
    async fn fetch_first(&self, options: &ListOptions) -> BatchResult<Page<T>> {
        (**self).fetch_first(options).await
    }

    async fn fetch_next(
        &self,
        next_link: &NextLink,
        options: &NextPageOptions,
    ) -> BatchResult<Page<T>> {
        (**self).fetch_next(next_link, options).await
    }
}
