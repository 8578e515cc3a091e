#![warn(missing_docs)]
#![crate_name = "batchsvc_rs"]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Batch Service Client
//!
//! `batchsvc_rs` is a client for a cloud batch-processing service. Every listing of the
//! service is paginated: a page carries a list of items and, unless it is the last one, an
//! opaque next link. This crate follows those links for you, either pull style with a
//! [`PagedCursor`] or push style with a [`PushDriver`] whose consumer can stop early.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use batchsvc_rs::{BatchClient, Credentials, JobSchedule, ListOptions, ListResource};
//!
//! #[tokio::main]
//! async fn main() -> batchsvc_rs::BatchResult<()> {
//!     let client = BatchClient::builder()
//!         .base_url("https://myaccount.westeurope.batch.example.com")
//!         .credentials(Credentials::new("my-access-token"))
//!         .build()
//!         .into_client()?;
//!
//!     let options = ListOptions::builder()
//!         .filter("state eq 'active'")
//!         .max_results(100)
//!         .build();
//!     let schedules = JobSchedule::list(&client, Some(options))
//!         .await?
//!         .collect_all()
//!         .await?;
//!     println!("{:#?}", schedules);
//!     Ok(())
//! }
//! ```

extern crate reqwest;
extern crate serde;
extern crate self as batchsvc_rs;

/// Module containing the client and its list endpoints.
pub mod client;
/// Module containing the pull style cursor.
pub mod cursor;
/// Module containing the push style driver.
pub mod driver;
/// Module containing the error type.
pub mod error;
/// Module containing the page fetch contract.
pub mod fetch;
/// Module containing the macros.
pub mod macros;
/// Module containing the list options.
pub mod options;
/// Module containing pages and continuation tokens.
pub mod page;
/// Module containing query parameters.
pub mod params;
/// Module containing request helpers.
pub mod requests;
/// Module containing the resource groups and their models.
pub mod resources;

mod credentials;

pub use client::{BatchClient, ListEndpoint};
pub use credentials::Credentials;
pub use cursor::{PagedCursor, PagingConfig};
pub use driver::{
    DriverState, PageConsumer, PagingDecision, PagingFailure, PagingHandle, PagingOutcome,
    PagingSummary, PushDriver,
};
pub use error::{BatchError, ServiceError};
pub use fetch::PageFetcher;
pub use options::{ListOptions, NextPageOptions};
pub use page::{ListResponse, NextLink, Page, PagedResponse};
pub use params::Parameters;
pub use resources::{JobSchedule, ListResource, PoolNodeCounts, SupportedImage, Task};

pub use async_trait::async_trait;
pub use futures;
pub use serde_json::Value;

#[cfg(feature = "derive")]
pub use batchsvc_rs_derive::ListResource;

/// Result type for the batchsvc-rs crate.
pub type BatchResult<T> = std::result::Result<T, error::BatchError>;
