use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::{BatchClient, ListEndpoint};
use crate::cursor::PagedCursor;
use crate::error::BatchError;
use crate::options::ListOptions;
use crate::page::{ListResponse, PagedResponse};
use crate::BatchResult;

/// Placeholder for the id of the parent resource in [`ListResource::PATH`].
pub const PARENT_PLACEHOLDER: &str = "{parent}";

/// Trait for item types that can be listed from a fixed endpoint.
///
/// Implemented by hand below for the built-in models and generated by
/// `#[derive(ListResource)]` with the `derive` feature.
#[async_trait]
pub trait ListResource: DeserializeOwned + Send + 'static {
    /// Path of the list endpoint relative to the base URL, e.g. `jobschedules` or
    /// `jobs/{parent}/tasks`.
    const PATH: &'static str;

    /// The envelope the pages are decoded from.
    type Response: DeserializeOwned + PagedResponse<Self> + Send + 'static;

    /// Resolves [`PATH`](Self::PATH) for the given parent id.
    ///
    /// Fails with a validation error if the path needs a parent and none was given, or if the
    /// parent id is not a single path segment.
    fn path(parent: Option<&str>) -> BatchResult<String> {
        let needs_parent = Self::PATH.contains(PARENT_PLACEHOLDER);
        match (needs_parent, parent) {
            (false, None) => Ok(Self::PATH.to_string()),
            (false, Some(_)) => Err(BatchError::validation(
                "parent",
                format!("`{}` is not nested under a parent", Self::PATH),
            )),
            (true, None) => Err(BatchError::validation(
                "parent",
                format!("`{}` requires a parent id", Self::PATH),
            )),
            (true, Some(parent)) => {
                validate_id("parent", parent)?;
                Ok(Self::PATH.replace(PARENT_PLACEHOLDER, parent))
            }
        }
    }

    /// Lists the resources and returns a cursor positioned on the first page.
    async fn list(
        client: &BatchClient,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<Self, ListEndpoint<Self, Self::Response>>> {
        let path = Self::path(None)?;
        client.list::<Self, Self::Response>(&path, options).await
    }

    /// Lists the resources below `parent` and returns a cursor positioned on the first page.
    async fn list_in(
        client: &BatchClient,
        parent: &str,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<Self, ListEndpoint<Self, Self::Response>>> {
        let path = Self::path(Some(parent))?;
        client.list::<Self, Self::Response>(&path, options).await
    }
}

pub(crate) fn validate_id(field: &'static str, id: &str) -> BatchResult<()> {
    if id.trim().is_empty() {
        return Err(BatchError::validation(field, "must not be empty"));
    }
    if id.contains(['/', '?', '#']) {
        return Err(BatchError::validation(
            field,
            format!("`{id}` must not contain '/', '?' or '#'"),
        ));
    }
    Ok(())
}

/// A job schedule, as returned by the job schedule listing.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobSchedule {
    /// The id of the schedule.
    pub id: String,
    /// The display name.
    pub display_name: Option<String>,
    /// The state, e.g. `active` or `completed`.
    pub state: Option<String>,
    /// The URL of the schedule.
    pub url: Option<String>,
}

impl ListResource for JobSchedule {
    const PATH: &'static str = "jobschedules";
    type Response = ListResponse<Self>;
}

/// A task of a job.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// The id of the task.
    pub id: String,
    /// The display name.
    pub display_name: Option<String>,
    /// The state, e.g. `active`, `running` or `completed`.
    pub state: Option<String>,
    /// The command line of the task.
    pub command_line: Option<String>,
}

impl ListResource for Task {
    const PATH: &'static str = "jobs/{parent}/tasks";
    type Response = ListResponse<Self>;
}

/// A virtual machine image supported by the account.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportedImage {
    /// The node agent SKU the image works with.
    #[serde(rename = "nodeAgentSKUId")]
    pub node_agent_sku_id: String,
    /// The operating system type.
    pub os_type: Option<String>,
    /// The verification state.
    pub verification_type: Option<String>,
}

impl ListResource for SupportedImage {
    const PATH: &'static str = "supportedimages";
    type Response = ListResponse<Self>;
}

/// Node counts of a pool, grouped by state.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolNodeCounts {
    /// The id of the pool.
    pub pool_id: String,
    /// Counts of dedicated nodes by state.
    pub dedicated: Option<serde_json::Value>,
    /// Counts of low priority nodes by state.
    pub low_priority: Option<serde_json::Value>,
}

impl ListResource for PoolNodeCounts {
    const PATH: &'static str = "nodecounts";
    type Response = ListResponse<Self>;
}

/// Operations on the batch account.
pub struct Accounts<'a> {
    client: &'a BatchClient,
}

impl<'a> Accounts<'a> {
    pub(crate) fn new(client: &'a BatchClient) -> Self {
        Self { client }
    }

    /// Lists the virtual machine images supported by the account.
    pub async fn list_supported_images<T>(
        &self,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<T, ListEndpoint<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.client
            .list::<T, ListResponse<T>>(SupportedImage::PATH, options)
            .await
    }

    /// Lists the node counts of the pools of the account.
    pub async fn list_pool_node_counts<T>(
        &self,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<T, ListEndpoint<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.client
            .list::<T, ListResponse<T>>(PoolNodeCounts::PATH, options)
            .await
    }
}

/// Operations on job schedules.
pub struct JobSchedules<'a> {
    client: &'a BatchClient,
}

impl<'a> JobSchedules<'a> {
    pub(crate) fn new(client: &'a BatchClient) -> Self {
        Self { client }
    }

    /// Returns the page fetcher of the job schedule listing.
    pub fn endpoint<T>(&self) -> BatchResult<ListEndpoint<T>>
    where
        T: DeserializeOwned,
    {
        self.client.endpoint(JobSchedule::PATH)
    }

    /// Lists the job schedules of the account.
    pub async fn list<T>(
        &self,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<T, ListEndpoint<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.client
            .list::<T, ListResponse<T>>(JobSchedule::PATH, options)
            .await
    }
}

/// Operations on the tasks of a job.
pub struct Tasks<'a> {
    client: &'a BatchClient,
}

impl<'a> Tasks<'a> {
    pub(crate) fn new(client: &'a BatchClient) -> Self {
        Self { client }
    }

    /// Returns the page fetcher of the task listing of a job.
    pub fn endpoint<T>(&self, job_id: &str) -> BatchResult<ListEndpoint<T>>
    where
        T: DeserializeOwned,
    {
        validate_id("job_id", job_id)?;
        self.client.endpoint(&task_path(job_id))
    }

    /// Lists the tasks of a job.
    ///
    /// An empty or malformed `job_id` fails before any request is sent.
    pub async fn list<T>(
        &self,
        job_id: &str,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<T, ListEndpoint<T>>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        validate_id("job_id", job_id)?;
        self.client
            .list::<T, ListResponse<T>>(&task_path(job_id), options)
            .await
    }
}

fn task_path(job_id: &str) -> String {
    Task::PATH.replace(PARENT_PLACEHOLDER, job_id)
}
