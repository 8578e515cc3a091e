use std::convert::TryFrom;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, Response};
use serde::de::DeserializeOwned;
use typed_builder::TypedBuilder;
use url::Url;

use crate::cursor::{PagedCursor, PagingConfig};
use crate::error::{BatchError, ServiceError};
use crate::fetch::PageFetcher;
use crate::options::{ListOptions, NextPageOptions};
use crate::page::{ListResponse, NextLink, Page, PagedResponse};
use crate::requests::RequestToHttpString;
use crate::resources::{Accounts, JobSchedules, Tasks};
use crate::{BatchResult, Credentials};

/// API version sent with every first page request unless configured otherwise.
pub const DEFAULT_API_VERSION: &str = "2024-07-01.20.0";

/// The configuration for constructing a [`BatchClient`]
#[derive(TypedBuilder)]
pub struct BatchClientConfig {
    /// URL of the batch account endpoint
    ///
    /// Example: `https://myaccount.westeurope.batch.example.com`
    #[builder(setter(into))]
    base_url: String,
    /// API version of the service
    #[builder(default = DEFAULT_API_VERSION.to_string(), setter(into))]
    api_version: String,
    /// Credentials of the client
    #[builder(default, setter(transform = |credentials: Credentials| Some(credentials)))]
    credentials: Option<Credentials>,
    /// Limits applied to every listing of this client
    #[builder(default)]
    paging: PagingConfig,
    /// Allow unsafe SSL certificates
    #[builder(default = false)]
    allow_insecure: bool,
    /// Timeout for each request, on top of the server side `timeout` option
    #[builder(default = Duration::from_secs(60))]
    timeout: Duration,
    /// User agent sent with every request
    #[builder(default = concat!("batchsvc-rs/", env!("CARGO_PKG_VERSION")).to_string(), setter(into))]
    user_agent: String,
}

impl BatchClientConfig {
    /// Builds the client.
    pub fn into_client(self) -> BatchResult<BatchClient> {
        BatchClient::try_from(self)
    }
}

/// The client of the batch service
///
/// Cloning is cheap, clones share the connection pool.
#[derive(Clone, Debug)]
pub struct BatchClient {
    /// Base URL, always ending in a slash
    base_url: Url,
    /// API version of the service
    api_version: String,
    /// Credentials of the client
    credentials: Option<Credentials>,
    /// Paging limits
    paging: PagingConfig,
    /// The client
    client: reqwest::Client,
}

impl TryFrom<BatchClientConfig> for BatchClient {
    type Error = BatchError;

    fn try_from(config: BatchClientConfig) -> Result<Self, Self::Error> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if config.api_version.trim().is_empty() {
            return Err(BatchError::validation("api_version", "must not be blank"));
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.allow_insecure)
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(BatchClient {
            base_url,
            api_version: config.api_version,
            credentials: config.credentials,
            paging: config.paging,
            client,
        })
    }
}

impl BatchClient {
    /// Creates a builder for the client
    ///
    /// ## Example
    ///
    /// ```rust,no_run
    /// use batchsvc_rs::{BatchClient, Credentials};
    ///
    /// let client = BatchClient::builder()
    ///     .base_url("https://myaccount.westeurope.batch.example.com")
    ///     .credentials(Credentials::new("token"))
    ///     .build()
    ///     .into_client()
    ///     .expect("invalid client configuration");
    /// ```
    pub fn builder() -> BatchClientConfigBuilder {
        BatchClientConfig::builder()
    }

    /// Operations on the batch account.
    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(self)
    }

    /// Operations on job schedules.
    pub fn job_schedules(&self) -> JobSchedules<'_> {
        JobSchedules::new(self)
    }

    /// Operations on the tasks of a job.
    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(self)
    }

    /// The base URL of the service.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The paging limits applied to listings.
    pub fn paging(&self) -> PagingConfig {
        self.paging
    }

    /// Returns the page fetcher of a listing at `path`, relative to the base URL.
    ///
    /// `R` is the envelope the pages are decoded from.
    pub fn endpoint<T, R>(&self, path: &str) -> BatchResult<ListEndpoint<T, R>>
    where
        R: DeserializeOwned + PagedResponse<T>,
    {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return Err(BatchError::validation("path", "must not be empty"));
        }
        Ok(ListEndpoint {
            client: self.client.clone(),
            url: self.base_url.join(path)?,
            api_version: self.api_version.clone(),
            credentials: self.credentials.clone(),
            _marker: PhantomData,
        })
    }

    /// Lists the resources at `path` and returns a cursor positioned on the first page.
    pub async fn list<T, R>(
        &self,
        path: &str,
        options: Option<ListOptions>,
    ) -> BatchResult<PagedCursor<T, ListEndpoint<T, R>>>
    where
        T: Send + 'static,
        R: DeserializeOwned + PagedResponse<T> + Send + 'static,
    {
        let endpoint = self.endpoint::<T, R>(path)?;
        PagedCursor::start_with(endpoint, options, self.paging).await
    }
}

/// Page fetcher bound to one list endpoint of the service.
///
/// The first page is requested from the endpoint URL with the `api-version` and the list
/// options. Every following page is requested from the next link exactly as the service
/// returned it.
pub struct ListEndpoint<T, R = ListResponse<T>> {
    client: reqwest::Client,
    url: Url,
    api_version: String,
    credentials: Option<Credentials>,
    _marker: PhantomData<fn() -> (T, R)>,
}

impl<T, R> Clone for ListEndpoint<T, R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            url: self.url.clone(),
            api_version: self.api_version.clone(),
            credentials: self.credentials.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for ListEndpoint<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListEndpoint")
            .field("url", &self.url.as_str())
            .field("api_version", &self.api_version)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl<T, R> ListEndpoint<T, R>
where
    R: DeserializeOwned + PagedResponse<T>,
{
    /// The URL of the first page, without query parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Builds the first page request without sending it.
    pub fn prepare_first_request(&self, options: &ListOptions) -> BatchResult<Request> {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", &self.api_version);
            for (key, value) in options.query_parameters().iter() {
                query.append_pair(key, value);
            }
        }

        let mut request = self.client.get(url).headers(options.headers()?);
        if let Some(credentials) = &self.credentials {
            request = credentials.apply(request);
        }
        Ok(request.build()?)
    }

    /// Builds the request for the page behind `next_link` without sending it.
    ///
    /// The link must be an absolute URL on the origin of the endpoint. A link to any other
    /// origin fails with [`BatchError::ForeignNextLink`] before credentials are attached.
    pub fn prepare_next_request(
        &self,
        next_link: &NextLink,
        options: &NextPageOptions,
    ) -> BatchResult<Request> {
        let url = Url::parse(next_link.as_str())?;
        if url.origin() != self.url.origin() {
            return Err(BatchError::ForeignNextLink {
                origin: url.origin().ascii_serialization(),
            });
        }

        let mut request = self.client.get(url).headers(options.headers()?);
        if let Some(credentials) = &self.credentials {
            request = credentials.apply(request);
        }
        Ok(request.build()?)
    }

    async fn execute(&self, request: Request) -> BatchResult<Page<T>> {
        if tracing::enabled!(tracing::Level::TRACE) {
            if let Ok(text) = request.to_http_string() {
                tracing::trace!("sending page request:\n{}", text);
            }
        }

        let url = request.url().clone();
        let response = self.client.execute(request).await?;
        let status = response.status();
        tracing::debug!(
            %url,
            status = status.as_u16(),
            request_id = header_str(&response, "request-id"),
            client_request_id = header_str(&response, "client-request-id"),
            "received page response"
        );

        if !status.is_success() {
            let body = response.text().await?;
            return Err(ServiceError::from_body(status.as_u16(), body).into());
        }

        let body = response.bytes().await?;
        let envelope = serde_json::from_slice::<R>(&body)?;
        Ok(envelope.into_page())
    }
}

#[async_trait]
impl<T, R> PageFetcher<T> for ListEndpoint<T, R>
where
    T: Send + 'static,
    R: DeserializeOwned + PagedResponse<T> + Send + 'static,
{
    async fn fetch_first(&self, options: &ListOptions) -> BatchResult<Page<T>> {
        let request = self.prepare_first_request(options)?;
        self.execute(request).await
    }

    async fn fetch_next(
        &self,
        next_link: &NextLink,
        options: &NextPageOptions,
    ) -> BatchResult<Page<T>> {
        let request = self.prepare_next_request(next_link, options)?;
        self.execute(request).await
    }
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
