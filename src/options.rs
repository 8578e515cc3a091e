use std::time::SystemTime;

use httpdate::fmt_http_date;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use typed_builder::TypedBuilder;

use crate::error::BatchError;
use crate::params::Parameters;
use crate::BatchResult;

/// Largest page size the service accepts.
pub const MAX_RESULTS_LIMIT: u32 = 1000;

const CLIENT_REQUEST_ID: HeaderName = HeaderName::from_static("client-request-id");
const RETURN_CLIENT_REQUEST_ID: HeaderName = HeaderName::from_static("return-client-request-id");
const OCP_DATE: HeaderName = HeaderName::from_static("ocp-date");

/// Options of a list call.
///
/// Passing `None` where an `Option<ListOptions>` is expected is the same as passing
/// `ListOptions::default()`: every field is unset and nothing is added to the request.
///
/// ## Example
///
/// ```
/// use batchsvc_rs::ListOptions;
///
/// let options = ListOptions::builder()
///     .filter("state eq 'active'")
///     .max_results(50)
///     .client_request_id("abc")
///     .build();
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct ListOptions {
    /// OData `$filter` expression.
    #[builder(default, setter(strip_option, into))]
    pub filter: Option<String>,
    /// OData `$select` clause.
    #[builder(default, setter(strip_option, into))]
    pub select: Option<String>,
    /// Maximum number of items per page, between 1 and [`MAX_RESULTS_LIMIT`].
    #[builder(default, setter(strip_option))]
    pub max_results: Option<u32>,
    /// Server side processing timeout in seconds.
    #[builder(default, setter(strip_option))]
    pub timeout: Option<u32>,
    /// Caller generated request identity, echoed in service logs.
    #[builder(default, setter(strip_option, into))]
    pub client_request_id: Option<String>,
    /// Whether the service should return the client request id in the response.
    #[builder(default, setter(strip_option))]
    pub return_client_request_id: Option<bool>,
    /// The time the request was issued, sent as an RFC 1123 date.
    #[builder(default, setter(strip_option))]
    pub ocp_date: Option<SystemTime>,
}

impl ListOptions {
    /// Checks every set option. Must pass before a request is built.
    pub fn validate(&self) -> BatchResult<()> {
        if let Some(filter) = &self.filter {
            if filter.trim().is_empty() {
                return Err(BatchError::validation("filter", "must not be blank"));
            }
        }
        if let Some(select) = &self.select {
            if select.trim().is_empty() {
                return Err(BatchError::validation("select", "must not be blank"));
            }
        }
        if let Some(max_results) = self.max_results {
            if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
                return Err(BatchError::validation(
                    "max_results",
                    format!("must be between 1 and {MAX_RESULTS_LIMIT}, got {max_results}"),
                ));
            }
        }
        if self.timeout == Some(0) {
            return Err(BatchError::validation("timeout", "must be at least one second"));
        }
        self.continuation().validate()
    }

    /// Returns the options a continuation request carries forward.
    ///
    /// Filter, select, page size and timeout are left out: the next link already encodes them.
    pub fn continuation(&self) -> NextPageOptions {
        NextPageOptions {
            client_request_id: self.client_request_id.clone(),
            return_client_request_id: self.return_client_request_id,
            ocp_date: self.ocp_date,
        }
    }

    /// The query parameters of the first page request.
    pub fn query_parameters(&self) -> Parameters {
        Parameters::new()
            .param_opt("$filter", self.filter.as_deref())
            .param_opt("$select", self.select.as_deref())
            .param_opt("maxresults", self.max_results.map(|v| v.to_string()))
            .param_opt("timeout", self.timeout.map(|v| v.to_string()))
    }

    /// The headers of the first page request.
    pub fn headers(&self) -> BatchResult<HeaderMap> {
        self.continuation().headers()
    }
}

/// The options that stay valid across pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextPageOptions {
    /// Caller generated request identity.
    pub client_request_id: Option<String>,
    /// Whether the service should return the client request id.
    pub return_client_request_id: Option<bool>,
    /// The time the request was issued.
    pub ocp_date: Option<SystemTime>,
}

impl NextPageOptions {
    /// Checks the carried options.
    pub fn validate(&self) -> BatchResult<()> {
        if let Some(id) = &self.client_request_id {
            if id.trim().is_empty() {
                return Err(BatchError::validation(
                    "client_request_id",
                    "must not be blank",
                ));
            }
            if HeaderValue::from_str(id).is_err() {
                return Err(BatchError::validation(
                    "client_request_id",
                    "must be a visible ASCII string",
                ));
            }
        }
        Ok(())
    }

    /// Builds the request headers for these options.
    pub fn headers(&self) -> BatchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(id) = &self.client_request_id {
            headers.insert(CLIENT_REQUEST_ID, HeaderValue::from_str(id)?);
        }
        if let Some(flag) = self.return_client_request_id {
            let value = if flag { "true" } else { "false" };
            headers.insert(RETURN_CLIENT_REQUEST_ID, HeaderValue::from_static(value));
        }
        if let Some(date) = self.ocp_date {
            headers.insert(OCP_DATE, HeaderValue::from_str(&fmt_http_date(date))?);
        }
        Ok(headers)
    }
}
