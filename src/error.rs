use std::fmt;

use serde::Deserialize;

/// Error type for the batchsvc-rs crate.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum BatchError {
    /// A call argument or option was rejected before any request was sent.
    #[error("Invalid value for `{field}`: {message}")]
    #[diagnostic(code(batchsvc_rs::error::BatchError::Validation))]
    Validation {
        /// The offending argument or option.
        field: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// The request could not be completed at the HTTP layer (connection, timeout).
    #[error(transparent)]
    #[diagnostic(code(batchsvc_rs::error::BatchError::Transport))]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error(transparent)]
    #[diagnostic(code(batchsvc_rs::error::BatchError::Service))]
    Service(#[from] ServiceError),

    /// The response body did not have the expected shape.
    #[error("Failed to decode the response body: {0}")]
    #[diagnostic(code(batchsvc_rs::error::BatchError::Decode))]
    Decode(#[from] serde_json::Error),

    /// An invalid header value has been provided.
    #[error(transparent)]
    #[diagnostic(code(batchsvc_rs::error::BatchError::InvalidHeaderValue))]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    /// Header value contained non-ASCII characters.
    #[error("Header value contained non-ASCII characters.")]
    #[diagnostic(code(batchsvc_rs::error::BatchError::HeaderValueToStrError))]
    HeaderValueToStrError,

    /// Url parsing error.
    #[error(transparent)]
    #[diagnostic(code(batchsvc_rs::error::BatchError::UrlParseError))]
    UrlParseError(#[from] url::ParseError),

    /// The service returned a next link on another origin than the listing.
    #[error("Refusing to follow a next link to `{origin}`.")]
    #[diagnostic(
        code(batchsvc_rs::error::BatchError::ForeignNextLink),
        help("next links must stay on the scheme, host and port of the client's base URL")
    )]
    ForeignNextLink {
        /// The origin of the rejected link.
        origin: String,
    },

    /// Writing a debug representation failed.
    #[error(transparent)]
    #[diagnostic(code(batchsvc_rs::error::BatchError::Format))]
    Format(#[from] std::fmt::Error),

    /// The configured page ceiling was reached while the service still returned a next link.
    #[error("Stopped after {limit} pages, the service kept returning a next link.")]
    #[diagnostic(
        code(batchsvc_rs::error::BatchError::PageLimitExceeded),
        help("raise `PagingConfig::max_pages` or narrow the listing with a filter")
    )]
    PageLimitExceeded {
        /// The ceiling that was hit.
        limit: usize,
    },

    /// The push driver task ended without reporting a result.
    #[error("The paging task ended without a result.")]
    #[diagnostic(code(batchsvc_rs::error::BatchError::DriverAborted))]
    DriverAborted,
}

impl BatchError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code if the service rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            BatchError::Service(err) => Some(err.status),
            BatchError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::header::ToStrError> for BatchError {
    fn from(_: reqwest::header::ToStrError) -> Self {
        BatchError::HeaderValueToStrError
    }
}

/// A non-success response of the service, with the decoded error payload if there was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The HTTP status code.
    pub status: u16,
    /// The service error code, e.g. `JobNotFound`.
    pub code: Option<String>,
    /// The human readable message.
    pub message: Option<String>,
    /// The raw response body.
    pub body: String,
}

impl ServiceError {
    /// Builds a service error from a status and the raw body.
    ///
    /// Bodies that are not a JSON error payload are kept verbatim in `body`.
    pub fn from_body(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let payload = serde_json::from_str::<ErrorPayload>(&body).ok();
        let (code, message) = match payload {
            Some(payload) => {
                let inner = payload.error.unwrap_or(payload.fields);
                (inner.code, inner.message.map(ErrorMessage::into_text))
            }
            None => (None, None),
        };
        Self {
            status,
            code,
            message,
            body,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The service returned HTTP {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

// Some endpoints nest the payload under `error`, others return it at the top level.
#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<ErrorFields>,
    #[serde(flatten)]
    fields: ErrorFields,
}

#[derive(Deserialize, Default)]
struct ErrorFields {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    Text(String),
    Localized { value: String },
}

impl ErrorMessage {
    fn into_text(self) -> String {
        match self {
            ErrorMessage::Text(text) => text,
            ErrorMessage::Localized { value } => value,
        }
    }
}
