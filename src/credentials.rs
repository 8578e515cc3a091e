use std::fmt;

use reqwest::RequestBuilder;

/// Credentials for the client.
///
/// The token is sent as `Authorization: Bearer <token>` on every page request, including the
/// ones that follow a next link.
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
}

impl Credentials {
    /// Creates a new `Credentials` struct from an OAuth access token.
    pub fn new(access_token: &str) -> Credentials {
        Credentials {
            access_token: access_token.to_string(),
        }
    }

    // An invalid token surfaces as an error when the request is built.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .finish()
    }
}
