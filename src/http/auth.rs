//! Pluggable authentication for outbound requests.

use log::warn;
use reqwest::RequestBuilder;
use reqwest::header::HeaderValue;

/// Augments an outbound request with credentials.
///
/// A strategy is attached to a client at construction and applied to every
/// request that client issues.
pub trait AuthStrategy: Send + Sync {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Bearer-token authentication via the `Authorization` header.
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl AuthStrategy for BearerAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match HeaderValue::from_str(&format!("Bearer {}", self.token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.header(reqwest::header::AUTHORIZATION, value)
            }
            // A token with invalid header characters cannot be sent; the
            // request goes out unauthenticated and the server rejects it.
            Err(_) => {
                warn!("Bearer token contains invalid header characters, sending unauthenticated");
                request
            }
        }
    }
}

/// HTTP basic authentication.
pub struct BasicAuth {
    username: String,
    password: Option<String>,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl AuthStrategy for BasicAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, self.password.as_deref())
    }
}
