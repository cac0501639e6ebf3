//! Async HTTP request helper with normalized error handling.

mod auth;
mod client;
mod error;
mod response;

pub use auth::{AuthStrategy, BasicAuth, BearerAuth};
pub use client::{ClientConfig, HttpClient, HttpMethod, RequestOptions};
pub use error::ExternalRequestError;
pub use response::json_response;
