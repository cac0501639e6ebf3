//! Error type for outbound HTTP calls.

use serde_json::Value;

/// Failure of an outbound call to an external service.
///
/// A single kind covers every failure path; callers tell causes apart by the
/// payload shape, not by a typed hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalRequestError {
    /// The failing response carried a structured (JSON) error body.
    Json(Value),
    /// Raw text: a transport failure description, an error body that was not
    /// valid JSON, or an undecodable body on an otherwise-successful status.
    Text(String),
}

impl ExternalRequestError {
    /// Wraps a transport-level failure (connect, DNS, TLS, timeout) that
    /// occurred before any response was obtained.
    pub fn transport(error: reqwest::Error) -> Self {
        ExternalRequestError::Text(error.to_string())
    }

    /// Returns the text payload, if this error carries one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExternalRequestError::Text(text) => Some(text),
            ExternalRequestError::Json(_) => None,
        }
    }

    /// Returns the structured payload, if this error carries one.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ExternalRequestError::Json(value) => Some(value),
            ExternalRequestError::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ExternalRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExternalRequestError::Json(value) => {
                write!(f, "External request failed: {}", value)
            }
            ExternalRequestError::Text(text) => {
                write!(f, "External request failed: {}", text)
            }
        }
    }
}

impl std::error::Error for ExternalRequestError {}
