//! Default conversion of HTTP responses into structured data.

use log::error;
use reqwest::Response;
use serde_json::Value;

use super::error::ExternalRequestError;

/// Converts a completed response into decoded JSON.
///
/// Error statuses (4xx/5xx) become [`ExternalRequestError::Json`] when the
/// body is valid JSON, [`ExternalRequestError::Text`] otherwise. A success
/// status with an undecodable body is logged at error level before being
/// surfaced as text; unexpected malformed success responses indicate server
/// misbehavior, while non-JSON error bodies are routine and stay quiet.
pub async fn json_response(response: Response) -> Result<Value, ExternalRequestError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(ExternalRequestError::transport)?;

    if status.is_client_error() || status.is_server_error() {
        return Err(match serde_json::from_slice::<Value>(&body) {
            Ok(value) => ExternalRequestError::Json(value),
            Err(_) => ExternalRequestError::Text(String::from_utf8_lossy(&body).into_owned()),
        });
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(_) => {
            let text = String::from_utf8_lossy(&body).into_owned();
            error!("Response body {}", text);
            Err(ExternalRequestError::Text(text))
        }
    }
}
