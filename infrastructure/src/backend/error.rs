//! Mapping of HTTP failures to [`BackendError`]

use ragchat_application::BackendError;
use serde_json::Value;

/// JSON fields that carry a human-readable error, in lookup order
const MESSAGE_FIELDS: [&str; 3] = ["detail", "error", "message"];

/// Map a non-2xx response to [`BackendError::Status`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> BackendError {
    BackendError::Status {
        status: status.as_u16(),
        message: error_message(status, body),
    }
}

/// Map a [`reqwest::Error`] raised before or while sending a request.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::InvalidResponse(err.to_string())
    } else {
        BackendError::ConnectionError(err.to_string())
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for field in MESSAGE_FIELDS {
            match map.get(field) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Null) | Some(Value::String(_)) | None => {}
                // FastAPI validation errors put a list under `detail`
                Some(other) => return other.to_string(),
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
