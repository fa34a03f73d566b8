use std::path::PathBuf;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

const MAX_MESSAGE_LEN: usize = 200;

/// Failures surfaced by [`ApiClient`](super::ApiClient). Nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A protected endpoint was called without a session credential.
    #[error("not signed in")]
    MissingCredential,
    /// Connection, TLS or body transfer failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{message} ({status})")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Server-provided message, or the status reason.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    /// An attachment could not be read from disk.
    #[error("failed to read attachment {}: {source}", .path.display())]
    Attachment {
        /// Path given in the form.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The server rejected the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
            || matches!(self, ApiError::MissingCredential)
    }

    /// Server-provided message for status errors.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            message: extract_message(body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);
    }
    if trimmed.starts_with('<') {
        // HTML error pages carry nothing useful for a status line.
        return None;
    }
    Some(trimmed.chars().take(MAX_MESSAGE_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_json_message() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"The name field is required."}"#,
        );
        assert_eq!(err.server_message(), Some("The name field is required."));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn falls_back_to_reason_phrase() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "<html>nope</html>");
        assert_eq!(err.server_message(), Some("Unauthorized"));
        assert!(err.is_unauthorized());
    }
}
