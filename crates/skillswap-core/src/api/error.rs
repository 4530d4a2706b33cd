use std::error::Error as _;

use serde::Deserialize;
use thiserror::Error;

/// Message used when a 5xx (or status 0) response has no JSON body.
pub const SERVER_UNAVAILABLE_MESSAGE: &str =
    "Backend server is not available. Please check if the server is running on the configured URL.";

/// Message used when a 404 response has no JSON body.
pub const NOT_FOUND_MESSAGE: &str =
    "API endpoint not found. Please check the backend route configuration.";

/// Message used when a 401 response has no JSON body.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please check your credentials.";

/// Message used when a success response cannot be decoded.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid response format from server";

/// Message used when a login response lacks a token or user record.
pub const MISSING_LOGIN_DATA_MESSAGE: &str =
    "Invalid response from server: missing token or user data";

/// Transport error text produced when a browser-style fetch is rejected
/// by cross-origin policy.
const CORS_SIGNATURES: &[&str] = &["failed to fetch", "cors", "cross-origin"];

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Diagnostic context for a non-success HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub message: String,
    pub status: u16,
    pub url: String,
}

impl std::fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every failure a backend call can produce. `Display` is the user-facing
/// message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    AuthFailure(HttpFailure),

    #[error("{0}")]
    NotFound(HttpFailure),

    #[error("{0}")]
    ServerUnavailable(HttpFailure),

    #[error("{0}")]
    Http(HttpFailure),

    #[error("CORS error: Cannot connect to backend server at {backend}. This may be due to CORS policy restrictions. The backend may need to allow this domain: {origin}")]
    Cors { backend: String, origin: String },

    #[error("Cannot connect to backend server at {backend}. Please check if the server is running and the URL is correct.")]
    Connection { backend: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Error bodies the backend sends; either field may carry the message.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    fn text(&self) -> Option<String> {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                _ => None,
            })
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    /// Classify a non-success response.
    ///
    /// A JSON body supplies the message through `message` or `error`, falling
    /// back to the status line. A body that is not JSON, or is JSON `null`,
    /// gets the default message for its status category. The variant always
    /// follows the status.
    pub fn from_status(status: u16, reason: &str, url: &str, body: &str) -> Self {
        let status_line = format!("HTTP {}: {}", status, reason);

        let parsed = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .filter(|value| !value.is_null());
        let message = match parsed {
            Some(value) => serde_json::from_value::<ErrorBody>(value)
                .ok()
                .and_then(|b| b.text())
                .unwrap_or(status_line),
            None => match status {
                0 | 500..=u16::MAX => SERVER_UNAVAILABLE_MESSAGE.to_string(),
                404 => NOT_FOUND_MESSAGE.to_string(),
                401 => AUTH_FAILED_MESSAGE.to_string(),
                _ => status_line,
            },
        };

        let failure = HttpFailure {
            message,
            status,
            url: url.to_string(),
        };

        match status {
            401 => ApiError::AuthFailure(failure),
            404 => ApiError::NotFound(failure),
            0 | 500..=u16::MAX => ApiError::ServerUnavailable(failure),
            _ => ApiError::Http(failure),
        }
    }

    /// Classify a failure where no response was received.
    ///
    /// `signature` is the text of the transport error chain.
    pub fn from_transport(signature: &str, backend: &str, origin: &str) -> Self {
        let lower = signature.to_lowercase();
        if CORS_SIGNATURES.iter().any(|s| lower.contains(s)) {
            ApiError::Cors {
                backend: backend.to_string(),
                origin: origin.to_string(),
            }
        } else {
            ApiError::Connection {
                backend: backend.to_string(),
            }
        }
    }

    /// Flatten a reqwest error and its sources into one string for
    /// transport classification.
    pub(crate) fn transport_signature(err: &reqwest::Error) -> String {
        let mut parts = vec![err.to_string()];
        let mut source = err.source();
        while let Some(inner) = source {
            parts.push(inner.to_string());
            source = inner.source();
        }
        parts.join(": ")
    }

    /// HTTP status for response-derived errors.
    pub fn status(&self) -> Option<u16> {
        self.http_failure().map(|f| f.status)
    }

    /// URL for response-derived errors.
    pub fn url(&self) -> Option<&str> {
        self.http_failure().map(|f| f.url.as_str())
    }

    fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            ApiError::AuthFailure(f)
            | ApiError::NotFound(f)
            | ApiError::ServerUnavailable(f)
            | ApiError::Http(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://backend.test/api/thing";

    #[test]
    fn test_json_message_field_wins() {
        let err = ApiError::from_status(400, "Bad Request", URL, r#"{"message":"Email taken"}"#);
        assert!(matches!(err, ApiError::Http(_)));
        assert_eq!(err.to_string(), "Email taken");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.url(), Some(URL));
    }

    #[test]
    fn test_json_error_field_used_when_message_missing() {
        let err = ApiError::from_status(401, "Unauthorized", URL, r#"{"error":"Bad password"}"#);
        assert!(matches!(err, ApiError::AuthFailure(_)));
        assert_eq!(err.to_string(), "Bad password");
    }

    #[test]
    fn test_json_without_message_uses_status_line() {
        let err = ApiError::from_status(404, "Not Found", URL, r#"{"ok":false}"#);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_non_json_defaults_by_category() {
        let err = ApiError::from_status(404, "Not Found", URL, "<html>nope</html>");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), NOT_FOUND_MESSAGE);

        let err = ApiError::from_status(401, "Unauthorized", URL, "");
        assert!(matches!(err, ApiError::AuthFailure(_)));
        assert_eq!(err.to_string(), AUTH_FAILED_MESSAGE);

        let err = ApiError::from_status(503, "Service Unavailable", URL, "down");
        assert!(matches!(err, ApiError::ServerUnavailable(_)));
        assert_eq!(err.to_string(), SERVER_UNAVAILABLE_MESSAGE);

        let err = ApiError::from_status(0, "", URL, "");
        assert!(matches!(err, ApiError::ServerUnavailable(_)));

        let err = ApiError::from_status(418, "I'm a teapot", URL, "short and stout");
        assert!(matches!(err, ApiError::Http(_)));
        assert_eq!(err.to_string(), "HTTP 418: I'm a teapot");
    }

    #[test]
    fn test_server_error_keeps_json_message() {
        let err =
            ApiError::from_status(500, "Internal Server Error", URL, r#"{"message":"db down"}"#);
        assert!(matches!(err, ApiError::ServerUnavailable(_)));
        assert_eq!(err.to_string(), "db down");
    }

    #[test]
    fn test_null_body_uses_category_default() {
        let err = ApiError::from_status(404, "Not Found", URL, "null");
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), NOT_FOUND_MESSAGE);

        let err = ApiError::from_status(502, "Bad Gateway", URL, " null ");
        assert_eq!(err.to_string(), SERVER_UNAVAILABLE_MESSAGE);

        // Other non-object JSON has no message field.
        let err = ApiError::from_status(400, "Bad Request", URL, "[1,2]");
        assert_eq!(err.to_string(), "HTTP 400: Bad Request");
    }

    #[test]
    fn test_transport_cors_names_both_origins() {
        let err = ApiError::from_transport(
            "TypeError: Failed to fetch",
            "https://api.example.com",
            "https://app.example.com",
        );
        assert!(matches!(err, ApiError::Cors { .. }));
        let message = err.to_string();
        assert!(message.contains("https://api.example.com"));
        assert!(message.contains("https://app.example.com"));
    }

    #[test]
    fn test_transport_other_is_connection_error() {
        let err = ApiError::from_transport(
            "error sending request: tcp connect error: Connection refused (os error 111)",
            "https://api.example.com",
            "https://app.example.com",
        );
        assert!(matches!(err, ApiError::Connection { .. }));
        let message = err.to_string();
        assert!(message.contains("https://api.example.com"));
        assert!(!message.contains("https://app.example.com"));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
