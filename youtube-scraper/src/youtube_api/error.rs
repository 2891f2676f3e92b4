//! Typed error causes that callers may want to tell apart.
//!
//! Operations return [`eyre::Result`]; these types sit at the root of the error chain and can be
//! recovered with [`eyre::Report::downcast_ref`].

use jiff::Timestamp;
use reqwest::StatusCode;
use serde::Deserialize;

/// The YouTube API rejected a request.
///
/// Covers invalid keys, exhausted quota, unknown identifiers on endpoints that treat them as
/// errors (e.g. `commentThreads.list`), and malformed parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "YouTube API request failed with status {status} ({}): {message}",
    .reason.as_deref().unwrap_or("no reason given")
)]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Machine-readable reason from the error envelope, e.g. `quotaExceeded` or `keyInvalid`.
    pub reason: Option<String>,
    /// Human-readable message from the error envelope, or the raw body if there wasn't one.
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

impl ApiError {
    /// Builds an error from a non-success response, using Google's JSON error envelope when the
    /// body contains one.
    ///
    /// See: <https://developers.google.com/youtube/v3/docs/errors>
    pub fn from_response_body(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope { error }) => Self {
                status,
                reason: error.errors.into_iter().find_map(|e| e.reason),
                message: error.message,
            },
            Err(_) => Self {
                status,
                reason: None,
                message: match body.trim() {
                    "" => "unknown error".to_string(),
                    body => body.to_string(),
                },
            },
        }
    }
}

/// Search criteria that can never produce a valid request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCriteria {
    #[error("requested result count must be greater than zero")]
    ZeroResults,
    #[error("time window ends ({before}) before it starts ({after})")]
    InvertedWindow { after: Timestamp, before: Timestamp },
    #[error("search scope must include at least one of video, channel, or playlist")]
    EmptyScope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_google_error_envelope() {
        let body = r#"{
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [
                    {
                        "message": "The request cannot be completed because you have exceeded your quota.",
                        "domain": "youtube.quota",
                        "reason": "quotaExceeded"
                    }
                ]
            }
        }"#;
        let err = ApiError::from_response_body(StatusCode::FORBIDDEN, body);
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.reason.as_deref(), Some("quotaExceeded"));
        assert!(err.message.starts_with("The request cannot be completed"));
        assert!(err.to_string().contains("quotaExceeded"));
    }

    #[test]
    fn falls_back_to_raw_body() {
        let err = ApiError::from_response_body(StatusCode::BAD_GATEWAY, "upstream hiccup\n");
        assert_eq!(err.reason, None);
        assert_eq!(err.message, "upstream hiccup");

        let err = ApiError::from_response_body(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.message, "unknown error");
    }
}
