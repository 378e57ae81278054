//! Letter generation errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal error states of a letter generation call.
///
/// Every failure from the store, the prompt builder or the upstream API is
/// converted into one of these before it reaches the HTTP layer.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "error_kind", rename_all = "snake_case")]
pub enum LetterError {
    /// Submitted fields failed validation (client-fixable)
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Client exceeded its admission window
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Upstream unreachable or timed out (transient)
    #[error("Language model service unavailable: {message}")]
    UpstreamUnavailable { message: String, timed_out: bool },

    /// Upstream rejected the request (auth, content, quota)
    #[error("Language model service rejected the request: {message}")]
    UpstreamError { code: u16, message: String },

    /// No API key configured for the upstream
    #[error("Language model service is not configured")]
    NotConfigured,

    /// Unexpected failure; details are logged, not returned
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LetterError {
    /// Stable machine-readable kind, matches the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::RateLimited { .. } => "rate_limited",
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::UpstreamError { .. } => "upstream_error",
            Self::NotConfigured => "not_configured",
            Self::Internal { .. } => "internal",
        }
    }

    /// Get HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::RateLimited { .. } => 429,
            Self::UpstreamUnavailable { timed_out: true, .. } => 504,
            Self::UpstreamUnavailable { .. } | Self::UpstreamError { .. } => 502,
            Self::NotConfigured => 503,
            Self::Internal { .. } => 500,
        }
    }

    /// Message safe to show to the end user.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LetterError::RateLimited { retry_after_secs: 5 }.http_status_code(), 429);
        assert_eq!(
            LetterError::InvalidInput { field: "name".to_string(), message: "missing".to_string() }
                .http_status_code(),
            400
        );
        assert_eq!(
            LetterError::UpstreamUnavailable { message: "timeout".to_string(), timed_out: true }
                .http_status_code(),
            504
        );
        assert_eq!(
            LetterError::UpstreamUnavailable { message: "refused".to_string(), timed_out: false }
                .http_status_code(),
            502
        );
        assert_eq!(
            LetterError::UpstreamError { code: 401, message: "auth".to_string() }
                .http_status_code(),
            502
        );
        assert_eq!(LetterError::NotConfigured.http_status_code(), 503);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = LetterError::Internal { message: "pool timed out at db-1:5432".to_string() };
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_retry_after_only_for_rate_limit() {
        assert_eq!(LetterError::RateLimited { retry_after_secs: 7 }.retry_after_secs(), Some(7));
        assert_eq!(LetterError::NotConfigured.retry_after_secs(), None);
    }
}
