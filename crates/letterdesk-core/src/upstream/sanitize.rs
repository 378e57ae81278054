//! Upstream error sanitization: keeps API keys, request ids and raw upstream
//! bodies out of client responses.
//!
//! Pattern: log the raw error server-side, return only an opaque message
//! with the HTTP status code to the client.

use letterdesk_types::protocol::claude::ErrorResponse;

/// Opaque client-facing message for an upstream error response.
pub fn sanitize_upstream_error(status_code: u16, raw_text: &str) -> String {
    match classify_error(status_code, raw_text) {
        ErrorCategory::RateLimited => format!("Rate limited (HTTP {})", status_code),
        ErrorCategory::Overloaded => format!("Service overloaded (HTTP {})", status_code),
        ErrorCategory::Unauthorized => format!("Authentication failed (HTTP {})", status_code),
        ErrorCategory::Forbidden => format!("Permission denied (HTTP {})", status_code),
        ErrorCategory::ModelNotFound => format!("Model not available (HTTP {})", status_code),
        ErrorCategory::PromptTooLong => format!("Prompt too long (HTTP {})", status_code),
        ErrorCategory::InvalidRequest => format!("Request rejected (HTTP {})", status_code),
        ErrorCategory::ServerError => format!("Upstream server error (HTTP {})", status_code),
        ErrorCategory::Unknown => format!("Upstream error (HTTP {})", status_code),
    }
}

enum ErrorCategory {
    RateLimited,
    Overloaded,
    Unauthorized,
    Forbidden,
    ModelNotFound,
    PromptTooLong,
    InvalidRequest,
    ServerError,
    Unknown,
}

fn classify_error(status_code: u16, raw_text: &str) -> ErrorCategory {
    let error_type = serde_json::from_str::<ErrorResponse>(raw_text)
        .map(|e| e.error.error_type)
        .unwrap_or_default();

    match status_code {
        429 => ErrorCategory::RateLimited,
        529 => ErrorCategory::Overloaded,
        401 => ErrorCategory::Unauthorized,
        403 => ErrorCategory::Forbidden,
        404 => ErrorCategory::ModelNotFound,
        413 => ErrorCategory::PromptTooLong,
        400 => {
            if raw_text.contains("prompt is too long")
                || raw_text.contains("exceeds the maximum")
                || raw_text.contains("too many tokens")
            {
                ErrorCategory::PromptTooLong
            } else if error_type == "invalid_request_error" {
                ErrorCategory::InvalidRequest
            } else {
                ErrorCategory::Unknown
            }
        },
        500..=599 => {
            if error_type == "overloaded_error" {
                ErrorCategory::Overloaded
            } else {
                ErrorCategory::ServerError
            }
        },
        _ => ErrorCategory::Unknown,
    }
}

/// Transport errors carry URLs and socket addresses; reduce them to a kind.
pub fn sanitize_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Upstream request timed out".to_string()
    } else if err.is_connect() {
        "Could not connect to upstream".to_string()
    } else if err.is_body() || err.is_decode() {
        "Upstream response was interrupted".to_string()
    } else {
        "Upstream request failed".to_string()
    }
}
