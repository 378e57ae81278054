//! Typed error definitions for Letterdesk.
//!
//! - **Serializable** for API responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for HTTP status mapping via enum variants

mod config;
mod letter;

pub use config::ConfigError;
pub use letter::LetterError;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = LetterError::InvalidInput {
            field: "name".to_string(),
            message: "missing required field".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("invalid_input"));
        assert!(json.contains("name"));

        let deserialized: LetterError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = LetterError::RateLimited { retry_after_secs: 42 };

        let msg = format!("{}", err);
        assert!(msg.contains("42"));
    }
}
