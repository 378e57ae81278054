//! Configuration enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the rate limiter does when the counting store cannot be reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Deny the request; abuse prevention wins over availability
    #[default]
    FailClosed,
    /// Admit the request and log a warning
    FailOpen,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::FailClosed => write!(f, "fail_closed"),
            Self::FailOpen => write!(f, "fail_open"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    /// Accepts `fail_open`/`fail-open`/`open` and the closed equivalents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_open" | "open" => Ok(Self::FailOpen),
            "fail_closed" | "closed" => Ok(Self::FailClosed),
            other => Err(format!("unknown failure policy '{}', expected fail_closed or fail_open", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("fail-open".parse::<FailurePolicy>(), Ok(FailurePolicy::FailOpen));
        assert_eq!("OPEN".parse::<FailurePolicy>(), Ok(FailurePolicy::FailOpen));
        assert_eq!("fail_closed".parse::<FailurePolicy>(), Ok(FailurePolicy::FailClosed));
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = "fail_opne".parse::<FailurePolicy>().unwrap_err();
        assert!(err.contains("fail_opne"));
        assert!("".parse::<FailurePolicy>().is_err());
    }
}
