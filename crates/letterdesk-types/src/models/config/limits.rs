//! Rate limit configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::FailurePolicy;
use crate::models::RateLimitRule;

/// Per endpoint-class admission rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RateLimitConfig {
    /// Letter generation and summary endpoints
    #[serde(default = "default_generate_rule")]
    #[validate(nested)]
    pub generate: RateLimitRule,
    /// Page views and other API calls
    #[serde(default = "default_page_rule")]
    #[validate(nested)]
    pub page: RateLimitRule,
    /// Behavior when the counting store is unreachable
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Use the first `X-Forwarded-For` / `X-Real-IP` hop as client identity
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            generate: default_generate_rule(),
            page: default_page_rule(),
            failure_policy: FailurePolicy::default(),
            trust_forwarded_headers: false,
        }
    }
}

pub const fn default_generate_rule() -> RateLimitRule {
    RateLimitRule::new(5, 60)
}

pub const fn default_page_rule() -> RateLimitRule {
    RateLimitRule::new(100, 3600)
}
