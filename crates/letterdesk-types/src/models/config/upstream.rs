//! Upstream language model configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Anthropic Messages API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UpstreamConfig {
    /// Base URL without the `/v1/messages` suffix
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key; empty disables generation
    #[serde(default)]
    pub api_key: String,
    /// Model identifier sent with every request
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_model")]
    pub model: String,
    /// Max tokens the model may produce
    #[validate(range(min = 1_u32, max = 64_000_u32))]
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Bound on one upstream call, in seconds
    #[validate(range(min = 1_u64, max = 600_u64))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Value of the `anthropic-version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_version: default_api_version(),
        }
    }
}

impl UpstreamConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

pub const fn default_max_tokens() -> u32 {
    4000
}

pub const fn default_timeout_secs() -> u64 {
    60
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}
