//! Application-level configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::documents::DocumentsConfig;
use super::limits::RateLimitConfig;
use super::session::{SessionConfig, StoreConfig};
use super::upstream::UpstreamConfig;
use crate::error::ConfigError;

/// Full application configuration.
///
/// Every recognized option lives here; components receive the part they need
/// through their constructors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    #[validate(nested)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    #[validate(nested)]
    pub session: SessionConfig,
    #[serde(default)]
    #[validate(nested)]
    pub store: StoreConfig,
    #[serde(default)]
    #[validate(nested)]
    pub documents: DocumentsConfig,
}

impl AppConfig {
    /// Parse a JSON document; missing sections fall back to defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::from_json_error(&e))
    }

    /// Run all field validators.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate().map_err(|e| ConfigError::from_validation_errors(&e))?;
        Ok(self)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Max accepted request body, uploads included
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn get_socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub const fn default_port() -> u16 {
    5000
}

pub const fn default_body_limit_bytes() -> usize {
    32 * 1024 * 1024
}
