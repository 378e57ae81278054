//! Session and store configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Browser session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SessionConfig {
    /// Key used to sign session tokens
    #[validate(length(min = 16_u64))]
    #[serde(default = "default_secret")]
    pub secret: String,
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// How long saved form values live, in seconds
    #[validate(range(min = 60_u64))]
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Add the `Secure` attribute to the cookie
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl_secs(),
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == default_secret()
    }
}

fn default_secret() -> String {
    "dev-secret-key-change-this".to_string()
}

fn default_cookie_name() -> String {
    "letterdesk_session".to_string()
}

pub const fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Key-value store backing sessions and rate counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct StoreConfig {
    /// `postgres://…` selects PostgreSQL; `None` or `memory://` keeps state in process
    #[serde(default)]
    pub url: Option<String>,
    /// Interval of the expired-entry purge task, in seconds
    #[serde(default = "default_purge_interval_secs")]
    #[validate(range(min = 1_u64))]
    pub purge_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { url: None, purge_interval_secs: default_purge_interval_secs() }
    }
}

impl StoreConfig {
    pub fn is_postgres(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|u| u.starts_with("postgres://") || u.starts_with("postgresql://"))
    }
}

pub const fn default_purge_interval_secs() -> u64 {
    300
}
