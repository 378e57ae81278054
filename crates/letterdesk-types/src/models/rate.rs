//! Rate limiting models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Max requests per fixed window for one endpoint class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct RateLimitRule {
    /// Requests admitted per window
    #[validate(range(min = 1_u32))]
    pub max_requests: u32,
    /// Window length in seconds
    #[validate(range(min = 1_u64, max = 86_400_u64))]
    pub window_secs: u64,
}

impl RateLimitRule {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self { max_requests, window_secs }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_secs.saturating_mul(1000)
    }
}

/// Counter state of one identity in one window, as seen after an increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateWindow {
    pub identity: String,
    /// Window start, unix milliseconds
    pub window_start: u64,
    pub count: u64,
}
