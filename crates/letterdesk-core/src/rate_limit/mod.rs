//! Fixed-window admission control.
//!
//! Each request increments the counter for
//! `(endpoint, identity, floor(now / window))` in the [`KvStore`]. The
//! increment is the store's atomic primitive, so the limiter itself holds no
//! mutable state. Stale windows are never cleaned here; their keys stop being
//! used and the store's expiry reclaims them.

mod clock;
mod window;


pub use clock::{Clock, ManualClock, SystemClock};

use std::sync::Arc;
use std::time::Duration;

use letterdesk_types::models::{FailurePolicy, RateLimitConfig, RateLimitRule, RateWindow};

use crate::identity::ClientIdentity;
use crate::store::KvStore;

/// Endpoint classes with independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    /// Letter generation and summaries
    Generate,
    /// Form pages and lightweight API reads
    Page,
}

impl EndpointClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Page => "page",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    LimitExceeded,
    StoreUnavailable,
}

/// Limiter verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allowed {
        /// `None` when admitted by the fail-open policy without counting.
        window: Option<RateWindow>,
        remaining: u32,
    },
    Denied {
        retry_after: Duration,
        reason: DenialReason,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Denied { retry_after, .. } => Some(*retry_after),
            Self::Allowed { .. } => None,
        }
    }
}

pub struct FixedWindowLimiter {
    store: Arc<dyn KvStore>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: RateLimitConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KvStore>, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, config, clock }
    }

    pub fn rule(&self, endpoint: EndpointClass) -> RateLimitRule {
        match endpoint {
            EndpointClass::Generate => self.config.generate,
            EndpointClass::Page => self.config.page,
        }
    }

    /// Count this request and decide whether it may proceed.
    pub async fn admit(&self, identity: &ClientIdentity, endpoint: EndpointClass) -> Admission {
        let rule = self.rule(endpoint);
        let window_ms = rule.window_ms().max(1);
        let now_ms = self.clock.now_ms();
        let index = window::window_index(now_ms, window_ms);
        let identity_key = identity.as_key();
        let key = window::counter_key(endpoint.as_str(), &identity_key, index);

        match self.store.incr_with_expiry(&key, Duration::from_millis(window_ms)).await {
            Ok(count) if count > u64::from(rule.max_requests) => {
                let retry_after = window::retry_after(now_ms, window_ms);
                tracing::info!(
                    "Rate limit hit: {} on {} ({} > {}), retry in {}s",
                    identity_key,
                    endpoint.as_str(),
                    count,
                    rule.max_requests,
                    retry_after.as_secs()
                );
                Admission::Denied { retry_after, reason: DenialReason::LimitExceeded }
            },
            Ok(count) => Admission::Allowed {
                remaining: rule.max_requests.saturating_sub(count as u32),
                window: Some(RateWindow {
                    identity: identity_key,
                    window_start: window::window_start(index, window_ms),
                    count,
                }),
            },
            Err(e) => match self.config.failure_policy {
                FailurePolicy::FailOpen => {
                    tracing::warn!(
                        "Rate limit store error on {} ({}), admitting per fail-open policy",
                        endpoint.as_str(),
                        e
                    );
                    Admission::Allowed { window: None, remaining: rule.max_requests }
                },
                FailurePolicy::FailClosed => {
                    tracing::error!(
                        "Rate limit store error on {} ({}), denying per fail-closed policy",
                        endpoint.as_str(),
                        e
                    );
                    Admission::Denied {
                        retry_after: window::retry_after(now_ms, window_ms),
                        reason: DenialReason::StoreUnavailable,
                    }
                },
            },
        }
    }
}
