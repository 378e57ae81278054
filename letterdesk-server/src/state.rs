//! Application State
//!
//! Everything handlers share, built once at startup from [`AppConfig`].

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use letterdesk_core::upstream::connect_llm;
use letterdesk_core::{
    FixedWindowLimiter, KvStore, LetterService, LlmClient, ReferenceLibrary, SessionManager,
};
use letterdesk_types::models::{AppConfig, RateLimitConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: AppConfig,
    pub store: Arc<dyn KvStore>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub service: LetterService,
    pub sessions: SessionManager,
}

impl AppState {
    /// Build state with the Anthropic client when an API key is configured.
    pub fn new(config: AppConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        let llm = connect_llm(&config.upstream)?;
        Ok(Self::with_components(config, store, llm))
    }

    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn KvStore>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let limiter = Arc::new(FixedWindowLimiter::new(store.clone(), config.rate_limit.clone()));
        let timeout = Duration::from_secs(config.upstream.timeout_secs);
        let references = ReferenceLibrary::from_config(&config.documents);
        if let Some(dir) = &config.documents.reference_dir {
            tracing::info!("Reference files served from {}", dir.display());
        }
        let service = LetterService::new(
            limiter.clone(),
            llm,
            references,
            config.documents.max_document_bytes,
            timeout,
        );
        let sessions = SessionManager::new(store.clone(), config.session.clone());
        Self { inner: Arc::new(AppStateInner { config, store, limiter, service, sessions }) }
    }

    pub fn service(&self) -> &LetterService {
        &self.inner.service
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    pub fn limiter(&self) -> &FixedWindowLimiter {
        &self.inner.limiter
    }

    pub fn rate_limit_config(&self) -> &RateLimitConfig {
        &self.inner.config.rate_limit
    }

    pub fn store_backend(&self) -> &'static str {
        self.inner.store.backend()
    }
}
