//! Test helpers for letterdesk-server unit tests.

use axum::async_trait;
use axum::http::{header, HeaderValue};
use axum_test::{TestResponse, TestServer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use letterdesk_core::{LlmClient, MemoryStore, UpstreamFailure};
use letterdesk_types::models::AppConfig;

use crate::router::build_router;
use crate::state::AppState;

/// Upstream double that counts calls, keeps the last prompt and returns a
/// fixed outcome.
pub struct StubLlm {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    outcome: Result<String, UpstreamFailure>,
}

impl StubLlm {
    fn with(outcome: Result<String, UpstreamFailure>) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), last_prompt: Mutex::new(None), outcome })
    }

    pub fn ok(text: &str) -> Arc<Self> {
        Self::with(Ok(text.to_string()))
    }

    pub fn failing(failure: UpstreamFailure) -> Arc<Self> {
        Self::with(Err(failure))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().expect("stub prompt lock").clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().expect("stub prompt lock") = Some(prompt.to_string());
        self.outcome.clone()
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// `AppState` over an in-memory store.
pub fn test_app_state(config: AppConfig, llm: Option<Arc<StubLlm>>) -> AppState {
    AppState::with_components(
        config,
        Arc::new(MemoryStore::new()),
        llm.map(|l| l as Arc<dyn LlmClient>),
    )
}

/// Full router behind the mock transport; requests carry no peer address.
pub fn test_server(config: AppConfig, llm: Option<Arc<StubLlm>>) -> TestServer {
    TestServer::new(build_router(test_app_state(config, llm))).expect("failed to start test server")
}

/// `name=value` pair of the session cookie set by `response`, ready to send back.
pub fn session_cookie(response: &TestResponse) -> HeaderValue {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("response did not set a session cookie");
    let pair = set_cookie.split(';').next().unwrap_or_default();
    HeaderValue::from_str(pair).expect("cookie pair is a valid header value")
}
