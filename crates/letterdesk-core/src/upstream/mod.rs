//! Upstream language model client.

mod anthropic;
mod client_builder;
pub mod sanitize;

pub use anthropic::AnthropicClient;
pub use client_builder::build_http_client;

use async_trait::async_trait;
use std::sync::Arc;

use letterdesk_types::models::UpstreamConfig;

use crate::error::AppResult;

/// Failure of one upstream call, before mapping to the public error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    /// Connection refused, DNS, TLS, reset mid-body
    #[error("transport error: {0}")]
    Transport(String),
    /// No response within the configured bound
    #[error("timed out after {0}s")]
    Timeout(u64),
    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    /// 2xx with a body we could not use
    #[error("unreadable response: {0}")]
    Malformed(String),
}

/// A single synchronous completion call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure>;

    /// Model identifier reported alongside generated text.
    fn model(&self) -> &str;
}

/// Anthropic client for `config`, or `None` when no API key is set.
pub fn connect_llm(config: &UpstreamConfig) -> AppResult<Option<Arc<dyn LlmClient>>> {
    if !config.is_configured() {
        tracing::warn!("No upstream API key configured; letter generation is disabled");
        return Ok(None);
    }
    let http = build_http_client(config.timeout_secs)?;
    let client = AnthropicClient::new(http, config);
    tracing::info!("Upstream model {} via {}", config.model, client.url());
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_llm_requires_key() {
        assert!(connect_llm(&UpstreamConfig::default()).unwrap().is_none());

        let config = UpstreamConfig { api_key: "sk-ant-test".to_string(), ..UpstreamConfig::default() };
        let client = connect_llm(&config).unwrap().unwrap();
        assert_eq!(client.model(), config.model);
    }
}
