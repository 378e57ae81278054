use async_trait::async_trait;

use letterdesk_types::models::UpstreamConfig;
use letterdesk_types::protocol::claude::{MessagesRequest, MessagesResponse};

use super::sanitize::{sanitize_transport_error, sanitize_upstream_error};
use super::{LlmClient, UpstreamFailure};

const MESSAGES_PATH: &str = "/v1/messages";

/// Client for `POST /v1/messages`.
pub struct AnthropicClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    api_version: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

impl AnthropicClient {
    pub fn new(http: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            url: build_url(&config.base_url),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub(crate) fn build_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), MESSAGES_PATH)
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure> {
        let body = MessagesRequest::single_turn(&self.model, self.max_tokens, prompt);

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let failure = if e.is_timeout() {
                    UpstreamFailure::Timeout(self.timeout_secs)
                } else {
                    UpstreamFailure::Transport(sanitize_transport_error(&e))
                };
                tracing::warn!("Upstream request failed: {}", e.without_url());
                failure
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            let failure = UpstreamFailure::Transport(sanitize_transport_error(&e));
            tracing::warn!("Upstream body read failed: {}", e.without_url());
            failure
        })?;

        if !status.is_success() {
            tracing::warn!("Upstream returned HTTP {}: {}", status.as_u16(), text);
            return Err(UpstreamFailure::Api {
                status: status.as_u16(),
                message: sanitize_upstream_error(status.as_u16(), &text),
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Upstream returned unparseable body: {}", e);
            UpstreamFailure::Malformed("response body is not a messages response".to_string())
        })?;

        let letter = parsed.text();
        if letter.trim().is_empty() {
            return Err(UpstreamFailure::Malformed("response contained no text".to_string()));
        }

        tracing::debug!(
            "Upstream completion {} ({} chars, stop_reason={:?})",
            parsed.id,
            letter.len(),
            parsed.stop_reason
        );
        Ok(letter)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
