//! Letter generation pipeline.
//!
//! `RECEIVED → RATE_CHECKED → VALIDATED → EXTRACTED → PROMPT_BUILT →
//! API_CALLED → RESPONDED`, with a short-circuit to a [`LetterError`] at any
//! step. The first four steps happen in [`LetterService::accept`]; a caller
//! that persists anything about a submission does so only with an
//! [`Accepted`] in hand. Nothing below this layer leaks into a response
//! without passing through [`map_upstream_failure`].

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use letterdesk_types::{
    GeneratedLetter, LetterError, LetterFields, LetterKind, LetterRequest, LetterResult,
};

use crate::documents::{self, ReferenceLibrary};
use crate::identity::ClientIdentity;
use crate::prompt::{self, Attachments, PromptBuilder};
use crate::rate_limit::{EndpointClass, FixedWindowLimiter};
use crate::upstream::{LlmClient, UpstreamFailure};

/// A submission that passed admission, validation and text extraction.
#[derive(Debug, Clone)]
pub struct Accepted {
    kind: LetterKind,
    fields: LetterFields,
    attachments: Attachments,
}

impl Accepted {
    pub fn kind(&self) -> LetterKind {
        self.kind
    }

    pub fn fields(&self) -> &LetterFields {
        &self.fields
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }
}

pub struct LetterService {
    limiter: Arc<FixedWindowLimiter>,
    llm: Option<Arc<dyn LlmClient>>,
    references: ReferenceLibrary,
    max_document_bytes: usize,
    timeout: Duration,
}

impl LetterService {
    /// `llm` is `None` when no API key is configured; generation then
    /// answers [`LetterError::NotConfigured`] while summaries keep working.
    pub fn new(
        limiter: Arc<FixedWindowLimiter>,
        llm: Option<Arc<dyn LlmClient>>,
        references: ReferenceLibrary,
        max_document_bytes: usize,
        timeout: Duration,
    ) -> Self {
        Self { limiter, llm, references, max_document_bytes, timeout }
    }

    pub fn llm_available(&self) -> bool {
        self.llm.is_some()
    }

    pub fn references(&self) -> &ReferenceLibrary {
        &self.references
    }

    /// Admit, validate and extract a submission.
    ///
    /// Admission comes first: a denied request never has its fields checked
    /// or its files parsed.
    pub async fn accept(
        &self,
        request: LetterRequest,
        identity: &ClientIdentity,
    ) -> Result<Accepted, LetterError> {
        let LetterRequest { kind, fields, uploads } = request;

        let admission = self.limiter.admit(identity, EndpointClass::Generate).await;
        if let Some(retry_after) = admission.retry_after() {
            return Err(LetterError::RateLimited { retry_after_secs: retry_after.as_secs().max(1) });
        }
        tracing::debug!("[{}] rate checked for {}", kind, identity);

        prompt::validate(kind, &fields).map_err(|e| {
            tracing::info!("[{}] rejected submission: {}", kind, e);
            LetterError::from(e)
        })?;

        let uploads = documents::extract_uploads(uploads, self.max_document_bytes).await?;
        let references = self.references.load(kind).await;
        tracing::debug!(
            "[{}] accepted with {} uploads and {} reference files",
            kind,
            uploads.len(),
            references.len()
        );

        Ok(Accepted { kind, fields, attachments: Attachments { references, uploads } })
    }

    pub async fn generate(&self, accepted: &Accepted) -> LetterResult {
        let kind = accepted.kind;
        let prompt = PromptBuilder::build(kind, &accepted.fields, &accepted.attachments)?;
        tracing::debug!("[{}] prompt built ({} chars)", kind, prompt.as_str().len());

        let Some(llm) = self.llm.as_ref() else {
            tracing::warn!("[{}] generation requested but no API key is configured", kind);
            return Err(LetterError::NotConfigured);
        };

        let started = std::time::Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, llm.complete(prompt.as_str())).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamFailure::Timeout(self.timeout.as_secs())),
        };
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            Ok(text) => {
                tracing::info!(
                    "[{}] letter generated by {} in {}ms ({} chars)",
                    kind,
                    llm.model(),
                    elapsed_ms,
                    text.len()
                );
                Ok(GeneratedLetter { kind, text, model: Some(llm.model().to_string()) })
            },
            Err(failure) => {
                tracing::warn!("[{}] upstream call failed after {}ms: {}", kind, elapsed_ms, failure);
                Err(map_upstream_failure(failure))
            },
        }
    }

    /// Markdown overview of an accepted submission, assembled locally.
    pub fn summarize(&self, accepted: &Accepted) -> LetterResult {
        let text =
            PromptBuilder::summarize(accepted.kind, &accepted.fields, &accepted.attachments)?;
        tracing::debug!("[{}] summary built ({} chars)", accepted.kind, text.len());
        Ok(GeneratedLetter { kind: accepted.kind, text, model: None })
    }
}

pub(crate) fn map_upstream_failure(failure: UpstreamFailure) -> LetterError {
    match failure {
        UpstreamFailure::Timeout(secs) => LetterError::UpstreamUnavailable {
            message: format!("Language model did not respond within {}s", secs),
            timed_out: true,
        },
        UpstreamFailure::Transport(message) => {
            LetterError::UpstreamUnavailable { message, timed_out: false }
        },
        UpstreamFailure::Api { status, message } => LetterError::UpstreamError { code: status, message },
        UpstreamFailure::Malformed(message) => LetterError::UpstreamError { code: 502, message },
    }
}
