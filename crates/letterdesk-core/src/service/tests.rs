use super::*;
use crate::rate_limit::ManualClock;
use crate::store::MemoryStore;
use async_trait::async_trait;
use letterdesk_types::models::RateLimitConfig;
use letterdesk_types::Upload;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Counts calls, keeps the last prompt and answers with a fixed outcome
/// after an optional delay.
struct StubLlm {
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    delay: Duration,
    outcome: Result<String, UpstreamFailure>,
}

impl StubLlm {
    fn with(delay: Duration, outcome: Result<String, UpstreamFailure>) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), last_prompt: Mutex::new(None), delay, outcome })
    }

    fn ok(text: &str) -> Arc<Self> {
        Self::with(Duration::ZERO, Ok(text.to_string()))
    }

    fn failing(failure: UpstreamFailure) -> Arc<Self> {
        Self::with(Duration::ZERO, Err(failure))
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Self::with(delay, Ok("late".to_string()))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

const MAX_BYTES: usize = 1024 * 1024;

fn service_in(
    llm: Option<Arc<StubLlm>>,
    timeout: Duration,
    reference_dir: Option<PathBuf>,
) -> LetterService {
    let limiter = FixedWindowLimiter::with_clock(
        Arc::new(MemoryStore::new()),
        RateLimitConfig::default(),
        Arc::new(ManualClock::new(10_000)),
    );
    LetterService::new(
        Arc::new(limiter),
        llm.map(|l| l as Arc<dyn LlmClient>),
        ReferenceLibrary::new(reference_dir, MAX_BYTES),
        MAX_BYTES,
        timeout,
    )
}

fn service_with(llm: Option<Arc<StubLlm>>, timeout: Duration) -> LetterService {
    service_in(llm, timeout, None)
}

async fn generate(service: &LetterService, kind: LetterKind, fields: &LetterFields) -> LetterResult {
    let accepted = service.accept(LetterRequest::new(kind, fields.clone()), &client()).await?;
    service.generate(&accepted).await
}

fn client() -> ClientIdentity {
    ClientIdentity::Peer(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
}

fn fields(pairs: &[(&str, &str)]) -> LetterFields {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

fn statement() -> LetterFields {
    fields(&[("name", "Dana Ortiz"), ("field", "computational biology")])
}

#[tokio::test]
async fn test_generate_success_reports_model() {
    let llm = StubLlm::ok("Dear committee,");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));

    let letter = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap();

    assert_eq!(letter.text, "Dear committee,");
    assert_eq!(letter.model.as_deref(), Some("stub-model"));
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_sixth_request_rate_limited_without_upstream_call() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));

    for _ in 0..5 {
        assert!(generate(&service, LetterKind::PersonalStatement, &statement()).await.is_ok());
    }
    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();

    match err {
        LetterError::RateLimited { retry_after_secs } => assert!(retry_after_secs > 0),
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(llm.calls(), 5);
}

#[tokio::test]
async fn test_missing_name_rejected_before_upstream() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));
    let submitted = fields(&[("department", "Physics"), ("target_rank", "Professor")]);

    let err = generate(&service, LetterKind::ChairPromotion, &submitted).await.unwrap_err();

    assert!(matches!(&err, LetterError::InvalidInput { field, .. } if field == "name"));
    assert_eq!(err.http_status_code(), 400);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let llm = StubLlm::slow(Duration::from_secs(5));
    let service = service_with(Some(llm.clone()), Duration::from_millis(50));

    let started = std::time::Instant::now();
    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(matches!(err, LetterError::UpstreamUnavailable { timed_out: true, .. }));
    assert_eq!(err.http_status_code(), 504);
}

#[tokio::test]
async fn test_upstream_failures_mapped() {
    let api = StubLlm::failing(UpstreamFailure::Api {
        status: 401,
        message: "Authentication failed (HTTP 401)".to_string(),
    });
    let service = service_with(Some(api), Duration::from_secs(5));
    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();
    assert_eq!(err, LetterError::UpstreamError { code: 401, message: "Authentication failed (HTTP 401)".to_string() });

    let down = StubLlm::failing(UpstreamFailure::Transport("Could not connect to upstream".to_string()));
    let service = service_with(Some(down), Duration::from_secs(5));
    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();
    assert!(matches!(err, LetterError::UpstreamUnavailable { timed_out: false, .. }));
    assert_eq!(err.http_status_code(), 502);
}

#[tokio::test]
async fn test_not_configured_after_validation() {
    let service = service_with(None, Duration::from_secs(5));
    assert!(!service.llm_available());

    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();
    assert_eq!(err, LetterError::NotConfigured);

    let err = generate(&service, LetterKind::PersonalStatement, &LetterFields::new()).await.unwrap_err();
    assert!(matches!(err, LetterError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_summary_shares_generate_budget() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));

    for _ in 0..5 {
        let accepted = service
            .accept(LetterRequest::new(LetterKind::PersonalStatement, statement()), &client())
            .await
            .unwrap();
        let summary = service.summarize(&accepted).unwrap();
        assert!(summary.model.is_none());
        assert!(summary.text.contains("Dana Ortiz"));
    }
    let err = generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap_err();
    assert!(matches!(err, LetterError::RateLimited { .. }));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_denied_request_is_not_validated_or_extracted() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));
    for _ in 0..5 {
        generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap();
    }

    // Invalid fields and an unreadable file still answer 429 once the window is spent.
    let upload = Upload { field: "cv_file".to_string(), file_name: "cv.xlsx".to_string(), bytes: vec![1] };
    let request =
        LetterRequest::new(LetterKind::PersonalStatement, LetterFields::new()).with_uploads(vec![upload]);
    let err = service.accept(request, &client()).await.unwrap_err();
    assert!(matches!(err, LetterError::RateLimited { .. }));
    assert_eq!(llm.calls(), 5);
}

#[tokio::test]
async fn test_uploads_reach_the_prompt() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));
    let upload = Upload {
        field: "cv_file".to_string(),
        file_name: "cv.docx".to_string(),
        bytes: crate::documents::test_files::docx("<w:p><w:r><w:t>Publications: 12</w:t></w:r></w:p>"),
    };
    let request = LetterRequest::new(LetterKind::PersonalStatement, statement()).with_uploads(vec![upload]);

    let accepted = service.accept(request, &client()).await.unwrap();
    assert_eq!(accepted.attachments().uploads.len(), 1);
    service.generate(&accepted).await.unwrap();

    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("=== UPLOADED DOCUMENTS ==="));
    assert!(prompt.contains("--- CV ---\nPublications: 12"));
}

#[tokio::test]
async fn test_bad_upload_rejected_before_upstream() {
    let llm = StubLlm::ok("ok");
    let service = service_with(Some(llm.clone()), Duration::from_secs(5));
    let upload = Upload { field: "cv_file".to_string(), file_name: "cv.txt".to_string(), bytes: Vec::new() };
    let request = LetterRequest::new(LetterKind::PersonalStatement, statement()).with_uploads(vec![upload]);

    let err = service.accept(request, &client()).await.unwrap_err();
    assert!(matches!(&err, LetterError::InvalidInput { field, .. } if field == "cv_file"));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_reference_files_feed_prompt_and_summary() {
    let root = tempfile::tempdir().unwrap();
    let folder = root.path().join(LetterKind::PersonalStatement.page_slug());
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("style_guide.txt"), "Keep it to one page.").unwrap();

    let llm = StubLlm::ok("ok");
    let service =
        service_in(Some(llm.clone()), Duration::from_secs(5), Some(root.path().to_path_buf()));
    assert_eq!(service.references().list(LetterKind::PersonalStatement).await.len(), 1);

    generate(&service, LetterKind::PersonalStatement, &statement()).await.unwrap();
    let prompt = llm.last_prompt().unwrap();
    assert!(prompt.contains("=== REFERENCE MATERIALS ==="));
    assert!(prompt.contains("--- STYLE GUIDE ---\nKeep it to one page."));

    let accepted = service
        .accept(LetterRequest::new(LetterKind::PersonalStatement, statement()), &client())
        .await
        .unwrap();
    let summary = service.summarize(&accepted).unwrap();
    assert!(summary.text.contains("- **Reference Files Loaded:** 1"));

    // Other pages do not see this folder.
    let accepted = service
        .accept(
            LetterRequest::new(
                LetterKind::FacultyPromotion,
                fields(&[("name", "A. Lee"), ("department", "Biology"), ("target_rank", "Professor")]),
            ),
            &client(),
        )
        .await
        .unwrap();
    assert!(accepted.attachments().references.is_empty());
}
