//! Letter generation and summary handlers

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::header,
    response::Json,
    Extension, Form,
};
use serde::Serialize;
use serde_json::{Map, Value};

use letterdesk_core::{Accepted, SessionId};
use letterdesk_types::{
    GeneratedLetter, LetterError, LetterFields, LetterKind, LetterRequest, Upload,
};

use super::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Keys that describe the page rather than the candidate.
const PAGE_KEYS: [&str; 2] = ["page_type", "page_title"];

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub success: bool,
    pub text: String,
    pub kind: LetterKind,
    pub session_id: String,
    pub form_fields_received: Vec<String>,
    pub files_processed: usize,
    pub server_files_loaded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl LetterResponse {
    fn new(letter: GeneratedLetter, session: &SessionId, accepted: &Accepted) -> Self {
        Self {
            success: true,
            text: letter.text,
            kind: letter.kind,
            session_id: session.to_string(),
            form_fields_received: accepted
                .fields()
                .keys()
                .filter(|k| !PAGE_KEYS.contains(&k.as_str()))
                .cloned()
                .collect(),
            files_processed: accepted.attachments().uploads.len(),
            server_files_loaded: accepted.attachments().references.len(),
            model: letter.model,
        }
    }
}

/// Submitted fields and files, from a JSON object, a urlencoded form or a
/// multipart form.
pub struct Submission {
    pub fields: LetterFields,
    pub uploads: Vec<Upload>,
}

impl Submission {
    fn into_request(self, kind: LetterKind) -> LetterRequest {
        LetterRequest::new(kind, self.fields).with_uploads(self.uploads)
    }
}

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(map) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(&e.body_text()))?;
            Ok(Self { fields: flatten_json(map), uploads: Vec::new() })
        } else if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| invalid_body(&e.body_text()))?;
            read_multipart(multipart).await
        } else {
            let Form(fields) = Form::<LetterFields>::from_request(req, state)
                .await
                .map_err(|e| invalid_body(&e.body_text()))?;
            Ok(Self { fields, uploads: Vec::new() })
        }
    }
}

/// Parts with a file name become uploads; the rest are text fields. File
/// inputs left empty arrive with a blank file name and are dropped.
async fn read_multipart(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut submission = Submission { fields: LetterFields::new(), uploads: Vec::new() };

    while let Some(field) =
        multipart.next_field().await.map_err(|e| invalid_body(&e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) if file_name.trim().is_empty() => continue,
            Some(file_name) => {
                let bytes = field.bytes().await.map_err(|e| invalid_body(&e.body_text()))?.to_vec();
                tracing::debug!("Received file '{}' in '{}' ({} bytes)", file_name, name, bytes.len());
                submission.uploads.push(Upload { field: name, file_name, bytes });
            },
            None => {
                let text = field.text().await.map_err(|e| invalid_body(&e.body_text()))?;
                submission.fields.insert(name, text);
            },
        }
    }
    Ok(submission)
}

fn invalid_body(detail: &str) -> ApiError {
    tracing::debug!("Rejected request body: {}", detail);
    ApiError(LetterError::InvalidInput {
        field: "body".to_string(),
        message: "expected a JSON object, form-encoded fields or a multipart form".to_string(),
    })
}

/// JSON values become the text a form would have sent; nulls are dropped.
fn flatten_json(map: Map<String, Value>) -> LetterFields {
    map.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

/// Fields are saved to the session only once the submission is accepted.
pub async fn generate(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(kind): Path<String>,
    submission: Submission,
) -> Result<Json<LetterResponse>, ApiError> {
    let kind: LetterKind = kind.parse()?;
    tracing::info!(
        "Generate {} for {} ({} fields, {} files)",
        kind,
        ctx.identity,
        submission.fields.len(),
        submission.uploads.len()
    );

    let accepted = state.service().accept(submission.into_request(kind), &ctx.identity).await?;
    state.sessions().save_fields(&ctx.session, accepted.kind(), accepted.fields()).await;
    let letter = state.service().generate(&accepted).await?;
    Ok(Json(LetterResponse::new(letter, &ctx.session, &accepted)))
}

pub async fn summarize(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(kind): Path<String>,
    submission: Submission,
) -> Result<Json<LetterResponse>, ApiError> {
    let kind: LetterKind = kind.parse()?;

    let accepted = state.service().accept(submission.into_request(kind), &ctx.identity).await?;
    state.sessions().save_fields(&ctx.session, accepted.kind(), accepted.fields()).await;
    let summary = state.service().summarize(&accepted)?;
    Ok(Json(LetterResponse::new(summary, &ctx.session, &accepted)))
}
