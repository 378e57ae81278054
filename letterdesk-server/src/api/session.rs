//! Saved form values for the current session

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Serialize;

use letterdesk_types::{LetterFields, LetterKind};

use super::ApiError;
use crate::middleware::RequestContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SavedFieldsResponse {
    pub kind: LetterKind,
    pub session_id: String,
    pub fields: LetterFields,
}

pub async fn saved_fields(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(kind): Path<String>,
) -> Result<Json<SavedFieldsResponse>, ApiError> {
    let kind: LetterKind = kind.parse()?;
    let fields = state.sessions().load_fields(&ctx.session, kind).await;
    Ok(Json(SavedFieldsResponse { kind, session_id: ctx.session.to_string(), fields }))
}
