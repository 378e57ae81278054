use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use letterdesk_types::LetterError;

/// HTTP face of [`LetterError`].
#[derive(Debug)]
pub struct ApiError(pub LetterError);

impl From<LetterError> for ApiError {
    fn from(err: LetterError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error_kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if let LetterError::Internal { message } = &err {
            tracing::error!("Internal error: {}", message);
        }

        let body = ErrorBody {
            success: false,
            error_kind: err.kind(),
            message: err.public_message(),
            retry_after_secs: err.retry_after_secs(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = err.retry_after_secs() {
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
