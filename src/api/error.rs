// CizError 轉成 HTTP 回應

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::utils::error::CizError;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn backend_status(status: u16) -> StatusCode {
    match status {
        409 => StatusCode::CONFLICT,
        400 | 422 => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for CizError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            CizError::RowError { .. }
            | CizError::MissingColumnError { .. }
            | CizError::EncodingError { .. }
            | CizError::CsvError(_)
            | CizError::ValidationError { .. } => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(self.user_friendly_message()),
            ),
            CizError::InsufficientCiz { .. } => (
                StatusCode::BAD_REQUEST,
                "Insufficient ciz",
                Some(self.user_friendly_message()),
            ),
            CizError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            CizError::Forbidden { .. } => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                Some(self.user_friendly_message()),
            ),
            CizError::NotFound { message } => {
                (StatusCode::NOT_FOUND, "Not found", Some(message.clone()))
            }
            CizError::Conflict { message } => {
                (StatusCode::CONFLICT, "Conflict", Some(message.clone()))
            }
            CizError::BackendError { status, message } => {
                tracing::error!("Backend error {}: {}", status, message);
                (backend_status(*status), "Backend error", Some(message.clone()))
            }
            CizError::SubmissionError { source, .. } => {
                tracing::error!("Import submission failed: {}", source);
                let status = match source.as_ref() {
                    CizError::BackendError { status, .. } => backend_status(*status),
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "Import aborted", Some(self.user_friendly_message()))
            }
            CizError::ApiError(e) => {
                tracing::error!("Backend request failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Backend unavailable", None)
            }
            CizError::ConfigError { .. }
            | CizError::ConfigValidationError { .. }
            | CizError::InvalidConfigValueError { .. }
            | CizError::MissingConfigError { .. }
            | CizError::IoError(_)
            | CizError::SerializationError(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
