use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::utils::error::{AppError, ErrorCategory};

pub(crate) fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::BusinessRule { .. }
        | AppError::ValidationError { .. }
        | AppError::MissingFieldError { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        match self.category() {
            ErrorCategory::Client | ErrorCategory::Auth => {
                tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
            }
            _ => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    self,
                    self.category(),
                    self.severity()
                );
            }
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_friendly_message(),
            }
        }));
        (status, body).into_response()
    }
}
