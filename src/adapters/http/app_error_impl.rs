use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "Request failed")
            }
            _ => tracing::warn!(error = %self, "Request rejected"),
        }

        match self {
            AppError::Validation { field, message } => {
                let body = serde_json::json!({
                    "code": ErrorCode::ValidationError.as_str(),
                    "message": message,
                    "field": field,
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::NotFound => error_resp(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "Email not found",
            ),
            AppError::StoreUnavailable(_) => error_resp(
                StatusCode::BAD_GATEWAY,
                ErrorCode::StoreUnavailable,
                "Waitlist storage is temporarily unavailable, please retry later",
            ),
            AppError::RateLimited => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::RateLimited,
                "Too many requests. Please slow down.",
            ),
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                "Internal server error",
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: &str) -> Response {
    let body = serde_json::json!({ "code": code.as_str(), "message": message });
    (status, Json(body)).into_response()
}
