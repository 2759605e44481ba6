//! Mapping of service errors onto HTTP responses.

use crate::error::{ErrorCode, ServiceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// HTTP status for an error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::UserNotFound | ErrorCode::TaskNotFound | ErrorCode::ParentNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::InvalidState | ErrorCode::AlreadyExists => StatusCode::CONFLICT,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = status_for(self.code);
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "Request failed: {}", self.message);
        }
        (status, Json(self)).into_response()
    }
}
