//! Error handlers
//!
//! Maps classified errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::error::types::{ApiError, ErrorKind};

/// Log an API error at a level matching its classification
pub fn handle_error(err: &ApiError) {
    match err.kind() {
        ErrorKind::Internal => error!("Request failed: {}", err),
        ErrorKind::PermissionDenied | ErrorKind::AuthFailure => warn!("Request rejected: {}", err),
        _ => {}
    }
}

/// Convert an error classification to an HTTP status code
pub fn error_to_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::AuthFailure => StatusCode::BAD_REQUEST,
        ErrorKind::AlreadyRevoked | ErrorKind::NoActiveSession => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status(self.kind());
        (status, Json(json!({ "msg": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_classification() {
        assert_eq!(error_to_status(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(error_to_status(ErrorKind::PermissionDenied), StatusCode::FORBIDDEN);
        assert_eq!(error_to_status(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(error_to_status(ErrorKind::AuthFailure), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_to_status(ErrorKind::Internal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
