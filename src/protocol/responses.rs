//! Response building
//!
//! JSON bodies and file downloads returned to the client.

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::StorageError;
use crate::storage::{DeleteOutcome, ListEntry, WriteOutcome};

/// `{"msg": ...}` with the given status
pub fn message(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "msg": msg }))).into_response()
}

pub fn login_success(access_token: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "msg": "Login successful", "access_token": access_token })),
    )
        .into_response()
}

pub fn listing(entries: &[ListEntry]) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "msg": "Directory list", "files": entries })),
    )
        .into_response()
}

pub fn written(outcome: WriteOutcome) -> Response {
    match outcome {
        WriteOutcome::Created { location } => (
            StatusCode::OK,
            [(header::LOCATION, location)],
            Json(json!({ "msg": "Created" })),
        )
            .into_response(),
        WriteOutcome::Unchanged => message(StatusCode::OK, "Already exists"),
    }
}

pub fn deleted(outcome: DeleteOutcome) -> Response {
    match outcome {
        DeleteOutcome::Directory => message(StatusCode::OK, "Directory removed"),
        DeleteOutcome::File => message(StatusCode::OK, "File removed"),
    }
}

/// Streams a file back as an attachment.
pub async fn download(path: &std::path::Path, name: &str) -> Result<Response, StorageError> {
    let file = File::open(path).await?;
    let body = Body::from_stream(ReaderStream::new(file));
    let disposition = format!("attachment; filename=\"{}\"", name.replace('"', "_"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
