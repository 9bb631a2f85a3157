//! Request handlers for the storage server.
//!
//! Each handler resolves the caller, hands the request to the storage
//! operations, and turns the outcome into a response.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::Response;
use axum::{Form, Json};
use serde::Deserialize;

use crate::error::{ApiError, AuthError};
use crate::protocol::commands::{Verb, bearer_token, parse_target};
use crate::protocol::responses;
use crate::server::AppState;
use crate::storage::{ReadOutcome, operations};

/// Multipart field carrying an uploaded file.
pub const UPLOAD_FIELD: &str = "upload_file";

#[derive(Debug, Deserialize)]
struct LoginRequest {
    user: Option<String>,
    password: Option<String>,
}

/// Handles `{prefix}/login`: JSON or form body with `user` and `password`.
pub async fn handle_login(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    if !matches!(*request.method(), Method::GET | Method::POST) {
        return Err(ApiError::bad_request("Bad request method"));
    }

    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let login = if is_json {
        Json::<LoginRequest>::from_request(request, &state)
            .await
            .map(|Json(login)| login)
            .map_err(|e| ApiError::bad_request(e.body_text()))?
    } else {
        Form::<LoginRequest>::from_request(request, &state)
            .await
            .map(|Form(login)| login)
            .map_err(|e| ApiError::bad_request(e.body_text()))?
    };

    let user = login.user.ok_or(AuthError::MissingField("user"))?;
    let password = login.password.unwrap_or_default();

    let token = state.sessions.login(&user, &password)?;
    Ok(responses::login_success(&token.access_token))
}

/// Handles `{prefix}/logout`: revokes the presented bearer token.
pub async fn handle_logout(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        return Err(ApiError::bad_request("Bad request method"));
    }

    state.sessions.revoke(bearer_token(&headers))?;
    Ok(responses::message(StatusCode::OK, "Logout successful"))
}

/// Handles every `{prefix}/{storage}/{path}` request.
pub async fn handle_fs_request(
    State(state): State<AppState>,
    method: Method,
    Path(target): Path<String>,
    headers: HeaderMap,
    upload: Option<Multipart>,
) -> Result<Response, ApiError> {
    let verb =
        Verb::from_method(&method).ok_or_else(|| ApiError::bad_request("Bad request method"))?;
    let (storage_name, relative) = parse_target(&target);

    let storage = state.storages.lookup(storage_name)?;
    let identity = state.sessions.resolve_identity(bearer_token(&headers));

    match verb {
        Verb::List => match operations::list_or_read(storage, relative, &identity).await? {
            ReadOutcome::Listing(entries) => Ok(responses::listing(&entries)),
            ReadOutcome::File { path, name } => Ok(responses::download(&path, &name).await?),
        },
        Verb::Write(mode) => {
            let content = match upload {
                Some(multipart) => read_upload(multipart).await?,
                None => None,
            };
            let outcome =
                operations::write(storage, relative, &identity, mode, content.as_deref()).await?;
            Ok(responses::written(outcome))
        }
        Verb::Delete => {
            let outcome = operations::delete(storage, relative, &identity).await?;
            Ok(responses::deleted(outcome))
        }
    }
}

/// Pulls the uploaded file out of a multipart body.
///
/// Only parts carrying a filename count as files. A body without any file
/// part means "create a directory"; a body with file parts but none named
/// [`UPLOAD_FIELD`] is rejected.
async fn read_upload(mut multipart: Multipart) -> Result<Option<Vec<u8>>, ApiError> {
    let mut saw_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.file_name().is_none() {
            continue;
        }
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(Some(bytes.to_vec()));
        }
        saw_file = true;
    }

    if saw_file {
        return Err(ApiError::bad_request("File not found in request"));
    }
    Ok(None)
}
