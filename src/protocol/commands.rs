//! Module `commands`
//!
//! Turns an incoming HTTP request into the pieces the core works with: a
//! verb, a storage name, a relative path and an optional bearer token.

use axum::http::{HeaderMap, Method, header};

use crate::storage::WriteMode;

/// Operation requested against a storage path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// GET: list a directory or read a file
    List,
    /// POST/PUT: write a file or create a directory
    Write(WriteMode),
    /// DELETE
    Delete,
}

impl Verb {
    /// Maps an HTTP method to a verb, `None` for unsupported methods.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Verb::List),
            Method::POST => Some(Verb::Write(WriteMode::CreateOnly)),
            Method::PUT => Some(Verb::Write(WriteMode::Upsert)),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }
}

/// Splits `storage/relative/path` at the first separator.
///
/// A target without a separator addresses the storage root.
pub fn parse_target(target: &str) -> (&str, &str) {
    match target.split_once('/') {
        Some((storage, path)) => (storage, path),
        None => (target, ""),
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
