//! Error types
//!
//! Defines domain-specific error types for each module of the storage server,
//! plus the outward `ApiError` every failure is folded into at the boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Outward message for anything that must not reveal why it failed.
pub const NOT_FOUND_MSG: &str = "Not found";
/// Outward message shared by every rejected login.
pub const LOGIN_FAILURE_MSG: &str = "Login failure";

/// Configuration loading errors. All of them abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load server config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("server stopped: {0}")]
    Serve(#[source] io::Error),
}

/// Authentication module errors
///
/// The variants keep the real reason for the server log; callers only ever see
/// [`LOGIN_FAILURE_MSG`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unknown user {0}")]
    UserNotFound(String),

    #[error("bad password for {0}")]
    InvalidPassword(String),

    #[error("unknown auth method {method} for {user}")]
    UnsupportedMethod { user: String, method: String },

    #[error("missing login parameter: {0}")]
    MissingField(&'static str),

    #[error("failed to issue token: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}

/// Session lifecycle errors raised by logout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active session")]
    NoActiveSession,

    #[error("session {0} already revoked")]
    AlreadyRevoked(String),
}

/// Path resolution errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unsupported path symbols in {0}")]
    UnsupportedSymbols(String),
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage {0} not found")]
    StorageNotFound(String),

    #[error("permission denied for {user} on {storage}")]
    PermissionDenied { storage: String, user: String },

    #[error(transparent)]
    PathTraversal(#[from] ResolveError),

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("path already exists: {0}")]
    AlreadyExists(String),

    #[error("parent directory not found: {0}")]
    ParentNotFound(String),

    #[error("storage root missing: {0}")]
    RootMissing(String),

    #[error("storage root of {0} cannot be modified")]
    RootImmutable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Classification the boundary maps onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    PermissionDenied,
    Conflict,
    AuthFailure,
    AlreadyRevoked,
    NoActiveSession,
    Internal,
}

/// A classified failure with the message shown to the caller.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, NOT_FOUND_MSG)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingField(field) => {
                ApiError::bad_request(format!("Missing login parameter: {field}"))
            }
            AuthError::TokenIssue(_) => ApiError::new(ErrorKind::Internal, "Internal error"),
            _ => ApiError::new(ErrorKind::AuthFailure, LOGIN_FAILURE_MSG),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NoActiveSession => {
                ApiError::new(ErrorKind::NoActiveSession, "You are not logged in")
            }
            SessionError::AlreadyRevoked(_) => {
                ApiError::new(ErrorKind::AlreadyRevoked, "Session already ended")
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            // Traversal attempts and missing paths look the same from outside.
            StorageError::StorageNotFound(_)
            | StorageError::PathTraversal(_)
            | StorageError::NotFound(_) => ApiError::not_found(),
            StorageError::ParentNotFound(_) => {
                ApiError::new(ErrorKind::NotFound, "Parent directory not found")
            }
            StorageError::PermissionDenied { .. } => {
                ApiError::new(ErrorKind::PermissionDenied, "Permission denied")
            }
            StorageError::AlreadyExists(_) => ApiError::new(ErrorKind::Conflict, "Already exists"),
            StorageError::RootImmutable(_) => {
                ApiError::bad_request("Storage root cannot be modified")
            }
            StorageError::RootMissing(_) | StorageError::Io(_) => {
                ApiError::new(ErrorKind::Internal, "Internal error")
            }
        }
    }
}
