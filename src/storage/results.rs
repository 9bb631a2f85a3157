//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;

use serde::Serialize;

/// One direct child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub path: String,
    pub is_dir: bool,
}

/// Result of a GET against a storage path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Listing(Vec<ListEntry>),
    File { path: PathBuf, name: String },
}

/// How a write treats a path that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fails with a conflict when the path exists.
    CreateOnly,
    /// Replaces whatever is at the path.
    Upsert,
}

/// Result of a file or directory write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Something new was written; `location` is `storage/relative-path`.
    Created { location: String },
    /// An upsert of a directory that already existed.
    Unchanged,
}

/// Result of a deletion, naming what kind of entry went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    File,
    Directory,
}
