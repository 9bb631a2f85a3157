//! Path validation
//!
//! Joins a caller-supplied relative path onto a storage root and rejects any
//! request whose joined form changes under lexical normalization. The check is
//! purely textual: symlinks are not followed and the filesystem is not touched.

use std::path::PathBuf;

use crate::error::ResolveError;
use crate::storage::registry::Storage;

pub const SEPARATOR: char = '/';

/// Lexically normalizes a path the way POSIX `normpath` does: collapses
/// repeated separators, drops `.` segments and trailing separators, and folds
/// `..` into the preceding segment.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    // POSIX keeps exactly two leading slashes, three or more collapse to one.
    let leading = if path.starts_with("//") && !path.starts_with("///") {
        2
    } else if path.starts_with(SEPARATOR) {
        1
    } else {
        0
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                if leading == 0 && parts.last().is_none_or(|last| *last == "..") {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            _ => parts.push(segment),
        }
    }

    let mut normalized = SEPARATOR.to_string().repeat(leading);
    normalized.push_str(&parts.join("/"));
    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

/// Resolves `relative` against the storage root.
///
/// A missing leading separator is added, so `"a/b"` and `"/a/b"` resolve to
/// the same place. An empty path resolves to the root itself. Paths holding a
/// NUL byte can never name a file and are rejected.
pub fn resolve(storage: &Storage, relative: &str) -> Result<PathBuf, ResolveError> {
    if relative.contains('\0') {
        return Err(ResolveError::UnsupportedSymbols(relative.to_string()));
    }

    let mut full = storage.root().to_string();
    if !relative.is_empty() && !relative.starts_with(SEPARATOR) {
        full.push(SEPARATOR);
    }
    full.push_str(relative);

    if full != normalize(&full) {
        return Err(ResolveError::UnsupportedSymbols(full));
    }

    Ok(PathBuf::from(full))
}
