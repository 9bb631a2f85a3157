//! File system helpers
//!
//! Thin async wrappers over `tokio::fs` used by the storage operations.

use std::io::{ErrorKind, Result};
use std::path::Path;

use tokio::fs;

/// What currently sits at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Returns the kind of entry at `path`, or `None` when nothing is there.
/// A path running through a regular file counts as nothing there. Symlinks
/// are followed.
pub async fn entry_kind(path: &Path) -> Result<Option<EntryKind>> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(Some(EntryKind::Directory)),
        Ok(_) => Ok(Some(EntryKind::File)),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Removes an entry, recursively when it is a directory.
pub async fn remove_entry(path: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::Directory => fs::remove_dir_all(path).await,
        EntryKind::File => fs::remove_file(path).await,
    }
}

/// Check if directory exists
pub async fn directory_exists(path: &Path) -> bool {
    matches!(entry_kind(path).await, Ok(Some(EntryKind::Directory)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn path_through_a_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readme.txt");
        fs::write(&file, b"hello").await.unwrap();

        assert_eq!(entry_kind(&file).await.unwrap(), Some(EntryKind::File));
        assert_eq!(entry_kind(&file.join("child")).await.unwrap(), None);
        assert!(!directory_exists(&file.join("child")).await);
        assert_eq!(
            entry_kind(dir.path()).await.unwrap(),
            Some(EntryKind::Directory)
        );
    }
}
