//! Storage operations
//!
//! List, read, write and delete against a storage. Every operation checks the
//! caller against the storage's rule first, then resolves the path, and only
//! then touches the filesystem.

use std::path::{Path, PathBuf};

use log::{error, info, warn};
use tokio::fs;

use crate::auth::Identity;
use crate::error::StorageError;
use crate::storage::filesystem::{EntryKind, directory_exists, entry_kind, remove_entry};
use crate::storage::permissions::{Access, authorize};
use crate::storage::registry::Storage;
use crate::storage::results::{DeleteOutcome, ListEntry, ReadOutcome, WriteMode, WriteOutcome};
use crate::storage::validation::{SEPARATOR, resolve};

/// Fails with `PermissionDenied` unless `identity` satisfies the storage rule
/// for `access`.
pub fn check_access(
    storage: &Storage,
    access: Access,
    identity: &Identity,
) -> Result<(), StorageError> {
    if authorize(storage.rule(access), identity.groups()) {
        return Ok(());
    }

    warn!(
        "Permission denied: {} {} on {}",
        identity.name(),
        access.as_str(),
        storage.name()
    );
    Err(StorageError::PermissionDenied {
        storage: storage.name().to_string(),
        user: identity.name().to_string(),
    })
}

/// Lists a directory, or hands back the file to stream when the path is a file.
pub async fn list_or_read(
    storage: &Storage,
    relative: &str,
    identity: &Identity,
) -> Result<ReadOutcome, StorageError> {
    check_access(storage, Access::Read, identity)?;
    let path = resolve_logged(storage, relative, identity)?;

    match entry_kind(&path).await? {
        None => {
            if !directory_exists(Path::new(storage.root())).await {
                error!(
                    "Root {} of storage {} is missing",
                    storage.root(),
                    storage.name()
                );
                return Err(StorageError::RootMissing(storage.root().to_string()));
            }
            Err(StorageError::NotFound(path.display().to_string()))
        }
        Some(EntryKind::Directory) => {
            let entries = list_directory(&path).await?;
            info!(
                "{} listed {}/{} - {} entries",
                identity.name(),
                storage.name(),
                relative.trim_start_matches(SEPARATOR),
                entries.len()
            );
            Ok(ReadOutcome::Listing(entries))
        }
        Some(EntryKind::File) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("{} reading {}", identity.name(), path.display());
            Ok(ReadOutcome::File { path, name })
        }
    }
}

/// Writes a file (`content` present) or a directory (`content` absent).
///
/// `CreateOnly` fails when anything exists at the path. `Upsert` replaces an
/// existing entry, except that an existing directory upserted as a directory
/// is left as it is.
pub async fn write(
    storage: &Storage,
    relative: &str,
    identity: &Identity,
    mode: WriteMode,
    content: Option<&[u8]>,
) -> Result<WriteOutcome, StorageError> {
    check_access(storage, Access::Write, identity)?;
    let path = resolve_logged(storage, relative, identity)?;
    ensure_not_root(storage, &path)?;

    let existing = entry_kind(&path).await?;
    match (existing, mode) {
        (Some(_), WriteMode::CreateOnly) => {
            return Err(StorageError::AlreadyExists(path.display().to_string()));
        }
        (Some(EntryKind::Directory), WriteMode::Upsert) if content.is_none() => {
            return Ok(WriteOutcome::Unchanged);
        }
        (Some(kind), WriteMode::Upsert) => remove_entry(&path, kind).await?,
        (None, _) => ensure_parent(&path).await?,
    }

    match content {
        Some(bytes) => fs::write(&path, bytes).await?,
        None => fs::create_dir(&path).await?,
    }

    let location = location(storage, relative);
    info!(
        "{} created {} {}",
        identity.name(),
        if content.is_some() { "file" } else { "directory" },
        location
    );
    Ok(WriteOutcome::Created { location })
}

/// Deletes a file, or a directory with everything under it.
pub async fn delete(
    storage: &Storage,
    relative: &str,
    identity: &Identity,
) -> Result<DeleteOutcome, StorageError> {
    check_access(storage, Access::Write, identity)?;
    let path = resolve_logged(storage, relative, identity)?;
    ensure_not_root(storage, &path)?;

    let kind = entry_kind(&path)
        .await?
        .ok_or_else(|| StorageError::NotFound(path.display().to_string()))?;
    remove_entry(&path, kind).await?;

    info!("{} removed {}", identity.name(), location(storage, relative));
    Ok(match kind {
        EntryKind::Directory => DeleteOutcome::Directory,
        EntryKind::File => DeleteOutcome::File,
    })
}

/// Reads the direct children of a directory in filesystem order.
async fn list_directory(path: &Path) -> Result<Vec<ListEntry>, StorageError> {
    let mut entries = Vec::new();
    let mut dir = fs::read_dir(path).await?;

    while let Some(entry) = dir.next_entry().await? {
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(ListEntry {
            path: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    Ok(entries)
}

fn resolve_logged(
    storage: &Storage,
    relative: &str,
    identity: &Identity,
) -> Result<PathBuf, StorageError> {
    resolve(storage, relative).map_err(|e| {
        warn!("{} rejected on {}: {}", identity.name(), storage.name(), e);
        StorageError::from(e)
    })
}

fn ensure_not_root(storage: &Storage, path: &Path) -> Result<(), StorageError> {
    if path == Path::new(storage.root()) {
        return Err(StorageError::RootImmutable(storage.name().to_string()));
    }
    Ok(())
}

async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if directory_exists(parent).await => Ok(()),
        _ => Err(StorageError::ParentNotFound(path.display().to_string())),
    }
}

fn location(storage: &Storage, relative: &str) -> String {
    format!(
        "{}/{}",
        storage.name(),
        relative.trim_start_matches(SEPARATOR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::permissions::PermissionRule;
    use tempfile::TempDir;

    fn docs(dir: &TempDir) -> Storage {
        Storage::new(
            "docs",
            dir.path().to_str().unwrap(),
            PermissionRule::All,
            PermissionRule::Group("Editors".into()),
        )
    }

    fn bob() -> Identity {
        Identity::user("bob", vec!["Editors".into()])
    }

    #[tokio::test]
    async fn listing_reports_children_and_kinds() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("reports")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let outcome = list_or_read(&docs(&dir), "", &Identity::Guest).await.unwrap();
        let ReadOutcome::Listing(mut entries) = outcome else {
            panic!("expected a listing");
        };
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(
            entries,
            vec![
                ListEntry { path: "readme.txt".into(), is_dir: false },
                ListEntry { path: "reports".into(), is_dir: true },
            ]
        );
    }

    #[tokio::test]
    async fn reading_a_file_returns_it() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let outcome = list_or_read(&docs(&dir), "readme.txt", &Identity::Guest)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::File {
                path: dir.path().join("readme.txt"),
                name: "readme.txt".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_path_and_traversal_are_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        assert!(matches!(
            list_or_read(&storage, "nope", &Identity::Guest).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            list_or_read(&storage, "../etc", &Identity::Guest).await,
            Err(StorageError::PathTraversal(_))
        ));
    }

    #[tokio::test]
    async fn missing_root_is_reported_separately() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(
            "gone",
            dir.path().join("absent").to_str().unwrap(),
            PermissionRule::All,
            PermissionRule::None,
        );
        assert!(matches!(
            list_or_read(&storage, "", &Identity::Guest).await,
            Err(StorageError::RootMissing(_))
        ));
    }

    #[tokio::test]
    async fn denied_read_never_resolves_the_path() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(
            "private",
            dir.path().to_str().unwrap(),
            PermissionRule::Group("Editors".into()),
            PermissionRule::None,
        );
        // Permission is checked before the traversal check.
        assert!(matches!(
            list_or_read(&storage, "../etc", &Identity::Guest).await,
            Err(StorageError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn create_only_conflicts_with_existing_entries() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        std::fs::create_dir(dir.path().join("reports")).unwrap();
        std::fs::write(dir.path().join("reports/keep.txt"), b"keep").unwrap();

        let result = write(&storage, "reports", &bob(), WriteMode::CreateOnly, None).await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        let result = write(&storage, "reports", &bob(), WriteMode::CreateOnly, Some(&b"x"[..])).await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert!(dir.path().join("reports/keep.txt").is_file());
    }

    #[tokio::test]
    async fn upsert_directory_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);

        let first = write(&storage, "reports", &bob(), WriteMode::Upsert, None).await.unwrap();
        assert_eq!(
            first,
            WriteOutcome::Created { location: "docs/reports".into() }
        );
        let second = write(&storage, "reports", &bob(), WriteMode::Upsert, None).await.unwrap();
        assert_eq!(second, WriteOutcome::Unchanged);
        assert!(dir.path().join("reports").is_dir());
    }

    #[tokio::test]
    async fn upsert_replaces_file_with_directory_and_back() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        std::fs::write(dir.path().join("thing"), b"file").unwrap();

        write(&storage, "thing", &bob(), WriteMode::Upsert, None).await.unwrap();
        assert!(dir.path().join("thing").is_dir());

        std::fs::write(dir.path().join("thing/inner"), b"nested").unwrap();
        write(&storage, "/thing", &bob(), WriteMode::Upsert, Some(&b"file again"[..]))
            .await
            .unwrap();
        assert_eq!(std::fs::read(dir.path().join("thing")).unwrap(), b"file again");
    }

    #[tokio::test]
    async fn write_needs_an_existing_parent() {
        let dir = TempDir::new().unwrap();
        let result = write(&docs(&dir), "a/b.txt", &bob(), WriteMode::CreateOnly, Some(&b"x"[..])).await;
        assert!(matches!(result, Err(StorageError::ParentNotFound(_))));
    }

    #[tokio::test]
    async fn storage_root_cannot_be_replaced_or_deleted() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        assert!(matches!(
            write(&storage, "", &bob(), WriteMode::Upsert, Some(&b"x"[..])).await,
            Err(StorageError::RootImmutable(_))
        ));
        assert!(matches!(
            delete(&storage, "", &bob()).await,
            Err(StorageError::RootImmutable(_))
        ));
        assert!(dir.path().is_dir());
    }

    #[tokio::test]
    async fn guest_cannot_write_or_delete() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        std::fs::write(dir.path().join("keep.txt"), b"keep").unwrap();

        assert!(matches!(
            write(&storage, "new.txt", &Identity::Guest, WriteMode::Upsert, Some(&b"x"[..])).await,
            Err(StorageError::PermissionDenied { .. })
        ));
        assert!(matches!(
            delete(&storage, "keep.txt", &Identity::Guest).await,
            Err(StorageError::PermissionDenied { .. })
        ));
        assert!(!dir.path().join("new.txt").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[tokio::test]
    async fn delete_reports_what_it_removed() {
        let dir = TempDir::new().unwrap();
        let storage = docs(&dir);
        std::fs::create_dir_all(dir.path().join("reports/2024")).unwrap();
        std::fs::write(dir.path().join("reports/2024/q1.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"notes").unwrap();

        assert_eq!(delete(&storage, "notes.txt", &bob()).await.unwrap(), DeleteOutcome::File);
        assert_eq!(
            delete(&storage, "reports", &bob()).await.unwrap(),
            DeleteOutcome::Directory
        );
        assert!(!dir.path().join("reports").exists());
        assert!(matches!(
            delete(&storage, "reports", &bob()).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
