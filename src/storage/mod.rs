//! Storage management
//!
//! Storage registry, permission rules, path validation and the file
//! operations performed against a storage.

pub mod filesystem;
pub mod operations;
pub mod permissions;
pub mod registry;
pub mod results;
pub mod validation;

pub use operations::{check_access, delete, list_or_read, write};
pub use permissions::{Access, PermissionRule, authorize};
pub use registry::{Storage, StorageRegistry};
pub use results::{DeleteOutcome, ListEntry, ReadOutcome, WriteMode, WriteOutcome};
pub use validation::{normalize, resolve};
