//! Storage registry
//!
//! Maps storage names to their root directory and permission rules. Built once
//! at startup and read-only afterwards.

use std::collections::HashMap;

use log::{info, warn};

use crate::config::StorageConfig;
use crate::error::{ConfigError, StorageError};
use crate::storage::permissions::{Access, PermissionRule};
use crate::storage::validation::normalize;

/// A named filesystem root exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    name: String,
    root: String,
    read_rule: PermissionRule,
    write_rule: PermissionRule,
}

impl Storage {
    /// Creates a storage; the root is stored in its normalized form so that
    /// resolved paths can be compared against it textually.
    pub fn new(
        name: impl Into<String>,
        root: &str,
        read_rule: PermissionRule,
        write_rule: PermissionRule,
    ) -> Self {
        Self {
            name: name.into(),
            root: normalize(root),
            read_rule,
            write_rule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the rule guarding the given kind of access.
    pub fn rule(&self, access: Access) -> &PermissionRule {
        match access {
            Access::Read => &self.read_rule,
            Access::Write => &self.write_rule,
        }
    }
}

/// Names shadowed by the session routes under the same prefix.
const RESERVED_NAMES: [&str; 2] = ["login", "logout"];

/// Process-wide lookup table of storages.
#[derive(Debug, Default)]
pub struct StorageRegistry {
    storages: HashMap<String, Storage>,
}

impl StorageRegistry {
    /// Builds the registry from configuration descriptors.
    ///
    /// Duplicate names keep the last descriptor and log a warning.
    pub fn from_configs(configs: &[StorageConfig]) -> Result<Self, ConfigError> {
        let mut storages = HashMap::with_capacity(configs.len());

        for config in configs {
            if config.name.is_empty() {
                return Err(ConfigError::Invalid("storage name cannot be empty".into()));
            }
            if config.name.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "storage name {} cannot contain '/'",
                    config.name
                )));
            }
            if RESERVED_NAMES.contains(&config.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "storage name {} is reserved",
                    config.name
                )));
            }

            let root = normalize(&config.path);
            if config.path.is_empty() || root == "." {
                return Err(ConfigError::Invalid(format!(
                    "storage {} needs a root directory",
                    config.name
                )));
            }

            let storage = Storage::new(
                config.name.clone(),
                &config.path,
                config.read_permissions.clone(),
                config.write_permissions.clone(),
            );

            if storages.insert(config.name.clone(), storage).is_some() {
                warn!(
                    "Storage {} is defined more than once, keeping the last definition",
                    config.name
                );
            }
        }

        info!("Loaded {} storage(s)", storages.len());
        Ok(Self { storages })
    }

    /// Looks a storage up by name.
    pub fn lookup(&self, name: &str) -> Result<&Storage, StorageError> {
        self.storages
            .get(name)
            .ok_or_else(|| StorageError::StorageNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.storages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.storages.keys().map(String::as_str)
    }
}
