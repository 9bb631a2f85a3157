//! Credential storage and management
//!
//! Loads the users file into an immutable directory keyed by user name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::auth::identity::{GUEST_NAME, Identity};
use crate::error::ConfigError;

/// How a user proves who they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AuthMethod {
    #[default]
    Password,
    /// Any method this server does not implement; such users cannot log in.
    Unsupported(String),
}

impl From<String> for AuthMethod {
    fn from(value: String) -> Self {
        if value == "password" {
            AuthMethod::Password
        } else {
            AuthMethod::Unsupported(value)
        }
    }
}

/// One entry of the users file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub auth_method: AuthMethod,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_groups")]
    pub groups: Vec<String>,
}

fn default_groups() -> Vec<String> {
    vec![GUEST_NAME.to_string()]
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::user(self.name.clone(), self.groups.clone())
    }
}

/// Immutable user name → user lookup table.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, User>,
}

impl UserDirectory {
    /// Builds the directory, rejecting users without a name.
    ///
    /// Duplicate names keep the last entry and log a warning.
    pub fn from_users(list: Vec<User>) -> Result<Self, ConfigError> {
        let mut users = HashMap::with_capacity(list.len());

        for user in list {
            if user.name.is_empty() {
                return Err(ConfigError::Invalid("empty user name".into()));
            }
            let name = user.name.clone();
            if users.insert(name.clone(), user).is_some() {
                warn!("User {name} is defined more than once, keeping the last definition");
            }
        }

        let with_password = users
            .values()
            .filter(|u| u.auth_method == AuthMethod::Password)
            .count();
        if with_password > 0 {
            warn!("{with_password} user password(s) are stored in plaintext");
        }

        info!("Loaded {} user(s)", users.len());
        Ok(Self { users })
    }

    /// Reads a JSON array of users from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let list: Vec<User> = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_users(list)
    }

    pub fn get(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
