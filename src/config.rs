//! Configuration management for the storage server
//!
//! The server config (listener, URL prefix, token settings, storages) comes
//! from a JSON file with `FS_`-prefixed environment overrides. The users list
//! lives in a separate JSON file loaded by [`crate::auth::UserDirectory`].

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::storage::PermissionRule;

/// Environment variable naming the server config file.
pub const CONFIG_PATH_VAR: &str = "FS_CONFIG";
/// Environment variable naming the users file.
pub const USERS_PATH_VAR: &str = "FS_USERS";

/// Longest accepted session token lifetime, one year.
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

const DEFAULT_CONFIG_PATH: &str = "config/config.json";
const DEFAULT_USERS_PATH: &str = "config/users.json";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub host: String,

    /// Port of the HTTP listener
    pub port: u16,

    /// Path every route is mounted under, e.g. `/fs`
    pub url_prefix: String,

    /// HMAC secret for session tokens; a random one is generated when unset
    #[serde(default)]
    pub token_secret: Option<String>,

    /// Session token lifetime
    pub token_ttl_secs: u64,

    /// Largest accepted upload
    pub max_upload_mb: u64,

    #[serde(default)]
    pub storages: Vec<StorageConfig>,
}

/// One storage descriptor as written in the config file.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub read_permissions: PermissionRule,
    #[serde(default)]
    pub write_permissions: PermissionRule,
}

impl ServerConfig {
    /// Load configuration from the file named by `FS_CONFIG`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load configuration from `path` with environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000)?
            .set_default("url_prefix", "/fs")?
            .set_default("token_ttl_secs", 8 * 60 * 60)?
            .set_default("max_upload_mb", 100)?
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(
                Environment::with_prefix("FS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;
        config.url_prefix = config.url_prefix.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port cannot be 0".into()));
        }

        if !self.url_prefix.is_empty() && !self.url_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "url_prefix must start with '/'".into(),
            ));
        }

        if self.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "token_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "token_ttl_secs cannot exceed {MAX_TOKEN_TTL_SECS}"
            )));
        }

        if self.max_upload_mb == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        if matches!(&self.token_secret, Some(secret) if secret.is_empty()) {
            return Err(ConfigError::Invalid("token_secret cannot be empty".into()));
        }

        Ok(())
    }

    /// Get host and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get token lifetime as Duration
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}

/// Path of the server config file
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Path of the users file
pub fn users_path() -> PathBuf {
    env::var_os(USERS_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_USERS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_fill_missing_settings() {
        let (_dir, path) = write_config(r#"{"storages": []}"#);
        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.url_prefix, "/fs");
        assert_eq!(config.token_ttl(), Duration::from_secs(8 * 60 * 60));
        assert_eq!(config.max_upload_bytes(), 100 * 1024 * 1024);
        assert!(config.token_secret.is_none());
    }

    #[test]
    fn storages_decode_permission_rules() {
        let (_dir, path) = write_config(
            r#"{
                "url_prefix": "/api/",
                "storages": [
                    {"name": "docs", "path": "/srv/docs", "read_permissions": "all", "write_permissions": "Editors"},
                    {"name": "vault", "path": "/srv/vault"}
                ]
            }"#,
        );
        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.url_prefix, "/api");
        assert_eq!(
            config.storages,
            vec![
                StorageConfig {
                    name: "docs".into(),
                    path: "/srv/docs".into(),
                    read_permissions: PermissionRule::All,
                    write_permissions: PermissionRule::Group("Editors".into()),
                },
                StorageConfig {
                    name: "vault".into(),
                    path: "/srv/vault".into(),
                    read_permissions: PermissionRule::None,
                    write_permissions: PermissionRule::None,
                },
            ]
        );
    }

    #[test]
    fn invalid_values_fail_at_load() {
        let (_dir, path) = write_config(r#"{"port": 0}"#);
        assert!(matches!(
            ServerConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        let (_dir, path) = write_config(r#"{"url_prefix": "fs"}"#);
        assert!(ServerConfig::load_from(&path).is_err());

        let (_dir, path) = write_config(
            r#"{"storages": [{"name": "docs", "path": "/srv", "read_permissions": ""}]}"#,
        );
        assert!(ServerConfig::load_from(&path).is_err());
    }

    #[test]
    fn token_lifetime_is_capped() {
        let (_dir, path) = write_config(&format!(r#"{{"token_ttl_secs": {MAX_TOKEN_TTL_SECS}}}"#));
        let config = ServerConfig::load_from(&path).unwrap();
        assert_eq!(config.token_ttl(), Duration::from_secs(MAX_TOKEN_TTL_SECS));

        let (_dir, path) =
            write_config(&format!(r#"{{"token_ttl_secs": {}}}"#, MAX_TOKEN_TTL_SECS + 1));
        assert!(matches!(
            ServerConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        let (_dir, path) = write_config(&format!(r#"{{"token_ttl_secs": {}}}"#, u64::MAX));
        assert!(ServerConfig::load_from(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ServerConfig::load_from(&dir.path().join("absent.json")),
            Err(ConfigError::Load(_))
        ));
    }
}
