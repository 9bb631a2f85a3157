//! Shared application state
//!
//! Everything request handlers need, built once at startup and shared by
//! reference between tasks.

use std::sync::Arc;

use log::warn;
use uuid::Uuid;

use crate::auth::{SessionManager, UserDirectory};
use crate::config::ServerConfig;
use crate::error::ConfigError;
use crate::storage::StorageRegistry;

#[derive(Clone)]
pub struct AppState {
    pub storages: Arc<StorageRegistry>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// Builds the registries and the session manager from loaded configuration.
    pub fn from_config(config: &ServerConfig, users: UserDirectory) -> Result<Self, ConfigError> {
        let storages = StorageRegistry::from_configs(&config.storages)?;

        let secret = match &config.token_secret {
            Some(secret) => secret.clone(),
            None => {
                warn!("No token_secret configured, sessions will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };

        let sessions = SessionManager::new(Arc::new(users), secret.as_bytes(), config.token_ttl());

        Ok(Self {
            storages: Arc::new(storages),
            sessions: Arc::new(sessions),
        })
    }
}
