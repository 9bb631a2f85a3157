use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::any;
use log::info;
use tokio::net::TcpListener;

use crate::auth::UserDirectory;
use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::middleware::logging::log_request;
use crate::protocol::{handle_fs_request, handle_login, handle_logout};
use crate::server::state::AppState;

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Builds the application state and binds the listener.
    pub async fn new(config: ServerConfig, users: UserDirectory) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config, users)?;
        for name in state.storages.names() {
            info!("Serving storage {name}");
        }

        let addr = config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| StartupError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server bound to {}", addr);

        Ok(Self {
            listener,
            router: build_router(state, &config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn start(self) -> std::io::Result<()> {
        info!("Starting storage server on {}", self.local_addr()?);
        axum::serve(self.listener, self.router).await
    }
}

/// Routes every endpoint under the configured URL prefix.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let prefix = &config.url_prefix;

    Router::new()
        .route(&format!("{prefix}/login"), any(handle_login))
        .route(&format!("{prefix}/logout"), any(handle_logout))
        .route(&format!("{prefix}/*target"), any(handle_fs_request))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
