//! RAX Storage Server - Entry Point

use log::{error, info};

use rax_storage_server::Server;
use rax_storage_server::auth::UserDirectory;
use rax_storage_server::config::{ServerConfig, config_path, users_path};
use rax_storage_server::error::StartupError;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching storage server...");

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    info!("Loading config from {}", config_path().display());
    let config = ServerConfig::load()?;

    info!("Loading users from {}", users_path().display());
    let users = UserDirectory::load(&users_path())?;

    let server = Server::new(config, users).await?;
    server.start().await.map_err(StartupError::Serve)
}
