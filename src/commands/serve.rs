//! `serve` subcommand: run the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, ConfigLoader};
use crate::debate::DebateEngine;
use crate::provider::OpenRouterClient;
use crate::server::DebateServer;
use crate::store::MemoryStore;

/// Overrides taken from the command line.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    Ok(loader.load()?)
}

/// Build the engine and serve until ctrl-c.
///
/// # Errors
///
/// Returns an error when the config file cannot be loaded or the server
/// fails to bind.
pub async fn serve(options: ServeOptions) -> anyhow::Result<()> {
    let mut config = load_config(options.config)?;
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }

    let provider = Arc::new(OpenRouterClient::new(&config.provider));
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(
        DebateEngine::new(store, provider).with_credential_env(config.provider.api_key_env.clone()),
    );

    let server = DebateServer::new(engine).with_config(config.server);
    let cancel = server.cancellation_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received ctrl-c, shutting down");
            cancel.cancel();
        }
    });

    server.run().await?;
    Ok(())
}
