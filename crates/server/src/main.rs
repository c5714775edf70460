//! shellcache server entry point.
//!
//! Loads configuration, opens the cache database, optionally installs the
//! current version, then serves MCP on stdio. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchClient, FetchConfig};
use shellcache_core::{AppConfig, CacheDb, Router, RouterOptions};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let options = RouterOptions::from_config(&config).context("validating configuration")?;

    let db = CacheDb::open(&config.db_path).await.context("opening cache database")?;
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let router = Arc::new(Router::new(options, Arc::new(db.clone()), Arc::new(network)));

    tracing::info!(version = %config.version, scope = %config.scope, db = %config.db_path.display(), "starting shellcache on stdio transport");

    if config.install_on_start {
        match router.install().await {
            Ok(report) => tracing::info!(seeded = report.seeded, state = report.state.as_str(), "installed on start"),
            Err(e) => tracing::warn!(error = %e, "install on start failed, requests pass through"),
        }
    }

    let handler = handler::ShellcacheServer::new(router);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    db.close().await?;
    Ok(())
}
