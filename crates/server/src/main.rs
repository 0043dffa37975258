//! swcache server entry point.
//!
//! Loads configuration, opens the cache database, installs and activates the
//! worker, then serves MCP on stdio. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchClient, FetchConfig};
use swcache_core::{AppConfig, CacheDb, Network, ServiceWorker, WorkerHost};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        generation = %config.generation,
        db = %config.db_path.display(),
        "starting swcache server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(WorkerHost::new(ServiceWorker::new(config.worker_config()?, db, network)));

    tools::boot(&worker).await?;

    let handler = handler::SwCacheServer::new(worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
