//! shellcache server entry point.
//!
//! Loads configuration, brings the configured shell generation up, then
//! serves MCP on stdio. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod context;
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
        version = %config.cache_version,
        store = ?config.store,
        "Starting shellcache server on stdio transport"
    );

    let context = context::ShellContext::open(config).await?;
    match context.start().await {
        Ok(events) => {
            for event in &events {
                tracing::info!(event = ?event, "lifecycle");
            }
        }
        Err(err) => tracing::warn!(error = %err, "no active generation, requests pass through"),
    }

    let handler = handler::ShellCacheServer::new(context);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
