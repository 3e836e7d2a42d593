//! HTTP server command
//!
//! Resolves layered configuration, opens the pool and runs the API server
//! until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use enrollctl_server::{create_pool_with_options, run_server};

use crate::config::{FileConfig, Layer};

/// Arguments for the serve command
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config file and environment)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections (default: 10)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Seconds to wait for a free database connection (default: 5)
    #[arg(long)]
    pub acquire_timeout_secs: Option<u64>,
}

impl ServeArgs {
    /// Flags as the top configuration layer.
    fn layer(&self) -> Layer {
        Layer {
            bind: self.bind,
            cors_permissive: self.cors_permissive.then_some(true),
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let file = FileConfig::load(config_path)?;
    let config = Layer::from(file)
        .overlay(Layer::from_env()?)
        .overlay(args.layer())
        .resolve()?;

    tracing::info!(
        bind = %config.server.bind_addr,
        max_connections = config.pool.max_connections,
        "Starting enrollctl server"
    );

    let pool = create_pool_with_options(&config.database_url, config.pool)
        .await
        .context("Failed to create database pool")?;

    // Blocks until shutdown
    run_server(pool, config.server)
        .await
        .context("Server error")?;

    Ok(())
}
