// ABOUTME: Main server binary for the Emmaus discipleship platform API
// ABOUTME: Loads configuration, runs migrations, and serves the HTTP router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Emmaus Platform

//! # Emmaus Server
//!
//! ## Usage
//!
//! ```bash
//! # Start with environment defaults
//! cargo run --bin emmaus-server
//!
//! # Override the port and database
//! cargo run --bin emmaus-server -- --port 9000 --database-url sqlite:./data/emmaus.db
//! ```

use clap::Parser;
use emmaus_server::config::ServerConfig;
use emmaus_server::database::Database;
use emmaus_server::errors::{AppError, AppResult};
use emmaus_server::resources::ServerResources;
use emmaus_server::routes::build_router;
use emmaus_server::logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "emmaus-server",
    about = "Emmaus discipleship platform API server",
    version
)]
struct ServerArgs {
    /// HTTP port override
    #[arg(long)]
    port: Option<u16>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    logging::init();

    let args = ServerArgs::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(
        port = config.http_port,
        database = %config.database_url,
        "starting emmaus-server"
    );

    let database = Arc::new(Database::new(&config.database_url).await?);
    let resources = Arc::new(ServerResources::new(database, config.clone()));
    let router = build_router(resources);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

/// Resolve on Ctrl-C so in-flight requests can drain
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
