// ABOUTME: Entry point for the clipscript backend server binary
// ABOUTME: Parses CLI arguments, initializes logging, loads config, and runs the server

// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Clipscript Server Binary
//!
//! Starts the streaming chat backend: loads configuration from the
//! environment, initializes logging, and serves the HTTP API.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use clipscript::config::environment::GEMINI_API_KEY_ENV;
use clipscript::config::ServerConfig;
use clipscript::logging;
use clipscript::server::RelayServer;

#[derive(Parser)]
#[command(name = "clipscript-server")]
#[command(about = "Streaming chat backend for short-video script generation")]
pub struct Args {
    /// Override HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where clap may not work properly
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args { port: None }
        }
    };

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }

    if !config.is_gemini_configured() {
        warn!(
            "{} not set, chat requests will fail until it is configured",
            GEMINI_API_KEY_ENV
        );
    }

    info!("Starting clipscript server: {}", config.summary());
    display_available_endpoints(config.http_port);

    RelayServer::new(config).run().await
}

/// Display the available API endpoints
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    info!("   Liveness:     GET  http://{host}:{port}/");
    info!("   Health Check: GET  http://{host}:{port}/api/health");
    info!("   Chat Stream:  POST http://{host}:{port}/api/chat/stream");
    info!("=== End of Endpoint List ===");
}
