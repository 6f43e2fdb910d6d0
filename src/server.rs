// ABOUTME: HTTP server assembly binding routes, middleware, and shared state
// ABOUTME: Loads the knowledge base once at startup and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server for the clipscript backend
//!
//! Assembles the router from the route modules, layers CORS and request
//! tracing, and serves on the configured port. The knowledge base is loaded
//! once at construction and shared read-only through [`AppState`].

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::knowledge;
use crate::middleware::setup_cors;
use crate::routes::{ChatRoutes, HealthRoutes};

/// Shared application state available to all route handlers
pub struct AppState {
    /// Server configuration loaded at startup
    pub config: ServerConfig,
    /// Cached knowledge-base document; empty when no file was found
    pub knowledge_base: String,
}

/// The streaming relay server
pub struct RelayServer {
    state: Arc<AppState>,
}

impl RelayServer {
    /// Create a new server, loading the knowledge base from disk
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let knowledge_base = knowledge::load(config.kb_path.as_deref());

        Self {
            state: Arc::new(AppState {
                config,
                knowledge_base,
            }),
        }
    }

    /// Build the complete router with middleware layers applied
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .merge(HealthRoutes::routes(self.state.clone()))
            .merge(ChatRoutes::routes(self.state.clone()))
            .layer(setup_cors(&self.state.config))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the listen socket and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails.
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(
            addr = %addr,
            kb_status = knowledge::status(&self.state.knowledge_base),
            "clipscript server listening"
        );

        axum::serve(listener, self.router())
            .await
            .context("HTTP server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::DEFAULT_MODEL;

    fn test_config() -> ServerConfig {
        ServerConfig {
            http_port: 0,
            gemini_api_key: None,
            model_name: DEFAULT_MODEL.to_owned(),
            kb_path: None,
            frontend_url: None,
        }
    }

    #[test]
    fn test_router_builds_without_credential() {
        let server = RelayServer::new(test_config());
        let _router = server.router();
    }
}
