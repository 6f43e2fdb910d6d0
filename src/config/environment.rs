// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed ServerConfig at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration management
//!
//! All runtime configuration comes from environment variables, loaded once
//! at startup. There are no configuration files.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Environment variable for the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable for the model identifier
pub const GEMINI_MODEL_ENV: &str = "GEMINI_MODEL";

/// Environment variable overriding the knowledge-base file path
pub const KB_PATH_ENV: &str = "KB_PATH";

/// Environment variable for the frontend origin added to the CORS allow-list
pub const FRONTEND_URL_ENV: &str = "FRONTEND_URL";

/// Environment variable for the HTTP listen port
pub const PORT_ENV: &str = "PORT";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Gemini API credential; `None` means the chat endpoint is degraded
    pub gemini_api_key: Option<String>,
    /// Model identifier passed to the provider
    pub model_name: String,
    /// Explicit knowledge-base file path override
    pub kb_path: Option<PathBuf>,
    /// Frontend origin added to the CORS allow-list
    pub frontend_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(PORT_ENV) {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("{PORT_ENV} must be a valid port number, got {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let gemini_api_key = env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty());

        let model_name = env::var(GEMINI_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned());

        let kb_path = env::var(KB_PATH_ENV).ok().map(PathBuf::from);

        let frontend_url = env::var(FRONTEND_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty());

        Ok(Self {
            http_port,
            gemini_api_key,
            model_name,
            kb_path,
            frontend_url,
        })
    }

    /// Whether a Gemini credential is configured
    #[must_use]
    pub fn is_gemini_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    /// One-line configuration summary safe for logging (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} model={} gemini_configured={} kb_override={} frontend_url={}",
            self.http_port,
            self.model_name,
            self.is_gemini_configured(),
            self.kb_path
                .as_ref()
                .map_or_else(|| "none".to_owned(), |p| p.display().to_string()),
            self.frontend_url.as_deref().unwrap_or("none"),
        )
    }
}
