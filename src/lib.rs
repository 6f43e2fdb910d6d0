// ABOUTME: Main library entry point for the clipscript streaming chat backend
// ABOUTME: Wires prompt assembly, the Gemini provider, and the SSE relay into an axum HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # clipscript
//!
//! A streaming chat backend for a short-video script assistant. The service
//! assembles a system prompt from a static knowledge-base document and
//! per-request parameters (platform, persona, topic, duration), forwards the
//! conversation to Google Gemini, and relays the incremental token stream
//! back to the caller as Server-Sent Events.
//!
//! ## Architecture
//!
//! - **`knowledge`**: knowledge-base discovery and load-once caching
//! - **`prompt`**: pure system-prompt assembly from request parameters
//! - **`llm`**: Gemini provider with streaming completion support
//! - **`relay`**: converts the upstream token stream into a well-formed
//!   SSE event sequence (`start`, `token`*, `error`?, `end`)
//! - **`routes`**: HTTP handlers for liveness, health, and chat streaming
//! - **`server`**: router assembly and the serve loop
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use clipscript::config::environment::ServerConfig;
//! use clipscript::server::RelayServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     RelayServer::new(config).run().await
//! }
//! ```

/// Environment-based configuration management
pub mod config;

/// Unified error handling with `AppError` and `ErrorCode`
pub mod errors;

/// Knowledge-base file discovery and loading
pub mod knowledge;

/// LLM provider abstraction and the Gemini implementation
pub mod llm;

/// Logging configuration and structured logging setup
pub mod logging;

/// HTTP middleware (CORS)
pub mod middleware;

/// System prompt assembly
pub mod prompt;

/// The SSE streaming relay core
pub mod relay;

/// HTTP route handlers
pub mod routes;

/// Server state and serve loop
pub mod server;
