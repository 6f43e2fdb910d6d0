// ABOUTME: Route module organization for the clipscript HTTP endpoints
// ABOUTME: Route definitions organized by domain with thin handler functions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route module for the clipscript backend
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the prompt, LLM, and relay layers.

/// Chat streaming routes
pub mod chat;
/// Liveness and health check routes
pub mod health;

/// Chat route handlers
pub use chat::ChatRoutes;
/// Health route handlers
pub use health::HealthRoutes;
