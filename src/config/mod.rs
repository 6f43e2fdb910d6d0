// ABOUTME: Configuration module organization for the clipscript backend
// ABOUTME: Environment-only configuration, no config files
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management for the service

/// Environment-based server configuration
pub mod environment;

pub use environment::ServerConfig;
