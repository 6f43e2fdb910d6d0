// ABOUTME: HTTP middleware organization
// ABOUTME: Currently only the CORS layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP middleware for the API surface

/// CORS middleware configuration
pub mod cors;

pub use cors::setup_cors;
