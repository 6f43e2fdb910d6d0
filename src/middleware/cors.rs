// ABOUTME: CORS middleware configuration for HTTP API endpoints
// ABOUTME: Permissive by default, with an origin allow-list when a frontend URL is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ServerConfig;

/// Local development origins always present in the allow-list
const DEV_ORIGINS: &[&str] = &["http://localhost:8080", "http://127.0.0.1:8080"];

/// Configure CORS for the API
///
/// Without `FRONTEND_URL` the service allows any origin (development mode).
/// When a frontend URL is configured, the allow-list is that origin plus the
/// local development origins.
pub fn setup_cors(config: &ServerConfig) -> CorsLayer {
    let allow_origin = match &config.frontend_url {
        None => AllowOrigin::any(),
        Some(frontend) => {
            let origins: Vec<HeaderValue> = DEV_ORIGINS
                .iter()
                .copied()
                .chain(std::iter::once(frontend.as_str()))
                .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
                .collect();

            if origins.is_empty() {
                // Fallback to any if parsing failed
                AllowOrigin::any()
            } else {
                AllowOrigin::list(origins)
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("authorization"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("access-control-request-method"),
            HeaderName::from_static("access-control-request-headers"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
