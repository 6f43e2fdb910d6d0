// ABOUTME: Shared helpers for HTTP integration tests
// ABOUTME: Builds a test router and issues in-process requests via tower oneshot

// SPDX-License-Identifier: MIT OR Apache-2.0

// Each integration test binary compiles this module; not every binary uses
// every helper.
#![allow(dead_code)]

use axum::body::Body;
use axum::Router;
use http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use clipscript::config::environment::DEFAULT_MODEL;
use clipscript::config::ServerConfig;
use clipscript::server::RelayServer;

/// Configuration for tests: no credential, no knowledge base, ephemeral port
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        gemini_api_key: None,
        model_name: DEFAULT_MODEL.to_owned(),
        kb_path: None,
        frontend_url: None,
    }
}

/// Build the full application router for a configuration
pub fn test_app(config: ServerConfig) -> Router {
    RelayServer::new(config).router()
}

/// Issue a GET request and return the status plus parsed JSON body
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

/// Issue a POST request with a JSON body and return the status plus raw body
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}
