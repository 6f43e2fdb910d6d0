// ABOUTME: HTTP integration tests for the liveness and health endpoints
// ABOUTME: Exercises the full router in-process without a live upstream

// SPDX-License-Identifier: MIT OR Apache-2.0

mod common;

use chrono::DateTime;
use http::StatusCode;

use common::{get_json, test_app, test_config};

#[tokio::test]
async fn test_root_returns_liveness_message() {
    let (status, body) = get_json(test_app(test_config()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "clipscript backend is running");
}

#[tokio::test]
async fn test_health_without_credential() {
    let (status, body) = get_json(test_app(test_config()), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["gemini_configured"], false);
    assert_eq!(body["gemini_test"], "not_configured");
    assert_eq!(body["model_name"], "gemini-2.5-flash");
}

#[tokio::test]
async fn test_health_reports_kb_not_found_without_file() {
    let (_, body) = get_json(test_app(test_config()), "/api/health").await;
    assert_eq!(body["kb_status"], "not_found");
}

#[tokio::test]
async fn test_health_reports_kb_loaded_with_file() {
    let path = std::env::temp_dir().join("clipscript_health_kb_test.txt");
    std::fs::write(&path, "kb content").unwrap();

    let mut config = test_config();
    config.kb_path = Some(path.clone());
    let (_, body) = get_json(test_app(config), "/api/health").await;

    assert_eq!(body["kb_status"], "loaded");
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_health_timestamp_is_rfc3339() {
    let (_, body) = get_json(test_app(test_config()), "/api/health").await;

    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = common::post_json(
        test_app(test_config()),
        "/api/unknown",
        &serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
