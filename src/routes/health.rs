// ABOUTME: Liveness and health check route handlers for service monitoring
// ABOUTME: Reports knowledge-base state, credential presence, and a best-effort upstream probe
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health check routes
//!
//! `GET /` is a dependency-free liveness payload. `GET /api/health` reports
//! the knowledge-base load state, whether a Gemini credential is configured,
//! and the result of a best-effort short-timeout upstream probe. The health
//! endpoint never fails outward: probe failures are reported as strings
//! inside the 200 envelope.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::knowledge;
use crate::llm::{ChatMessage, ChatRequest, GeminiProvider, LlmProvider};
use crate::server::AppState;

/// Timeout for the upstream connectivity probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the liveness and health check routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/api/health", get(health_handler))
            .with_state(state)
    }
}

/// Static liveness payload, no dependencies
async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "clipscript backend is running" }))
}

/// Health report; probe failures are stringified, so this always succeeds
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(build_health_report(&state).await)
}

/// Assemble the health payload, including the upstream probe result
async fn build_health_report(state: &AppState) -> Value {
    let kb_status = knowledge::status(&state.knowledge_base);
    let gemini_configured = state.config.is_gemini_configured();

    let gemini_test = match &state.config.gemini_api_key {
        Some(api_key) => probe_gemini(api_key, &state.config.model_name).await,
        None => "not_configured".to_owned(),
    };

    json!({
        "status": "ok",
        "kb_status": kb_status,
        "gemini_configured": gemini_configured,
        "gemini_test": gemini_test,
        "model_name": state.config.model_name,
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// Best-effort upstream connectivity probe with a short timeout
///
/// Failures are reported as strings, never raised.
async fn probe_gemini(api_key: &str, model_name: &str) -> String {
    let provider = GeminiProvider::new(api_key).with_default_model(model_name);
    let request = ChatRequest::new(vec![ChatMessage::user("test")]);

    match tokio::time::timeout(PROBE_TIMEOUT, provider.complete(&request)).await {
        Ok(Ok(response)) => {
            debug!(model = %response.model, "Gemini probe succeeded");
            if response.content.is_empty() {
                "failed".to_owned()
            } else {
                "working".to_owned()
            }
        }
        Ok(Err(e)) => format!("error: {e}"),
        Err(_) => "error: probe timed out".to_owned(),
    }
}
