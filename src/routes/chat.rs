// ABOUTME: Chat streaming route handler wiring prompt assembly, history mapping, and the SSE relay
// ABOUTME: Validates the credential synchronously, then streams the model response as SSE events
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat streaming route
//!
//! `POST /api/chat/stream` builds the system prompt from the cached
//! knowledge base and request parameters, maps the caller-supplied history
//! onto provider roles, seeds a conversation, and relays the model's token
//! stream back as Server-Sent Events.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm::{ChatMessage, GeminiProvider, LlmProvider};
use crate::prompt::{build_system_prompt, PromptParams};
use crate::relay::{relay_events, sse_response};
use crate::server::AppState;

/// One caller-supplied history entry; the role is free-form text
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Conversation role ("user", "assistant", or "model"; others are dropped)
    pub role: String,
    /// Message content
    pub content: String,
}

/// Request body for the chat streaming endpoint
#[derive(Debug, Deserialize)]
pub struct ChatStreamRequest {
    /// The new user message (required)
    pub message: String,
    /// Target platform
    #[serde(default)]
    pub platform: Option<String>,
    /// Account positioning / persona
    #[serde(default)]
    pub profile: Option<String>,
    /// Prior conversation turns, in conversation order
    #[serde(default)]
    pub history: Option<Vec<IncomingMessage>>,
    /// Content topic
    #[serde(default)]
    pub topic: Option<String>,
    /// Style/formatting directive override
    #[serde(default)]
    pub style: Option<String>,
    /// Target script duration in seconds
    #[serde(default = "default_duration")]
    pub duration: Option<String>,
}

fn default_duration() -> Option<String> {
    Some("30".to_owned())
}

/// Map caller-supplied history onto provider messages
///
/// "user" maps to the user role; "assistant" and "model" map to the
/// assistant role; any other role value is dropped silently.
#[must_use]
pub fn map_history(history: &[IncomingMessage]) -> Vec<ChatMessage> {
    history
        .iter()
        .filter_map(|message| match message.role.as_str() {
            "user" => Some(ChatMessage::user(&message.content)),
            "assistant" | "model" => Some(ChatMessage::assistant(&message.content)),
            _ => None,
        })
        .collect()
}

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create the chat streaming route
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/api/chat/stream", post(stream_chat))
            .with_state(state)
    }
}

/// Stream a chat response as SSE events
///
/// A missing credential is the only synchronous failure: it returns a
/// structured HTTP 500 before any stream is opened. Once streaming starts,
/// upstream failures downgrade to in-band `error` events.
async fn stream_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatStreamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(api_key) = state.config.gemini_api_key.clone() else {
        return Err(AppError::config("Missing GEMINI_API_KEY in environment"));
    };

    if request.message.trim().is_empty() {
        return Err(AppError::invalid_input("message must not be empty"));
    }

    let params = PromptParams {
        platform: request.platform.as_deref(),
        profile: request.profile.as_deref(),
        topic: request.topic.as_deref(),
        style: request.style.as_deref(),
        duration: request.duration.as_deref(),
    };
    let system_prompt = build_system_prompt(&state.knowledge_base, &params);

    let history = request.history.unwrap_or_default();
    let mut seed = Vec::with_capacity(history.len() + 1);
    seed.push(ChatMessage::system(system_prompt));
    seed.extend(map_history(&history));

    info!(
        history_turns = seed.len() - 1,
        model = %state.config.model_name,
        "starting chat stream"
    );

    let provider = GeminiProvider::new(api_key).with_default_model(&state.config.model_name);
    let conversation = provider.start_conversation(seed);

    Ok(sse_response(relay_events(conversation.send(request.message))))
}
