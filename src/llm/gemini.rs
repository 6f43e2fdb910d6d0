// ABOUTME: Google Gemini LLM provider implementation with streaming support
// ABOUTME: Talks to the Generative Language API for one-shot and streaming completions
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Gemini Provider
//!
//! Implementation of the [`LlmProvider`] trait for Google's Gemini models.
//!
//! ## Configuration
//!
//! Set the `GEMINI_API_KEY` environment variable with an API key from
//! Google AI Studio. The default model is `gemini-2.5-flash`; override it
//! per provider with [`GeminiProvider::with_default_model`].

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::stream::decode_sse_stream;
use super::{ChatMessage, ChatRequest, ChatResponse, ChatStream, LlmProvider, MessageRole, StreamChunk};
use crate::config::environment::{DEFAULT_MODEL, GEMINI_API_KEY_ENV};
use crate::errors::{AppError, ErrorCode};

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

/// Content structure for the Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

/// Part of a content block; `text` is absent for metadata-only parts
#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Streaming response chunk
#[derive(Debug, Deserialize)]
struct StreamingResponse {
    candidates: Option<Vec<Candidate>>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            AppError::config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Convert our message role to Gemini's role format
    ///
    /// System messages are handled separately via the `system_instruction`
    /// field, but if one appears here, map it to "user" for compatibility.
    const fn convert_role(role: MessageRole) -> &'static str {
        match role {
            MessageRole::System | MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }

    /// Build the API URL for a model and method
    fn build_url(&self, model: &str, method: &str) -> String {
        format!(
            "{API_BASE_URL}/models/{model}:{method}?key={}",
            self.api_key
        )
    }

    /// Convert chat messages to Gemini format
    ///
    /// System messages are lifted into the separate `system_instruction`
    /// field; the last one wins if several appear.
    fn convert_messages(messages: &[ChatMessage]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in messages {
            let part = ContentPart {
                text: Some(message.content.clone()),
            };
            if message.role == MessageRole::System {
                system_instruction = Some(GeminiContent {
                    role: None,
                    parts: vec![part],
                });
            } else {
                contents.push(GeminiContent {
                    role: Some(Self::convert_role(message.role).to_owned()),
                    parts: vec![part],
                });
            }
        }

        (contents, system_instruction)
    }

    /// Build a Gemini API request from a [`ChatRequest`]
    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);
        GeminiRequest {
            contents,
            system_instruction,
        }
    }

    /// Extract the first text part from a non-streaming response
    fn extract_content(response: &GeminiResponse) -> Result<String, AppError> {
        response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or_else(|| AppError::internal("No content in Gemini response"))
    }

    /// Map an API error status to the appropriate error type
    ///
    /// For rate limit (429) errors, exposes a user-friendly message
    /// extracted from the provider's quota response.
    fn map_api_error(status: u16, response_text: &str) -> AppError {
        let message = serde_json::from_str::<GeminiResponse>(response_text)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| response_text.to_owned(), |e| e.message);

        if status == 429 {
            AppError::new(
                ErrorCode::ExternalRateLimited,
                Self::extract_quota_message(&message),
            )
        } else {
            AppError::external_service("Gemini", format!("API error ({status}): {message}"))
        }
    }

    /// Extract a user-friendly quota message from a Gemini rate-limit error
    ///
    /// Looks for "Please retry in X" (e.g. "Please retry in 6.406453963s.")
    /// and surfaces the wait time in whole seconds.
    fn extract_quota_message(message: &str) -> String {
        if let Some(retry_pos) = message.find("Please retry in ") {
            let after_prefix = &message[retry_pos + 16..];
            if let Some(s_pos) = after_prefix.find('s') {
                if let Ok(seconds) = after_prefix[..s_pos].parse::<f64>() {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let seconds_int = seconds.ceil() as u64;
                    return format!(
                        "AI service quota exceeded. Please try again in {seconds_int} seconds."
                    );
                }
            }
        }
        "AI service quota exceeded. Please wait a moment and try again.".to_owned()
    }

    /// Parse one streaming `data:` payload into a [`StreamChunk`]
    ///
    /// Malformed payloads are logged and skipped; chunks without a text
    /// part yield `StreamChunk { text: None }` for the relay to skip.
    fn parse_stream_payload(payload: &str) -> Option<StreamChunk> {
        match serde_json::from_str::<StreamingResponse>(payload) {
            Ok(response) => {
                let text = response
                    .candidates
                    .as_ref()
                    .and_then(|c| c.first())
                    .and_then(|c| c.content.as_ref())
                    .and_then(|c| c.parts.first())
                    .and_then(|p| p.text.clone());
                Some(StreamChunk { text })
            }
            Err(e) => {
                warn!(error = %e, "failed to parse Gemini streaming chunk, skipping");
                None
            }
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, "generateContent");

        let gemini_request = Self::build_gemini_request(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::external_service("Gemini", format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AppError::external_service("Gemini", format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::map_api_error(status.as_u16(), &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::internal(format!("Failed to parse Gemini response: {e}"))
            })?;

        if let Some(error) = gemini_response.error {
            return Err(AppError::external_service("Gemini", error.message));
        }

        let content = Self::extract_content(&gemini_response)?;

        debug!("Successfully received Gemini response");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
        })
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, "streamGenerateContent");

        let gemini_request = Self::build_gemini_request(request);

        debug!("Starting streaming request to Gemini API");

        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::external_service("Gemini", format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Self::map_api_error(status.as_u16(), &error_text));
        }

        Ok(decode_sse_stream(
            response.bytes_stream(),
            |payload| Self::parse_stream_payload(payload),
            "Gemini",
        ))
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_configured_default_model() {
        let provider = GeminiProvider::new("key");
        assert_eq!(provider.default_model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_convert_role() {
        assert_eq!(GeminiProvider::convert_role(MessageRole::User), "user");
        assert_eq!(GeminiProvider::convert_role(MessageRole::System), "user");
        assert_eq!(GeminiProvider::convert_role(MessageRole::Assistant), "model");
    }

    #[test]
    fn test_convert_messages_lifts_system_instruction() {
        let messages = vec![
            ChatMessage::system("rules"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let (contents, system) = GeminiProvider::convert_messages(&messages);

        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role.as_deref(), Some("user"));
        assert_eq!(contents[1].role.as_deref(), Some("model"));

        let system = system.expect("system instruction should be set");
        assert_eq!(system.parts[0].text.as_deref(), Some("rules"));
    }

    #[test]
    fn test_parse_stream_payload_extracts_text() {
        let payload = r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}],"role":"model"}}]}"#;
        let chunk = GeminiProvider::parse_stream_payload(payload).unwrap();
        assert_eq!(chunk.text.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_parse_stream_payload_metadata_only() {
        let payload = r#"{"candidates":[{"content":{"parts":[{}],"role":"model"}}]}"#;
        let chunk = GeminiProvider::parse_stream_payload(payload).unwrap();
        assert_eq!(chunk.text, None);
    }

    #[test]
    fn test_parse_stream_payload_malformed_skipped() {
        assert!(GeminiProvider::parse_stream_payload("not json at all").is_none());
    }

    #[test]
    fn test_quota_message_extraction() {
        let message = "Quota exceeded for requests. Please retry in 6.406453963s.";
        assert_eq!(
            GeminiProvider::extract_quota_message(message),
            "AI service quota exceeded. Please try again in 7 seconds."
        );
        assert_eq!(
            GeminiProvider::extract_quota_message("something else"),
            "AI service quota exceeded. Please wait a moment and try again."
        );
    }

    #[test]
    fn test_map_api_error_rate_limited() {
        let error = GeminiProvider::map_api_error(429, r#"{"error":{"message":"quota"}}"#);
        assert_eq!(error.code, ErrorCode::ExternalRateLimited);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let provider = GeminiProvider::new("super-secret");
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
