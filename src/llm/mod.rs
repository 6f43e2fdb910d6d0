// ABOUTME: LLM provider abstraction layer for pluggable model integration
// ABOUTME: Defines the provider contract, message types, and per-request conversation handles
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # LLM Provider Interface
//!
//! The contract a model provider implements to power the chat endpoint.
//! A provider can complete a request in one shot (used by the health probe)
//! or return a lazy token stream (used by the SSE relay).
//!
//! Conversations are explicit per-request values: a [`Conversation`] is
//! created from an immutable seed history and consumed by sending one user
//! message. No hidden mutable session is shared across requests.

mod gemini;
/// Upstream SSE byte-stream decoding
pub mod stream;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::errors::AppError;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier; `None` uses the provider default
    pub model: Option<String>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from a non-streaming chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated message content
    pub content: String,
    /// Model used for generation
    pub model: String,
}

/// One incremental unit of generated text from a streaming completion
///
/// `text` is absent for chunks carrying no displayable content
/// (metadata-only chunks); the relay skips those silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Content delta for this chunk, if any
    pub text: Option<String>,
}

/// Stream type for chat completion responses
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AppError>> + Send>>;

/// LLM provider trait for chat completion
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g. "gemini")
    fn name(&self) -> &'static str;

    /// Default model to use when the request names none
    fn default_model(&self) -> &str;

    /// Perform a chat completion (non-streaming)
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError>;

    /// Perform a streaming chat completion
    ///
    /// The returned stream is lazily produced; each chunk is fetched from
    /// the upstream provider on demand.
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError>;

    /// Start a stateful conversation from a seed history
    ///
    /// The provider is moved into the handle so the resulting conversation
    /// (and any stream it produces) is free of borrowed state.
    fn start_conversation(self, seed: Vec<ChatMessage>) -> Conversation<Self>
    where
        Self: Sized,
    {
        Conversation {
            provider: self,
            history: seed,
        }
    }
}

/// A per-request conversation handle: an immutable seed history plus the
/// provider that will serve it
#[derive(Debug)]
pub struct Conversation<P: LlmProvider> {
    provider: P,
    history: Vec<ChatMessage>,
}

impl<P: LlmProvider> Conversation<P> {
    /// Send one user message and return the provider's token stream
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream request cannot be started.
    pub async fn send(mut self, message: impl Into<String> + Send) -> Result<ChatStream, AppError> {
        self.history.push(ChatMessage::user(message));
        let request = ChatRequest::new(self.history);
        self.provider.complete_stream(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    /// Stub provider that records the request it receives
    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-1"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
            Ok(ChatResponse {
                content: format!("{} messages", request.messages.len()),
                model: "echo-1".to_owned(),
            })
        }

        async fn complete_stream(&self, request: &ChatRequest) -> Result<ChatStream, AppError> {
            let roles: Vec<_> = request
                .messages
                .iter()
                .map(|m| {
                    Ok(StreamChunk {
                        text: Some(m.role.as_str().to_owned()),
                    })
                })
                .collect();
            Ok(Box::pin(tokio_stream::iter(roles)))
        }
    }

    #[tokio::test]
    async fn test_conversation_appends_user_turn_to_seed() {
        let seed = vec![ChatMessage::system("sys"), ChatMessage::assistant("prev")];
        let conversation = EchoProvider.start_conversation(seed);

        let stream = conversation.send("hello").await.unwrap();
        let roles: Vec<_> = stream
            .map(|chunk| chunk.unwrap().text.unwrap())
            .collect()
            .await;

        assert_eq!(roles, vec!["system", "assistant", "user"]);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(MessageRole::User.as_str(), "user");
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, r#""assistant""#);
    }
}
