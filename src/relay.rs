// ABOUTME: The streaming relay core converting an upstream token stream into SSE events
// ABOUTME: Guarantees the event grammar: one start, zero or more tokens, at most one error, one end
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Streaming Relay
//!
//! Converts a lazy upstream token stream into a well-formed Server-Sent-Events
//! sequence without ever leaving the transport in a malformed or
//! permanently-open state.
//!
//! Event grammar, enforced per stream:
//! - exactly one `start`, emitted before the upstream request is made
//! - zero or more `token` events, one per non-empty text chunk
//! - at most one `error` event, emitted in-band on the first failure
//! - exactly one terminal `end`, emitted unconditionally
//!
//! Once `start` has gone out, every failure downgrades to an in-band `error`
//! event followed by `end`; the HTTP stream itself never aborts uncleanly.

use std::convert::Infallible;
use std::future::Future;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::errors::AppError;
use crate::llm::ChatStream;

/// A typed event on the outbound SSE stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SseEvent {
    /// The relay is live; emitted before any upstream call
    Start,
    /// One increment of generated text
    Token {
        /// The text delta
        content: String,
    },
    /// The upstream stream failed; at most one per stream
    Error {
        /// Human-readable failure description
        message: String,
    },
    /// Terminal event, always emitted last
    End,
}

/// Relay an upstream token stream as a sequence of [`SseEvent`]s
///
/// Takes a future resolving to the upstream stream so that `start` can be
/// emitted before the upstream request is made: a failure to start the
/// stream surfaces as an in-band `error` event, not a transport error.
///
/// Chunks with absent or empty text are skipped silently. The first stream
/// error stops consumption; `end` is yielded unconditionally.
pub fn relay_events<F>(upstream: F) -> impl Stream<Item = SseEvent> + Send
where
    F: Future<Output = Result<ChatStream, AppError>> + Send + 'static,
{
    async_stream::stream! {
        yield SseEvent::Start;

        match upstream.await {
            Ok(mut stream) => {
                let mut tokens = 0usize;
                loop {
                    match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Some(text) = chunk.text {
                                if !text.is_empty() {
                                    tokens += 1;
                                    yield SseEvent::Token { content: text };
                                }
                            }
                        }
                        Some(Err(e)) => {
                            debug!(tokens, error = %e, "upstream stream failed mid-flight");
                            yield SseEvent::Error {
                                message: e.to_string(),
                            };
                            break;
                        }
                        None => {
                            debug!(tokens, "upstream stream completed");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "upstream stream could not be started");
                yield SseEvent::Error {
                    message: e.to_string(),
                };
            }
        }

        yield SseEvent::End;
    }
}

/// Wrap an event stream as an axum SSE response
///
/// Each event is serialized to JSON and framed as `data: <json>\n\n` with
/// media type `text/event-stream`.
pub fn sse_response<S>(events: S) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send>
where
    S: Stream<Item = SseEvent> + Send + 'static,
{
    let frames = events.map(|event| {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| {
            r#"{"type":"error","message":"event serialization failed"}"#.to_owned()
        });
        Ok(Event::default().data(payload))
    });

    Sse::new(frames).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        assert_eq!(
            serde_json::to_value(SseEvent::Start).unwrap(),
            serde_json::json!({"type": "start"})
        );
        assert_eq!(
            serde_json::to_value(SseEvent::Token {
                content: "Hi".to_owned()
            })
            .unwrap(),
            serde_json::json!({"type": "token", "content": "Hi"})
        );
        assert_eq!(
            serde_json::to_value(SseEvent::Error {
                message: "boom".to_owned()
            })
            .unwrap(),
            serde_json::json!({"type": "error", "message": "boom"})
        );
        assert_eq!(
            serde_json::to_value(SseEvent::End).unwrap(),
            serde_json::json!({"type": "end"})
        );
    }
}
