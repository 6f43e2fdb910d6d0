// ABOUTME: Line-buffering SSE decoder for upstream LLM streaming responses
// ABOUTME: Handles partial lines across TCP boundaries and multiple events per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Upstream SSE Stream Decoding
//!
//! A line-buffering decoder for the Server-Sent-Events byte stream the
//! provider returns. Solves two correctness issues:
//!
//! 1. **Multiple events per TCP chunk**: when network buffers batch several
//!    SSE events into a single `bytes_stream()` chunk, all events are
//!    emitted, not just the first.
//! 2. **Partial JSON across TCP boundaries**: when a payload is split across
//!    two chunks, the line buffer accumulates data until a complete line
//!    arrives.
//!
//! The provider supplies a `parse_data` closure converting raw `data:`
//! payloads into [`StreamChunk`] values; returning `None` skips the payload
//! (malformed upstream data is tolerated per payload, never fatal).

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use super::{ChatStream, StreamChunk};
use crate::errors::AppError;

/// Line-buffering SSE parser that handles partial lines across chunk boundaries
///
/// SSE streams are newline-delimited, but TCP does not align network chunks
/// with event boundaries. The buffer holds incomplete lines as raw bytes and
/// emits a `data:` payload only once its terminating newline has arrived;
/// decoding to UTF-8 happens per complete line, so a multi-byte character
/// split across two chunks decodes intact.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty line buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes from a network chunk, returning any complete `data:` payloads
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(payload) = extract_data_payload(line.trim_end()) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Drain any trailing unterminated line after the stream ends
    pub fn flush(&mut self) -> Option<String> {
        let remainder = std::mem::take(&mut self.buffer);
        extract_data_payload(String::from_utf8_lossy(&remainder).trim_end())
    }
}

/// Strip the `data:` prefix from an SSE line, skipping comments and blank lines
fn extract_data_payload(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        None
    } else {
        Some(data.to_owned())
    }
}

/// Decode an upstream SSE byte stream into a [`ChatStream`]
///
/// `parse_data` converts each complete `data:` payload into a chunk;
/// returning `None` skips the payload. Transport errors terminate the
/// stream with a single `Err` item.
pub fn decode_sse_stream<S, F>(bytes: S, mut parse_data: F, provider: &'static str) -> ChatStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    F: FnMut(&str) -> Option<StreamChunk> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut buffer = SseLineBuffer::new();
        futures_util::pin_mut!(bytes);

        while let Some(next) = bytes.next().await {
            match next {
                Ok(chunk) => {
                    for payload in buffer.feed(&chunk) {
                        if let Some(parsed) = parse_data(&payload) {
                            yield Ok(parsed);
                        }
                    }
                }
                Err(e) => {
                    yield Err(AppError::external_service(provider, format!("stream error: {e}")));
                    return;
                }
            }
        }

        if let Some(payload) = buffer.flush() {
            if let Some(parsed) = parse_data(&payload) {
                yield Ok(parsed);
            }
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_multiple_events_in_one_chunk() {
        let mut buffer = SseLineBuffer::new();
        let payloads = buffer.feed(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(payloads, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn test_feed_partial_line_across_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(b"data: {\"text\":\"hel").is_empty());
        let payloads = buffer.feed(b"lo\"}\n\n");
        assert_eq!(payloads, vec![r#"{"text":"hello"}"#]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let line = "data: 你好\n".as_bytes();
        // byte 8 falls inside the three-byte encoding of 你
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(&line[..8]).is_empty());
        let payloads = buffer.feed(&line[8..]);
        assert_eq!(payloads, vec!["你好"]);
    }

    #[test]
    fn test_non_data_lines_skipped() {
        let mut buffer = SseLineBuffer::new();
        let payloads = buffer.feed(b": keep-alive comment\nevent: message\ndata: payload\n");
        assert_eq!(payloads, vec!["payload"]);
    }

    #[test]
    fn test_flush_unterminated_trailing_line() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(b"data: tail").is_empty());
        assert_eq!(buffer.flush(), Some("tail".to_owned()));
        assert_eq!(buffer.flush(), None);
    }
}
