//! Incremental reader for JSON payloads carried in a server-sent-event body.
//!
//! Events are separated by a blank line. Only the first `data:` line of an
//! event is considered; other SSE fields are ignored. The `[DONE]` sentinel is
//! skipped and every other payload that parses as JSON replaces the previous
//! one, so the last complete message on the stream wins.

use serde_json::Value;

use crate::error::TransportError;

const DONE_SENTINEL: &str = "[DONE]";

/// Default cap on bytes held for a single unterminated event.
pub const DEFAULT_MAX_EVENT_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug)]
pub struct SseJsonReader {
    buf: Vec<u8>,
    last_payload: Option<Value>,
    max_event_bytes: usize,
}

impl Default for SseJsonReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENT_BYTES)
    }
}

impl SseJsonReader {
    pub fn new(max_event_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            last_payload: None,
            max_event_bytes,
        }
    }

    /// Feed the next chunk of the body, processing every complete event.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), TransportError> {
        // CRLF framing is folded to LF; JSON text cannot contain a raw CR
        // inside a string, so payloads are unaffected.
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        while let Some(pos) = find_double_newline(&self.buf) {
            let frame = self.buf.drain(..pos + 2).collect::<Vec<_>>();
            self.handle_event(&frame);
        }

        if self.buf.len() > self.max_event_bytes {
            return Err(TransportError::StreamOverflow {
                limit: self.max_event_bytes,
            });
        }
        Ok(())
    }

    /// Process any unterminated trailing event and return the last payload.
    pub fn finish(mut self) -> Result<Value, TransportError> {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            self.handle_event(&rest);
        }
        self.last_payload.ok_or(TransportError::NoPayload)
    }

    /// Most recent payload parsed so far.
    pub fn last_payload(&self) -> Option<&Value> {
        self.last_payload.as_ref()
    }

    fn handle_event(&mut self, frame: &[u8]) {
        let text = String::from_utf8_lossy(frame);
        let Some(data) = text
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("data:"))
        else {
            return;
        };

        let data = data.trim();
        if data.is_empty() || data == DONE_SENTINEL {
            return;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(v) => self.last_payload = Some(v),
            Err(e) => {
                tracing::warn!(
                    name: "mcp.sse.unparseable",
                    error = %e,
                    "Unable to parse SSE payload"
                );
            }
        }
    }
}

/// Find the position of a double newline in the buffer.
fn find_double_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}
