//! Re-framing an upstream event stream into [`NormalizedEvent`]s
//!
//! [`LineDecoder`] turns arbitrarily split body chunks into lines and
//! [`Normalizer`] maps each line to zero or more client events. Both are
//! plain state machines with no I/O so they can be driven from any byte source.

use crate::protocol::UpstreamChunk;
use crate::types::NormalizedEvent;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Lifecycle of one streaming completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Waiting for upstream response headers
    Connecting,
    /// Reading the upstream body
    Streaming,
    /// Finished normally
    Completed,
    /// Finished with an error event, or abandoned by the client
    Failed,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Splits a byte stream into newline-delimited lines
///
/// Bytes are buffered until a `\n` arrives, so multi-byte characters split
/// across chunks decode correctly. A `\r` before the `\n` is dropped.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Feed one body chunk, returning every line it completes
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.buffer[start..end]));
            start = end + 1;
        }

        self.buffer.drain(..start);
        lines
    }

    /// Flush a final unterminated line at end of body
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        let line = decode_line(&self.buffer);
        self.buffer.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Maps upstream lines to client events
#[derive(Debug)]
pub struct Normalizer {
    state: StreamState,
    terminal_sent: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            state: StreamState::Connecting,
            terminal_sent: false,
        }
    }
}

impl Normalizer {
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Upstream accepted the request; body lines follow
    pub fn connected(&mut self) {
        if self.state == StreamState::Connecting {
            self.state = StreamState::Streaming;
        }
    }

    /// Process one line
    ///
    /// Lines without the `data:` prefix are ignored. A chunk carrying a finish
    /// reason yields `Done(reason)` but does not complete the stream; only the
    /// `[DONE]` sentinel or end of body does.
    pub fn line(&mut self, line: &str) -> Vec<NormalizedEvent> {
        if self.state != StreamState::Streaming {
            return Vec::new();
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return Vec::new();
        };
        let payload = payload.trim();

        if payload == DONE_SENTINEL {
            self.state = StreamState::Completed;
            self.terminal_sent = true;
            return vec![NormalizedEvent::done(None)];
        }

        let chunk: UpstreamChunk = match serde_json::from_str(payload) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, data = %payload, "skipping unparseable stream chunk");
                return Vec::new();
            }
        };

        let mut events = Vec::new();

        if let Some(text) = chunk.content().filter(|text| !text.is_empty()) {
            events.push(NormalizedEvent::delta(text));
        }

        if let Some(reason) = chunk.finish_reason().filter(|reason| !reason.is_empty()) {
            self.terminal_sent = true;
            events.push(NormalizedEvent::done(Some(reason)));
        }

        events
    }

    /// Upstream body ended; returns the closing `Done` if none was sent yet
    pub fn finish(&mut self) -> Option<NormalizedEvent> {
        if self.state.is_terminal() {
            return None;
        }

        self.state = StreamState::Completed;

        if self.terminal_sent {
            None
        } else {
            self.terminal_sent = true;
            Some(NormalizedEvent::done(None))
        }
    }

    /// Transport failure mid-body; returns the single error event
    ///
    /// Once a `Done` has gone out the client already holds a finished
    /// answer, so a later failure completes the stream without an event.
    pub fn fail(&mut self, message: impl Into<String>) -> Option<NormalizedEvent> {
        if self.state.is_terminal() {
            return None;
        }

        if self.terminal_sent {
            self.state = StreamState::Completed;
            return None;
        }

        self.state = StreamState::Failed;
        Some(NormalizedEvent::error(message))
    }
}
