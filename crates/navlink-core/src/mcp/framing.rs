//! Wire framing for MCP messages
//!
//! Tool providers disagree on how JSON-RPC messages are delimited on stdio.
//! Two framings are supported:
//!
//! - **Length-prefixed**: `Content-Length: <N>\r\n\r\n` followed by exactly
//!   `N` bytes of UTF-8 JSON (the LSP convention).
//! - **Line-delimited**: one compact JSON object per `\n`-terminated line.
//!
//! [`FrameDecoder`] is a pure buffer: bytes go in through [`FrameDecoder::push`]
//! and complete frames come out of [`FrameDecoder::next_frame`].
//! [`read_frame`] drives it from a transport under a deadline.

use super::error::McpError;
use super::transport::{McpTransport, ReadOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::time::Instant;
use tracing::trace;

/// Separator between the header block and the body
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Largest header block accepted before giving up on the stream
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Largest body accepted, declared or buffered
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// How messages are delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framing {
    /// One JSON object per line
    LineDelimited,
    /// `Content-Length` header, blank line, body
    LengthPrefixed,
}

impl Framing {
    /// Kebab-case name used in configuration and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineDelimited => "line-delimited",
            Self::LengthPrefixed => "length-prefixed",
        }
    }
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a message into its wire representation
pub fn encode<T: Serialize + ?Sized>(message: &T, framing: Framing) -> Result<Vec<u8>, McpError> {
    let body = serde_json::to_vec(message)?;

    let bytes = match framing {
        Framing::LineDelimited => {
            let mut out = Vec::with_capacity(body.len() + 1);
            out.extend_from_slice(&body);
            out.push(b'\n');
            out
        }
        Framing::LengthPrefixed => {
            let header = format!("Content-Length: {}\r\n\r\n", body.len());
            let mut out = Vec::with_capacity(header.len() + body.len());
            out.extend_from_slice(header.as_bytes());
            out.extend_from_slice(&body);
            out
        }
    };

    Ok(bytes)
}

/// Incremental decoder for one framing
#[derive(Debug)]
pub struct FrameDecoder {
    framing: Framing,
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no newline
    scanned: usize,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    /// Framing this decoder understands
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Bytes received but not yet consumed by a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append bytes read from the peer
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// What a read is currently blocked on, for timeout messages
    pub fn waiting_for(&self) -> &'static str {
        match self.framing {
            Framing::LineDelimited => "line read",
            Framing::LengthPrefixed => {
                if find(&self.buffer, HEADER_TERMINATOR).is_some() {
                    "body read"
                } else {
                    "header read"
                }
            }
        }
    }

    /// Take the next complete frame out of the buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<Map<String, Value>>, McpError> {
        match self.framing {
            Framing::LineDelimited => self.next_line_frame(),
            Framing::LengthPrefixed => self.next_length_prefixed_frame(),
        }
    }

    fn next_line_frame(&mut self) -> Result<Option<Map<String, Value>>, McpError> {
        loop {
            let newline = self.buffer[self.scanned..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.scanned + offset);
            let Some(newline) = newline else {
                self.scanned = self.buffer.len();
                if self.buffer.len() > MAX_FRAME_BYTES {
                    return Err(McpError::framing(format!(
                        "line exceeds {} bytes without a newline",
                        MAX_FRAME_BYTES
                    )));
                }
                return Ok(None);
            };

            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.scanned = 0;
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            return parse_object(text.as_bytes(), "ndjson").map(Some);
        }
    }

    fn next_length_prefixed_frame(&mut self) -> Result<Option<Map<String, Value>>, McpError> {
        let Some(header_end) = find(&self.buffer, HEADER_TERMINATOR) else {
            if self.buffer.len() > MAX_HEADER_BYTES {
                return Err(McpError::framing(format!(
                    "no header terminator within {} bytes",
                    MAX_HEADER_BYTES
                )));
            }
            return Ok(None);
        };

        let length = content_length(&self.buffer[..header_end])?;
        let body_start = header_end + HEADER_TERMINATOR.len();
        if self.buffer.len() - body_start < length {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..body_start + length).collect();
        parse_object(&frame[body_start..], "content-length").map(Some)
    }
}

/// Read the declared body length out of a header block
fn content_length(header: &[u8]) -> Result<usize, McpError> {
    let header = String::from_utf8_lossy(header);

    let declared = header.split("\r\n").find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().to_string())
    });

    let Some(declared) = declared else {
        return Err(McpError::framing("missing Content-Length header"));
    };

    match declared.parse::<i64>() {
        Ok(n) if n <= 0 => Err(McpError::framing(format!(
            "invalid MCP frame content-length: {}",
            n
        ))),
        Ok(n) if n as u64 > MAX_FRAME_BYTES as u64 => Err(McpError::framing(format!(
            "declared content-length {} exceeds {} bytes",
            n, MAX_FRAME_BYTES
        ))),
        Ok(n) => Ok(n as usize),
        Err(_) => Err(McpError::framing(format!(
            "invalid MCP frame content-length: {:?}",
            declared
        ))),
    }
}

fn parse_object(bytes: &[u8], framing: &str) -> Result<Map<String, Value>, McpError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(obj)) => Ok(obj),
        Ok(other) => Err(McpError::framing(format!(
            "invalid MCP {} payload: expected a JSON object, got {}",
            framing,
            json_kind(&other)
        ))),
        Err(e) => Err(McpError::framing(format!(
            "invalid MCP {} payload: {}",
            framing, e
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one frame from `transport`, failing once `deadline` passes.
///
/// Bytes beyond the frame stay buffered in `decoder` for the next call.
pub async fn read_frame(
    transport: &mut dyn McpTransport,
    decoder: &mut FrameDecoder,
    deadline: Instant,
) -> Result<Map<String, Value>, McpError> {
    let started = Instant::now();

    loop {
        if let Some(frame) = decoder.next_frame()? {
            trace!(framing = %decoder.framing(), "decoded frame");
            return Ok(frame);
        }

        let now = Instant::now();
        if now >= deadline {
            let hint = transport.error_hint().await;
            return Err(McpError::timeout(decoder.waiting_for(), now - started).with_stderr(hint));
        }

        match transport.read_available(deadline - now).await? {
            ReadOutcome::Data(bytes) => decoder.push(&bytes),
            ReadOutcome::Idle => {}
            ReadOutcome::Closed => {
                let hint = transport.error_hint().await;
                let mut message = if decoder.buffered() > 0 {
                    format!(
                        "MCP server closed stdout mid-frame ({} bytes buffered)",
                        decoder.buffered()
                    )
                } else {
                    "MCP server closed stdout".to_string()
                };
                if let Some(hint) = hint {
                    message.push_str(" | stderr: ");
                    message.push_str(&hint);
                }
                return Err(McpError::framing(message));
            }
        }
    }
}
