//! MCP error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving a tool-provider process.
///
/// Every variant except [`McpError::Configuration`] and
/// [`McpError::AllTransportsFailed`] is recoverable at the provider level: the
/// provider moves on to the next transport candidate.
#[derive(Debug, Error, Clone)]
pub enum McpError {
    /// No usable command configured
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Malformed frame or stream closed mid-frame
    #[error("Framing error: {message}")]
    Framing { message: String },

    /// Deadline elapsed while waiting for bytes or a matching response
    #[error("{}", timeout_message(.waiting_for, .after, .stderr))]
    Timeout {
        waiting_for: String,
        after: Duration,
        stderr: Option<String>,
    },

    /// The peer answered with a JSON-RPC error object
    #[error("{method} error {code}: {message}")]
    Peer {
        method: String,
        code: i64,
        message: String,
    },

    /// The peer answered, but the result is not shaped as expected
    #[error("{method} invalid result: {message}")]
    Shape { method: String, message: String },

    /// No advertised tool matches the requested capability
    #[error("no {capability} tool found in tools/list (peer offers: {offered})")]
    Resolution { capability: String, offered: String },

    /// Every argument candidate was rejected
    #[error("{tool} rejected all {attempts} argument shapes, last: {last}")]
    Negotiation {
        tool: String,
        attempts: usize,
        last: Box<McpError>,
    },

    /// Spawning the process or completing the handshake failed
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// I/O error on the process pipes
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON encoding/decoding error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Every transport candidate failed or the time budget ran out
    #[error(
        "{operation} failed on all transports ({attempts} attempts, {elapsed:?} of {budget:?} budget): {}",
        aggregate_cause(.last)
    )]
    AllTransportsFailed {
        operation: String,
        attempts: usize,
        elapsed: Duration,
        budget: Duration,
        last: Option<Box<McpError>>,
    },
}

fn timeout_message(waiting_for: &str, after: &Duration, stderr: &Option<String>) -> String {
    match stderr {
        Some(hint) => format!("MCP {} timeout after {:?} | stderr: {}", waiting_for, after, hint),
        None => format!("MCP {} timeout after {:?}", waiting_for, after),
    }
}

fn aggregate_cause(last: &Option<Box<McpError>>) -> String {
    match last {
        Some(err) => err.to_string(),
        None => "no attempt fit in the time budget".to_string(),
    }
}

impl McpError {
    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new Framing error
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Create a new Timeout error
    pub fn timeout(waiting_for: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            waiting_for: waiting_for.into(),
            after,
            stderr: None,
        }
    }

    /// Create a new Peer error
    pub fn peer(method: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self::Peer {
            method: method.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a new Shape error
    pub fn shape(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Create a new Resolution error
    pub fn resolution(capability: impl Into<String>, offered: &[String]) -> Self {
        Self::Resolution {
            capability: capability.into(),
            offered: if offered.is_empty() {
                "none".to_string()
            } else {
                offered.join(", ")
            },
        }
    }

    /// Create a new Negotiation error
    pub fn negotiation(tool: impl Into<String>, attempts: usize, last: McpError) -> Self {
        Self::Negotiation {
            tool: tool.into(),
            attempts,
            last: Box::new(last),
        }
    }

    /// Create a new Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Attach a stderr excerpt to a timeout error; other variants are unchanged
    pub fn with_stderr(mut self, hint: Option<String>) -> Self {
        if let Self::Timeout { stderr, .. } = &mut self {
            *stderr = hint.filter(|h| !h.is_empty());
        }
        self
    }

    /// Stable code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "MCP_CONFIGURATION",
            Self::Framing { .. } => "MCP_FRAMING",
            Self::Timeout { .. } => "MCP_TIMEOUT",
            Self::Peer { .. } => "MCP_PEER",
            Self::Shape { .. } => "MCP_SHAPE",
            Self::Resolution { .. } => "MCP_RESOLUTION",
            Self::Negotiation { .. } => "MCP_NEGOTIATION",
            Self::Connection { .. } => "MCP_CONNECTION",
            Self::Io { .. } => "MCP_IO",
            Self::Serialization { .. } => "MCP_SERIALIZATION",
            Self::AllTransportsFailed { .. } => "MCP_ALL_TRANSPORTS_FAILED",
        }
    }

    /// Whether the provider may move on to the next transport candidate
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Configuration { .. } | Self::AllTransportsFailed { .. }
        )
    }

    /// Whether the peer itself turned down a request, as opposed to the
    /// session breaking down. Only rejections move argument negotiation on.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Peer { .. } | Self::Shape { .. })
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
