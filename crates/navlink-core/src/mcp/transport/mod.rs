//! MCP transport layer implementations
//!
//! A transport moves raw bytes; framing lives in [`super::framing`].
//!
//! ## Available Transports
//!
//! - **Stdio**: spawns the tool provider and talks over its standard streams
//! - **Stream**: any async reader/writer pair, used for in-process peers

pub mod stdio;
pub mod stream;

pub use stdio::StdioTransport;
pub use stream::StreamTransport;

use super::error::McpError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Result of one bounded read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes arrived (never empty)
    Data(Vec<u8>),
    /// Nothing arrived before the timeout
    Idle,
    /// The peer closed its output stream
    Closed,
}

/// Byte transport for MCP communication
#[async_trait]
pub trait McpTransport: Send {
    /// Write bytes and flush
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), McpError>;

    /// Return whatever output arrives within `timeout`
    async fn read_available(&mut self, timeout: Duration) -> Result<ReadOutcome, McpError>;

    /// Recent diagnostic output from the peer, if any. Never blocks.
    async fn error_hint(&mut self) -> Option<String>;

    /// Shut the peer down. Safe to call more than once.
    async fn close(&mut self);

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;
}

/// How to launch a tool-provider process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    /// Executable
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Extra environment, merged over the inherited environment
    pub env: HashMap<String, String>,
    /// How long to wait after the termination signal before killing
    pub shutdown_grace: Duration,
}

impl ProcessCommand {
    /// Default wait between the termination signal and a forced kill
    pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

    /// Split a command line using shell quoting rules
    pub fn parse(command_line: &str, env: HashMap<String, String>) -> Result<Self, McpError> {
        let words = shell_words::split(command_line).map_err(|e| {
            McpError::configuration(format!("cannot parse MCP command {:?}: {}", command_line, e))
        })?;

        let mut words = words.into_iter();
        let program = words
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| McpError::configuration("empty MCP command"))?;

        Ok(Self {
            program,
            args: words.collect(),
            env,
            shutdown_grace: Self::DEFAULT_SHUTDOWN_GRACE,
        })
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Command line for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
