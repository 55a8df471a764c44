//! Model Context Protocol (MCP) client for stdio tool providers
//!
//! This module drives an external tool-provider process over its standard
//! streams: it frames JSON-RPC messages, correlates responses with requests,
//! and performs the `initialize` handshake.
//!
//! ## Features
//!
//! - Two wire framings (line-delimited and `Content-Length` prefixed)
//! - Deadline-bounded reads with stderr capture for diagnostics
//! - Graceful subprocess shutdown (terminate, grace period, kill)
//!
//! ## Example
//!
//! ```rust,ignore
//! use navlink_core::mcp::{Framing, McpSession, ProcessCommand, SessionOptions};
//!
//! let command = ProcessCommand::parse("npx -y -p @amap/amap-maps-mcp-server mcp-amap", env)?;
//! let options = SessionOptions::new(Framing::LineDelimited, Duration::from_secs(8));
//! let mut session = McpSession::open(&command, options).await?;
//!
//! let tools = session.list_tools().await?;
//! let result = session.call_tool("maps_text_search", json!({"keywords": "coffee"})).await?;
//! session.close().await;
//! ```

pub mod error;
pub mod framing;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;

pub use error::McpError;
pub use framing::{FrameDecoder, Framing};
pub use protocol::{McpNotification, McpRequest, McpResponse, McpRpcError, RequestId};
pub use session::{McpSession, SessionOptions};
pub use transport::{McpTransport, ProcessCommand, ReadOutcome, StdioTransport, StreamTransport};
pub use types::{ClientInfo, McpServerInfo, McpTool, McpToolResult};
