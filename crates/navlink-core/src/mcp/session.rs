//! One MCP session: a transport bound to a framing, with request correlation
//! and the `initialize` handshake.
//!
//! A session is created per provider call and closed before the call
//! returns. [`McpSession::open`] either hands back a fully initialized session
//! or tears the process down and fails; callers never see a half-open one.

use super::error::McpError;
use super::framing::{FrameDecoder, Framing, encode, read_frame};
use super::protocol::{
    MCP_PROTOCOL_VERSION, McpNotification, McpRequest, McpRpcError, frame_id, methods,
};
use super::transport::{McpTransport, ProcessCommand, StdioTransport};
use super::types::{
    ClientInfo, InitializeParams, InitializeResult, McpServerInfo, McpTool, McpToolResult,
};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Wire framing for the whole session
    pub framing: Framing,
    /// How long a single call may wait for its response
    pub read_timeout: Duration,
    /// Hard stop for every read, typically the end of the caller's budget
    pub deadline: Option<Instant>,
    /// Identity sent in `initialize`
    pub client_info: ClientInfo,
}

impl SessionOptions {
    /// Options with the default client identity and no hard deadline
    pub fn new(framing: Framing, read_timeout: Duration) -> Self {
        Self {
            framing,
            read_timeout,
            deadline: None,
            client_info: ClientInfo::default(),
        }
    }

    /// Cap every read at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the client identity
    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }
}

/// An MCP session over a single transport
pub struct McpSession {
    transport: Box<dyn McpTransport>,
    decoder: FrameDecoder,
    options: SessionOptions,
    /// Next request id; starts at 1, never reused
    next_id: u64,
    server_info: Option<McpServerInfo>,
}

impl McpSession {
    /// Wrap a transport without performing the handshake
    pub fn new(transport: Box<dyn McpTransport>, options: SessionOptions) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(options.framing),
            options,
            next_id: 1,
            server_info: None,
        }
    }

    /// Spawn the provider process and complete the handshake
    #[instrument(skip_all, fields(command = %command.program, framing = %options.framing))]
    pub async fn open(command: &ProcessCommand, options: SessionOptions) -> Result<Self, McpError> {
        let transport = StdioTransport::spawn(command)?;
        Self::establish(Box::new(transport), options).await
    }

    /// Complete the handshake over an existing transport.
    ///
    /// On failure the transport is closed and a connection error returned.
    pub async fn establish(
        transport: Box<dyn McpTransport>,
        options: SessionOptions,
    ) -> Result<Self, McpError> {
        let mut session = Self::new(transport, options);
        match session.handshake().await {
            Ok(()) => Ok(session),
            Err(e) => {
                session.close().await;
                Err(McpError::connection(format!("handshake failed: {}", e)))
            }
        }
    }

    async fn handshake(&mut self) -> Result<(), McpError> {
        let params = InitializeParams {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: Map::new(),
            client_info: self.options.client_info.clone(),
        };

        let result = self
            .call(methods::INITIALIZE, Some(serde_json::to_value(&params)?))
            .await?;

        let init: InitializeResult =
            serde_json::from_value(Value::Object(result)).unwrap_or_default();
        debug!(
            server = %init.server_info.name,
            version = %init.server_info.version,
            protocol = ?init.protocol_version,
            "MCP session initialized"
        );
        self.server_info = Some(init.server_info);

        self.notify(methods::INITIALIZED, Some(json!({}))).await
    }

    /// Framing this session is bound to
    pub fn framing(&self) -> Framing {
        self.options.framing
    }

    /// Server info reported during the handshake
    pub fn server_info(&self) -> Option<&McpServerInfo> {
        self.server_info.as_ref()
    }

    /// Send a request and wait for the response with the same id.
    ///
    /// Frames with other ids (stray notifications, late answers to earlier
    /// requests) and requests from the peer are discarded.
    #[instrument(skip(self, params), level = "debug")]
    pub async fn call(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Map<String, Value>, McpError> {
        let id = self.next_request_id();

        let request = McpRequest::new(id, method);
        let request = if let Some(p) = params {
            request.with_params(p)
        } else {
            request
        };

        let bytes = encode(&request, self.options.framing)?;
        self.transport.write_all(&bytes).await?;
        debug!(id, method, bytes = bytes.len(), "sent request");

        let deadline = self.call_deadline();
        loop {
            let mut frame =
                read_frame(self.transport.as_mut(), &mut self.decoder, deadline).await?;

            // Peer-initiated requests can reuse our id; only responses match
            match frame_id(&frame) {
                Some(frame_id) if frame_id.matches(id) && !frame.contains_key("method") => {}
                other => {
                    debug!(
                        id,
                        frame_id = ?other,
                        method = ?frame.get("method"),
                        "discarding unmatched frame"
                    );
                    continue;
                }
            }

            if let Some(error) = frame.get("error") {
                let error = McpRpcError::from_value(error);
                return Err(McpError::peer(method, error.code, error.message));
            }

            return match frame.remove("result") {
                Some(Value::Object(result)) => Ok(result),
                Some(_) => Err(McpError::shape(method, "result is not an object")),
                None => Err(McpError::shape(method, "response has neither result nor error")),
            };
        }
    }

    /// Send a notification; no reply is expected
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let notification = McpNotification::new(method);
        let notification = if let Some(p) = params {
            notification.with_params(p)
        } else {
            notification
        };

        let bytes = encode(&notification, self.options.framing)?;
        self.transport.write_all(&bytes).await?;
        debug!(method, "sent notification");
        Ok(())
    }

    /// List available tools
    pub async fn list_tools(&mut self) -> Result<Vec<McpTool>, McpError> {
        let result = self.call(methods::TOOLS_LIST, Some(json!({}))).await?;
        Ok(McpTool::list_from_result(&result))
    }

    /// Call a tool
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<McpToolResult, McpError> {
        let params = json!({
            "name": name,
            "arguments": arguments
        });

        let result = self.call(methods::TOOLS_CALL, Some(params)).await?;
        Ok(McpToolResult::from_result(&result))
    }

    /// Shut the transport (and process) down
    pub async fn close(&mut self) {
        self.transport.close().await;
    }

    /// Generate next request ID
    fn next_request_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn call_deadline(&self) -> Instant {
        let deadline = Instant::now() + self.options.read_timeout;
        match self.options.deadline {
            Some(hard) if hard < deadline => hard,
            _ => deadline,
        }
    }
}
