//! Scriptable MCP tool provider for local demos and end-to-end tests
//!
//! Speaks either framing (or detects it from the first request), advertises
//! map tools and answers with AMap-shaped payloads. Before every response it
//! emits a stray log notification, the way real servers interleave them.
//!
//! ```bash
//! navlink --command "navlink-mock-peer --framing length" poi coffee
//! navlink --command "navlink-mock-peer --behavior reject-first" route --from 31.23,121.47 --to 31.2,121.44
//! ```

use clap::{Parser, ValueEnum};
use navlink_core::mcp::framing::{FrameDecoder, Framing, encode};
use navlink_core::mcp::protocol::frame_id;
use navlink_core::mcp::{McpNotification, McpResponse, McpRpcError};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Parser)]
#[command(name = "navlink-mock-peer")]
#[command(about = "Mock MCP map tool provider over stdio")]
struct Args {
    /// Framing the peer understands
    #[arg(long, value_enum, default_value = "any")]
    framing: FramingArg,

    /// How tool calls are answered
    #[arg(long, value_enum, default_value = "ok")]
    behavior: Behavior,

    /// Advertised tool names, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "maps_around_search,maps_text_search,maps_direction_driving"
    )]
    tools: Vec<String>,

    /// Line written to stderr at startup
    #[arg(long)]
    banner: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FramingArg {
    Line,
    Length,
    /// Detect from the first request
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Behavior {
    /// Answer everything
    Ok,
    /// Read requests, never answer
    Silent,
    /// Reject the first tools/call with invalid params
    RejectFirst,
    /// Carry results as a JSON string in a text item
    TextContent,
    /// Flag every tool result with isError
    ToolError,
}

struct Peer {
    args: Args,
    calls: usize,
}

impl Peer {
    fn handle(&mut self, frame: &Map<String, Value>) -> Option<McpResponse> {
        let method = frame.get("method").and_then(Value::as_str).unwrap_or("");
        let id = frame_id(frame)?;

        if self.args.behavior == Behavior::Silent {
            return None;
        }

        let reply = match method {
            "initialize" => Ok(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "navlink-mock-peer", "version": env!("CARGO_PKG_VERSION")}
            })),
            "tools/list" => Ok(json!({
                "tools": self.args.tools.iter().map(|name| json!({
                    "name": name,
                    "description": format!("mock {}", name),
                    "inputSchema": {"type": "object"}
                })).collect::<Vec<_>>()
            })),
            "tools/call" => self.call_tool(frame.get("params")),
            other => Err(McpRpcError::method_not_found(other)),
        };

        Some(match reply {
            Ok(result) => McpResponse::success(id, result),
            Err(error) => McpResponse::error(id, error),
        })
    }

    fn call_tool(&mut self, params: Option<&Value>) -> Result<Value, McpRpcError> {
        self.calls += 1;
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("");

        if !self.args.tools.iter().any(|t| t == name) {
            return Err(McpRpcError::invalid_params(format!("Unknown tool: {}", name)));
        }
        if self.args.behavior == Behavior::RejectFirst && self.calls == 1 {
            return Err(McpRpcError::invalid_params("Invalid arguments for first attempt"));
        }

        let payload = if name.contains("direction") || name.contains("route") {
            route_payload()
        } else {
            poi_payload()
        };

        Ok(match self.args.behavior {
            Behavior::ToolError => json!({
                "isError": true,
                "content": [{"type": "text", "text": "INVALID_USER_KEY"}]
            }),
            Behavior::TextContent => json!({
                "content": [{"type": "text", "text": payload.to_string()}]
            }),
            _ => json!({"content": [{"type": "json", "json": payload}]}),
        })
    }
}

fn poi_payload() -> Value {
    json!({
        "status": "1",
        "pois": [
            {"name": "Mock Cafe", "location": "121.47,31.23", "address": "1 Mock Road", "distance": "600"},
            {"name": "Mock Bakery", "location": "121.48,31.24", "distance": 950}
        ]
    })
}

fn route_payload() -> Value {
    json!({
        "route": {
            "paths": [{
                "distance": "4510",
                "duration": "1258",
                "steps": [
                    {"instruction": "Head north", "distance": "800", "polyline": "121.47,31.23;121.47,31.24"},
                    {"instruction": "Turn left", "distance": "3710", "polyline": "121.47,31.24;121.44,31.20"}
                ]
            }]
        }
    })
}

fn detect_framing(buffer: &[u8]) -> Option<Framing> {
    let start = buffer.iter().position(|b| !b.is_ascii_whitespace())?;
    let head = &buffer[start..];
    let prefix = b"content-length";
    if head.len() < prefix.len() && prefix.starts_with(&head.to_ascii_lowercase()) {
        return None;
    }
    if head.to_ascii_lowercase().starts_with(prefix) {
        Some(Framing::LengthPrefixed)
    } else {
        Some(Framing::LineDelimited)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(banner) = &args.banner {
        eprintln!("{}", banner);
    }

    let mut framing = match args.framing {
        FramingArg::Line => Some(Framing::LineDelimited),
        FramingArg::Length => Some(Framing::LengthPrefixed),
        FramingArg::Any => None,
    };
    let mut pending = Vec::new();
    let mut decoder = framing.map(FrameDecoder::new);
    let mut peer = Peer { args, calls: 0 };

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        let n = stdin.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }

        if decoder.is_none() {
            pending.extend_from_slice(&buf[..n]);
            framing = detect_framing(&pending);
            if let Some(detected) = framing {
                let mut fresh = FrameDecoder::new(detected);
                fresh.push(&pending);
                pending.clear();
                decoder = Some(fresh);
            }
        } else if let Some(decoder) = decoder.as_mut() {
            decoder.push(&buf[..n]);
        }

        let (Some(decoder), Some(framing)) = (decoder.as_mut(), framing) else {
            continue;
        };

        loop {
            let frame = match decoder.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) if framing == Framing::LineDelimited => {
                    eprintln!("mock peer: skipping bad line: {}", e);
                    continue;
                }
                Err(e) => {
                    eprintln!("mock peer: unrecoverable framing error: {}", e);
                    return Ok(());
                }
            };

            let Some(reply) = peer.handle(&frame) else {
                continue;
            };

            let notice = McpNotification::new("notifications/message")
                .with_params(json!({"level": "info", "data": "mock peer handling request"}));
            stdout.write_all(&encode(&notice, framing)?).await?;
            stdout.write_all(&encode(&reply, framing)?).await?;
            stdout.flush().await?;
        }
    }
}
