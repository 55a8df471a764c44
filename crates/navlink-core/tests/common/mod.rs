//! In-process MCP peer over a duplex pipe

#![allow(dead_code)]

use navlink_core::mcp::framing::{FrameDecoder, Framing, encode};
use navlink_core::mcp::{McpTransport, StreamTransport};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

/// What the peer does in reply to one inbound frame
pub enum Reply {
    /// Encode and send in the session framing
    Json(Value),
    /// Send these bytes as is
    Raw(Vec<u8>),
    /// Close both directions
    Hangup,
}

/// Frames received by the peer, in order
pub type Inbox = Arc<Mutex<Vec<Map<String, Value>>>>;

/// Connect a transport to an in-process peer driven by `handler`
pub fn connect<F>(framing: Framing, handler: F) -> (Box<dyn McpTransport>, Inbox)
where
    F: FnMut(&Map<String, Value>) -> Vec<Reply> + Send + 'static,
{
    let (client, peer) = duplex(64 * 1024);
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    tokio::spawn(run_peer(peer, framing, handler, inbox.clone()));

    let (reader, writer) = tokio::io::split(client);
    (Box::new(StreamTransport::new(reader, writer)), inbox)
}

async fn run_peer<F>(peer: tokio::io::DuplexStream, framing: Framing, mut handler: F, inbox: Inbox)
where
    F: FnMut(&Map<String, Value>) -> Vec<Reply> + Send + 'static,
{
    let (mut reader, mut writer) = tokio::io::split(peer);
    let mut decoder = FrameDecoder::new(framing);
    let mut buf = [0u8; 4096];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        decoder.push(&buf[..n]);

        while let Ok(Some(frame)) = decoder.next_frame() {
            inbox.lock().push(frame.clone());
            for reply in handler(&frame) {
                let bytes = match reply {
                    Reply::Json(value) => encode(&value, framing).unwrap(),
                    Reply::Raw(bytes) => bytes,
                    Reply::Hangup => return,
                };
                if writer.write_all(&bytes).await.is_err() {
                    return;
                }
            }
        }
    }
}

pub fn method(frame: &Map<String, Value>) -> &str {
    frame.get("method").and_then(Value::as_str).unwrap_or("")
}

pub fn id(frame: &Map<String, Value>) -> Value {
    frame.get("id").cloned().unwrap_or(Value::Null)
}

pub fn result(frame: &Map<String, Value>, result: Value) -> Reply {
    Reply::Json(json!({"jsonrpc": "2.0", "id": id(frame), "result": result}))
}

pub fn error(frame: &Map<String, Value>, code: i64, message: &str) -> Reply {
    Reply::Json(json!({
        "jsonrpc": "2.0",
        "id": id(frame),
        "error": {"code": code, "message": message}
    }))
}

pub fn json_content(payload: Value) -> Value {
    json!({"content": [{"type": "json", "json": payload}]})
}

/// A well-behaved peer offering `tools`; `tools/call` goes to `on_call`
pub fn tool_peer<C>(tools: &[&str], mut on_call: C) -> impl FnMut(&Map<String, Value>) -> Vec<Reply> + Send + 'static
where
    C: FnMut(&Map<String, Value>, &Value) -> Reply + Send + 'static,
{
    let tools: Vec<Value> = tools
        .iter()
        .map(|name| json!({"name": name, "description": "", "inputSchema": {}}))
        .collect();

    move |frame| match method(frame) {
        "initialize" => vec![result(
            frame,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "duplex-peer", "version": "0.0.1"}
            }),
        )],
        "notifications/initialized" => vec![],
        "tools/list" => vec![result(frame, json!({"tools": tools}))],
        "tools/call" => {
            let args = frame
                .get("params")
                .and_then(|p| p.get("arguments"))
                .cloned()
                .unwrap_or(Value::Null);
            vec![on_call(frame, &args)]
        }
        other => vec![error(frame, -32601, &format!("Method not found: {}", other))],
    }
}
