//! Session tests: handshake, response correlation and read deadlines

mod common;

use common::{Reply, connect, error, method, result, tool_peer};
use navlink_core::mcp::{Framing, McpError, McpSession, SessionOptions};
use serde_json::json;
use std::time::{Duration, Instant};

fn options(framing: Framing) -> SessionOptions {
    SessionOptions::new(framing, Duration::from_secs(2))
}

#[tokio::test]
async fn test_handshake_then_list_tools() {
    for framing in [Framing::LineDelimited, Framing::LengthPrefixed] {
        let (transport, inbox) = connect(
            framing,
            tool_peer(&["maps_text_search", "maps_direction_driving"], |frame, _| {
                result(frame, json!({}))
            }),
        );

        let mut session = McpSession::establish(transport, options(framing)).await.unwrap();
        assert_eq!(session.server_info().unwrap().name, "duplex-peer");
        assert_eq!(session.framing(), framing);

        let tools = session.list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["maps_text_search", "maps_direction_driving"]);
        session.close().await;

        let frames = inbox.lock().clone();
        assert_eq!(frames[0]["method"], "initialize");
        assert_eq!(frames[0]["id"], 1);
        assert_eq!(frames[0]["params"]["protocolVersion"], "2024-11-05");
        assert_eq!(frames[0]["params"]["capabilities"], json!({}));
        assert_eq!(frames[0]["params"]["clientInfo"]["name"], "navlink");

        assert_eq!(frames[1]["method"], "notifications/initialized");
        assert!(frames[1].get("id").is_none());

        assert_eq!(frames[2]["method"], "tools/list");
        assert_eq!(frames[2]["id"], 2);
    }
}

#[tokio::test]
async fn test_unmatched_frames_are_discarded() {
    let mut peer = tool_peer(&["maps_geo"], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LineDelimited, move |frame| {
        if method(frame) != "tools/list" {
            return peer(frame);
        }
        let mut replies = vec![
            Reply::Json(json!({"jsonrpc": "2.0", "method": "notifications/progress", "params": {}})),
            Reply::Json(json!({"jsonrpc": "2.0", "id": 99, "result": {"tools": []}})),
        ];
        // String ids holding the right number still match
        replies.push(Reply::Json(json!({
            "jsonrpc": "2.0",
            "id": frame["id"].to_string(),
            "result": {"tools": [{"name": "maps_geo"}]}
        })));
        replies
    });

    let mut session = McpSession::establish(transport, options(Framing::LineDelimited))
        .await
        .unwrap();
    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "maps_geo");
    session.close().await;
}

#[tokio::test]
async fn test_peer_request_with_same_id_is_discarded() {
    let mut peer = tool_peer(&["maps_geo"], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LengthPrefixed, move |frame| {
        if method(frame) != "tools/list" {
            return peer(frame);
        }
        let mut replies = vec![Reply::Json(json!({
            "jsonrpc": "2.0",
            "id": frame["id"].clone(),
            "method": "roots/list",
            "params": {}
        }))];
        replies.extend(peer(frame));
        replies
    });

    let mut session = McpSession::establish(transport, options(Framing::LengthPrefixed))
        .await
        .unwrap();
    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "maps_geo");
    session.close().await;
}

#[tokio::test]
async fn test_peer_error_and_bad_result() {
    let mut peer = tool_peer(&[], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LineDelimited, move |frame| match method(frame) {
        "tools/list" => vec![error(frame, -32000, "quota exceeded")],
        "tools/call" => vec![result(frame, json!(["not", "an", "object"]))],
        _ => peer(frame),
    });

    let mut session = McpSession::establish(transport, options(Framing::LineDelimited))
        .await
        .unwrap();

    let err = session.list_tools().await.unwrap_err();
    match &err {
        McpError::Peer { method, code, message } => {
            assert_eq!(method, "tools/list");
            assert_eq!(*code, -32000);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_rejection());

    let err = session.call_tool("maps_geo", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::Shape { .. }));
    session.close().await;
}

#[tokio::test]
async fn test_truncated_body_times_out() {
    let mut peer = tool_peer(&[], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LengthPrefixed, move |frame| match method(frame) {
        "tools/list" => vec![Reply::Raw(b"Content-Length: 500\r\n\r\n{\"jsonrpc\":\"2.0\"".to_vec())],
        _ => peer(frame),
    });

    let mut session = McpSession::establish(
        transport,
        SessionOptions::new(Framing::LengthPrefixed, Duration::from_millis(300)),
    )
    .await
    .unwrap();

    let started = Instant::now();
    let err = session.list_tools().await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, McpError::Timeout { .. }), "{err}");
    assert!(err.to_string().contains("body read timeout"), "{err}");
    assert!(err.is_recoverable());
    session.close().await;
}

#[tokio::test]
async fn test_hard_deadline_caps_read_timeout() {
    let mut peer = tool_peer(&[], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LineDelimited, move |frame| match method(frame) {
        "tools/list" => vec![],
        _ => peer(frame),
    });

    let options = SessionOptions::new(Framing::LineDelimited, Duration::from_secs(30))
        .with_deadline(tokio::time::Instant::now() + Duration::from_millis(300));
    let mut session = McpSession::establish(transport, options).await.unwrap();

    let started = Instant::now();
    let err = session.list_tools().await.unwrap_err();
    assert!(matches!(err, McpError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(3));
    session.close().await;
}

#[tokio::test]
async fn test_closed_stream_is_framing_error() {
    let mut peer = tool_peer(&[], |frame, _| result(frame, json!({})));
    let (transport, _inbox) = connect(Framing::LineDelimited, move |frame| match method(frame) {
        "tools/list" => vec![Reply::Hangup],
        _ => peer(frame),
    });

    let mut session = McpSession::establish(transport, options(Framing::LineDelimited))
        .await
        .unwrap();
    let err = session.list_tools().await.unwrap_err();
    assert!(matches!(err, McpError::Framing { .. }), "{err}");
    assert!(!err.is_rejection());
    session.close().await;
}

#[tokio::test]
async fn test_handshake_failure_is_connection_error() {
    let (transport, _inbox) = connect(Framing::LineDelimited, |frame| {
        vec![error(frame, -32602, "unsupported protocol version")]
    });

    let err = McpSession::establish(transport, options(Framing::LineDelimited))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, McpError::Connection { .. }));
    assert!(err.to_string().contains("unsupported protocol version"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_wrong_framing_times_out_during_handshake() {
    // Peer speaks line-delimited; client expects Content-Length headers
    let (transport, _inbox) = connect(Framing::LengthPrefixed, |_frame| vec![]);

    let started = Instant::now();
    let err = McpSession::establish(
        transport,
        SessionOptions::new(Framing::LineDelimited, Duration::from_millis(200)),
    )
    .await
    .err()
    .unwrap();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(err.to_string().contains("line read timeout"), "{err}");
}
