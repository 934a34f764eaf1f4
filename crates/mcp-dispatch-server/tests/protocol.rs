//! JSON-RPC integration tests for mcp-dispatch-server.
//!
//! Drives the demo server through `ProtocolHandler` and the stdio loop.

use std::io::Write;
use std::sync::{Arc, Mutex as StdMutex};

use serde_json::{json, Value};
use tokio::sync::Mutex;

use mcp_dispatch::McpServer;
use mcp_dispatch_server::demo;
use mcp_dispatch_server::protocol::ProtocolHandler;
use mcp_dispatch_server::transport::{framing, FrameWriter, StdioTransport};
use mcp_dispatch_server::types::*;

// ─────────────────────── helpers ───────────────────────

fn demo_server() -> McpServer {
    let mut server = demo::builder().unwrap().build().unwrap();
    demo::install_resource_reader(&mut server);
    server
}

fn handler() -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(Mutex::new(demo_server())))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

/// Send and unwrap the response.
async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

fn error_code(response: &Value) -> i64 {
    response["error"]["code"].as_i64().unwrap_or_default()
}

/// In-memory stdout.
#[derive(Clone, Default)]
struct SharedBuf(Arc<StdMutex<Vec<u8>>>);

impl SharedBuf {
    fn lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════
// LIFECYCLE
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_initialize() {
    let handler = handler();
    let resp = send_unwrap(
        &handler,
        mcp_request(
            0,
            "initialize",
            json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": { "name": "test-client", "version": "1.0" }
            }),
        ),
    )
    .await;

    assert_eq!(resp["id"], 0);
    assert_eq!(resp["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(resp["result"]["serverInfo"]["name"], demo::SERVER_NAME);
    assert_eq!(resp["result"]["capabilities"]["tools"]["listChanged"], true);
    assert!(resp["result"]["capabilities"].get("logging").is_none());
}

#[tokio::test]
async fn test_initialized_notification_has_no_response() {
    let handler = handler();
    assert!(!handler.is_initialized());
    let resp = send(
        &handler,
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert!(resp.is_none());
    assert!(handler.is_initialized());
}

#[tokio::test]
async fn test_other_notifications_are_only_logged() {
    let handler = handler();
    for method in ["notifications/cancelled", "notifications/roots/list_changed"] {
        let resp = send(&handler, json!({ "jsonrpc": "2.0", "method": method })).await;
        assert!(resp.is_none(), "{method}");
    }
    assert!(!handler.is_initialized());
}

#[tokio::test]
async fn test_ping() {
    let resp = send_unwrap(&handler(), mcp_request(3, "ping", json!({}))).await;
    assert_eq!(resp["result"], json!({}));
}

// ═══════════════════════════════════════════════════════
// TOOLS
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_tools_list() {
    let resp = send_unwrap(&handler(), mcp_request(1, "tools/list", json!({}))).await;
    let names: Vec<&str> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, ["echo", "add", "whoami"]);
    assert_eq!(resp["result"]["tools"][0]["annotations"]["readOnlyHint"], true);
}

#[tokio::test]
async fn test_tool_call_success() {
    let resp = send_unwrap(&handler(), tool_call(2, "add", json!({ "a": 40, "b": 2 }))).await;
    assert_eq!(resp["result"]["content"][0]["text"], "42");
    assert_eq!(resp["result"]["isError"], false);
}

#[tokio::test]
async fn test_tool_call_with_context() {
    let resp = send_unwrap(&handler(), tool_call(2, "whoami", json!({}))).await;
    assert_eq!(
        resp["result"]["structuredContent"],
        json!({ "server": demo::SERVER_NAME })
    );
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let resp = send_unwrap(&handler(), tool_call(4, "nonexistent", json!({}))).await;
    assert_eq!(error_code(&resp), -32602);
    assert_eq!(resp["error"]["message"], "Tool not found nonexistent");
    assert_eq!(resp["error"]["data"]["kind"], "tool_not_found");
}

#[tokio::test]
async fn test_nameless_tool_call_is_invalid_params() {
    let resp = send_unwrap(
        &handler(),
        mcp_request(4, "tools/call", json!({ "arguments": {} })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);
    assert_eq!(resp["error"]["data"]["kind"], "tool_not_found");
}

#[tokio::test]
async fn test_missing_arguments_are_invalid_params() {
    let resp = send_unwrap(&handler(), tool_call(5, "add", json!({ "a": 1 }))).await;
    assert_eq!(error_code(&resp), -32602);
    assert_eq!(resp["error"]["data"]["kind"], "missing_required_arguments");
    assert_eq!(resp["error"]["message"], "Missing required arguments: b");
}

#[tokio::test]
async fn test_schema_violation_is_invalid_params() {
    let resp = send_unwrap(
        &handler(),
        tool_call(6, "add", json!({ "a": 1, "b": 2, "c": 3 })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);
    assert_eq!(resp["error"]["data"]["kind"], "invalid_schema");
}

#[tokio::test]
async fn test_tool_failure_is_internal_error() {
    let resp = send_unwrap(
        &handler(),
        tool_call(7, "add", json!({ "a": i64::MAX, "b": 1 })),
    )
    .await;
    assert_eq!(error_code(&resp), -32603);
    assert_eq!(resp["error"]["message"], "Internal error calling tool add");
    assert_eq!(resp["error"]["data"]["kind"], "internal_error");
}

// ═══════════════════════════════════════════════════════
// PROMPTS & RESOURCES
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_prompt_get() {
    let resp = send_unwrap(
        &handler(),
        mcp_request(8, "prompts/get", json!({ "name": "greet", "arguments": { "name": "Ada" } })),
    )
    .await;
    assert_eq!(resp["result"]["description"], "Greeting for Ada");
    assert_eq!(
        resp["result"]["messages"][0]["content"]["text"],
        "Write a short friendly greeting for Ada."
    );
}

#[tokio::test]
async fn test_prompt_missing_argument_is_internal_error() {
    let resp = send_unwrap(
        &handler(),
        mcp_request(9, "prompts/get", json!({ "name": "greet" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32603);
    assert_eq!(resp["error"]["message"], "Internal error handling prompts/get request");
}

#[tokio::test]
async fn test_resources() {
    let handler = handler();

    let resp = send_unwrap(&handler, mcp_request(10, "resources/list", json!({}))).await;
    assert_eq!(resp["result"]["resources"][0]["uri"], demo::README_URI);

    let resp = send_unwrap(&handler, mcp_request(11, "resources/templates/list", json!({}))).await;
    assert_eq!(
        resp["result"]["resourceTemplates"][0]["uriTemplate"],
        "demo://echo/{text}"
    );

    let resp = send_unwrap(
        &handler,
        mcp_request(12, "resources/read", json!({ "uri": demo::README_URI })),
    )
    .await;
    assert_eq!(resp["result"]["contents"][0]["mimeType"], "text/markdown");
}

// ═══════════════════════════════════════════════════════
// ENVELOPES & ROUTING
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_unknown_method() {
    let resp = send_unwrap(&handler(), mcp_request(13, "made/up", json!({}))).await;
    assert_eq!(error_code(&resp), -32601);
    assert_eq!(resp["error"]["message"], "Method not found: made/up");
}

#[tokio::test]
async fn test_disabled_capability_is_method_not_found() {
    let resp = send_unwrap(
        &handler(),
        mcp_request(14, "logging/setLevel", json!({ "level": "info" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32601);
    assert!(resp["error"]["message"].as_str().unwrap().contains("logging"));
}

#[tokio::test]
async fn test_wrong_jsonrpc_version() {
    let resp = send_unwrap(
        &handler(),
        json!({ "jsonrpc": "1.0", "id": 15, "method": "ping" }),
    )
    .await;
    assert_eq!(error_code(&resp), -32600);
    assert_eq!(resp["id"], 15);
}

#[tokio::test]
async fn test_missing_jsonrpc_version_is_invalid_request() {
    let resp = send_unwrap(&handler(), json!({ "id": 17, "method": "ping" })).await;
    assert_eq!(error_code(&resp), -32600);
    assert_eq!(resp["id"], 17);
}

#[tokio::test]
async fn test_missing_jsonrpc_version_over_stdio() {
    let out = SharedBuf::default();
    let transport = StdioTransport::new(handler(), FrameWriter::new(out.clone()));
    transport
        .serve("{\"id\":1,\"method\":\"ping\"}\n".as_bytes())
        .await
        .unwrap();

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(error_code(&lines[0]), -32600);
    assert_eq!(lines[0]["id"], 1);
}

#[tokio::test]
async fn test_custom_method_defined_while_serving() {
    let handler = handler();
    handler
        .server()
        .lock()
        .await
        .define_custom_method("demo/version", |_| Ok(json!({ "version": "x" })))
        .unwrap();

    let resp = send_unwrap(&handler, mcp_request(16, "demo/version", json!({}))).await;
    assert_eq!(resp["result"], json!({ "version": "x" }));
}

#[test]
fn test_client_response_is_ignored() {
    let handler = handler();
    let resp = tokio_test::block_on(send(
        &handler,
        json!({ "jsonrpc": "2.0", "id": 1, "result": {} }),
    ));
    assert!(resp.is_none());
}

#[test]
fn test_garbage_line_is_parse_error() {
    let err = framing::parse_message("{\"jsonrpc\": ").unwrap_err();
    assert_eq!(err.code(), error_codes::PARSE_ERROR);
}

// ═══════════════════════════════════════════════════════
// STDIO LOOP
// ═══════════════════════════════════════════════════════

#[tokio::test]
async fn test_stdio_session() {
    let out = SharedBuf::default();
    let writer = FrameWriter::new(out.clone());

    let mut server = demo::builder()
        .unwrap()
        .transport(Arc::new(writer.clone()))
        .build()
        .unwrap();
    demo::install_resource_reader(&mut server);
    let server = Arc::new(Mutex::new(server));

    let transport = StdioTransport::new(ProtocolHandler::new(server.clone()), writer);
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
        "\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
        "this is not json\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/call\",\"params\":{\"name\":\"echo\",\"arguments\":{\"message\":\"hi\"}}}\n",
    );
    transport.serve(input.as_bytes()).await.unwrap();
    server.lock().await.notify_tools_list_changed();

    let lines = out.lines();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], json!({ "jsonrpc": "2.0", "id": 1, "result": {} }));
    assert_eq!(lines[1]["id"], Value::Null);
    assert_eq!(error_code(&lines[1]), -32700);
    assert_eq!(lines[2]["result"]["content"][0]["text"], "hi");
    assert_eq!(
        lines[3],
        json!({ "jsonrpc": "2.0", "method": "notifications/tools/list_changed" })
    );
}
