//! MCP endpoint: JSON-RPC 2.0 over HTTP POST at `/mcp`.
//!
//! Supported methods:
//! - `initialize`: server info + capabilities
//! - `notifications/initialized`: client ack (no-op)
//! - `ping`: health check
//! - `tools/list`: list the Jira tools
//! - `tools/call`: execute a tool
//!
//! Tool failures are reported inside a successful JSON-RPC result with
//! `isError: true`, so the host model can read the reason. Their text is
//! either a validation message or an already-redacted upstream message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::http::server::AppState;
use crate::observability::logging::log_safe;
use crate::mcp::tools::{call_tool, tool_definitions};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 endpoint handler.
pub async fn mcp_handler(
    State(state): State<AppState>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    tracing::debug!(method = %log_safe(method), "MCP request");

    let response = match method {
        "initialize" => handle_initialize(&id),
        "notifications/initialized" => return (StatusCode::OK, Json(json!({}))),
        "ping" => json_rpc_result(&id, json!({})),
        "tools/list" => json_rpc_result(&id, json!({ "tools": tool_definitions() })),
        "tools/call" => handle_tools_call(&state, &request, &id).await,
        "" => json_rpc_error(&id, -32600, "Invalid request: missing method"),
        other => json_rpc_error(&id, -32601, &format!("Method not found: {}", other)),
    };

    (StatusCode::OK, Json(response))
}

fn handle_initialize(id: &Value) -> Value {
    json_rpc_result(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": "jira-gateway",
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "Read-only access to Jira boards, issue search and projects, plus Markdown scaffolding of recently closed work."
        }),
    )
}

async fn handle_tools_call(state: &AppState, request: &Value, id: &Value) -> Value {
    let params = request.get("params").cloned().unwrap_or(json!({}));
    let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    if tool_name.is_empty() {
        return json_rpc_error(id, -32602, "Missing 'name' in params");
    }

    match call_tool(state, tool_name, &arguments).await {
        Ok(output) => {
            let mut content = vec![json!({ "type": "text", "text": output.text })];
            if let Some(deliveries) = output.deliveries {
                content.push(json!({
                    "type": "text",
                    "text": json!({ "notifications": deliveries }).to_string(),
                }));
            }
            json_rpc_result(id, json!({ "content": content, "isError": false }))
        }
        Err(e) => json_rpc_result(
            id,
            json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true,
                "errorCode": e.rpc_code(),
            }),
        ),
    }
}

fn json_rpc_result(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn json_rpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_shape() {
        let response = handle_initialize(&json!(1));
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "jira-gateway");
    }

    #[test]
    fn test_error_shape() {
        let response = json_rpc_error(&json!("a"), -32601, "Method not found: x");
        assert_eq!(response["error"]["code"], -32601);
        assert!(response.get("result").is_none());
    }
}
