//! Minimal MCP JSON-RPC endpoint (`POST /mcp`) for HTTP clients.

use super::http::{call_tool_inner, list_tools_for_state};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROTOCOL_VERSION: &str = "2025-06-18";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

fn rpc_result(id: Value, result: Value) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result})).into_response()
}

fn rpc_error(id: Value, code: i64, message: impl Into<String>) -> Response {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message.into()}
    }))
    .into_response()
}

fn status_to_rpc_code(status: StatusCode) -> i64 {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => INVALID_PARAMS,
        StatusCode::NOT_FOUND => METHOD_NOT_FOUND,
        _ => INTERNAL_ERROR,
    }
}

/// Malformed bodies answer with a JSON-RPC parse error, not an extractor rejection.
pub async fn mcp_rpc_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return rpc_error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)),
    };
    if !request.is_object() {
        return rpc_error(Value::Null, INVALID_REQUEST, "Request must be a JSON object");
    }

    let id = request.get("id").cloned();
    let method = request
        .get("method")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();

    // Notifications carry no id and get no body back.
    let Some(id) = id else {
        return StatusCode::ACCEPTED.into_response();
    };

    match method.as_str() {
        "initialize" => rpc_result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {
                    "name": "SEO MCP",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),
        "ping" => rpc_result(id, json!({})),
        "tools/list" => match serde_json::to_value(list_tools_for_state(&state)) {
            Ok(tools) => rpc_result(id, tools),
            Err(e) => rpc_error(id, INTERNAL_ERROR, e.to_string()),
        },
        "tools/call" => {
            let params = request.get("params").cloned().unwrap_or(Value::Null);
            let Some(name) = params.get("name").and_then(|n| n.as_str()) else {
                return rpc_error(id, INVALID_PARAMS, "Missing tool name");
            };
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

            match call_tool_inner(state, name, &arguments).await {
                Ok(Json(resp)) => match serde_json::to_value(resp) {
                    Ok(result) => rpc_result(id, result),
                    Err(e) => rpc_error(id, INTERNAL_ERROR, e.to_string()),
                },
                Err((status, Json(err))) => rpc_error(id, status_to_rpc_code(status), err.error),
            }
        }
        "" => rpc_error(id, INVALID_REQUEST, "Missing method"),
        _ => rpc_error(id, METHOD_NOT_FOUND, "Method not found"),
    }
}
