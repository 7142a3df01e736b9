use super::handlers;
use super::handlers::common::HandlerResult;
use super::tooling;
use crate::types::ErrorResponse;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema", alias = "input_schema")]
    pub input_schema: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    #[serde(rename = "isError", alias = "is_error")]
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

pub fn list_tools_for_state(state: &AppState) -> McpToolsResponse {
    let tools = state
        .tool_registry
        .public_specs()
        .into_iter()
        .map(|spec| McpTool {
            name: spec.public_name,
            title: spec.public_title,
            description: spec.public_description,
            input_schema: spec.public_input_schema,
        })
        .collect();
    McpToolsResponse { tools }
}

pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<McpToolsResponse> {
    Json(list_tools_for_state(&state))
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Json(request): Json<McpCallRequest>,
) -> HandlerResult {
    call_tool_inner(state, &request.name, &request.arguments).await
}

/// Dispatch one call by public or internal tool name. Shared by every transport.
pub async fn call_tool_inner(state: Arc<AppState>, name: &str, arguments: &Value) -> HandlerResult {
    info!("MCP tool call: {} with args: {}", name, arguments);

    let internal = state
        .tool_registry
        .resolve_incoming_tool_name(name)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Unknown tool: {}", name),
                }),
            )
        })?;

    // A missing arguments object reads the same as an empty one.
    let empty = Value::Object(Default::default());
    let arguments = if arguments.is_null() { &empty } else { arguments };

    match internal.as_str() {
        tooling::GET_BACKLINKS_LIST => handlers::get_backlinks_list::handle(state, arguments).await,
        tooling::KEYWORD_GENERATOR => handlers::keyword_generator::handle(state, arguments).await,
        tooling::GET_TRAFFIC => handlers::get_traffic::handle(state, arguments).await,
        tooling::KEYWORD_DIFFICULTY => handlers::keyword_difficulty::handle(state, arguments).await,
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Unknown tool: {}", name),
            }),
        )),
    }
}
