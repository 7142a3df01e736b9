use super::http::{call_tool_inner, McpCallResponse};
use super::tooling::schema_to_object_map;
use crate::types::ErrorResponse;
use crate::AppState;
use axum::http::StatusCode;
use axum::response::Json;
use rmcp::{model::*, ServiceExt};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{info, warn};

fn status_code_to_error_code(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::INVALID_PARAMS,
        StatusCode::NOT_FOUND => ErrorCode::METHOD_NOT_FOUND,
        _ => ErrorCode::INTERNAL_ERROR,
    }
}

fn mcp_call_response_to_stdio_result(response: McpCallResponse) -> CallToolResult {
    let content = response
        .content
        .into_iter()
        .map(|item| Content::text(item.text))
        .collect();

    if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

fn convert_http_handler_result(
    result: Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)>,
) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(Json(response)) => Ok(mcp_call_response_to_stdio_result(response)),
        Err((status, Json(err))) => Err(ErrorData::new(
            status_code_to_error_code(status),
            err.error,
            None,
        )),
    }
}

#[derive(Clone, Debug)]
pub struct McpService {
    pub state: Arc<AppState>,
}

impl McpService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl rmcp::ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::LATEST)
            .with_server_info(
                Implementation::from_build_env()
                    .with_title("SEO MCP")
                    .with_description(
                        "Free SEO lookups (backlinks, keyword ideas, keyword difficulty, traffic) backed by Ahrefs free tools.",
                    ),
            )
            .with_instructions(
                "Each call clears a captcha first and can take 10-60 seconds. Domains are bare hosts like example.com.",
            )
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self
            .state
            .tool_registry
            .public_specs()
            .into_iter()
            .map(|spec| {
                Tool::new(
                    Cow::Owned(spec.public_name),
                    Cow::Owned(spec.public_description),
                    schema_to_object_map(&spec.public_input_schema),
                )
                .with_title(spec.public_title)
            })
            .collect();

        Ok(ListToolsResult {
            tools,
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        // rmcp hands arguments over as an object map; handlers take a serde_json::Value.
        let arguments = request
            .arguments
            .clone()
            .map(Value::Object)
            .unwrap_or(Value::Null);

        convert_http_handler_result(
            call_tool_inner(Arc::clone(&self.state), request.name.as_ref(), &arguments).await,
        )
    }
}

pub async fn run() -> anyhow::Result<()> {
    info!("Starting SEO MCP stdio service");
    let state = Arc::new(AppState::from_env()?);
    let service = McpService::new(state);
    let running = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server initialized; waiting for client session");
    let quit_reason = running.waiting().await?;
    warn!("MCP stdio server stopped: {:?}", quit_reason);
    Ok(())
}
