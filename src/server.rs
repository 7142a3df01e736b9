use crate::mcp::{self, jsonrpc};
use crate::types::HealthResponse;
use crate::AppState;
use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Health probe plus the MCP endpoints, all sharing one `AppState`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/mcp", post(jsonrpc::mcp_rpc_handler))
        .route("/mcp/tools", get(mcp::list_tools))
        .route("/mcp/call", post(mcp::call_tool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness only: never touches config, the solver or upstream.
pub async fn health_check() -> Json<HealthResponse> {
    tracing::debug!("health check");
    Json(HealthResponse::healthy())
}
