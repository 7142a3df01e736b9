use super::common::{json_result, required_str, tool_failure, HandlerResult};
use crate::mcp::tooling::GET_BACKLINKS_LIST;
use crate::{tools, AppState};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(state: Arc<AppState>, arguments: &Value) -> HandlerResult {
    let domain = required_str(arguments, "domain")?;

    match tools::get_backlinks_list(&state, domain).await {
        Ok(report) => json_result(&report),
        Err(e) => tool_failure(GET_BACKLINKS_LIST, e),
    }
}
