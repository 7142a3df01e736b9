use super::common::{json_result, optional_str, required_str, tool_failure, HandlerResult};
use crate::mcp::tooling::KEYWORD_DIFFICULTY;
use crate::{tools, AppState};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(state: Arc<AppState>, arguments: &Value) -> HandlerResult {
    let keyword = required_str(arguments, "keyword")?;
    let country = optional_str(arguments, "country", "us");

    match tools::keyword_difficulty(&state, keyword, country).await {
        Ok(kd) => json_result(&kd),
        Err(e) => tool_failure(KEYWORD_DIFFICULTY, e),
    }
}
