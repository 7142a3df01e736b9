use super::common::{json_result, optional_str, required_str, tool_failure, HandlerResult};
use crate::mcp::tooling::KEYWORD_GENERATOR;
use crate::{tools, AppState};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(state: Arc<AppState>, arguments: &Value) -> HandlerResult {
    let keyword = required_str(arguments, "keyword")?;
    let country = optional_str(arguments, "country", "us");
    let search_engine = optional_str(arguments, "search_engine", "Google");
    let detailed = arguments
        .get("detailed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let result = if detailed {
        tools::keyword_ideas(&state, keyword, country, search_engine)
            .await
            .map(|ideas| json_result(&ideas))
    } else {
        tools::keyword_generator(&state, keyword, country, search_engine)
            .await
            .map(|keywords| json_result(&keywords))
    };

    result.unwrap_or_else(|e| tool_failure(KEYWORD_GENERATOR, e))
}
