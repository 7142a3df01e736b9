use super::common::{bad_request, json_result, optional_str, required_str, tool_failure, HandlerResult};
use crate::mcp::tooling::GET_TRAFFIC;
use crate::types::TrafficMode;
use crate::{tools, AppState};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle(state: Arc<AppState>, arguments: &Value) -> HandlerResult {
    let domain_or_url = required_str(arguments, "domain_or_url")?;
    let country = optional_str(arguments, "country", "None");
    let mode = optional_str(arguments, "mode", "subdomains");
    let mode = TrafficMode::parse_str(mode)
        .ok_or_else(|| bad_request("Invalid mode. Allowed values: subdomains, exact"))?;

    match tools::get_traffic(&state, domain_or_url, country, mode).await {
        Ok(report) => json_result(&report),
        Err(e) => tool_failure(GET_TRAFFIC, e),
    }
}
