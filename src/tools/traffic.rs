use super::upstream::{self, num};
use super::{acquire_token, require_non_empty, target};
use crate::core::error::{SeoError, SeoResult};
use crate::types::{TrafficMode, TrafficReport, TrafficSummary};
use crate::AppState;
use serde_json::{json, Value};
use tracing::info;

/// Estimated organic traffic for a domain or URL.
///
/// `country` is passed through verbatim; `"None"` means worldwide.
pub async fn get_traffic(
    state: &AppState,
    domain_or_url: &str,
    country: &str,
    mode: TrafficMode,
) -> SeoResult<TrafficReport> {
    let domain_or_url = require_non_empty("domain_or_url", domain_or_url)?;
    let challenge_url = target::traffic_target(domain_or_url, mode);
    let token = acquire_token(state, &challenge_url).await?;

    let input = json!({
        "captcha": token.as_str(),
        "country": country,
        "protocol": "None",
        "mode": mode.as_str(),
        "url": domain_or_url,
    });
    let payload = upstream::get_json(
        state,
        upstream::TRAFFIC_OVERVIEW,
        &challenge_url,
        &[("input", input.to_string())],
        domain_or_url,
    )
    .await?;

    let report = parse_traffic(&payload)
        .ok_or_else(|| SeoError::upstream(domain_or_url, "no traffic data in response"))?;
    info!(
        "traffic: {} monthly visits for {}",
        report.traffic.traffic_monthly_avg, domain_or_url
    );
    Ok(report)
}

pub fn parse_traffic(payload: &Value) -> Option<TrafficReport> {
    // No summary object means upstream had nothing for this target.
    let summary = payload.get("traffic").filter(|t| t.is_object())?;
    let list = |key: &str| -> Vec<Value> {
        payload
            .get(key)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
    };

    // Upstream spells it "costMontlyAvg".
    let cost = if summary.get("costMontlyAvg").is_some() {
        num(summary, "costMontlyAvg")
    } else {
        num(summary, "costMonthlyAvg")
    };

    Some(TrafficReport {
        traffic_history: list("traffic_history"),
        traffic: TrafficSummary {
            traffic_monthly_avg: num(summary, "trafficMonthlyAvg"),
            cost_monthly_avg: cost,
        },
        top_pages: list("top_pages"),
        top_countries: list("top_countries"),
        top_keywords: list("top_keywords"),
    })
}
