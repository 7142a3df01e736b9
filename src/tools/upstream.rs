//! Thin client for the Ahrefs free-tool XHR endpoints.
//!
//! Every `/v4/st*` endpoint answers with a two-element array: `["Ok", payload]`
//! on success, `["Error", details]` otherwise.

use crate::antibot::upstream_headers;
use crate::core::error::{SeoError, SeoResult};
use crate::AppState;
use serde_json::Value;
use tracing::debug;

pub const BACKLINKS_OVERVIEW: &str = "/v4/stGetFreeBacklinksOverview";
pub const BACKLINKS_LIST: &str = "/v4/stGetFreeBacklinksList";
pub const KEYWORD_IDEAS: &str = "/v4/stGetFreeKeywordIdeas";
pub const KEYWORD_DIFFICULTY: &str = "/v4/stGetFreeSerpOverviewForKeywordDifficultyChecker";
pub const TRAFFIC_OVERVIEW: &str = "/v4/stGetFreeTrafficOverview";

/// POST a JSON body and return the unwrapped `"Ok"` payload.
pub async fn post_json(
    state: &AppState,
    endpoint: &str,
    referer: &str,
    body: &Value,
    input: &str,
) -> SeoResult<Value> {
    let base = &state.config.ahrefs_base_url;
    let request = state
        .http_client
        .post(format!("{}{}", base, endpoint))
        .headers(upstream_headers(base, referer))
        .json(body);
    send(request, endpoint, input).await
}

/// GET with query parameters and return the unwrapped `"Ok"` payload.
pub async fn get_json(
    state: &AppState,
    endpoint: &str,
    referer: &str,
    query: &[(&str, String)],
    input: &str,
) -> SeoResult<Value> {
    let base = &state.config.ahrefs_base_url;
    let request = state
        .http_client
        .get(format!("{}{}", base, endpoint))
        .headers(upstream_headers(base, referer))
        .query(query);
    send(request, endpoint, input).await
}

async fn send(request: reqwest::RequestBuilder, endpoint: &str, input: &str) -> SeoResult<Value> {
    let resp = request
        .send()
        .await
        .map_err(|e| SeoError::transport(input, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(SeoError::upstream(
            input,
            format!("{} returned HTTP {}", endpoint, status),
        ));
    }

    let text = resp
        .text()
        .await
        .map_err(|e| SeoError::transport(input, e))?;
    debug!("upstream: {} answered {} bytes", endpoint, text.len());

    let body: Value = serde_json::from_str(&text).map_err(|e| {
        SeoError::upstream(input, format!("{} returned non-JSON body: {}", endpoint, e))
    })?;
    ok_payload(body, endpoint, input)
}

/// Unwrap `["Ok", payload]`.
pub fn ok_payload(body: Value, endpoint: &str, input: &str) -> SeoResult<Value> {
    let Value::Array(mut items) = body else {
        return Err(SeoError::upstream(
            input,
            format!("{} returned an unexpected shape", endpoint),
        ));
    };
    if items.len() < 2 {
        return Err(SeoError::upstream(
            input,
            format!("{} returned an empty response", endpoint),
        ));
    }

    let payload = items.swap_remove(1);
    match items[0].as_str() {
        Some("Error") => Err(SeoError::upstream(
            input,
            format!("{} reported an error: {}", endpoint, payload),
        )),
        _ if payload.is_null() => Err(SeoError::upstream(
            input,
            format!("{} returned no data", endpoint),
        )),
        _ => Ok(payload),
    }
}

/// Number at `key`, tolerating numeric strings; 0 when absent.
pub(crate) fn num(v: &Value, key: &str) -> f64 {
    match v.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// String at `key`, or `default` when absent or not a string.
pub(crate) fn text(v: &Value, key: &str, default: &str) -> String {
    v.get(key)
        .and_then(|s| s.as_str())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_payload_unwraps_second_element() {
        let payload = ok_payload(json!(["Ok", {"a": 1}]), "e", "in").unwrap();
        assert_eq!(payload, json!({"a": 1}));
    }

    #[test]
    fn error_tag_is_upstream_error() {
        let err = ok_payload(json!(["Error", ["InvalidCaptcha"]]), "e", "example.com").unwrap_err();
        assert_eq!(err.kind(), "upstream_query_error");
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn non_array_and_short_arrays_are_rejected() {
        assert!(ok_payload(json!({"a": 1}), "e", "in").is_err());
        assert!(ok_payload(json!(["Ok"]), "e", "in").is_err());
        assert!(ok_payload(json!(["Ok", null]), "e", "in").is_err());
    }

    #[test]
    fn num_accepts_numeric_strings() {
        let v = json!({"a": 3, "b": "4.5", "c": "x"});
        assert_eq!(num(&v, "a"), 3.0);
        assert_eq!(num(&v, "b"), 4.5);
        assert_eq!(num(&v, "c"), 0.0);
        assert_eq!(num(&v, "missing"), 0.0);
    }
}
