use crate::core::error::SeoError;
use crate::mcp::{McpCallResponse, McpContent};
use crate::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

pub type HandlerResult = Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)>;

pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn required_str<'a>(
    arguments: &'a Value,
    key: &str,
) -> Result<&'a str, (StatusCode, Json<ErrorResponse>)> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| bad_request(format!("Missing required parameter: {}", key)))
}

/// String argument with a default; `null` counts as absent.
pub fn optional_str<'a>(arguments: &'a Value, key: &str, default: &'a str) -> &'a str {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}

/// Successful tool result carrying pretty-printed JSON text.
pub fn json_result<T: Serialize>(value: &T) -> HandlerResult {
    let (text, is_error) = match serde_json::to_string_pretty(value) {
        Ok(text) => (text, false),
        Err(e) => {
            error!("tool result serialization failed: {}", e);
            let body = serde_json::json!({
                "error": "serialization_error",
                "message": format!("Serialization failed: {}", e),
            });
            (body.to_string(), true)
        }
    };
    Ok(Json(McpCallResponse {
        content: vec![McpContent {
            content_type: "text".to_string(),
            text,
        }],
        is_error,
    }))
}

/// Map a query failure onto the MCP error convention: bad input is a protocol
/// error, everything else a tool result with `is_error` set.
pub fn tool_failure(tool: &str, err: SeoError) -> HandlerResult {
    if let SeoError::InvalidArgument(msg) = &err {
        return Err(bad_request(msg.clone()));
    }

    error!("{} failed: {}", tool, err);
    let body = serde_json::json!({
        "error": err.kind(),
        "message": err.to_string(),
    });
    Ok(Json(McpCallResponse {
        content: vec![McpContent {
            content_type: "text".to_string(),
            text: body.to_string(),
        }],
        is_error: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_str_falls_back_on_null_and_blank() {
        let args = json!({"country": null, "search_engine": "  ", "mode": "exact"});
        assert_eq!(optional_str(&args, "country", "us"), "us");
        assert_eq!(optional_str(&args, "search_engine", "Google"), "Google");
        assert_eq!(optional_str(&args, "mode", "subdomains"), "exact");
    }

    #[test]
    fn invalid_argument_becomes_bad_request() {
        let (status, Json(body)) =
            tool_failure("t", SeoError::InvalidArgument("keyword must not be empty".into()))
                .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("keyword"));
    }

    #[test]
    fn other_failures_are_error_results() {
        let Json(resp) = tool_failure("t", SeoError::upstream("example.com", "no signature")).unwrap();
        assert!(resp.is_error);
        let body: Value = serde_json::from_str(&resp.content[0].text).unwrap();
        assert_eq!(body["error"], "upstream_query_error");
    }

    #[test]
    fn unserializable_result_is_flagged_as_error() {
        let not_json = std::collections::HashMap::from([((1, 2), "tuple keys")]);
        let Json(resp) = json_result(&not_json).unwrap();
        assert!(resp.is_error);
        let body: Value = serde_json::from_str(&resp.content[0].text).unwrap();
        assert_eq!(body["error"], "serialization_error");

        let Json(ok) = json_result(&json!(["fine"])).unwrap();
        assert!(!ok.is_error);
    }
}
