use serde_json::{Map, Value};
use std::sync::Arc;

pub const GET_BACKLINKS_LIST: &str = "get_backlinks_list";
pub const KEYWORD_GENERATOR: &str = "keyword_generator";
pub const GET_TRAFFIC: &str = "get_traffic";
pub const KEYWORD_DIFFICULTY: &str = "keyword_difficulty";

#[derive(Clone, Debug)]
pub struct ToolCatalogEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolCatalogEntry> {
    vec![
        ToolCatalogEntry {
            name: GET_BACKLINKS_LIST,
            title: "Backlinks List",
            description: "Get backlinks list for the specified domain: overview plus top backlinks with title, URL and domain rating.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "domain": {"type": "string", "description": "Domain to query, e.g. example.com"}
                },
                "required": ["domain"]
            }),
        },
        ToolCatalogEntry {
            name: KEYWORD_GENERATOR,
            title: "Keyword Generator",
            description: "Get keyword ideas for the specified keyword.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "keyword": {"type": "string"},
                    "country": {"type": "string", "default": "us"},
                    "search_engine": {"type": "string", "default": "Google"},
                    "detailed": {"type": "boolean", "default": false, "description": "Return difficulty/volume labels and question ideas instead of plain strings"}
                },
                "required": ["keyword"]
            }),
        },
        ToolCatalogEntry {
            name: GET_TRAFFIC,
            title: "Traffic Check",
            description: "Check the estimated search traffic for any website.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "domain_or_url": {"type": "string"},
                    "country": {"type": "string", "default": "None"},
                    "mode": {"type": "string", "enum": ["subdomains", "exact"], "default": "subdomains"}
                },
                "required": ["domain_or_url"]
            }),
        },
        ToolCatalogEntry {
            name: KEYWORD_DIFFICULTY,
            title: "Keyword Difficulty",
            description: "Get keyword difficulty for the specified keyword, with the organic SERP behind it.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "keyword": {"type": "string"},
                    "country": {"type": "string", "default": "us"}
                },
                "required": ["keyword"]
            }),
        },
    ]
}

pub fn schema_to_object_map(schema: &Value) -> Arc<Map<String, Value>> {
    match schema {
        Value::Object(map) => Arc::new(map.clone()),
        _ => Arc::new(Map::new()),
    }
}
