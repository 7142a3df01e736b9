use crate::mcp::tooling::tool_catalog;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Optional per-tool overrides from `tools_metadata.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct ToolMetadataEntry {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct PublicToolSpec {
    pub public_name: String,
    pub public_title: String,
    pub public_description: String,
    pub public_input_schema: Value,
}

#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    internal_to_public: HashMap<String, PublicToolSpec>,
    public_to_internal: HashMap<String, String>,
}

impl ToolRegistry {
    pub fn load() -> Self {
        let (metadata_map, source) = load_tools_metadata();
        if let Some(source) = source {
            info!("tool_metadata: loaded from {}", source.display());
        }
        Self::with_metadata(metadata_map.as_ref())
    }

    /// Built-in catalog with optional public name/title/description overrides.
    pub fn with_metadata(metadata: Option<&HashMap<String, ToolMetadataEntry>>) -> Self {
        let mut registry = ToolRegistry::default();

        for internal in tool_catalog() {
            let internal_name = internal.name.to_string();

            let (public_name, public_title, public_description) =
                match metadata.and_then(|m| m.get(&internal_name)) {
                    Some(meta) => (
                        meta.name.clone(),
                        meta.title
                            .clone()
                            .unwrap_or_else(|| internal.title.to_string()),
                        meta.description.clone(),
                    ),
                    None => (
                        internal_name.clone(),
                        internal.title.to_string(),
                        internal.description.to_string(),
                    ),
                };

            if let Some(existing) = registry
                .public_to_internal
                .insert(public_name.clone(), internal_name.clone())
            {
                warn!(
                    "tool_metadata: public tool name collision: {} already mapped to {}; now also maps to {}",
                    public_name, existing, internal_name
                );
            }

            registry.internal_to_public.insert(
                internal_name,
                PublicToolSpec {
                    public_name,
                    public_title,
                    public_description,
                    public_input_schema: internal.input_schema,
                },
            );
        }

        registry
    }

    pub fn public_specs(&self) -> Vec<PublicToolSpec> {
        let mut tools: Vec<_> = self.internal_to_public.values().cloned().collect();
        tools.sort_by(|a, b| a.public_name.cmp(&b.public_name));
        tools
    }

    /// Internal name for an incoming public (or internal) tool name.
    pub fn resolve_incoming_tool_name(&self, incoming: &str) -> Option<String> {
        if let Some(internal) = self.public_to_internal.get(incoming) {
            return Some(internal.clone());
        }
        self.internal_to_public
            .contains_key(incoming)
            .then(|| incoming.to_string())
    }

    pub fn public_tool_name_for_internal(&self, internal_tool_name: &str) -> Option<&str> {
        self.internal_to_public
            .get(internal_tool_name)
            .map(|s| s.public_name.as_str())
    }
}

fn load_tools_metadata() -> (Option<HashMap<String, ToolMetadataEntry>>, Option<PathBuf>) {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(p) = std::env::var("SEO_MCP_TOOLS_METADATA_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
    {
        candidates.push(PathBuf::from(p));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("tools_metadata.json"));
        candidates.push(cwd.join("../tools_metadata.json"));
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, ToolMetadataEntry>>(&raw) {
                Ok(map) => return (Some(map), Some(path)),
                Err(e) => warn!(
                    "tool_metadata: failed to parse {} ({}); ignoring and continuing",
                    path.display(),
                    e
                ),
            },
            Err(e) => warn!(
                "tool_metadata: failed to read {} ({}); ignoring and continuing",
                path.display(),
                e
            ),
        }
    }

    (None, None)
}
