use seo_mcp::core::tools_registry::{ToolMetadataEntry, ToolRegistry};
use std::collections::HashMap;

#[test]
fn public_tool_names_resolve_to_internal() {
    let registry = ToolRegistry::with_metadata(None);

    let mut seen = std::collections::HashSet::new();
    for spec in registry.public_specs() {
        assert!(
            seen.insert(spec.public_name.clone()),
            "duplicate public tool name"
        );
        let internal = registry
            .resolve_incoming_tool_name(&spec.public_name)
            .expect("public name should resolve to an internal name");
        assert!(
            registry.public_tool_name_for_internal(&internal).is_some(),
            "internal tool should have a public name"
        );
    }
}

#[test]
fn default_catalog_exposes_the_four_seo_tools() {
    let registry = ToolRegistry::with_metadata(None);
    let names: Vec<String> = registry
        .public_specs()
        .into_iter()
        .map(|s| s.public_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "get_backlinks_list",
            "get_traffic",
            "keyword_difficulty",
            "keyword_generator"
        ]
    );
}

#[test]
fn schemas_declare_required_arguments_and_defaults() {
    let registry = ToolRegistry::with_metadata(None);
    let specs = registry.public_specs();

    let traffic = specs
        .iter()
        .find(|s| s.public_name == "get_traffic")
        .expect("expected traffic tool");
    let props = traffic
        .public_input_schema
        .get("properties")
        .and_then(|v| v.as_object())
        .expect("schema properties should be an object");
    assert_eq!(props["country"]["default"], "None");
    assert_eq!(props["mode"]["enum"], serde_json::json!(["subdomains", "exact"]));
    assert_eq!(
        traffic.public_input_schema["required"],
        serde_json::json!(["domain_or_url"])
    );

    let generator = specs
        .iter()
        .find(|s| s.public_name == "keyword_generator")
        .expect("expected keyword generator");
    assert_eq!(
        generator.public_input_schema["properties"]["search_engine"]["default"],
        "Google"
    );
}

#[test]
fn metadata_overrides_public_name_but_internal_name_still_resolves() {
    let metadata = HashMap::from([(
        "keyword_difficulty".to_string(),
        ToolMetadataEntry {
            name: "kd_check".to_string(),
            title: None,
            description: "How hard is it to rank?".to_string(),
        },
    )]);
    let registry = ToolRegistry::with_metadata(Some(&metadata));

    assert_eq!(
        registry.resolve_incoming_tool_name("kd_check").as_deref(),
        Some("keyword_difficulty")
    );
    assert_eq!(
        registry.resolve_incoming_tool_name("keyword_difficulty").as_deref(),
        Some("keyword_difficulty")
    );
    let spec = registry
        .public_specs()
        .into_iter()
        .find(|s| s.public_name == "kd_check")
        .expect("renamed tool listed");
    assert_eq!(spec.public_title, "Keyword Difficulty");
    assert!(registry.resolve_incoming_tool_name("nope").is_none());
}
