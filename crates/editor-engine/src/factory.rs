//! Node factory
//!
//! Builds a new node's initial data record from a catalog template plus
//! caller-supplied overrides. Everything is deep-copied before any merge, so
//! the catalog and the caller's overrides are never aliased or mutated.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::catalog::{NodeCatalog, GROUP_NODE_TYPE};
use crate::types::{GraphNode, NodeStyle, Position};

/// Default size of a layout-container node
const GROUP_STYLE: NodeStyle = NodeStyle {
    width: 300.0,
    height: 300.0,
};

/// Generate a fresh node identifier for a type
pub fn fresh_node_id(type_name: &str) -> String {
    format!("{}-{}", type_name, Uuid::new_v4())
}

/// Build a node instance from a catalog template
///
/// Returns `None` when `type_name` is not in the catalog. Overrides are
/// merged on top of template defaults: for `input.properties` and
/// `output.properties` the merge is a per-key union where override values
/// win but template keys absent from the override are preserved; every other
/// override key replaces the computed default wholesale.
pub fn create_node(
    catalog: &NodeCatalog,
    type_name: &str,
    id: impl Into<String>,
    position: Position,
    overrides: &Map<String, Value>,
) -> Option<GraphNode> {
    if type_name == GROUP_NODE_TYPE {
        return Some(create_group_node(id, position, overrides));
    }

    let template = catalog.find(type_name)?;

    let input_props = merged_properties(
        template.input.as_ref().map(|p| &p.properties),
        override_properties(overrides, "input"),
    );
    let output_props = merged_properties(
        template.output.as_ref().map(|p| &p.properties),
        override_properties(overrides, "output"),
    );

    let mut data = Map::new();
    data.insert("title".to_string(), Value::String(template.name.clone()));
    data.insert(
        "acronym".to_string(),
        Value::String(template.visual_tag.acronym.clone()),
    );
    data.insert(
        "color".to_string(),
        Value::String(template.visual_tag.color.clone()),
    );
    data.insert("config".to_string(), Value::Object(template.config.clone()));

    // Overrides win over every computed default except the input/output
    // blocks, which were already merged per key above.
    for (key, value) in overrides {
        if key != "input" && key != "output" {
            data.insert(key.clone(), value.clone());
        }
    }
    data.insert("input".to_string(), json!({ "properties": input_props }));
    data.insert("output".to_string(), json!({ "properties": output_props }));

    Some(GraphNode {
        id: id.into(),
        node_type: type_name.to_string(),
        position,
        data: Value::Object(data),
        style: None,
    })
}

/// A group is a pure layout container: default title, fixed default size,
/// no config or handles; overrides merge directly into `data`.
fn create_group_node(
    id: impl Into<String>,
    position: Position,
    overrides: &Map<String, Value>,
) -> GraphNode {
    let mut data = Map::new();
    data.insert("title".to_string(), Value::String("Group".to_string()));
    for (key, value) in overrides {
        data.insert(key.clone(), value.clone());
    }
    GraphNode {
        id: id.into(),
        node_type: GROUP_NODE_TYPE.to_string(),
        position,
        data: Value::Object(data),
        style: Some(GROUP_STYLE),
    }
}

fn override_properties<'a>(
    overrides: &'a Map<String, Value>,
    block: &str,
) -> Option<&'a Map<String, Value>> {
    overrides
        .get(block)
        .and_then(|b| b.get("properties"))
        .and_then(|p| p.as_object())
}

fn merged_properties(
    template: Option<&Map<String, Value>>,
    overrides: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut merged = template.cloned().unwrap_or_default();
    if let Some(over) = overrides {
        for (key, value) in over {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NodeTemplate, PortSchema, VisualTag};

    fn llm_catalog() -> NodeCatalog {
        let mut catalog = NodeCatalog::new();
        let mut config = Map::new();
        config.insert("system_message".to_string(), json!("You are helpful."));
        config.insert(
            "input_schema".to_string(),
            json!({"user_message": "str"}),
        );
        let mut input_props = Map::new();
        input_props.insert("user_message".to_string(), json!({"type": "string"}));
        let mut output_props = Map::new();
        output_props.insert("response".to_string(), json!({"type": "string"}));
        catalog.register(
            "llm",
            NodeTemplate {
                name: "single-llm-call".to_string(),
                visual_tag: VisualTag {
                    acronym: "LLM".to_string(),
                    color: "#059669".to_string(),
                },
                config,
                input: Some(PortSchema {
                    properties: input_props,
                }),
                output: Some(PortSchema {
                    properties: output_props,
                }),
            },
        );
        catalog
    }

    #[test]
    fn test_unknown_type_returns_none() {
        let catalog = llm_catalog();
        let node = create_node(
            &catalog,
            "missing",
            "n1",
            Position::default(),
            &Map::new(),
        );
        assert!(node.is_none());
    }

    #[test]
    fn test_defaults_from_template() {
        let catalog = llm_catalog();
        let node = create_node(
            &catalog,
            "single-llm-call",
            "n1",
            Position::new(10.0, 20.0),
            &Map::new(),
        )
        .unwrap();

        assert_eq!(node.node_type, "single-llm-call");
        assert_eq!(node.title(), Some("single-llm-call"));
        assert_eq!(node.data["acronym"], "LLM");
        assert_eq!(node.data["color"], "#059669");
        assert_eq!(node.data["config"]["system_message"], "You are helpful.");
        assert_eq!(
            node.data["input"]["properties"]["user_message"]["type"],
            "string"
        );
        assert!(node.style.is_none());
    }

    #[test]
    fn test_property_merge_union_override_wins() {
        let catalog = llm_catalog();
        let overrides: Map<String, Value> = serde_json::from_value(json!({
            "input": {"properties": {
                "user_message": {"type": "text"},
                "context": {"type": "string"}
            }}
        }))
        .unwrap();

        let node = create_node(
            &catalog,
            "single-llm-call",
            "n1",
            Position::default(),
            &overrides,
        )
        .unwrap();

        let props = node.data["input"]["properties"].as_object().unwrap();
        // Override key wins, new key added, template-only keys preserved
        assert_eq!(props["user_message"]["type"], "text");
        assert_eq!(props["context"]["type"], "string");
        // Output block untouched by the input override
        assert_eq!(
            node.data["output"]["properties"]["response"]["type"],
            "string"
        );
    }

    #[test]
    fn test_override_keys_spread_last() {
        let catalog = llm_catalog();
        let overrides: Map<String, Value> = serde_json::from_value(json!({
            "title": "My Call",
            "config": {"system_message": "Override."}
        }))
        .unwrap();

        let node = create_node(
            &catalog,
            "single-llm-call",
            "n1",
            Position::default(),
            &overrides,
        )
        .unwrap();

        assert_eq!(node.title(), Some("My Call"));
        // A config override replaces the template config wholesale
        assert_eq!(node.data["config"]["system_message"], "Override.");
        assert!(node.data["config"].get("input_schema").is_none());
    }

    #[test]
    fn test_group_node_shape() {
        let catalog = NodeCatalog::new();
        let overrides: Map<String, Value> =
            serde_json::from_value(json!({"title": "X"})).unwrap();

        let node = create_node(
            &catalog,
            "group",
            "g1",
            Position::new(5.0, 6.0),
            &overrides,
        )
        .unwrap();

        assert_eq!(node.node_type, "group");
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert_eq!(node.data, json!({"title": "X"}));
        let style = node.style.unwrap();
        assert_eq!(style.width, 300.0);
        assert_eq!(style.height, 300.0);
    }

    #[test]
    fn test_group_default_title() {
        let node = create_node(
            &NodeCatalog::new(),
            "group",
            "g1",
            Position::default(),
            &Map::new(),
        )
        .unwrap();
        assert_eq!(node.title(), Some("Group"));
    }

    #[test]
    fn test_no_aliasing_of_catalog_or_overrides() {
        let catalog = llm_catalog();
        let overrides: Map<String, Value> = serde_json::from_value(json!({
            "input": {"properties": {"context": {"type": "string"}}}
        }))
        .unwrap();

        let mut node = create_node(
            &catalog,
            "single-llm-call",
            "n1",
            Position::default(),
            &overrides,
        )
        .unwrap();

        // Mutate the returned node's config and properties
        node.config_mut()
            .unwrap()
            .insert("system_message".to_string(), json!("mutated"));
        node.data["input"]["properties"]
            .as_object_mut()
            .unwrap()
            .clear();

        // Template and overrides are untouched
        let template = catalog.find("single-llm-call").unwrap();
        assert_eq!(template.config["system_message"], "You are helpful.");
        assert_eq!(
            overrides["input"]["properties"]["context"]["type"],
            "string"
        );
    }

    #[test]
    fn test_fresh_node_id_prefix() {
        let id = fresh_node_id("single-llm-call");
        assert!(id.starts_with("single-llm-call-"));
    }
}
