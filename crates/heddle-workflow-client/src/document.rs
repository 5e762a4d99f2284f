//! The persisted workflow document
//!
//! The backend consumes a flattened, snake_case form of the authored graph:
//! nodes projected to `{id, title, node_type, config, coordinates}` and
//! edges projected to link records carrying both endpoints' handle keys and
//! declared types. The document is derived, never authoritative; it is
//! recomputed in full from the live graph at save time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use editor_engine::catalog::{DEFAULT_TYPE_TOKEN, INPUT_NODE_TYPE};
use editor_engine::schema::{schema_from_config, SchemaSide};
use editor_engine::types::{EditorGraph, GraphEdge, GraphNode};

/// Canvas coordinates of a persisted node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeCoordinates {
    pub x: f64,
    pub y: f64,
}

/// One persisted workflow step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNodeSpec {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub node_type: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<NodeCoordinates>,
}

/// A persisted connection between an output key and an input key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowLinkSpec {
    pub source_id: String,
    pub source_output_key: String,
    pub source_output_type: String,
    pub target_id: String,
    pub target_input_key: String,
    pub target_input_type: String,
}

/// The workflow DAG in its persisted form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub nodes: Vec<WorkflowNodeSpec>,
    pub links: Vec<WorkflowLinkSpec>,
    #[serde(default)]
    pub test_inputs: Value,
}

/// The document sent to the persistence API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub name: String,
    pub definition: WorkflowDefinition,
}

/// Flatten the live graph into its persisted document
///
/// Malformed node entries (empty id) are skipped defensively. The graph
/// input node's `input_schema` is synthesized from the declared workflow
/// input variable names, each mapped to the placeholder type token,
/// overriding whatever schema the node carried.
pub fn build_workflow_document(
    graph: &EditorGraph,
    input_variables: &[String],
    name: &str,
    test_inputs: Value,
) -> WorkflowDocument {
    let nodes = graph
        .nodes
        .iter()
        .filter(|n| !n.id.is_empty())
        .map(|n| project_node(n, input_variables))
        .collect();
    let links = graph.edges.iter().map(|e| project_link(graph, e)).collect();

    WorkflowDocument {
        name: name.to_string(),
        definition: WorkflowDefinition {
            nodes,
            links,
            test_inputs,
        },
    }
}

fn project_node(node: &GraphNode, input_variables: &[String]) -> WorkflowNodeSpec {
    let mut config = node.config().cloned().unwrap_or_default();

    if node.node_type == INPUT_NODE_TYPE {
        let mut schema = Map::new();
        for variable in input_variables {
            schema.insert(
                variable.clone(),
                Value::String(DEFAULT_TYPE_TOKEN.to_string()),
            );
        }
        config.insert("input_schema".to_string(), Value::Object(schema));
    }

    WorkflowNodeSpec {
        id: node.id.clone(),
        title: node.title().unwrap_or_default().to_string(),
        node_type: node.node_type.clone(),
        config: Value::Object(config),
        coordinates: Some(NodeCoordinates {
            x: node.position.x,
            y: node.position.y,
        }),
    }
}

fn project_link(graph: &EditorGraph, edge: &GraphEdge) -> WorkflowLinkSpec {
    WorkflowLinkSpec {
        source_id: edge.source.clone(),
        source_output_key: edge.source_handle.clone(),
        source_output_type: declared_type(
            graph,
            &edge.source,
            SchemaSide::OutputSchema,
            &edge.source_handle,
        ),
        target_id: edge.target.clone(),
        target_input_key: edge.target_handle.clone(),
        target_input_type: declared_type(
            graph,
            &edge.target,
            SchemaSide::InputSchema,
            &edge.target_handle,
        ),
    }
}

/// Best-effort type lookup from a node's schema; missing anything along the
/// way falls back to the generic string token
fn declared_type(graph: &EditorGraph, node_id: &str, side: SchemaSide, key: &str) -> String {
    graph
        .find_node(node_id)
        .and_then(|n| n.data.get("config"))
        .map(|config| schema_from_config(config, side))
        .and_then(|schema| schema.get(key).cloned())
        .unwrap_or_else(|| DEFAULT_TYPE_TOKEN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_engine::types::Position;
    use serde_json::json;

    fn node(id: &str, node_type: &str, config: Value) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            node_type: node_type.to_string(),
            position: Position::new(1.0, 2.0),
            data: json!({"title": format!("{id} title"), "config": config}),
            style: None,
        }
    }

    fn edge(id: &str, source: &str, source_handle: &str, target: &str, target_handle: &str) -> GraphEdge {
        GraphEdge {
            id: id.to_string(),
            source: source.to_string(),
            source_handle: source_handle.to_string(),
            target: target.to_string(),
            target_handle: target_handle.to_string(),
        }
    }

    fn sample_graph() -> EditorGraph {
        let mut graph = EditorGraph::new("wf-1", "My Workflow");
        graph.nodes.push(node(
            "in",
            "input",
            json!({"input_schema": {"stale": "str"}, "output_schema": {"a": "str", "b": "str"}}),
        ));
        graph.nodes.push(node(
            "llm",
            "single-llm-call",
            json!({"input_schema": {"x": "int"}, "output_schema": {"response": "str"}}),
        ));
        graph.edges.push(edge("e1", "in", "a", "llm", "x"));
        graph
    }

    #[test]
    fn test_input_node_schema_synthesized_from_variables() {
        let graph = sample_graph();
        let variables = vec!["a".to_string(), "b".to_string()];
        let doc = build_workflow_document(&graph, &variables, "My Workflow", json!([]));

        let input = doc
            .definition
            .nodes
            .iter()
            .find(|n| n.node_type == "input")
            .unwrap();
        // The carried schema is overridden entirely
        assert_eq!(input.config["input_schema"], json!({"a": "str", "b": "str"}));
        assert_eq!(input.title, "in title");
        assert_eq!(input.coordinates, Some(NodeCoordinates { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn test_other_nodes_copy_config_verbatim() {
        let graph = sample_graph();
        let doc = build_workflow_document(&graph, &[], "My Workflow", json!([]));

        let llm = doc
            .definition
            .nodes
            .iter()
            .find(|n| n.node_type == "single-llm-call")
            .unwrap();
        assert_eq!(llm.config["input_schema"], json!({"x": "int"}));
        assert_eq!(llm.config["output_schema"], json!({"response": "str"}));
    }

    #[test]
    fn test_link_projection_carries_keys_and_types() {
        let graph = sample_graph();
        let doc = build_workflow_document(&graph, &["a".to_string()], "wf", json!([]));

        assert_eq!(doc.definition.links.len(), 1);
        let link = &doc.definition.links[0];
        assert_eq!(link.source_id, "in");
        assert_eq!(link.source_output_key, "a");
        assert_eq!(link.source_output_type, "str");
        assert_eq!(link.target_id, "llm");
        assert_eq!(link.target_input_key, "x");
        assert_eq!(link.target_input_type, "int");
    }

    #[test]
    fn test_missing_schema_entries_default_to_str() {
        let mut graph = EditorGraph::new("wf", "wf");
        graph.nodes.push(node("a", "single-llm-call", json!({})));
        graph.nodes.push(node("b", "single-llm-call", json!({})));
        graph.edges.push(edge("e1", "a", "out", "b", "in"));

        let doc = build_workflow_document(&graph, &[], "wf", json!([]));
        let link = &doc.definition.links[0];
        assert_eq!(link.source_output_type, "str");
        assert_eq!(link.target_input_type, "str");
    }

    #[test]
    fn test_malformed_nodes_are_skipped() {
        let mut graph = sample_graph();
        graph.nodes.push(node("", "single-llm-call", json!({})));

        let doc = build_workflow_document(&graph, &[], "wf", json!([]));
        assert_eq!(doc.definition.nodes.len(), 2);
    }

    #[test]
    fn test_document_wire_names_are_snake_case() {
        let graph = sample_graph();
        let doc = build_workflow_document(&graph, &[], "wf", json!([{"a": "1"}]));
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["definition"]["nodes"][0].get("node_type").is_some());
        assert!(json["definition"]["links"][0].get("source_output_key").is_some());
        assert_eq!(json["definition"]["test_inputs"], json!([{"a": "1"}]));
    }
}
