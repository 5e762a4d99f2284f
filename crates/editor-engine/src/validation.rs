//! Graph validation
//!
//! Collects every problem in an authored graph rather than stopping at the
//! first: dangling edge endpoints, edges bound to handle keys absent from
//! their node's schema, duplicate node ids, unknown node types, and cycles.
//! Validation never mutates the graph and never blocks editing; the host
//! decides when to surface the results.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::catalog::{NodeCatalog, GROUP_NODE_TYPE, INPUT_NODE_TYPE};
use crate::schema::{schema_from_config, SchemaSide};
use crate::types::{EditorGraph, GraphNode};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Cycle detected in the graph
    CycleDetected,
    /// A node's type is not in the catalog
    UnknownNodeType { node_id: String, node_type: String },
    /// An edge references a non-existent node
    UnknownNode { edge_id: String, node_id: String },
    /// An edge is bound to a handle key absent from the node's schema
    UnknownHandle {
        edge_id: String,
        node_id: String,
        handle: String,
    },
    /// Two nodes share an ID
    DuplicateNodeId { node_id: String },
    /// The workflow has no graph-input node
    MissingInputNode,
    /// The workflow has more than one graph-input node
    MultipleInputNodes,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleDetected => write!(f, "Cycle detected in graph"),
            Self::UnknownNodeType { node_id, node_type } => {
                write!(f, "Unknown node type '{node_type}' for node '{node_id}'")
            }
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{edge_id}' references unknown node '{node_id}'")
            }
            Self::UnknownHandle {
                edge_id,
                node_id,
                handle,
            } => write!(
                f,
                "Edge '{edge_id}' is bound to handle '{handle}' absent from node '{node_id}'"
            ),
            Self::DuplicateNodeId { node_id } => {
                write!(f, "Duplicate node ID '{node_id}'")
            }
            Self::MissingInputNode => write!(f, "Workflow has no input node"),
            Self::MultipleInputNodes => write!(f, "Workflow has more than one input node"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate the structural rules of an editor graph
///
/// Returns all errors found (not just the first). Pass a catalog to enable
/// node type validation.
pub fn validate_graph(
    graph: &EditorGraph,
    catalog: Option<&NodeCatalog>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_unique_ids(graph, &mut errors);
    validate_edge_references(graph, &mut errors);
    detect_cycles(graph, &mut errors);

    if let Some(catalog) = catalog {
        validate_node_types(graph, catalog, &mut errors);
    }

    errors
}

/// Validate a graph as a publishable workflow
///
/// Adds the backend's rule that a workflow carries exactly one graph-input
/// node on top of the structural checks.
pub fn validate_workflow(
    graph: &EditorGraph,
    catalog: Option<&NodeCatalog>,
) -> Vec<ValidationError> {
    let mut errors = validate_graph(graph, catalog);

    let input_count = graph
        .nodes
        .iter()
        .filter(|n| n.node_type == INPUT_NODE_TYPE)
        .count();
    if input_count == 0 {
        errors.push(ValidationError::MissingInputNode);
    } else if input_count > 1 {
        errors.push(ValidationError::MultipleInputNodes);
    }

    errors
}

fn validate_unique_ids(graph: &EditorGraph, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for node in &graph.nodes {
        if !seen.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNodeId {
                node_id: node.id.clone(),
            });
        }
    }
}

/// Check that edge endpoints exist and that their handles are present in
/// the endpoint node's schema
fn validate_edge_references(graph: &EditorGraph, errors: &mut Vec<ValidationError>) {
    for edge in &graph.edges {
        match graph.find_node(&edge.source) {
            None => errors.push(ValidationError::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
            }),
            Some(node) => validate_handle(
                node,
                SchemaSide::OutputSchema,
                &edge.id,
                &edge.source_handle,
                errors,
            ),
        }
        match graph.find_node(&edge.target) {
            None => errors.push(ValidationError::UnknownNode {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
            }),
            Some(node) => validate_handle(
                node,
                SchemaSide::InputSchema,
                &edge.id,
                &edge.target_handle,
                errors,
            ),
        }
    }
}

/// A handle check only applies when the node declares a schema for that
/// side; nodes without one (groups, free-form types) are skipped
fn validate_handle(
    node: &GraphNode,
    side: SchemaSide,
    edge_id: &str,
    handle: &str,
    errors: &mut Vec<ValidationError>,
) {
    let Some(config) = node.data.get("config") else {
        return;
    };
    if config.get(side.config_key()).is_none() {
        return;
    }
    let schema = schema_from_config(config, side);
    if !schema.contains_key(handle) {
        errors.push(ValidationError::UnknownHandle {
            edge_id: edge_id.to_string(),
            node_id: node.id.clone(),
            handle: handle.to_string(),
        });
    }
}

fn validate_node_types(
    graph: &EditorGraph,
    catalog: &NodeCatalog,
    errors: &mut Vec<ValidationError>,
) {
    for node in &graph.nodes {
        if node.node_type == GROUP_NODE_TYPE {
            continue;
        }
        if !catalog.has_node_type(&node.node_type) {
            errors.push(ValidationError::UnknownNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            });
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
fn detect_cycles(graph: &EditorGraph, errors: &mut Vec<ValidationError>) {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in &graph.nodes {
        in_degree.insert(&node.id, 0);
    }
    for edge in &graph.edges {
        *in_degree.entry(&edge.target).or_insert(0) += 1;
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in &graph.edges {
            if edge.source == node_id {
                if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(&edge.target);
                    }
                }
            }
        }
    }

    if visited < graph.nodes.len() {
        errors.push(ValidationError::CycleDetected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NodeTemplate, VisualTag};
    use crate::types::{GraphEdge, Position};
    use serde_json::json;

    fn node(id: &str, node_type: &str, config: serde_json::Value) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            node_type: node_type.to_string(),
            position: Position::default(),
            data: json!({"title": id, "config": config}),
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

    fn catalog() -> NodeCatalog {
        let mut catalog = NodeCatalog::new();
        for name in ["input", "single-llm-call"] {
            catalog.register(
                "core",
                NodeTemplate {
                    name: name.to_string(),
                    visual_tag: VisualTag {
                        acronym: "N".to_string(),
                        color: "#000".to_string(),
                    },
                    config: serde_json::Map::new(),
                    input: None,
                    output: None,
                },
            );
        }
        catalog
    }

    fn valid_graph() -> EditorGraph {
        let mut graph = EditorGraph::new("wf", "Test");
        graph.nodes.push(node(
            "in",
            "input",
            json!({"output_schema": {"a": "str"}}),
        ));
        graph.nodes.push(node(
            "llm",
            "single-llm-call",
            json!({"input_schema": {"x": "str"}, "output_schema": {"response": "str"}}),
        ));
        graph.edges.push(edge("e1", "in", "a", "llm", "x"));
        graph
    }

    #[test]
    fn test_valid_graph_has_no_errors() {
        let errors = validate_workflow(&valid_graph(), Some(&catalog()));
        assert!(errors.is_empty(), "expected no errors, got: {errors:?}");
    }

    #[test]
    fn test_edge_to_missing_node() {
        let mut graph = valid_graph();
        graph.edges.push(edge("e2", "llm", "response", "ghost", "x"));

        let errors = validate_graph(&graph, None);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownNode { node_id, .. } if node_id == "ghost")));
    }

    #[test]
    fn test_edge_bound_to_absent_handle() {
        let mut graph = valid_graph();
        graph.edges.push(edge("e2", "in", "missing", "llm", "x"));

        let errors = validate_graph(&graph, None);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownHandle { handle, node_id, .. }
                if handle == "missing" && node_id == "in"
        )));
    }

    #[test]
    fn test_node_without_schema_skips_handle_check() {
        let mut graph = EditorGraph::new("wf", "Test");
        graph.nodes.push(GraphNode {
            id: "g".to_string(),
            node_type: "group".to_string(),
            position: Position::default(),
            data: json!({"title": "Group"}),
            style: None,
        });
        graph.nodes.push(node("llm", "single-llm-call", json!({})));
        graph.edges.push(edge("e1", "g", "anything", "llm", "anything"));

        let errors = validate_graph(&graph, None);
        assert!(errors.is_empty(), "got: {errors:?}");
    }

    #[test]
    fn test_duplicate_node_ids() {
        let mut graph = valid_graph();
        graph.nodes.push(node("llm", "single-llm-call", json!({})));

        let errors = validate_graph(&graph, None);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DuplicateNodeId { node_id } if node_id == "llm")));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = EditorGraph::new("wf", "Cycle");
        graph.nodes.push(node("a", "single-llm-call", json!({})));
        graph.nodes.push(node("b", "single-llm-call", json!({})));
        graph.edges.push(edge("e1", "a", "out", "b", "in"));
        graph.edges.push(edge("e2", "b", "out", "a", "in"));

        let errors = validate_graph(&graph, None);
        assert!(errors.contains(&ValidationError::CycleDetected));
    }

    #[test]
    fn test_unknown_node_type_with_catalog() {
        let mut graph = valid_graph();
        graph.nodes.push(node("x", "mystery", json!({})));

        let errors = validate_graph(&graph, Some(&catalog()));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownNodeType { node_type, .. } if node_type == "mystery")));
    }

    #[test]
    fn test_group_nodes_bypass_type_check() {
        let mut graph = valid_graph();
        graph.nodes.push(GraphNode {
            id: "g".to_string(),
            node_type: "group".to_string(),
            position: Position::default(),
            data: json!({"title": "Group"}),
            style: None,
        });

        let errors = validate_graph(&graph, Some(&catalog()));
        assert!(errors.is_empty(), "got: {errors:?}");
    }

    #[test]
    fn test_workflow_requires_exactly_one_input_node() {
        let mut graph = EditorGraph::new("wf", "Test");
        graph.nodes.push(node("llm", "single-llm-call", json!({})));

        let errors = validate_workflow(&graph, None);
        assert!(errors.contains(&ValidationError::MissingInputNode));

        graph.nodes.push(node("in1", "input", json!({})));
        graph.nodes.push(node("in2", "input", json!({})));
        let errors = validate_workflow(&graph, None);
        assert!(errors.contains(&ValidationError::MultipleInputNodes));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut graph = EditorGraph::new("wf", "Test");
        graph.nodes.push(node("a", "mystery-1", json!({})));
        graph.nodes.push(node("b", "mystery-2", json!({})));
        graph.edges.push(edge("e1", "a", "out", "b", "in"));
        graph.edges.push(edge("e2", "b", "out", "a", "in"));

        let errors = validate_graph(&graph, Some(&catalog()));
        assert!(errors.len() >= 3);
    }
}
