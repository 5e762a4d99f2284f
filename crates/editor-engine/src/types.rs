//! Core types for the editor graph
//!
//! These types define the in-memory shape of an authored graph: node
//! instances, the edges connecting their handles, and the graph container
//! with its lookup helpers. Node configuration lives in `data` as JSON so
//! that type templates can declare arbitrary config shapes.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Identifier for a handle (a named input or output connection point),
/// always equal to a key of the owning node's input or output schema.
pub type HandleId = String;

/// Position of a node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fixed render size for layout-container nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub width: f64,
    pub height: f64,
}

/// An edge connecting an output handle of one node to an input handle of
/// another
///
/// Both handle identifiers must name keys currently present in the
/// corresponding node's schema; rename coordination keeps this true when
/// schema keys change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Output handle on the source node
    pub source_handle: HandleId,
    /// Target node ID
    pub target: NodeId,
    /// Input handle on the target node
    pub target_handle: HandleId,
}

/// A node instance in the editor graph
///
/// `data` holds the per-instance record built by the node factory: `title`,
/// `acronym`, `color`, the live `config` object, and the `input`/`output`
/// property maps, plus any caller overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node type (references a catalog template by name)
    pub node_type: String,
    /// Position on the canvas
    pub position: Position,
    /// Instance data (title, config, input/output properties, overrides)
    pub data: serde_json::Value,
    /// Fixed size, set only for layout containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
}

impl GraphNode {
    /// Get the node's display title, if set
    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(|t| t.as_str())
    }

    /// Get the node's live config object, if present
    pub fn config(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.data.get("config").and_then(|c| c.as_object())
    }

    /// Get the node's live config object (mutable), if present
    pub fn config_mut(&mut self) -> Option<&mut serde_json::Map<String, serde_json::Value>> {
        self.data.get_mut("config").and_then(|c| c.as_object_mut())
    }
}

/// The complete editor graph: every node and edge currently authored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorGraph {
    /// Unique identifier for this graph
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Nodes in the graph
    pub nodes: Vec<GraphNode>,
    /// Edges connecting node handles
    pub edges: Vec<GraphEdge>,
}

impl EditorGraph {
    /// Create a new empty graph
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Get edges bound to a specific handle on a node, on either side
    pub fn edges_for_handle<'a>(
        &'a self,
        node_id: &'a str,
        handle: &'a str,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| {
            (e.source == node_id && e.source_handle == handle)
                || (e.target == node_id && e.target_handle == handle)
        })
    }

    /// Remove a node by ID, dropping every edge attached to it
    ///
    /// Returns the removed node, or `None` if no node had that ID.
    pub fn remove_node(&mut self, node_id: &str) -> Option<GraphNode> {
        let pos = self.nodes.iter().position(|n| n.id == node_id)?;
        self.edges.retain(|e| e.source != node_id && e.target != node_id);
        Some(self.nodes.remove(pos))
    }

    /// Remove an edge by ID
    pub fn remove_edge(&mut self, edge_id: &str) -> Option<GraphEdge> {
        let pos = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(pos))
    }

    /// Whether the graph has neither nodes nor edges
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
