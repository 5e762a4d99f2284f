//! The editor store
//!
//! All shared editor state (the graph plus UI selection state) lives here,
//! and every mutation flows through [`EditorStore::dispatch`] as a typed
//! action applied by a reducer. Components read a consistent snapshot and
//! never mutate each other's state directly. The rename action applies its
//! config rewrite and edge repointing in a single dispatch, so observers
//! never see an edge bound to a handle key absent from its node's schema.

use std::sync::Arc;

use log::warn;
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::events::{EditorEvent, EventSink, NullEventSink};
use crate::rename::{normalized_rename_target, remap_edges, renamed_config};
use crate::schema::SchemaSide;
use crate::types::{EdgeId, EditorGraph, GraphEdge, GraphNode, NodeId, Position};
use crate::undo::UndoHistory;

/// Default sidebar width in pixels
pub const DEFAULT_SIDEBAR_WIDTH: f64 = 400.0;

/// UI-only state: never persisted, never part of undo history
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub selected_node: Option<NodeId>,
    pub sidebar_width: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            selected_node: None,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
        }
    }
}

/// The complete editor state: authored graph plus UI state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub graph: EditorGraph,
    pub ui: UiState,
}

/// Actions accepted by the store
#[derive(Debug, Clone)]
pub enum EditorAction {
    /// Add a node to the graph (no-op when the ID already exists)
    AddNode(GraphNode),
    /// Remove a node and every edge attached to it
    RemoveNode { node_id: NodeId },
    /// Move a node to a new canvas position
    MoveNode { node_id: NodeId, position: Position },
    /// Connect an edge (no-op when the ID already exists)
    AddEdge(GraphEdge),
    /// Disconnect an edge
    RemoveEdge { edge_id: EdgeId },
    /// Merge the given object into the node's data, key by key
    UpdateNodeData { node_id: NodeId, data: Value },
    /// Rename a schema key, rewriting config, messages and bound edges
    RenameHandle {
        node_id: NodeId,
        old_key: String,
        new_key: String,
        side: SchemaSide,
    },
    /// Select a node in the sidebar, or clear the selection
    SetSelectedNode { node_id: Option<NodeId> },
    /// Resize the sidebar
    SetSidebarWidth { width: f64 },
}

/// Store owning the editor state, its event sink, and undo history
pub struct EditorStore {
    state: EditorState,
    events: Arc<dyn EventSink>,
    history: UndoHistory,
}

impl EditorStore {
    /// Create a store around an initial graph with the given event sink
    pub fn new(graph: EditorGraph, events: Arc<dyn EventSink>) -> Self {
        let mut store = Self {
            state: EditorState {
                graph,
                ui: UiState::default(),
            },
            events,
            history: UndoHistory::default(),
        };
        store.record_history();
        store
    }

    /// Create a store tuned by an engine config (sidebar width, undo depth)
    pub fn with_config(
        graph: EditorGraph,
        events: Arc<dyn EventSink>,
        config: &EngineConfig,
    ) -> Self {
        let mut store = Self {
            state: EditorState {
                graph,
                ui: UiState {
                    selected_node: None,
                    sidebar_width: config.sidebar_width,
                },
            },
            events,
            history: UndoHistory::new(config.undo_depth),
        };
        store.record_history();
        store
    }

    /// Create a store that discards events (embedding in tests or tools)
    pub fn detached(graph: EditorGraph) -> Self {
        Self::new(graph, Arc::new(NullEventSink))
    }

    /// The current state snapshot
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The authored graph
    pub fn graph(&self) -> &EditorGraph {
        &self.state.graph
    }

    /// The currently selected node, if any
    pub fn selected_node(&self) -> Option<&GraphNode> {
        let id = self.state.ui.selected_node.as_deref()?;
        self.state.graph.find_node(id)
    }

    /// Apply an action, record undo history for graph mutations, and emit
    /// the matching event
    pub fn dispatch(&mut self, action: EditorAction) {
        let applied = match action {
            EditorAction::AddNode(node) => self.add_node(node),
            EditorAction::RemoveNode { node_id } => self.remove_node(&node_id),
            EditorAction::MoveNode { node_id, position } => self.move_node(&node_id, position),
            EditorAction::AddEdge(edge) => self.add_edge(edge),
            EditorAction::RemoveEdge { edge_id } => self.remove_edge(&edge_id),
            EditorAction::UpdateNodeData { node_id, data } => {
                self.update_node_data(&node_id, data)
            }
            EditorAction::RenameHandle {
                node_id,
                old_key,
                new_key,
                side,
            } => self.rename_handle(&node_id, &old_key, &new_key, side),
            EditorAction::SetSelectedNode { node_id } => {
                self.state.ui.selected_node = node_id.clone();
                Some(Applied {
                    event: EditorEvent::SelectionChanged { node_id },
                    mutates_graph: false,
                })
            }
            EditorAction::SetSidebarWidth { width } => {
                self.state.ui.sidebar_width = width;
                Some(Applied {
                    event: EditorEvent::SidebarResized { width },
                    mutates_graph: false,
                })
            }
        };

        if let Some(applied) = applied {
            if applied.mutates_graph {
                self.record_history();
            }
            self.emit(applied.event);
        }
    }

    /// Restore the previous graph state; `true` when a state was restored
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(Ok(graph)) => {
                self.restore(graph);
                true
            }
            Some(Err(e)) => {
                warn!("undo failed to decode snapshot: {e}");
                false
            }
            None => false,
        }
    }

    /// Restore the next graph state; `true` when a state was restored
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(Ok(graph)) => {
                self.restore(graph);
                true
            }
            Some(Err(e)) => {
                warn!("redo failed to decode snapshot: {e}");
                false
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, graph: EditorGraph) {
        // A restored graph may no longer contain the selected node
        if let Some(selected) = &self.state.ui.selected_node {
            if graph.find_node(selected).is_none() {
                self.state.ui.selected_node = None;
            }
        }
        self.state.graph = graph;
        self.emit(EditorEvent::GraphRestored);
    }

    fn add_node(&mut self, node: GraphNode) -> Option<Applied> {
        if self.state.graph.find_node(&node.id).is_some() {
            return None;
        }
        let node_id = node.id.clone();
        self.state.graph.nodes.push(node);
        Some(Applied::graph(EditorEvent::NodeAdded { node_id }))
    }

    fn remove_node(&mut self, node_id: &str) -> Option<Applied> {
        self.state.graph.remove_node(node_id)?;
        if self.state.ui.selected_node.as_deref() == Some(node_id) {
            self.state.ui.selected_node = None;
        }
        Some(Applied::graph(EditorEvent::NodeRemoved {
            node_id: node_id.to_string(),
        }))
    }

    fn move_node(&mut self, node_id: &str, position: Position) -> Option<Applied> {
        let node = self.state.graph.find_node_mut(node_id)?;
        node.position = position;
        Some(Applied::graph(EditorEvent::NodeMoved {
            node_id: node_id.to_string(),
        }))
    }

    fn add_edge(&mut self, edge: GraphEdge) -> Option<Applied> {
        if self.state.graph.find_edge(&edge.id).is_some() {
            return None;
        }
        let edge_id = edge.id.clone();
        self.state.graph.edges.push(edge);
        Some(Applied::graph(EditorEvent::EdgeAdded { edge_id }))
    }

    fn remove_edge(&mut self, edge_id: &str) -> Option<Applied> {
        self.state.graph.remove_edge(edge_id)?;
        Some(Applied::graph(EditorEvent::EdgeRemoved {
            edge_id: edge_id.to_string(),
        }))
    }

    /// Merge `data` into the node's existing data by key (per-key replace)
    fn update_node_data(&mut self, node_id: &str, data: Value) -> Option<Applied> {
        let node = self.state.graph.find_node_mut(node_id)?;
        let Value::Object(patch) = data else {
            return None;
        };
        if !node.data.is_object() {
            node.data = Value::Object(Map::new());
        }
        if let Some(existing) = node.data.as_object_mut() {
            for (key, value) in patch {
                existing.insert(key, value);
            }
        }
        Some(Applied::graph(EditorEvent::NodeDataUpdated {
            node_id: node_id.to_string(),
        }))
    }

    /// Apply the full rename contract: normalized key, schema + message
    /// rewrite, and edge repointing, all in one dispatch
    fn rename_handle(
        &mut self,
        node_id: &str,
        old_key: &str,
        raw_new_key: &str,
        side: SchemaSide,
    ) -> Option<Applied> {
        let new_key = normalized_rename_target(old_key, raw_new_key)?;
        let node = self.state.graph.find_node_mut(node_id)?;

        let config = node
            .data
            .get("config")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let updated = renamed_config(&config, old_key, &new_key, side);
        if !node.data.is_object() {
            node.data = Value::Object(Map::new());
        }
        if let Some(data) = node.data.as_object_mut() {
            data.insert("config".to_string(), updated);
        }

        remap_edges(&mut self.state.graph.edges, node_id, side, old_key, &new_key);

        Some(Applied::graph(EditorEvent::HandleRenamed {
            node_id: node_id.to_string(),
            old_key: old_key.to_string(),
            new_key,
            side,
        }))
    }

    fn record_history(&mut self) {
        if let Err(e) = self.history.record(&self.state.graph) {
            warn!("failed to record undo snapshot: {e}");
        }
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.events.send(event) {
            warn!("failed to deliver editor event: {e}");
        }
    }
}

struct Applied {
    event: EditorEvent,
    mutates_graph: bool,
}

impl Applied {
    fn graph(event: EditorEvent) -> Self {
        Self {
            event,
            mutates_graph: true,
        }
    }
}
