//! Event types for observing editor state changes
//!
//! Every store dispatch emits one event describing what changed. Consumers
//! (the canvas host, the autosave scheduler, tests) subscribe through an
//! `EventSink` so the store stays independent of any transport.

use serde::{Deserialize, Serialize};

use crate::schema::SchemaSide;
use crate::types::{EdgeId, NodeId};

/// Trait for receiving editor events
///
/// This abstracts over the delivery mechanism (channel, callback, test
/// collector) so the store can be embedded in different hosts.
pub trait EventSink: Send + Sync {
    /// Deliver an event
    ///
    /// Returns an error if the event could not be delivered (e.g. the
    /// consumer went away).
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Error when delivering events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted as the user edits the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A node was added to the graph
    #[serde(rename_all = "camelCase")]
    NodeAdded { node_id: NodeId },

    /// A node (and its attached edges) was removed
    #[serde(rename_all = "camelCase")]
    NodeRemoved { node_id: NodeId },

    /// A node was dragged to a new position
    #[serde(rename_all = "camelCase")]
    NodeMoved { node_id: NodeId },

    /// A node's data record changed
    #[serde(rename_all = "camelCase")]
    NodeDataUpdated { node_id: NodeId },

    /// An edge was connected
    #[serde(rename_all = "camelCase")]
    EdgeAdded { edge_id: EdgeId },

    /// An edge was disconnected
    #[serde(rename_all = "camelCase")]
    EdgeRemoved { edge_id: EdgeId },

    /// A handle key was renamed, with edges repointed
    #[serde(rename_all = "camelCase")]
    HandleRenamed {
        node_id: NodeId,
        old_key: String,
        new_key: String,
        side: SchemaSide,
    },

    /// The selected node changed
    #[serde(rename_all = "camelCase")]
    SelectionChanged { node_id: Option<NodeId> },

    /// The sidebar was resized
    #[serde(rename_all = "camelCase")]
    SidebarResized { width: f64 },

    /// The whole graph was replaced by an undo/redo restore
    #[serde(rename_all = "camelCase")]
    GraphRestored,
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: parking_lot::Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}
