//! Debounced whole-graph autosave
//!
//! Every time the node/edge collection changes, the current graph is
//! flattened into its persisted document and a save is scheduled through a
//! trailing debounce, so a burst of edits produces one API call carrying
//! the final state. A failed save is caught and logged; the next scheduled
//! save is the only recovery path, and local editing is never blocked.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use editor_engine::config::EngineConfig;
use editor_engine::debounce::Debouncer;
use editor_engine::types::EditorGraph;

use crate::client::WorkflowBackend;
use crate::document::{build_workflow_document, WorkflowDocument};

/// Default trailing-debounce window between a graph change and its save
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Schedules debounced saves of the authored graph
pub struct AutosaveService {
    workflow_id: String,
    saves: Debouncer<WorkflowDocument>,
}

impl AutosaveService {
    /// Create a service saving through `backend` with the default window
    pub fn new(workflow_id: impl Into<String>, backend: Arc<dyn WorkflowBackend>) -> Self {
        Self::with_window(workflow_id, backend, AUTOSAVE_DEBOUNCE)
    }

    /// Create a service with the autosave window from an engine config
    pub fn from_config(
        workflow_id: impl Into<String>,
        backend: Arc<dyn WorkflowBackend>,
        config: &EngineConfig,
    ) -> Self {
        Self::with_window(workflow_id, backend, config.autosave_debounce())
    }

    /// Create a service with an explicit debounce window
    pub fn with_window(
        workflow_id: impl Into<String>,
        backend: Arc<dyn WorkflowBackend>,
        window: Duration,
    ) -> Self {
        let workflow_id = workflow_id.into();
        let save_id = workflow_id.clone();
        let saves = Debouncer::new(window, move |document: WorkflowDocument| {
            let backend = Arc::clone(&backend);
            let workflow_id = save_id.clone();
            tokio::spawn(async move {
                match backend.update_workflow(&workflow_id, &document).await {
                    Ok(()) => debug!("workflow '{workflow_id}' saved"),
                    Err(e) => warn!("workflow '{workflow_id}' save failed: {e}"),
                }
            });
        });
        Self { workflow_id, saves }
    }

    /// The workflow this service persists
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Schedule a save of the current graph state
    ///
    /// No-op while the graph has neither nodes nor edges.
    pub fn graph_changed(
        &self,
        graph: &EditorGraph,
        input_variables: &[String],
        test_inputs: Value,
    ) {
        if graph.is_empty() {
            return;
        }
        let document =
            build_workflow_document(graph, input_variables, &graph.name, test_inputs);
        self.saves.call(document);
    }

    /// Schedule a save of an already-built document
    pub fn schedule(&self, document: WorkflowDocument) {
        self.saves.call(document);
    }

    /// Cancel any pending save (called on editor teardown)
    pub fn cancel(&self) {
        self.saves.cancel();
    }
}
