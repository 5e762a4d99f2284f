//! Workflow persistence for Heddle
//!
//! Flattens the in-memory editor graph into the backend's workflow document
//! and keeps the stored copy current through debounced autosave. The
//! document is always derived from live graph state; nothing here is a
//! source of truth.

pub mod autosave;
pub mod client;
pub mod document;

// Re-export key types
pub use autosave::{AutosaveService, AUTOSAVE_DEBOUNCE};
pub use client::{ClientError, HttpWorkflowBackend, WorkflowBackend};
pub use document::{
    build_workflow_document, NodeCoordinates, WorkflowDefinition, WorkflowDocument,
    WorkflowLinkSpec, WorkflowNodeSpec,
};
