//! Editor Engine - Graph editor state core for Heddle
//!
//! This crate owns the in-memory state of the visual workflow editor: the
//! node/edge graph, node instantiation from type templates, schema-driven
//! configuration forms, and the consistency work that keeps handle
//! identifiers aligned across schemas, message templates, and edges.
//!
//! # Architecture
//!
//! All shared state lives in an [`EditorStore`] and is mutated only through
//! dispatched [`EditorAction`]s, so every component reads one consistent
//! snapshot:
//!
//! - [`NodeCatalog`] + [`factory::create_node`]: templates in, node
//!   instances out, with deep-copied data and per-key override merging
//! - [`form::ConfigForm`]: the single edit funnel for config fields, with
//!   debounced slider commits
//! - [`EditorAction::RenameHandle`]: schema rewrite, `{{ key }}` message
//!   rewriting, and edge repointing applied in one dispatch
//! - [`UndoHistory`]: compressed whole-graph snapshots for undo/redo
//! - [`Debouncer`]: the single-slot "latest wins" timer shared by config
//!   commits and autosave

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod factory;
pub mod form;
pub mod paths;
pub mod rename;
pub mod schema;
pub mod store;
pub mod types;
pub mod undo;
pub mod validation;

// Re-export key types
pub use catalog::{NodeCatalog, NodeTemplate, VisualTag};
pub use config::EngineConfig;
pub use debounce::Debouncer;
pub use error::{EditorError, Result};
pub use events::{EditorEvent, EventSink, NullEventSink, VecEventSink};
pub use schema::{SchemaMap, SchemaSide};
pub use store::{EditorAction, EditorState, EditorStore};
pub use types::{EdgeId, EditorGraph, GraphEdge, GraphNode, HandleId, NodeId, Position};
pub use undo::UndoHistory;
pub use validation::{validate_graph, validate_workflow, ValidationError};
