//! Error types for the editor engine

use thiserror::Error;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that can occur in the editor engine
#[derive(Debug, Error)]
pub enum EditorError {
    /// A node type is not present in the catalog
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// A node ID is not present in the graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A dotted config path could not be traversed
    #[error("Invalid config path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Compression error
    #[error("Compression error: {0}")]
    Compression(String),
}

impl EditorError {
    /// Create an invalid-path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
