//! Undo/redo over compressed graph snapshots
//!
//! Every graph-mutating dispatch records a full snapshot of the editor
//! graph; undo and redo restore whole graphs. Snapshots are zstd-compressed
//! JSON, so the stack stays small even for long editing sessions, and no
//! action needs an inverse operation. UI-only state (selection, sidebar) is
//! not part of a snapshot.

use std::collections::VecDeque;

use crate::error::{EditorError, Result};
use crate::types::EditorGraph;

const ZSTD_LEVEL: i32 = 3;

/// Bounded undo/redo history of compressed graph snapshots
pub struct UndoHistory {
    snapshots: VecDeque<Vec<u8>>,
    /// Index of the snapshot representing the current state
    cursor: usize,
    max_snapshots: usize,
}

impl UndoHistory {
    /// Create a history keeping at most `max_snapshots` states
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: 0,
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Record the graph as the newest state
    ///
    /// Any redo states beyond the cursor are discarded; the oldest states
    /// are trimmed once the bound is exceeded.
    pub fn record(&mut self, graph: &EditorGraph) -> Result<()> {
        let json = serde_json::to_vec(graph)?;
        let compressed = zstd::encode_all(&json[..], ZSTD_LEVEL)
            .map_err(|e| EditorError::Compression(e.to_string()))?;

        while self.snapshots.len() > self.cursor + 1 {
            self.snapshots.pop_back();
        }
        self.snapshots.push_back(compressed);
        self.cursor = self.snapshots.len() - 1;

        while self.snapshots.len() > self.max_snapshots {
            self.snapshots.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
        Ok(())
    }

    /// Step back one state, returning the graph to restore
    pub fn undo(&mut self) -> Option<Result<EditorGraph>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.decode(self.cursor))
    }

    /// Step forward one state, returning the graph to restore
    pub fn redo(&mut self) -> Option<Result<EditorGraph>> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.decode(self.cursor))
    }

    /// The graph at the cursor, without moving it
    pub fn current(&self) -> Option<Result<EditorGraph>> {
        if self.snapshots.is_empty() {
            None
        } else {
            Some(self.decode(self.cursor))
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop all recorded states
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }

    /// Total compressed size of the history, in bytes
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(Vec::len).sum()
    }

    fn decode(&self, index: usize) -> Result<EditorGraph> {
        let json = zstd::decode_all(&self.snapshots[index][..])
            .map_err(|e| EditorError::Compression(e.to_string()))?;
        Ok(serde_json::from_slice(&json)?)
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
