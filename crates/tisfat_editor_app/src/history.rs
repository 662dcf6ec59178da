// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built on bincode snapshots.
//!
//! Every operation stores the state before and after a change, serialized,
//! together with what the snapshot describes: one keyframe pose or the whole
//! project.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tisfat_editor_timeline::{FramesetId, KeyframeId, LayerId};

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationID(u64);

/// Serialized state (CoW data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Serialized state
    pub data: Vec<u8>,
}

impl StateSnapshot {
    /// Create from serializable value
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(value)?,
        })
    }

    /// Deserialize to value
    pub fn to_value<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.data)?)
    }
}

/// What a snapshot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotTarget {
    /// One keyframe's pose
    Pose {
        /// Owning layer
        layer: LayerId,
        /// Owning frameset
        frameset: FramesetId,
        /// The keyframe
        keyframe: KeyframeId,
    },
    /// The whole project
    Project,
}

/// An operation that can be undone/redone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation ID
    pub id: OperationID,
    /// Human-readable description
    pub description: String,
    /// What the snapshots describe
    pub target: SnapshotTarget,
    /// State before operation (for undo)
    pub before: StateSnapshot,
    /// State after operation (for redo)
    pub after: StateSnapshot,
}

impl Operation {
    /// Create a new operation
    pub fn new(
        id: OperationID,
        description: String,
        target: SnapshotTarget,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            id,
            description,
            target,
            before,
            after,
        }
    }
}

/// Group of operations that are undone/redone together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationGroup {
    /// Group ID
    pub id: OperationID,
    /// Human-readable description
    pub description: String,
    /// Operations in this group
    pub operations: Vec<Operation>,
}

impl OperationGroup {
    /// Create a new operation group
    pub fn new(id: OperationID, description: String) -> Self {
        Self {
            id,
            description,
            operations: Vec::new(),
        }
    }

    /// Add an operation to this group
    pub fn add_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    /// Undo stack
    undo_stack: VecDeque<OperationGroup>,
    /// Redo stack
    redo_stack: VecDeque<OperationGroup>,
    /// Next operation ID
    next_id: u64,
    /// Maximum history depth
    max_depth: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
        }
    }

    /// Begin a new operation
    pub fn begin_operation(&mut self) -> OperationID {
        let id = OperationID(self.next_id);
        self.next_id += 1;
        id
    }

    /// Commit an operation group
    pub fn commit(&mut self, group: OperationGroup) {
        if group.operations.is_empty() {
            return;
        }

        // Clear redo stack
        self.redo_stack.clear();
        self.undo_stack.push_back(group);

        // Enforce history limit
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the last operation
    pub fn undo(&mut self) -> Result<OperationGroup> {
        let group = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        self.redo_stack.push_back(group.clone());

        Ok(group)
    }

    /// Redo the last undone operation
    pub fn redo(&mut self) -> Result<OperationGroup> {
        let group = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        self.undo_stack.push_back(group.clone());

        Ok(group)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|g| g.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
