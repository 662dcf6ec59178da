// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the timeline.

use serde::{Deserialize, Serialize};
use tisfat_editor_entities::EntityState;
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// An explicit pose at a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Frame index
    pub time: u32,
    /// Pose at this frame
    pub state: EntityState,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: u32, state: EntityState) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            state,
        }
    }
}

/// Which neighbour of a keyframe to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    /// The keyframe before
    Previous,
    /// The keyframe after
    Next,
}
