// SPDX-License-Identifier: MIT OR Apache-2.0
//! What the user has picked on the timeline.

use crate::frameset::FramesetId;
use crate::keyframe::KeyframeId;
use crate::layer::{FrameKind, LayerId};

/// Current timeline selection
///
/// Exactly one of keyframe, blank frame or null frame can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A keyframe
    Keyframe {
        /// Owning layer
        layer: LayerId,
        /// Owning frameset
        frameset: FramesetId,
        /// The keyframe
        keyframe: KeyframeId,
    },
    /// A frame inside a frameset with no keyframe
    BlankFrame {
        /// Owning layer
        layer: LayerId,
        /// Enclosing frameset
        frameset: FramesetId,
        /// Frame index
        time: u32,
    },
    /// A frame no frameset covers
    NullFrame {
        /// Owning layer
        layer: LayerId,
        /// Frame index
        time: u32,
    },
}

impl Selection {
    /// Build the selection for a classified frame
    pub fn from_frame_kind(layer: LayerId, time: u32, kind: FrameKind) -> Self {
        match kind {
            FrameKind::Keyframe { frameset, keyframe } => Self::Keyframe {
                layer,
                frameset,
                keyframe,
            },
            FrameKind::Blank { frameset } => Self::BlankFrame { layer, frameset, time },
            FrameKind::Null => Self::NullFrame { layer, time },
        }
    }

    /// Selected layer
    pub fn layer(&self) -> Option<LayerId> {
        match *self {
            Self::None => None,
            Self::Keyframe { layer, .. } | Self::BlankFrame { layer, .. } | Self::NullFrame { layer, .. } => {
                Some(layer)
            }
        }
    }

    /// Selected or enclosing frameset
    pub fn frameset(&self) -> Option<FramesetId> {
        match *self {
            Self::Keyframe { frameset, .. } | Self::BlankFrame { frameset, .. } => Some(frameset),
            Self::None | Self::NullFrame { .. } => None,
        }
    }

    /// Frame type of the selection
    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::None => FrameType::None,
            Self::Keyframe { .. } => FrameType::Keyframe,
            Self::BlankFrame { .. } => FrameType::Blank,
            Self::NullFrame { .. } => FrameType::Null,
        }
    }
}

/// Kind of the selected frame, used to pick context-menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Nothing selected
    None,
    /// Uncovered frame
    Null,
    /// Frame inside a frameset
    Blank,
    /// Keyframe
    Keyframe,
}
