// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline errors.
//!
//! [`EditError`] is the reason an edit was refused. The interactive
//! controller logs and drops these, so a refused drag simply does not move
//! anything. [`InvariantError`] reports structural damage, e.g. in a loaded
//! project.

use crate::frameset::FramesetId;
use crate::keyframe::KeyframeId;
use crate::layer::LayerId;
use thiserror::Error;
use tisfat_editor_entities::EntityError;

/// Reason an edit was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Another keyframe of the frameset already sits at this time
    #[error("Frame {time} already holds a keyframe")]
    KeyframeCollision {
        /// Conflicting time
        time: u32,
    },

    /// An interior keyframe would leave its frameset
    #[error("Frame {time} is outside the frameset span {start}..={end}")]
    OutsideFrameset {
        /// Requested time
        time: u32,
        /// Frameset start
        start: u32,
        /// Frameset end
        end: u32,
    },

    /// An end keyframe would pass its inner neighbour
    #[error("End keyframe moved to {time} would no longer be extremal")]
    NotExtremal {
        /// Requested time
        time: u32,
    },

    /// The resulting span would touch another frameset
    #[error("Span overlaps the frameset at {start}..={end}")]
    OverlapsFrameset {
        /// Start of the other frameset
        start: u32,
        /// End of the other frameset
        end: u32,
    },

    /// No two consecutive keyframes enclose the time
    #[error("No keyframe gap encloses frame {time}")]
    NoEnclosingGap {
        /// Requested time
        time: u32,
    },

    /// A frameset must keep its two end keyframes
    #[error("A frameset needs at least two keyframes")]
    TooFewKeyframes,

    /// A layer must keep at least one frameset
    #[error("A layer needs at least one frameset")]
    LastFrameset,

    /// The time is already covered by a frameset
    #[error("Frame {time} is already covered by a frameset")]
    CoveredTime {
        /// Requested time
        time: u32,
    },

    /// The next frameset starts too soon for a new one
    #[error("Frame {time} is too close to the frameset starting at {next_start}")]
    InsufficientGap {
        /// Requested time
        time: u32,
        /// Start of the following frameset
        next_start: u32,
    },

    /// The start must come before the end
    #[error("Invalid frameset span {start}..={end}")]
    InvalidSpan {
        /// Requested start
        start: u32,
        /// Requested end
        end: u32,
    },

    /// A frameset would start before frame 0
    #[error("Frameset would start before frame 0")]
    NegativeTime,

    /// Frame index would overflow
    #[error("Frame index overflow")]
    TimeOverflow,

    /// No keyframe on that side
    #[error("No neighbouring keyframe")]
    NoNeighbor,

    /// The layer is already first/last
    #[error("Layer is already at the edge of the list")]
    LayerAtEdge,

    /// Layer does not exist
    #[error("Layer not found: {0:?}")]
    LayerNotFound(LayerId),

    /// Frameset does not exist
    #[error("Frameset not found: {0:?}")]
    FramesetNotFound(FramesetId),

    /// Keyframe does not exist
    #[error("Keyframe not found: {0:?}")]
    KeyframeNotFound(KeyframeId),

    /// The command needs a different selection
    #[error("Selection does not allow {0}")]
    InvalidSelection(&'static str),
}

/// Structural invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// Frameset with fewer than two keyframes
    #[error("Frameset {frameset:?} has {count} keyframes")]
    TooFewKeyframes {
        /// Offending frameset
        frameset: FramesetId,
        /// Keyframe count
        count: usize,
    },

    /// Keyframes out of order or sharing a time
    #[error("Frameset {frameset:?} keyframes are not strictly ordered at frame {time}")]
    UnorderedKeyframes {
        /// Offending frameset
        frameset: FramesetId,
        /// First out-of-order time
        time: u32,
    },

    /// Layer without framesets
    #[error("Layer '{layer}' has no framesets")]
    EmptyLayer {
        /// Layer name
        layer: String,
    },

    /// Framesets overlap or are out of order
    #[error("Layer '{layer}' framesets overlap or are unordered ({first_end} >= {second_start})")]
    OverlappingFramesets {
        /// Layer name
        layer: String,
        /// End of the earlier frameset
        first_end: u32,
        /// Start of the later frameset
        second_start: u32,
    },

    /// A keyframe state does not fit the layer's entity
    #[error("Layer '{layer}': {source}")]
    Entity {
        /// Layer name
        layer: String,
        /// Underlying entity error
        #[source]
        source: EntityError,
    },
}
