// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline and data model for the TISFAT Zero editor.
//!
//! This crate provides:
//! - Keyframes, framesets, layers and the project document
//! - Pose queries with interpolation between keyframes
//! - The interactive timeline controller (selection, drags, playback)
//! - Timeline geometry and painting
//!
//! ## Architecture
//!
//! The model enforces its invariants itself: keyframes are strictly ordered
//! inside a frameset, framesets on a layer never share a frame, and every
//! edit either applies completely or returns an [`EditError`]. The
//! [`Timeline`] controller owns the [`Project`] and maps pointer events to
//! those edits.

pub mod keyframe;
pub mod frameset;
pub mod layer;
pub mod project;
pub mod selection;
pub mod playback;
pub mod layout;
pub mod timeline;
pub mod ruler;
pub mod error;

pub use keyframe::{Keyframe, KeyframeId, Neighbor};
pub use frameset::{Frameset, FramesetId};
pub use layer::{Layer, LayerId, FrameKind, Pose, DEFAULT_FRAMESET_END};
pub use project::{Project, LayerDirection, DEFAULT_FPS, DEFAULT_WIDTH, DEFAULT_HEIGHT};
pub use selection::{Selection, FrameType};
pub use playback::{PlaybackController, PlaybackState};
pub use layout::TimelineLayout;
pub use timeline::{Timeline, DragOperation, ContextMenuRequest};
pub use ruler::{paint_timeline, timeline_ui};
pub use error::{EditError, InvariantError};
