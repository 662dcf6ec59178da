// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive timeline controller.
//!
//! The controller owns the [`Project`] and turns pointer events and editing
//! commands into model edits. Refused edits are logged at debug level and
//! otherwise ignored; the shell observes results through
//! [`Timeline::take_redraw_request`] and [`Timeline::take_context_menu`].

use crate::error::EditError;
use crate::keyframe::Neighbor;
use crate::layer::{Layer, LayerId};
use crate::layout::TimelineLayout;
use crate::playback::PlaybackController;
use crate::project::{LayerDirection, Project};
use crate::selection::{FrameType, Selection};
use egui::{PointerButton, Pos2, Vec2};
use std::time::Instant;
use tisfat_editor_entities::{Entity, EntityState};

/// Drag operation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragOperation {
    /// Not dragging
    #[default]
    None,
    /// Moving the playhead
    Scrub,
    /// Moving the selected keyframe
    Keyframe,
    /// Moving the frameset grabbed at a blank frame
    Frameset {
        /// Frame of the last accepted position
        origin_frame: u32,
    },
}

/// A right-click that should open a context menu
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuRequest {
    /// Pointer position in timeline coordinates
    pub pos: Pos2,
    /// Type of the frame under the pointer
    pub frame_type: FrameType,
    /// Frame under the pointer
    pub frame: u32,
}

/// Timeline editor state
#[derive(Debug)]
pub struct Timeline {
    project: Project,
    /// Pixel geometry
    pub layout: TimelineLayout,
    /// Scroll offset in pixels
    pub scroll: Vec2,
    selection: Selection,
    playback: PlaybackController,
    drag_op: DragOperation,
    pointer_down: bool,
    pointer_frame: u32,
    pointer_moved: bool,
    redraw_requested: bool,
    context_menu: Option<ContextMenuRequest>,
}

impl Timeline {
    /// Create a controller for `project`
    pub fn new(project: Project) -> Self {
        Self::with_layout(project, TimelineLayout::default())
    }

    /// Create a controller with custom geometry
    pub fn with_layout(project: Project, layout: TimelineLayout) -> Self {
        Self {
            project,
            layout,
            scroll: Vec2::ZERO,
            selection: Selection::None,
            playback: PlaybackController::new(),
            drag_op: DragOperation::None,
            pointer_down: false,
            pointer_frame: 0,
            pointer_moved: false,
            redraw_requested: true,
            context_menu: None,
        }
    }

    /// The edited project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Mutable project access
    ///
    /// Selection ids that stop resolving are treated as no selection.
    pub fn project_mut(&mut self) -> &mut Project {
        self.redraw_requested = true;
        &mut self.project
    }

    /// Replace the project, resetting selection and playback
    pub fn set_project(&mut self, project: Project) -> Project {
        self.selection = Selection::None;
        self.drag_op = DragOperation::None;
        self.pointer_down = false;
        self.playback.seek(0.0);
        self.redraw_requested = true;
        std::mem::replace(&mut self.project, project)
    }

    /// Swap in a restored project, keeping the selection on the same frame
    ///
    /// The selected frame is re-classified against the restored layers, and
    /// the selection is cleared when its layer no longer exists.
    pub fn restore_project(&mut self, project: Project) -> Project {
        let selected = self.selected_frame();
        let previous = std::mem::replace(&mut self.project, project);
        self.selection = selected
            .and_then(|(id, time)| {
                let layer = self.project.layer(id)?;
                Some(Selection::from_frame_kind(id, time, layer.frame_kind(time)))
            })
            .unwrap_or(Selection::None);
        self.drag_op = DragOperation::None;
        self.redraw_requested = true;
        previous
    }

    /// Current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Current drag operation
    pub fn drag_operation(&self) -> DragOperation {
        self.drag_op
    }

    /// Type of the selected frame
    pub fn frame_type(&self) -> FrameType {
        self.selection.frame_type()
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Current frame, see [`Timeline::current_frame_at`]
    pub fn current_frame(&self) -> f32 {
        self.current_frame_at(Instant::now())
    }

    /// The selected frame if any, else the playhead at `now`
    pub fn current_frame_at(&self, now: Instant) -> f32 {
        match self.selected_frame() {
            Some((_, time)) => time as f32,
            None => self.playback.frame_at(now, self.project.fps),
        }
    }

    fn selected_frame(&self) -> Option<(LayerId, u32)> {
        match self.selection {
            Selection::Keyframe {
                layer,
                frameset,
                keyframe,
            } => Some((layer, self.project.layer(layer)?.keyframe(frameset, keyframe)?.time)),
            Selection::BlankFrame { layer, time, .. } | Selection::NullFrame { layer, time } => Some((layer, time)),
            Selection::None => None,
        }
    }

    /// Frame to paint at `now`; keeps requesting repaints while playing
    pub fn frame_for_paint(&mut self, now: Instant) -> f32 {
        if self.playback.is_playing() {
            self.redraw_requested = true;
        }
        self.current_frame_at(now)
    }

    /// Consume the pending redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Consume the pending context-menu request
    pub fn take_context_menu(&mut self) -> Option<ContextMenuRequest> {
        self.context_menu.take()
    }

    /// Scrollable content size
    pub fn content_size(&self) -> Vec2 {
        self.layout.content_size(&self.project)
    }

    /// The selected keyframe's entity and pose
    pub fn selected_pose(&self) -> Option<(&Entity, &EntityState)> {
        let Selection::Keyframe {
            layer,
            frameset,
            keyframe,
        } = self.selection
        else {
            return None;
        };
        let layer = self.project.layer(layer)?;
        Some((&layer.entity, &layer.keyframe(frameset, keyframe)?.state))
    }

    /// The selected keyframe's entity and pose, for canvas editing
    pub fn selected_pose_mut(&mut self) -> Option<(&Entity, &mut EntityState)> {
        let Selection::Keyframe {
            layer,
            frameset,
            keyframe,
        } = self.selection
        else {
            return None;
        };
        self.redraw_requested = true;
        self.project.layer_mut(layer)?.entity_and_state_mut(frameset, keyframe)
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, EditError> {
        self.project.layer_mut(id).ok_or(EditError::LayerNotFound(id))
    }

    fn apply(&mut self, action: &'static str, edit: impl FnOnce(&mut Self) -> Result<(), EditError>) {
        match edit(self) {
            Ok(()) => self.redraw_requested = true,
            Err(error) => tracing::debug!("Rejected {action}: {error}"),
        }
    }

    fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    fn select_frame(&mut self, pos: Pos2, frame: u32) {
        let Some(row) = self.layout.y_to_layer(pos.y, self.scroll) else {
            return;
        };
        let Some(layer) = self.project.layers().get(row) else {
            return;
        };
        self.selection = Selection::from_frame_kind(layer.id, frame, layer.frame_kind(frame));
    }

    // Pointer events

    /// Pointer pressed at `pos`
    pub fn mouse_down(&mut self, pos: Pos2, button: PointerButton) {
        self.pointer_down = true;
        self.pointer_moved = false;
        self.drag_op = DragOperation::None;
        self.context_menu = None;
        self.clear_selection();

        let frame = self.layout.x_to_frame(pos.x, self.scroll);
        self.pointer_frame = frame;
        self.playback.seek(frame as f32);
        self.select_frame(pos, frame);
        self.redraw_requested = true;

        if button != PointerButton::Primary {
            return;
        }
        self.drag_op = match self.selection {
            Selection::Keyframe { .. } => DragOperation::Keyframe,
            Selection::BlankFrame { .. } => DragOperation::Frameset { origin_frame: frame },
            Selection::NullFrame { .. } | Selection::None => DragOperation::None,
        };
    }

    /// Pointer moved to `pos`
    pub fn mouse_moved(&mut self, pos: Pos2) {
        if !self.pointer_down {
            return;
        }
        let frame = self.layout.x_to_frame(pos.x, self.scroll);
        if frame == self.pointer_frame {
            return;
        }
        self.pointer_frame = frame;
        self.pointer_moved = true;

        match self.drag_op {
            DragOperation::Keyframe => self.apply("keyframe drag", |t| t.drag_keyframe(frame)),
            DragOperation::Frameset { origin_frame } => {
                self.apply("frameset drag", |t| t.drag_frameset(origin_frame, frame))
            }
            DragOperation::None | DragOperation::Scrub => {
                self.drag_op = DragOperation::Scrub;
                self.clear_selection();
                self.playback.seek(frame as f32);
                self.redraw_requested = true;
            }
        }
    }

    /// Pointer released at `pos`
    pub fn mouse_up(&mut self, pos: Pos2, button: PointerButton) {
        let clicked = self.pointer_down && !self.pointer_moved;
        if button == PointerButton::Secondary && clicked && !self.playback.is_playing() {
            self.context_menu = Some(ContextMenuRequest {
                pos,
                frame_type: self.frame_type(),
                frame: self.current_frame() as u32,
            });
        }
        self.pointer_down = false;
        self.pointer_moved = false;
        self.drag_op = DragOperation::None;
        self.redraw_requested = true;
    }

    /// Pointer left the timeline; ends scrubbing
    pub fn mouse_left(&mut self) {
        if self.drag_op == DragOperation::Scrub {
            self.drag_op = DragOperation::None;
            self.pointer_down = false;
        }
        self.redraw_requested = true;
    }

    fn drag_keyframe(&mut self, frame: u32) -> Result<(), EditError> {
        let Selection::Keyframe {
            layer,
            frameset,
            keyframe,
        } = self.selection
        else {
            return Err(EditError::InvalidSelection("keyframe drag"));
        };
        self.layer_mut(layer)?.move_keyframe(frameset, keyframe, frame)
    }

    fn drag_frameset(&mut self, origin_frame: u32, frame: u32) -> Result<(), EditError> {
        let Selection::BlankFrame { layer, frameset, .. } = self.selection else {
            return Err(EditError::InvalidSelection("frameset drag"));
        };
        let delta = i64::from(frame) - i64::from(origin_frame);
        self.layer_mut(layer)?.move_frameset(frameset, delta)?;
        self.selection = Selection::BlankFrame {
            layer,
            frameset,
            time: frame,
        };
        self.drag_op = DragOperation::Frameset { origin_frame: frame };
        Ok(())
    }

    // Editing commands

    /// Insert a keyframe at the selected blank frame
    pub fn insert_keyframe(&mut self) {
        self.apply("insert keyframe", |t| {
            let (Some(layer), Some(frameset)) = (t.selection.layer(), t.selection.frameset()) else {
                return Err(EditError::InvalidSelection("inserting a keyframe"));
            };
            let time = t.current_frame() as u32;
            let keyframe = t.layer_mut(layer)?.insert_keyframe(frameset, time)?;
            t.selection = Selection::Keyframe {
                layer,
                frameset,
                keyframe,
            };
            Ok(())
        });
    }

    /// Remove the selected keyframe
    pub fn remove_keyframe(&mut self) {
        self.apply("remove keyframe", |t| {
            let Selection::Keyframe {
                layer: layer_id,
                frameset,
                keyframe,
            } = t.selection
            else {
                return Err(EditError::InvalidSelection("removing a keyframe"));
            };
            let layer = t.layer_mut(layer_id)?;
            let removed = layer.remove_keyframe(frameset, keyframe)?;
            let kind = layer.frame_kind(removed.time);
            t.selection = Selection::from_frame_kind(layer_id, removed.time, kind);
            Ok(())
        });
    }

    /// Insert a frameset at the selected null frame
    pub fn insert_frameset(&mut self) {
        self.apply("insert frameset", |t| {
            let Selection::NullFrame { layer, time } = t.selection else {
                return Err(EditError::InvalidSelection("inserting a frameset"));
            };
            let (frameset, keyframe) = t.layer_mut(layer)?.insert_frameset(time)?;
            t.selection = Selection::Keyframe {
                layer,
                frameset,
                keyframe,
            };
            Ok(())
        });
    }

    /// Remove the selected frameset
    pub fn remove_frameset(&mut self) {
        self.apply("remove frameset", |t| {
            let (Some(layer_id), Some(frameset)) = (t.selection.layer(), t.selection.frameset()) else {
                return Err(EditError::InvalidSelection("removing a frameset"));
            };
            let layer = t.layer_mut(layer_id)?;
            let start = layer.remove_frameset(frameset)?.start_time();
            let kind = layer.frame_kind(start);
            t.selection = Selection::from_frame_kind(layer_id, start, kind);
            Ok(())
        });
    }

    /// Move the selected layer towards the top of the list
    pub fn move_layer_up(&mut self) {
        self.move_layer(LayerDirection::Up);
    }

    /// Move the selected layer towards the bottom of the list
    pub fn move_layer_down(&mut self) {
        self.move_layer(LayerDirection::Down);
    }

    fn move_layer(&mut self, direction: LayerDirection) {
        self.apply("move layer", |t| {
            let layer = t.selection.layer().ok_or(EditError::InvalidSelection("moving a layer"))?;
            t.project.move_layer(layer, direction)
        });
    }

    /// Remove the selected layer
    pub fn remove_layer(&mut self) {
        self.apply("remove layer", |t| {
            let layer = t.selection.layer().ok_or(EditError::InvalidSelection("removing a layer"))?;
            t.project.remove_layer(layer)?;
            t.clear_selection();
            Ok(())
        });
    }

    /// Copy the previous keyframe's pose into the selected keyframe
    pub fn set_pose_to_previous(&mut self) {
        self.copy_neighbor_pose(Neighbor::Previous);
    }

    /// Copy the next keyframe's pose into the selected keyframe
    pub fn set_pose_to_next(&mut self) {
        self.copy_neighbor_pose(Neighbor::Next);
    }

    fn copy_neighbor_pose(&mut self, neighbor: Neighbor) {
        self.apply("copy pose", |t| {
            let Selection::Keyframe {
                layer,
                frameset,
                keyframe,
            } = t.selection
            else {
                return Err(EditError::InvalidSelection("copying a pose"));
            };
            t.layer_mut(layer)?.copy_neighbor_pose(frameset, keyframe, neighbor)
        });
    }

    // Playback

    /// Jump to frame 0
    pub fn seek_start(&mut self) {
        self.goto_frame(0);
    }

    /// Jump to the earliest frameset start
    pub fn seek_first_frame(&mut self) {
        self.goto_frame(self.project.first_time());
    }

    /// Jump to the latest frameset end
    pub fn seek_last_frame(&mut self) {
        self.goto_frame(self.project.last_time());
    }

    /// Jump to `frame`, stopping playback and clearing the selection
    pub fn goto_frame(&mut self, frame: u32) {
        self.clear_selection();
        self.drag_op = DragOperation::None;
        self.playback.seek(frame as f32);
        self.redraw_requested = true;
    }

    /// Start or stop playback
    pub fn toggle_pause(&mut self) {
        self.toggle_pause_at(Instant::now());
    }

    /// Start or stop playback at `now`
    ///
    /// Playback starts from the selected frame, if any.
    pub fn toggle_pause_at(&mut self, now: Instant) {
        let fps = self.project.fps;
        if !self.playback.is_playing() {
            let frame = self.current_frame_at(now);
            self.playback.seek(frame);
        }
        self.playback.toggle_playback(now, fps);
        self.clear_selection();
        self.drag_op = DragOperation::None;
        self.redraw_requested = true;
    }
}
