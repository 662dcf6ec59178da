// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas pose manipulation.
//!
//! The canvas edits the pose of the keyframe selected on the timeline. A
//! drag starts when the entity accepts the press in `try_manipulate`, every
//! move applies `manipulate_update` to the live keyframe state, and the
//! release produces one undoable [`PoseEditCommand`].

use crate::commands::PoseEditCommand;
use egui::{Modifiers, PointerButton, Pos2};
use tisfat_editor_entities::{EntityState, ManipulateResult};
use tisfat_editor_timeline::{FramesetId, KeyframeId, LayerId, Selection, Timeline};

/// Cursor the canvas asks the host to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanvasCursor {
    /// Regular arrow
    #[default]
    Default,
    /// Over a handle, or dragging one
    Hand,
}

impl CanvasCursor {
    /// Matching egui cursor icon
    pub fn icon(self) -> egui::CursorIcon {
        match self {
            Self::Default => egui::CursorIcon::Default,
            Self::Hand => egui::CursorIcon::Grab,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveManipulation {
    layer: LayerId,
    frameset: FramesetId,
    keyframe: KeyframeId,
    result: ManipulateResult,
    before: EntityState,
}

/// Pointer state machine for the drawing canvas
#[derive(Debug, Clone, Default)]
pub struct CanvasController {
    active: Option<ActiveManipulation>,
}

impl CanvasController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a handle is being dragged
    pub fn is_manipulating(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer pressed on the canvas. Returns whether a drag started.
    pub fn pointer_down(
        &mut self,
        timeline: &Timeline,
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> bool {
        self.active = None;
        if timeline.is_playing() {
            return false;
        }
        let Selection::Keyframe {
            layer,
            frameset,
            keyframe,
        } = timeline.selection()
        else {
            return false;
        };
        let Some((entity, state)) = timeline.selected_pose() else {
            return false;
        };
        let Some(result) = entity.try_manipulate(state, pos, button, modifiers) else {
            return false;
        };

        tracing::debug!("Grabbed {:?} on layer {:?}", result.target, layer);
        self.active = Some(ActiveManipulation {
            layer,
            frameset,
            keyframe,
            result,
            before: state.clone(),
        });
        true
    }

    /// Pointer moved over the canvas
    pub fn pointer_moved(&mut self, timeline: &mut Timeline, pos: Pos2) -> CanvasCursor {
        if let Some(active) = &self.active {
            let target = timeline
                .project_mut()
                .layer_mut(active.layer)
                .and_then(|l| l.entity_and_state_mut(active.frameset, active.keyframe));
            match target {
                Some((entity, state)) => entity.manipulate_update(state, &active.result, pos),
                None => {
                    tracing::debug!("Dragged keyframe disappeared");
                    self.active = None;
                    return CanvasCursor::Default;
                }
            }
            return CanvasCursor::Hand;
        }

        if timeline.is_playing() {
            return CanvasCursor::Default;
        }
        let over_handle = timeline.selected_pose().is_some_and(|(entity, state)| {
            entity
                .try_manipulate(state, pos, PointerButton::Primary, Modifiers::NONE)
                .is_some()
        });
        if over_handle {
            CanvasCursor::Hand
        } else {
            CanvasCursor::Default
        }
    }

    /// Pointer released. Returns the finished edit, if the pose changed.
    pub fn pointer_up(&mut self, timeline: &Timeline) -> Option<PoseEditCommand> {
        let active = self.active.take()?;
        let after = timeline
            .project()
            .layer(active.layer)?
            .keyframe(active.frameset, active.keyframe)?
            .state
            .clone();
        if after == active.before {
            return None;
        }
        Some(PoseEditCommand::new(
            active.layer,
            active.frameset,
            active.keyframe,
            active.before,
            after,
            "Manipulate Pose",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, Vec2};
    use tisfat_editor_entities::EntityKind;
    use tisfat_editor_timeline::Project;

    const HIP: Pos2 = pos2(200.0, 200.0);

    fn selected_timeline() -> Timeline {
        let mut project = Project::default();
        project.add_layer(EntityKind::StickFigure);
        let mut timeline = Timeline::new(project);
        let pos = pos2(
            timeline.layout.frame_to_x(0, Vec2::ZERO),
            timeline.layout.layer_to_y(0, Vec2::ZERO),
        );
        timeline.mouse_down(pos, PointerButton::Primary);
        timeline.mouse_up(pos, PointerButton::Primary);
        timeline
    }

    fn joints(timeline: &Timeline) -> Vec<Pos2> {
        match timeline.selected_pose() {
            Some((_, EntityState::StickFigure(state))) => state.joints.clone(),
            other => panic!("unexpected pose {other:?}"),
        }
    }

    #[test]
    fn test_drag_root_translates_and_emits_command() {
        let mut timeline = selected_timeline();
        let mut canvas = CanvasController::new();
        let start = joints(&timeline);

        assert!(canvas.pointer_down(&timeline, HIP, PointerButton::Primary, Modifiers::NONE));
        assert_eq!(canvas.pointer_moved(&mut timeline, HIP + vec2(10.0, 5.0)), CanvasCursor::Hand);
        assert!(timeline.take_redraw_request());

        let command = canvas.pointer_up(&timeline).unwrap();
        assert!(!canvas.is_manipulating());
        let moved = joints(&timeline);
        for (a, b) in start.iter().zip(&moved) {
            assert_eq!(*b, *a + vec2(10.0, 5.0));
        }
        assert_eq!(command.before, EntityState::StickFigure(tisfat_editor_entities::StickFigureState { joints: start }));
        assert_eq!(command.description, "Manipulate Pose");
    }

    #[test]
    fn test_press_off_handle_does_nothing() {
        let timeline = selected_timeline();
        let mut canvas = CanvasController::new();
        assert!(!canvas.pointer_down(&timeline, pos2(5.0, 5.0), PointerButton::Primary, Modifiers::NONE));
        assert!(canvas.pointer_up(&timeline).is_none());
    }

    #[test]
    fn test_requires_keyframe_selection() {
        let mut project = Project::default();
        project.add_layer(EntityKind::StickFigure);
        let timeline = Timeline::new(project);
        let mut canvas = CanvasController::new();
        assert!(!canvas.pointer_down(&timeline, HIP, PointerButton::Primary, Modifiers::NONE));
    }

    #[test]
    fn test_click_without_motion_records_nothing() {
        let timeline = selected_timeline();
        let mut canvas = CanvasController::new();
        assert!(canvas.pointer_down(&timeline, HIP, PointerButton::Primary, Modifiers::NONE));
        assert!(canvas.pointer_up(&timeline).is_none());
    }

    #[test]
    fn test_hover_reports_hand_over_handle() {
        let mut timeline = selected_timeline();
        let mut canvas = CanvasController::new();
        assert_eq!(canvas.pointer_moved(&mut timeline, HIP), CanvasCursor::Hand);
        assert_eq!(canvas.pointer_moved(&mut timeline, pos2(5.0, 5.0)), CanvasCursor::Default);
        assert_eq!(CanvasCursor::Hand.icon(), egui::CursorIcon::Grab);
    }
}
