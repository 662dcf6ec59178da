// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor commands for undo/redo support.
//!
//! Commands encapsulate editor operations and integrate with
//! the [`History`](crate::history::History) system. Pose edits carry a
//! single keyframe state; structural timeline edits carry the whole project.

use crate::history::{HistoryError, Operation, OperationID, SnapshotTarget, StateSnapshot};
use serde::{Deserialize, Serialize};
use tisfat_editor_entities::{EntityError, EntityState};
use tisfat_editor_timeline::{FramesetId, InvariantError, KeyframeId, LayerId, Project, Timeline};

/// Trait for editor commands that can be undone/redone
pub trait EditorCommand {
    /// Get a description of this command
    fn description(&self) -> &str;

    /// Create an operation for the undo system
    fn to_operation(&self, id: OperationID) -> Result<Operation, CommandError>;
}

/// Error type for command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// History error
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// The keyframe a pose snapshot belongs to is gone
    #[error("Keyframe not found: {0:?}")]
    KeyframeNotFound(KeyframeId),

    /// Pose does not fit the layer's entity
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// A project snapshot breaks the model invariants
    #[error("Invalid project: {0}")]
    InvalidProject(#[from] InvariantError),
}

/// Command replacing one keyframe's pose
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseEditCommand {
    /// Layer holding the keyframe
    pub layer: LayerId,
    /// Frameset holding the keyframe
    pub frameset: FramesetId,
    /// The edited keyframe
    pub keyframe: KeyframeId,
    /// Pose before the edit
    pub before: EntityState,
    /// Pose after the edit
    pub after: EntityState,
    /// Description of the edit
    pub description: String,
}

impl PoseEditCommand {
    /// Create a new pose edit command
    pub fn new(
        layer: LayerId,
        frameset: FramesetId,
        keyframe: KeyframeId,
        before: EntityState,
        after: EntityState,
        description: impl Into<String>,
    ) -> Self {
        Self {
            layer,
            frameset,
            keyframe,
            before,
            after,
            description: description.into(),
        }
    }

    fn target(&self) -> SnapshotTarget {
        SnapshotTarget::Pose {
            layer: self.layer,
            frameset: self.frameset,
            keyframe: self.keyframe,
        }
    }
}

impl EditorCommand for PoseEditCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn to_operation(&self, id: OperationID) -> Result<Operation, CommandError> {
        let before = StateSnapshot::from_value(&self.before)?;
        let after = StateSnapshot::from_value(&self.after)?;
        Ok(Operation::new(id, self.description.clone(), self.target(), before, after))
    }
}

/// Command replacing the whole project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEditCommand {
    /// Project before the edit
    pub before: Project,
    /// Project after the edit
    pub after: Project,
    /// Description of the edit
    pub description: String,
}

impl ProjectEditCommand {
    /// Create a new project edit command
    pub fn new(before: Project, after: Project, description: impl Into<String>) -> Self {
        Self {
            before,
            after,
            description: description.into(),
        }
    }

    /// Whether the edit changed anything
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

impl EditorCommand for ProjectEditCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn to_operation(&self, id: OperationID) -> Result<Operation, CommandError> {
        let before = StateSnapshot::from_value(&self.before)?;
        let after = StateSnapshot::from_value(&self.after)?;
        Ok(Operation::new(id, self.description.clone(), SnapshotTarget::Project, before, after))
    }
}

/// Restore a recorded snapshot into the timeline
///
/// A restored project keeps the selection on the same frame, re-classified
/// against the restored layers.
pub fn apply_snapshot(
    timeline: &mut Timeline,
    target: SnapshotTarget,
    snapshot: &StateSnapshot,
) -> Result<(), CommandError> {
    match target {
        SnapshotTarget::Pose { .. } => set_pose(timeline, target, snapshot.to_value()?),
        SnapshotTarget::Project => {
            let project: Project = snapshot.to_value()?;
            project.validate()?;
            timeline.restore_project(project);
            Ok(())
        }
    }
}

fn set_pose(timeline: &mut Timeline, target: SnapshotTarget, pose: EntityState) -> Result<(), CommandError> {
    let SnapshotTarget::Pose {
        layer,
        frameset,
        keyframe,
    } = target
    else {
        return Ok(());
    };
    let (entity, state) = timeline
        .project_mut()
        .layer_mut(layer)
        .and_then(|l| l.entity_and_state_mut(frameset, keyframe))
        .ok_or(CommandError::KeyframeNotFound(keyframe))?;
    entity.check_state(&pose)?;
    *state = pose;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use egui::vec2;
    use tisfat_editor_entities::EntityKind;

    fn fixture() -> (Timeline, LayerId, FramesetId, KeyframeId) {
        let mut project = Project::default();
        let layer = project.add_layer(EntityKind::StickFigure);
        let fs = &project.layer(layer).unwrap().framesets()[0];
        let (fs_id, kf_id) = (fs.id, fs.keyframes()[0].id);
        (Timeline::new(project), layer, fs_id, kf_id)
    }

    fn pose(timeline: &Timeline, layer: LayerId, fs: FramesetId, kf: KeyframeId) -> EntityState {
        timeline.project().layer(layer).unwrap().keyframe(fs, kf).unwrap().state.clone()
    }

    fn shifted(state: &EntityState, by: f32) -> EntityState {
        let mut state = state.clone();
        if let EntityState::StickFigure(figure) = &mut state {
            for joint in &mut figure.joints {
                *joint += vec2(by, 0.0);
            }
        }
        state
    }

    fn operation(command: &dyn EditorCommand) -> Operation {
        command.to_operation(History::new().begin_operation()).unwrap()
    }

    #[test]
    fn test_pose_command_redo_and_undo() {
        let (mut timeline, layer, fs, kf) = fixture();
        let before = pose(&timeline, layer, fs, kf);
        let after = shifted(&before, 15.0);
        let op = operation(&PoseEditCommand::new(layer, fs, kf, before.clone(), after.clone(), "Move Joint"));
        assert_eq!(op.description, "Move Joint");

        apply_snapshot(&mut timeline, op.target, &op.after).unwrap();
        assert_eq!(pose(&timeline, layer, fs, kf), after);
        apply_snapshot(&mut timeline, op.target, &op.before).unwrap();
        assert_eq!(pose(&timeline, layer, fs, kf), before);
    }

    #[test]
    fn test_pose_for_missing_keyframe_fails() {
        let (mut timeline, layer, fs, kf) = fixture();
        let before = pose(&timeline, layer, fs, kf);
        let missing = KeyframeId::new();
        let op = operation(&PoseEditCommand::new(layer, fs, missing, before.clone(), before, "Move Joint"));
        assert!(matches!(
            apply_snapshot(&mut timeline, op.target, &op.after),
            Err(CommandError::KeyframeNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_pose_of_wrong_kind_rejected() {
        let (mut timeline, layer, fs, kf) = fixture();
        let bitmap = EntityKind::Bitmap.create_default().create_ref_state();
        let before = pose(&timeline, layer, fs, kf);
        let op = operation(&PoseEditCommand::new(layer, fs, kf, before.clone(), bitmap, "Bad"));
        assert!(matches!(
            apply_snapshot(&mut timeline, op.target, &op.after),
            Err(CommandError::Entity(_))
        ));
        assert_eq!(pose(&timeline, layer, fs, kf), before);
    }

    #[test]
    fn test_project_command_round_trip() {
        let (mut timeline, _, _, _) = fixture();
        let before = timeline.project().clone();
        let mut after = before.clone();
        after.add_layer(EntityKind::Bitmap);
        let command = ProjectEditCommand::new(before.clone(), after.clone(), "Add Layer");
        assert!(!command.is_noop());

        let op = operation(&command);
        assert_eq!(op.target, SnapshotTarget::Project);
        apply_snapshot(&mut timeline, op.target, &op.after).unwrap();
        assert_eq!(timeline.project(), &after);
        apply_snapshot(&mut timeline, op.target, &op.before).unwrap();
        assert_eq!(timeline.project(), &before);
    }
}
