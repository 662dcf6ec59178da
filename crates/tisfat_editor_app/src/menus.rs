// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main menu commands and the timeline context menu.

use tisfat_editor_entities::EntityKind;
use tisfat_editor_timeline::{FrameType, Timeline};

/// What a main menu entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Replace the document with a new project
    NewProject,
    /// Open a project file
    OpenProject,
    /// Save to the current file
    SaveProject,
    /// Save to a new file
    SaveProjectAs,
    /// Undo the last change
    Undo,
    /// Redo the last undone change
    Redo,
    /// Add a layer of the given kind
    AddLayer(EntityKind),
    /// Start or stop playback
    TogglePlayback,
    /// Seek to frame 0
    SeekStart,
    /// Seek to the earliest frameset start
    SeekFirstFrame,
    /// Seek to the latest frameset end
    SeekLastFrame,
}

/// A main menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Unique identifier for the command
    pub id: &'static str,
    /// Display name shown in menus
    pub name: &'static str,
    /// Category for grouping (e.g., "File", "Edit", "Playback")
    pub category: &'static str,
    /// What the entry runs
    pub action: MenuAction,
}

impl Command {
    const fn new(id: &'static str, name: &'static str, category: &'static str, action: MenuAction) -> Self {
        Self {
            id,
            name,
            category,
            action,
        }
    }
}

/// Main menu commands
pub const COMMANDS: &[Command] = &[
    Command::new("file.new", "New", "File", MenuAction::NewProject),
    Command::new("file.open", "Open", "File", MenuAction::OpenProject),
    Command::new("file.save", "Save", "File", MenuAction::SaveProject),
    Command::new("file.save_as", "Save As", "File", MenuAction::SaveProjectAs),
    Command::new("edit.undo", "Undo", "Edit", MenuAction::Undo),
    Command::new("edit.redo", "Redo", "Edit", MenuAction::Redo),
    Command::new(
        "layer.add_stick_figure",
        "Add Stick Figure",
        "Layer",
        MenuAction::AddLayer(EntityKind::StickFigure),
    ),
    Command::new("layer.add_bitmap", "Add Bitmap", "Layer", MenuAction::AddLayer(EntityKind::Bitmap)),
    Command::new("playback.toggle", "Play/Pause", "Playback", MenuAction::TogglePlayback),
    Command::new("playback.seek_start", "Seek to Start", "Playback", MenuAction::SeekStart),
    Command::new("playback.seek_first", "Seek to First Frame", "Playback", MenuAction::SeekFirstFrame),
    Command::new("playback.seek_last", "Seek to Last Frame", "Playback", MenuAction::SeekLastFrame),
];

/// Look up a main menu command
pub fn find_command(id: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.id == id)
}

/// Entries of the timeline context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextMenuAction {
    /// Turn the selected blank frame into a keyframe
    InsertKeyframe,
    /// Delete the selected keyframe
    RemoveKeyframe,
    /// Start a frameset at the selected null frame
    InsertFrameset,
    /// Delete the frameset under the selection
    RemoveFrameset,
    /// Copy the previous keyframe's pose
    SetPoseToPrevious,
    /// Copy the next keyframe's pose
    SetPoseToNext,
    /// Swap the layer with the one above
    MoveLayerUp,
    /// Swap the layer with the one below
    MoveLayerDown,
    /// Delete the layer
    RemoveLayer,
    /// Move the playhead
    GotoFrame,
}

impl ContextMenuAction {
    /// Menu text
    pub fn name(self) -> &'static str {
        match self {
            Self::InsertKeyframe => "Insert Keyframe",
            Self::RemoveKeyframe => "Remove Keyframe",
            Self::InsertFrameset => "Insert Frameset",
            Self::RemoveFrameset => "Remove Frameset",
            Self::SetPoseToPrevious => "Set Pose to Previous Keyframe",
            Self::SetPoseToNext => "Set Pose to Next Keyframe",
            Self::MoveLayerUp => "Move Layer Up",
            Self::MoveLayerDown => "Move Layer Down",
            Self::RemoveLayer => "Remove Layer",
            Self::GotoFrame => "Goto Frame",
        }
    }

    /// Whether the action restructures the project
    pub fn edits_project(self) -> bool {
        !matches!(self, Self::GotoFrame)
    }

    /// Apply the action to the timeline's current selection
    ///
    /// `frame` is the destination for [`ContextMenuAction::GotoFrame`] and
    /// is ignored otherwise.
    pub fn apply(self, timeline: &mut Timeline, frame: u32) {
        match self {
            Self::InsertKeyframe => timeline.insert_keyframe(),
            Self::RemoveKeyframe => timeline.remove_keyframe(),
            Self::InsertFrameset => timeline.insert_frameset(),
            Self::RemoveFrameset => timeline.remove_frameset(),
            Self::SetPoseToPrevious => timeline.set_pose_to_previous(),
            Self::SetPoseToNext => timeline.set_pose_to_next(),
            Self::MoveLayerUp => timeline.move_layer_up(),
            Self::MoveLayerDown => timeline.move_layer_down(),
            Self::RemoveLayer => timeline.remove_layer(),
            Self::GotoFrame => timeline.goto_frame(frame),
        }
    }
}

const LAYER_ACTIONS: [ContextMenuAction; 4] = [
    ContextMenuAction::MoveLayerUp,
    ContextMenuAction::MoveLayerDown,
    ContextMenuAction::RemoveLayer,
    ContextMenuAction::GotoFrame,
];

/// Context menu entries available for a frame type
pub fn actions_for(frame_type: FrameType) -> Vec<ContextMenuAction> {
    use ContextMenuAction as A;

    let frame_actions: &[ContextMenuAction] = match frame_type {
        FrameType::None => return Vec::new(),
        FrameType::Keyframe => &[A::RemoveKeyframe, A::RemoveFrameset, A::SetPoseToPrevious, A::SetPoseToNext],
        FrameType::Blank => &[A::InsertKeyframe, A::RemoveFrameset],
        FrameType::Null => &[A::InsertFrameset],
    };
    frame_actions.iter().chain(&LAYER_ACTIONS).copied().collect()
}
