// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor shell state.
//!
//! [`Editor`] ties the timeline, the canvas controller and the undo history
//! together and owns the project lifecycle (new, open, save, save-as). Every
//! change to the project that goes through the editor is recorded in the
//! history and marks the document dirty.

use crate::canvas::{CanvasController, CanvasCursor};
use crate::commands::{apply_snapshot, CommandError, EditorCommand, ProjectEditCommand};
use crate::config::EditorSettings;
use crate::export::{self, ExportError, ExportFrame};
use crate::file_format::{self, FileFormatError, PROJECT_EXTENSION};
use crate::history::{History, HistoryError, OperationGroup};
use crate::menus::{self, ContextMenuAction, MenuAction};
use egui::{Modifiers, PointerButton, Pos2};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tisfat_editor_entities::EntityKind;
use tisfat_editor_timeline::{ContextMenuRequest, DragOperation, LayerId, Project, Timeline};

const TITLE_PREFIX: &str = "TISFAT Zero";
const UNTITLED: &str = "Untitled";

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Reading or writing a project failed
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),

    /// Undo or redo had nothing to do
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A recorded snapshot could not be restored
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Save was requested for a project that has never been saved
    #[error("Project has no file path")]
    NoFilePath,

    /// Menu command id not known
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// The editor
#[derive(Debug)]
pub struct Editor {
    timeline: Timeline,
    canvas: CanvasController,
    history: History,
    settings: EditorSettings,
    file_path: Option<PathBuf>,
    dirty: bool,
    /// Project as it was when the current timeline drag began
    drag_before: Option<Project>,
}

impl Editor {
    /// Create an editor holding a new project
    pub fn new(settings: EditorSettings) -> Self {
        let timeline = Timeline::with_layout(Project::default(), settings.timeline);
        let mut editor = Self {
            timeline,
            canvas: CanvasController::new(),
            history: History::with_max_depth(settings.history_depth),
            settings,
            file_path: None,
            dirty: false,
            drag_before: None,
        };
        editor.new_project();
        editor
    }

    // Project lifecycle

    /// Replace the document with a new project holding one stick figure
    pub fn new_project(&mut self) {
        let defaults = &self.settings.project;
        let mut project = Project::new(defaults.fps, defaults.width, defaults.height);
        project.add_layer(EntityKind::StickFigure);
        self.replace_project(project, None);
        tracing::info!("Created new project");
    }

    /// Open a project file
    pub fn open(&mut self, path: &Path) -> Result<(), EditorError> {
        let project = file_format::load(path)?;
        self.replace_project(project, Some(path.to_path_buf()));
        Ok(())
    }

    /// Save to the current file
    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.file_path.clone().ok_or(EditorError::NoFilePath)?;
        file_format::save(self.timeline.project(), &path)?;
        self.dirty = false;
        Ok(())
    }

    /// Save to `path` and make it the current file
    ///
    /// A missing extension is replaced with `.tzp`.
    pub fn save_as(&mut self, path: &Path) -> Result<(), EditorError> {
        let path = if path.extension().is_none() {
            path.with_extension(PROJECT_EXTENSION)
        } else {
            path.to_path_buf()
        };
        file_format::save(self.timeline.project(), &path)?;
        self.file_path = Some(path);
        self.dirty = false;
        Ok(())
    }

    fn replace_project(&mut self, project: Project, path: Option<PathBuf>) {
        self.timeline.set_project(project);
        self.canvas = CanvasController::new();
        self.history.clear();
        self.drag_before = None;
        self.file_path = path;
        self.dirty = false;
    }

    /// Window title, e.g. `TISFAT Zero - walk *`
    pub fn title(&self) -> String {
        let name = self
            .file_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string());
        let marker = if self.dirty { " *" } else { "" };
        format!("{TITLE_PREFIX} - {name}{marker}")
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current file, if the project was opened or saved
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Active settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The timeline controller
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The timeline controller, for painting and scrolling
    ///
    /// Project edits made through this reference bypass the history.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    // Recording

    fn edit_project<R>(&mut self, description: &str, edit: impl FnOnce(&mut Timeline) -> R) -> R {
        let before = self.timeline.project().clone();
        let result = edit(&mut self.timeline);
        self.record_project_change(description, before);
        result
    }

    fn record_project_change(&mut self, description: &str, before: Project) {
        let command = ProjectEditCommand::new(before, self.timeline.project().clone(), description);
        if !command.is_noop() {
            self.record(&command);
        }
    }

    fn record(&mut self, command: &dyn EditorCommand) {
        let id = self.history.begin_operation();
        match command.to_operation(id) {
            Ok(operation) => {
                let mut group = OperationGroup::new(id, command.description().to_string());
                group.add_operation(operation);
                self.history.commit(group);
            }
            Err(e) => tracing::warn!("Could not record '{}': {e}", command.description()),
        }
        self.dirty = true;
    }

    /// Undo the last change
    pub fn undo(&mut self) -> Result<(), EditorError> {
        let group = self.history.undo()?;
        for operation in group.operations.iter().rev() {
            apply_snapshot(&mut self.timeline, operation.target, &operation.before)?;
        }
        self.dirty = true;
        tracing::debug!("Undo: {}", group.description);
        Ok(())
    }

    /// Redo the last undone change
    pub fn redo(&mut self) -> Result<(), EditorError> {
        let group = self.history.redo()?;
        for operation in &group.operations {
            apply_snapshot(&mut self.timeline, operation.target, &operation.after)?;
        }
        self.dirty = true;
        tracing::debug!("Redo: {}", group.description);
        Ok(())
    }

    // Editing

    /// Add a layer holding a default entity of `kind`
    pub fn add_layer(&mut self, kind: EntityKind) -> LayerId {
        self.edit_project("Add Layer", |t| t.project_mut().add_layer(kind))
    }

    /// Run a timeline context menu action
    pub fn context_action(&mut self, action: ContextMenuAction, frame: u32) {
        if action.edits_project() {
            self.edit_project(action.name(), |t| action.apply(t, frame));
        } else {
            action.apply(&mut self.timeline, frame);
        }
    }

    /// Pending context menu with the actions it offers
    pub fn take_context_menu(&mut self) -> Option<(ContextMenuRequest, Vec<ContextMenuAction>)> {
        let request = self.timeline.take_context_menu()?;
        let actions = menus::actions_for(request.frame_type);
        Some((request, actions))
    }

    /// Run a main menu command by id
    ///
    /// Commands that need a file path are reported as [`EditorError::NoFilePath`];
    /// use [`Editor::open`] and [`Editor::save_as`] for those.
    pub fn run_command(&mut self, id: &str) -> Result<(), EditorError> {
        let command = menus::find_command(id).ok_or_else(|| EditorError::UnknownCommand(id.to_string()))?;
        tracing::debug!("Menu: {} > {}", command.category, command.name);
        match command.action {
            MenuAction::NewProject => self.new_project(),
            MenuAction::SaveProject => self.save()?,
            MenuAction::OpenProject | MenuAction::SaveProjectAs => return Err(EditorError::NoFilePath),
            MenuAction::Undo => self.undo()?,
            MenuAction::Redo => self.redo()?,
            MenuAction::AddLayer(kind) => {
                self.add_layer(kind);
            }
            MenuAction::TogglePlayback => self.timeline.toggle_pause(),
            MenuAction::SeekStart => self.timeline.seek_start(),
            MenuAction::SeekFirstFrame => self.timeline.seek_first_frame(),
            MenuAction::SeekLastFrame => self.timeline.seek_last_frame(),
        }
        Ok(())
    }

    // Timeline pointer input

    /// Pointer pressed on the timeline
    pub fn timeline_mouse_down(&mut self, pos: Pos2, button: PointerButton) {
        self.drag_before = Some(self.timeline.project().clone());
        self.timeline.mouse_down(pos, button);
    }

    /// Pointer moved over the timeline
    pub fn timeline_mouse_moved(&mut self, pos: Pos2) {
        self.timeline.mouse_moved(pos);
    }

    /// Pointer released over the timeline; records any drag edit
    pub fn timeline_mouse_up(&mut self, pos: Pos2, button: PointerButton) {
        let description = match self.timeline.drag_operation() {
            DragOperation::Keyframe => "Move Keyframe",
            DragOperation::Frameset { .. } => "Move Frameset",
            DragOperation::None | DragOperation::Scrub => "Timeline Edit",
        };
        self.timeline.mouse_up(pos, button);
        if let Some(before) = self.drag_before.take() {
            self.record_project_change(description, before);
        }
    }

    /// Pointer left the timeline
    pub fn timeline_mouse_left(&mut self) {
        self.timeline.mouse_left();
    }

    // Canvas pointer input

    /// Pointer pressed on the canvas. Returns whether a handle was grabbed.
    pub fn canvas_pointer_down(&mut self, pos: Pos2, button: PointerButton, modifiers: Modifiers) -> bool {
        self.canvas.pointer_down(&self.timeline, pos, button, modifiers)
    }

    /// Pointer moved over the canvas
    pub fn canvas_pointer_moved(&mut self, pos: Pos2) -> CanvasCursor {
        self.canvas.pointer_moved(&mut self.timeline, pos)
    }

    /// Pointer released on the canvas; records the pose edit
    pub fn canvas_pointer_up(&mut self) {
        if let Some(command) = self.canvas.pointer_up(&self.timeline) {
            self.record(&command);
        }
    }

    // Export

    /// Render the animation at `output_fps`
    pub fn export_frames(&self, output_fps: f32) -> Result<Vec<ExportFrame>, EditorError> {
        Ok(export::render_frames(self.timeline.project(), output_fps)?)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2, Vec2};
    use tisfat_editor_timeline::{FrameType, Selection};

    fn cell(editor: &Editor, frame: u32, row: usize) -> Pos2 {
        let layout = editor.timeline().layout;
        pos2(layout.frame_to_x(frame, Vec2::ZERO), layout.layer_to_y(row, Vec2::ZERO))
    }

    fn click(editor: &mut Editor, frame: u32, row: usize) {
        let pos = cell(editor, frame, row);
        editor.timeline_mouse_down(pos, PointerButton::Primary);
        editor.timeline_mouse_up(pos, PointerButton::Primary);
    }

    fn first_span(editor: &Editor) -> (u32, u32) {
        let fs = &editor.timeline().project().layers()[0].framesets()[0];
        (fs.start_time(), fs.end_time())
    }

    #[test]
    fn test_new_project() {
        let editor = Editor::default();
        assert_eq!(editor.timeline().project().layer_count(), 1);
        assert_eq!(editor.timeline().project().layers()[0].name, "Stick Figure 1");
        assert_eq!(editor.title(), "TISFAT Zero - Untitled");
        assert!(!editor.is_dirty());
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_add_layer_undo_redo() {
        let mut editor = Editor::default();
        editor.add_layer(EntityKind::Bitmap);
        assert_eq!(editor.timeline().project().layer_count(), 2);
        assert!(editor.is_dirty());
        assert_eq!(editor.title(), "TISFAT Zero - Untitled *");
        assert_eq!(editor.history().undo_description(), Some("Add Layer"));

        editor.undo().unwrap();
        assert_eq!(editor.timeline().project().layer_count(), 1);
        editor.redo().unwrap();
        assert_eq!(editor.timeline().project().layer_count(), 2);
        assert!(matches!(editor.redo(), Err(EditorError::History(HistoryError::NothingToRedo))));
    }

    #[test]
    fn test_keyframe_drag_is_undoable() {
        let mut editor = Editor::default();
        let start = cell(&editor, 20, 0);
        editor.timeline_mouse_down(start, PointerButton::Primary);
        editor.timeline_mouse_moved(cell(&editor, 26, 0));
        editor.timeline_mouse_up(cell(&editor, 26, 0), PointerButton::Primary);

        assert_eq!(first_span(&editor), (0, 26));
        assert_eq!(editor.history().undo_description(), Some("Move Keyframe"));
        editor.undo().unwrap();
        assert_eq!(first_span(&editor), (0, 20));
    }

    #[test]
    fn test_plain_click_records_nothing() {
        let mut editor = Editor::default();
        click(&mut editor, 5, 0);
        assert_eq!(editor.timeline().frame_type(), FrameType::Blank);
        assert!(!editor.history().can_undo());
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_context_menu_actions() {
        let mut editor = Editor::default();
        let pos = cell(&editor, 30, 0);
        editor.timeline_mouse_down(pos, PointerButton::Secondary);
        editor.timeline_mouse_up(pos, PointerButton::Secondary);

        let (request, actions) = editor.take_context_menu().unwrap();
        assert_eq!(request.frame_type, FrameType::Null);
        assert_eq!(request.frame, 30);
        assert_eq!(actions[0], ContextMenuAction::InsertFrameset);

        editor.context_action(ContextMenuAction::InsertFrameset, request.frame);
        assert_eq!(editor.timeline().project().layers()[0].framesets().len(), 2);
        assert_eq!(editor.history().undo_description(), Some("Insert Frameset"));

        editor.undo().unwrap();
        assert_eq!(editor.timeline().project().layers()[0].framesets().len(), 1);
    }

    #[test]
    fn test_undo_reclassifies_selection() {
        let mut editor = Editor::default();
        click(&mut editor, 30, 0);
        editor.context_action(ContextMenuAction::InsertFrameset, 30);
        assert_eq!(editor.timeline().frame_type(), FrameType::Keyframe);

        editor.undo().unwrap();
        assert_eq!(editor.timeline().frame_type(), FrameType::Null);
        assert!(editor.timeline().selected_pose().is_none());
        assert_eq!(editor.timeline().current_frame(), 30.0);

        editor.redo().unwrap();
        assert_eq!(editor.timeline().frame_type(), FrameType::Keyframe);
        assert!(editor.timeline().selected_pose().is_some());
    }

    #[test]
    fn test_rejected_action_records_nothing() {
        let mut editor = Editor::default();
        click(&mut editor, 0, 0);
        editor.context_action(ContextMenuAction::RemoveKeyframe, 0);
        assert!(!editor.history().can_undo());
        editor.context_action(ContextMenuAction::GotoFrame, 8);
        assert_eq!(editor.timeline().current_frame(), 8.0);
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn test_canvas_edit_undo() {
        let mut editor = Editor::default();
        click(&mut editor, 0, 0);
        assert!(matches!(editor.timeline().selection(), Selection::Keyframe { .. }));

        let hip = pos2(200.0, 200.0);
        assert!(editor.canvas_pointer_down(hip, PointerButton::Primary, Modifiers::NONE));
        assert_eq!(editor.canvas_pointer_moved(hip + vec2(30.0, 0.0)), CanvasCursor::Hand);
        editor.canvas_pointer_up();
        assert_eq!(editor.history().undo_description(), Some("Manipulate Pose"));

        let root = |editor: &Editor| match editor.timeline().selected_pose() {
            Some((_, tisfat_editor_entities::EntityState::StickFigure(s))) => s.joints[0],
            _ => Pos2::ZERO,
        };
        assert_eq!(root(&editor), pos2(230.0, 200.0));
        editor.undo().unwrap();
        assert_eq!(root(&editor), hip);
        editor.redo().unwrap();
        assert_eq!(root(&editor), pos2(230.0, 200.0));
    }

    #[test]
    fn test_save_requires_path() {
        let mut editor = Editor::default();
        assert!(matches!(editor.save(), Err(EditorError::NoFilePath)));
        assert!(matches!(editor.run_command("file.save_as"), Err(EditorError::NoFilePath)));
        assert!(matches!(editor.run_command("file.bogus"), Err(EditorError::UnknownCommand(_))));
    }

    #[test]
    fn test_save_as_and_open() {
        let base = std::env::temp_dir().join(format!("tisfat-editor-{}", uuid::Uuid::new_v4()));
        let mut editor = Editor::default();
        editor.add_layer(EntityKind::Bitmap);
        editor.save_as(&base).unwrap();

        let saved = base.with_extension(PROJECT_EXTENSION);
        assert_eq!(editor.file_path(), Some(saved.as_path()));
        assert!(!editor.is_dirty());
        assert!(editor.title().ends_with(&*base.file_name().unwrap().to_string_lossy()));

        let mut other = Editor::default();
        other.open(&saved).unwrap();
        std::fs::remove_file(&saved).unwrap();
        assert_eq!(other.timeline().project(), editor.timeline().project());
        assert!(!other.history().can_undo());
    }

    #[test]
    fn test_run_playback_commands() {
        let mut editor = Editor::default();
        editor.run_command("playback.seek_last").unwrap();
        assert_eq!(editor.timeline().current_frame(), 20.0);
        editor.run_command("playback.seek_start").unwrap();
        assert_eq!(editor.timeline().current_frame(), 0.0);
        editor.run_command("layer.add_stick_figure").unwrap();
        assert_eq!(editor.timeline().project().layers()[1].name, "Stick Figure 2");
        editor.run_command("edit.undo").unwrap();
        assert_eq!(editor.timeline().project().layer_count(), 1);
        editor.run_command("playback.toggle").unwrap();
        assert!(editor.timeline().is_playing());
    }

    #[test]
    fn test_every_menu_command_is_handled() {
        let mut editor = Editor::default();
        for command in menus::COMMANDS {
            let result = editor.run_command(command.id);
            assert!(!matches!(result, Err(EditorError::UnknownCommand(_))), "{}", command.id);
        }
    }

    #[test]
    fn test_export_frames() {
        let editor = Editor::default();
        assert_eq!(editor.export_frames(10.0).unwrap().len(), 21);
        assert!(matches!(editor.export_frames(0.0), Err(EditorError::Export(_))));
    }
}
