// SPDX-License-Identifier: MIT OR Apache-2.0
//! TISFAT Zero editor shell.
//!
//! This crate provides everything around the timeline that a front end needs:
//! - Editor settings ([`config`])
//! - The `.tzp` project file format ([`file_format`])
//! - Undo/redo history and commands ([`history`], [`commands`])
//! - Canvas pose manipulation ([`canvas`])
//! - Menus and the timeline context menu ([`menus`])
//! - Frame export ([`export`])
//! - The [`Editor`] tying them together
//!
//! ## Architecture
//!
//! The shell is headless: input arrives as pointer events in widget
//! coordinates and output is `egui::Shape` lists, so any egui host can drive
//! it. Edits that change the project are recorded as bincode snapshots in the
//! history.

pub mod canvas;
pub mod commands;
pub mod config;
pub mod editor;
pub mod export;
pub mod file_format;
pub mod history;
pub mod menus;

pub use canvas::{CanvasController, CanvasCursor};
pub use config::{EditorSettings, SETTINGS_FILE_NAME};
pub use editor::{Editor, EditorError};
pub use history::History;
pub use menus::ContextMenuAction;
