// SPDX-License-Identifier: MIT OR Apache-2.0
//! Posable entities for the TISFAT Zero editor.
//!
//! This crate provides the things a layer animates:
//! - The [`Manipulatable`] contract (reference pose, drag handles, blending, drawing)
//! - Stick figures
//! - Bitmaps
//!
//! ## Architecture
//!
//! Entities draw into plain `egui::Shape` lists, so any immediate-mode
//! canvas can paint them. The closed [`Entity`]/[`EntityState`] enums are
//! what the timeline stores.

pub mod manipulate;
pub mod stick_figure;
pub mod bitmap;
pub mod entity;
pub mod error;

pub use manipulate::{Manipulatable, ManipulateResult, ManipulateTarget, ManipulateParams, DragMode, HANDLE_RADIUS};
pub use stick_figure::{StickFigure, StickFigureState, Joint};
pub use bitmap::{BitmapObject, BitmapState};
pub use entity::{Entity, EntityKind, EntityState};
pub use error::EntityError;
