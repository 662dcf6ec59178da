// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bitmap entity.
//!
//! The pixels themselves live in an external texture; the entity only keeps
//! the source path, the native size, and the texture handle once the
//! renderer has uploaded it.

use crate::manipulate::{lerp_pos, DragMode, Manipulatable, ManipulateResult, ManipulateTarget, HANDLE_RADIUS};
use egui::{pos2, Color32, Modifiers, PointerButton, Pos2, Rect, Shape, Stroke, TextureId, Vec2};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MIN_SIZE: f32 = 1.0;
const PLACEHOLDER_FILL: Color32 = Color32::from_gray(200);
const OUTLINE_COLOR: Color32 = Color32::from_gray(80);

/// Pose of a bitmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitmapState {
    /// Placement on the canvas
    pub rect: Rect,
}

/// Bitmap entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitmapObject {
    /// Image file the texture was loaded from
    pub source: Option<PathBuf>,
    /// Native pixel size
    pub size: Vec2,
    /// Texture handle, attached by the renderer at runtime
    #[serde(skip)]
    pub texture: Option<TextureId>,
}

impl BitmapObject {
    /// Create a bitmap of the given native size
    pub fn new(size: Vec2) -> Self {
        Self {
            source: None,
            size,
            texture: None,
        }
    }

    /// Set the source image path
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach an uploaded texture
    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    fn resize_handle(rect: &Rect) -> Rect {
        Rect::from_center_size(rect.max, Vec2::splat(HANDLE_RADIUS * 2.0))
    }
}

impl Manipulatable for BitmapObject {
    type State = BitmapState;

    fn create_ref_state(&self) -> BitmapState {
        BitmapState {
            rect: Rect::from_min_size(Pos2::ZERO, self.size),
        }
    }

    fn try_manipulate(
        &self,
        state: &BitmapState,
        pos: Pos2,
        _button: PointerButton,
        _modifiers: Modifiers,
    ) -> Option<ManipulateResult> {
        if Self::resize_handle(&state.rect).contains(pos) {
            return Some(ManipulateResult::new(ManipulateTarget::Resize, DragMode::Scale, pos - state.rect.max));
        }

        if state.rect.contains(pos) {
            return Some(ManipulateResult::new(ManipulateTarget::Body, DragMode::Translate, pos - state.rect.min));
        }

        None
    }

    fn manipulate_update(&self, state: &mut BitmapState, result: &ManipulateResult, pos: Pos2) {
        let target = pos - result.params.grab_offset;
        match result.target {
            ManipulateTarget::Body => {
                state.rect = Rect::from_min_size(target, state.rect.size());
            }
            ManipulateTarget::Resize => {
                let max = pos2(
                    target.x.max(state.rect.min.x + MIN_SIZE),
                    target.y.max(state.rect.min.y + MIN_SIZE),
                );
                state.rect = Rect::from_min_max(state.rect.min, max);
            }
            ManipulateTarget::Joint(_) => {}
        }
    }

    fn interpolate(&self, from: &BitmapState, to: &BitmapState, t: f32) -> BitmapState {
        BitmapState {
            rect: Rect::from_min_max(
                lerp_pos(from.rect.min, to.rect.min, t),
                lerp_pos(from.rect.max, to.rect.max, t),
            ),
        }
    }

    fn draw(&self, state: &BitmapState, _time: f32, for_render: bool) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(3);

        match self.texture {
            Some(texture) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                shapes.push(Shape::image(texture, state.rect, uv, Color32::WHITE));
            }
            None => {
                shapes.push(Shape::rect_filled(state.rect, 0.0, PLACEHOLDER_FILL));
            }
        }

        if !for_render {
            shapes.push(Shape::rect_stroke(state.rect, 0.0, Stroke::new(1.0, OUTLINE_COLOR)));
            shapes.push(Shape::rect_filled(Self::resize_handle(&state.rect), 0.0, Color32::RED));
        }

        shapes
    }
}
