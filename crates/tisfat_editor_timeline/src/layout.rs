// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pixel geometry of the timeline.
//!
//! One frame is a fixed-width column and one layer a fixed-height row. The
//! row area starts below the ruler and right of the layer-name header.

use crate::project::Project;
use egui::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// Width of one frame column in pixels
pub const FRAME_WIDTH: f32 = 9.0;
/// Height of one layer row in pixels
pub const LAYER_HEIGHT: f32 = 16.0;
/// Width of the layer-name column in pixels
pub const HEADER_WIDTH: f32 = 80.0;
/// Height of the frame-number ruler in pixels
pub const RULER_HEIGHT: f32 = 16.0;
/// Empty frames shown after the last frame
pub const TRAILING_FRAMES: u32 = 101;

/// Timeline geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLayout {
    /// Width of one frame column
    pub frame_width: f32,
    /// Height of one layer row
    pub layer_height: f32,
    /// Width of the layer-name column
    pub header_width: f32,
    /// Height of the ruler
    pub ruler_height: f32,
    /// Empty frames shown after the last frame
    pub trailing_frames: u32,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            frame_width: FRAME_WIDTH,
            layer_height: LAYER_HEIGHT,
            header_width: HEADER_WIDTH,
            ruler_height: RULER_HEIGHT,
            trailing_frames: TRAILING_FRAMES,
        }
    }
}

impl TimelineLayout {
    /// Convert x position to a frame, clamped at 0
    pub fn x_to_frame(&self, x: f32, scroll: Vec2) -> u32 {
        let frame = ((x + scroll.x - self.header_width) / self.frame_width).floor();
        if frame.is_finite() && frame > 0.0 {
            frame as u32
        } else {
            0
        }
    }

    /// Convert y position to a layer row; `None` on the ruler
    pub fn y_to_layer(&self, y: f32, scroll: Vec2) -> Option<usize> {
        let row = ((y + scroll.y - self.ruler_height) / self.layer_height).floor();
        (row.is_finite() && row >= 0.0).then_some(row as usize)
    }

    /// Left edge of a frame column
    pub fn frame_left(&self, frame: f32, scroll: Vec2) -> f32 {
        self.header_width + frame * self.frame_width - scroll.x
    }

    /// Centre of a frame column
    pub fn frame_to_x(&self, frame: u32, scroll: Vec2) -> f32 {
        self.frame_left(frame as f32, scroll) + self.frame_width / 2.0
    }

    /// Top edge of a layer row
    pub fn layer_top(&self, index: usize, scroll: Vec2) -> f32 {
        self.ruler_height + index as f32 * self.layer_height - scroll.y
    }

    /// Centre of a layer row
    pub fn layer_to_y(&self, index: usize, scroll: Vec2) -> f32 {
        self.layer_top(index, scroll) + self.layer_height / 2.0
    }

    /// Scrollable content size for `project`
    pub fn content_size(&self, project: &Project) -> Vec2 {
        vec2(
            project.last_time().saturating_add(self.trailing_frames) as f32 * self.frame_width,
            project.layer_count() as f32 * self.layer_height + self.ruler_height,
        )
    }
}
