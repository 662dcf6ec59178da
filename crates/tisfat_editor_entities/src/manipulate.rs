// SPDX-License-Identifier: MIT OR Apache-2.0
//! The manipulatable entity contract.
//!
//! Every pose-bearing entity implements [`Manipulatable`]. The timeline only
//! ever stores `State` snapshots; the entity itself knows how to produce a
//! reference state, how to drag its control points, how to blend two states
//! and how to turn a state into drawing primitives.

use egui::{Modifiers, PointerButton, Pos2, Shape, Vec2};
use serde::{Deserialize, Serialize};

/// Pixel radius used when hit-testing control handles
pub const HANDLE_RADIUS: f32 = 5.0;

/// The part of a pose that a drag grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManipulateTarget {
    /// A stick-figure joint, by index
    Joint(usize),
    /// The whole body of an entity
    Body,
    /// A resize handle (bitmap bottom-right corner)
    Resize,
}

/// How pointer motion is applied to the grabbed target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragMode {
    /// Rotate the target around its parent, keeping distances
    #[default]
    Rotate,
    /// Move the target (and whatever hangs off it) by the pointer delta
    Translate,
    /// Stretch the target towards the pointer
    Scale,
}

/// Drag parameters captured when a manipulation starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManipulateParams {
    /// How motion is applied
    pub mode: DragMode,
    /// Offset from the grabbed point to the pointer at grab time
    pub grab_offset: Vec2,
}

/// Result of a successful hit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManipulateResult {
    /// Grabbed sub-part
    pub target: ManipulateTarget,
    /// Drag parameters
    pub params: ManipulateParams,
}

impl ManipulateResult {
    /// Create a result for a target with the given drag mode
    pub fn new(target: ManipulateTarget, mode: DragMode, grab_offset: Vec2) -> Self {
        Self {
            target,
            params: ManipulateParams { mode, grab_offset },
        }
    }
}

/// Capabilities required of any pose-bearing entity
pub trait Manipulatable {
    /// Pose snapshot stored in keyframes
    type State: Clone;

    /// Produce the default/current pose snapshot
    fn create_ref_state(&self) -> Self::State;

    /// Hit-test the control points of `state` at `pos`
    fn try_manipulate(
        &self,
        state: &Self::State,
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Option<ManipulateResult>;

    /// Apply an incremental drag to `state` in place
    fn manipulate_update(&self, state: &mut Self::State, result: &ManipulateResult, pos: Pos2);

    /// Blend two poses, `t` in `[0, 1]`
    fn interpolate(&self, from: &Self::State, to: &Self::State, t: f32) -> Self::State;

    /// Render `state` as immediate-mode primitives
    ///
    /// `for_render` is set when drawing for export: editing handles are
    /// left out.
    fn draw(&self, state: &Self::State, time: f32, for_render: bool) -> Vec<Shape>;
}

/// Linear interpolation between two points
pub(crate) fn lerp_pos(a: Pos2, b: Pos2, t: f32) -> Pos2 {
    a + (b - a) * t
}

/// Rotate `point` around `center` by `angle` radians
pub(crate) fn rotate_around(point: Pos2, center: Pos2, angle: f32) -> Pos2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    center + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_rotate_around_quarter_turn() {
        let rotated = rotate_around(pos2(10.0, 0.0), pos2(0.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!((rotated.x - 0.0).abs() < 1e-4);
        assert!((rotated.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_lerp_pos_midpoint() {
        let mid = lerp_pos(pos2(0.0, 0.0), pos2(10.0, 20.0), 0.5);
        assert_eq!(mid, pos2(5.0, 10.0));
    }
}
