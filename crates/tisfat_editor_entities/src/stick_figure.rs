// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stick figure entity.
//!
//! A figure is a tree of joints. Joints are stored parent-first, so a
//! joint's parent always has a lower index than the joint itself; subtree
//! walks rely on that ordering.

use crate::error::EntityError;
use crate::manipulate::{lerp_pos, rotate_around, DragMode, Manipulatable, ManipulateResult, ManipulateTarget, HANDLE_RADIUS};
use egui::{pos2, vec2, Color32, Modifiers, PointerButton, Pos2, Shape, Stroke, Vec2};
use serde::{Deserialize, Serialize};

const DEFAULT_THICKNESS: f32 = 6.0;
const DEFAULT_HANDLE_COLOR: Color32 = Color32::BLUE;
const LIMB_COLOR: Color32 = Color32::BLACK;
const HANDLE_DRAW_RADIUS: f32 = 3.0;

/// A joint definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Parent joint index, `None` for the root
    pub parent: Option<usize>,
    /// Rest location, used by the reference state
    pub location: Pos2,
    /// Handle colour shown while editing
    pub handle_color: Color32,
    /// Draw the bone to this joint as a circle (heads)
    pub is_circle: bool,
    /// Limb thickness in pixels
    pub thickness: f32,
}

/// Pose of a stick figure: one position per joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickFigureState {
    /// Joint positions, index-aligned with the figure's joints
    pub joints: Vec<Pos2>,
}

/// Stick figure entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StickFigure {
    joints: Vec<Joint>,
}

impl StickFigure {
    /// Create an empty figure
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the root joint. Returns its index.
    pub fn add_root(&mut self, location: Pos2) -> usize {
        self.joints.push(Joint {
            parent: None,
            location,
            handle_color: DEFAULT_HANDLE_COLOR,
            is_circle: false,
            thickness: DEFAULT_THICKNESS,
        });
        self.joints.len() - 1
    }

    /// Add a joint at `offset` from an existing parent joint
    pub fn add_joint_relative(&mut self, parent: usize, offset: Vec2) -> Result<usize, EntityError> {
        let Some(parent_joint) = self.joints.get(parent) else {
            return Err(EntityError::InvalidJointParent { parent, joints: self.joints.len() });
        };

        let location = parent_joint.location + offset;
        self.joints.push(Joint {
            parent: Some(parent),
            location,
            handle_color: DEFAULT_HANDLE_COLOR,
            is_circle: false,
            thickness: DEFAULT_THICKNESS,
        });
        Ok(self.joints.len() - 1)
    }

    /// Get a joint definition
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Get a mutable joint definition
    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    /// Number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The standard eleven-joint figure standing with its hip at `hip`
    pub fn humanoid(hip: Pos2) -> Self {
        let mut figure = Self::new();
        let hip = figure.add_root(hip);

        // Offsets are relative to the parent; indices are always valid here.
        let add = |figure: &mut Self, parent: usize, x: f32, y: f32| {
            figure.add_joint_relative(parent, vec2(x, y)).unwrap_or(parent)
        };

        let shoulder = add(&mut figure, hip, 0.0, -53.0);
        let l_elbow = add(&mut figure, shoulder, -21.0, 22.0);
        let _l_hand = add(&mut figure, l_elbow, -5.0, 35.0);
        let r_elbow = add(&mut figure, shoulder, 21.0, 22.0);
        let r_hand = add(&mut figure, r_elbow, 5.0, 35.0);
        let l_knee = add(&mut figure, hip, -16.0, 33.0);
        let _l_foot = add(&mut figure, l_knee, -5.0, 41.0);
        let r_knee = add(&mut figure, hip, 16.0, 33.0);
        let r_foot = add(&mut figure, r_knee, 5.0, 41.0);
        let head = add(&mut figure, shoulder, 0.0, -36.0);

        for index in [shoulder, hip, head] {
            figure.joints[index].handle_color = Color32::YELLOW;
        }
        for index in [r_elbow, r_hand, r_knee, r_foot] {
            figure.joints[index].handle_color = Color32::RED;
        }
        figure.joints[head].is_circle = true;

        figure
    }

    /// Mask of `index` and every joint below it
    fn subtree(&self, index: usize) -> Vec<bool> {
        let mut mask = vec![false; self.joints.len()];
        if index >= mask.len() {
            return mask;
        }

        mask[index] = true;
        for i in (index + 1)..self.joints.len() {
            if let Some(parent) = self.joints[i].parent {
                if mask[parent] {
                    mask[i] = true;
                }
            }
        }
        mask
    }

    /// Check that a state belongs to this figure
    pub fn check_state(&self, state: &StickFigureState) -> Result<(), EntityError> {
        if state.joints.len() != self.joints.len() {
            return Err(EntityError::JointCountMismatch {
                expected: self.joints.len(),
                found: state.joints.len(),
            });
        }
        Ok(())
    }

    /// Check the parent-before-child ordering
    pub fn validate(&self) -> Result<(), EntityError> {
        for (index, joint) in self.joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= index {
                    return Err(EntityError::InvalidJointParent { parent, joints: index });
                }
            }
        }
        Ok(())
    }
}

impl Manipulatable for StickFigure {
    type State = StickFigureState;

    fn create_ref_state(&self) -> StickFigureState {
        StickFigureState {
            joints: self.joints.iter().map(|j| j.location).collect(),
        }
    }

    fn try_manipulate(
        &self,
        state: &StickFigureState,
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Option<ManipulateResult> {
        let (index, joint_pos) = state
            .joints
            .iter()
            .enumerate()
            .map(|(i, p)| (i, *p, p.distance(pos)))
            .filter(|(_, _, d)| *d <= HANDLE_RADIUS)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(i, p, _)| (i, p))?;

        let is_root = self.joints.get(index).is_some_and(|j| j.parent.is_none());
        let mode = if is_root || modifiers.shift || button == PointerButton::Secondary {
            DragMode::Translate
        } else {
            DragMode::Rotate
        };

        Some(ManipulateResult::new(ManipulateTarget::Joint(index), mode, pos - joint_pos))
    }

    fn manipulate_update(&self, state: &mut StickFigureState, result: &ManipulateResult, pos: Pos2) {
        let ManipulateTarget::Joint(index) = result.target else {
            return;
        };
        if index >= state.joints.len() || self.check_state(state).is_err() {
            return;
        }

        let target = pos - result.params.grab_offset;
        let mask = self.subtree(index);

        match result.params.mode {
            DragMode::Rotate => {
                let Some(parent) = self.joints[index].parent else {
                    return;
                };
                let pivot = state.joints[parent];
                let current = state.joints[index] - pivot;
                let wanted = target - pivot;
                if wanted.length() <= f32::EPSILON || current.length() <= f32::EPSILON {
                    return;
                }

                let delta = wanted.angle() - current.angle();
                for (joint, moved) in state.joints.iter_mut().zip(&mask) {
                    if *moved {
                        *joint = rotate_around(*joint, pivot, delta);
                    }
                }
            }
            DragMode::Translate => {
                let delta = target - state.joints[index];
                for (joint, moved) in state.joints.iter_mut().zip(&mask) {
                    if *moved {
                        *joint += delta;
                    }
                }
            }
            // Joints have no extent to stretch.
            DragMode::Scale => {}
        }
    }

    fn interpolate(&self, from: &StickFigureState, to: &StickFigureState, t: f32) -> StickFigureState {
        StickFigureState {
            joints: from
                .joints
                .iter()
                .zip(&to.joints)
                .map(|(a, b)| lerp_pos(*a, *b, t))
                .collect(),
        }
    }

    fn draw(&self, state: &StickFigureState, _time: f32, for_render: bool) -> Vec<Shape> {
        let mut shapes = Vec::with_capacity(self.joints.len() * 2);

        for (joint, pos) in self.joints.iter().zip(&state.joints) {
            let Some(parent) = joint.parent else {
                continue;
            };
            let Some(parent_pos) = state.joints.get(parent) else {
                continue;
            };

            if joint.is_circle {
                let center = pos2((pos.x + parent_pos.x) / 2.0, (pos.y + parent_pos.y) / 2.0);
                let radius = pos.distance(*parent_pos) / 2.0;
                shapes.push(Shape::circle_stroke(center, radius, Stroke::new(joint.thickness, LIMB_COLOR)));
            } else {
                shapes.push(Shape::line_segment([*parent_pos, *pos], Stroke::new(joint.thickness, LIMB_COLOR)));
            }
        }

        if !for_render {
            for (joint, pos) in self.joints.iter().zip(&state.joints) {
                shapes.push(Shape::circle_filled(*pos, HANDLE_DRAW_RADIUS, joint.handle_color));
            }
        }

        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure() -> StickFigure {
        StickFigure::humanoid(pos2(200.0, 200.0))
    }

    #[test]
    fn test_humanoid_layout() {
        let figure = figure();
        assert_eq!(figure.joint_count(), 11);
        assert!(figure.validate().is_ok());

        let state = figure.create_ref_state();
        // shoulder sits 53px above the hip
        assert_eq!(state.joints[1], pos2(200.0, 147.0));
        // head is a circle joint hanging off the shoulder
        let head = figure.joint(10).unwrap();
        assert!(head.is_circle);
        assert_eq!(head.parent, Some(1));
    }

    #[test]
    fn test_add_joint_with_missing_parent() {
        let mut figure = StickFigure::new();
        figure.add_root(pos2(0.0, 0.0));
        assert!(matches!(
            figure.add_joint_relative(5, vec2(1.0, 1.0)),
            Err(EntityError::InvalidJointParent { parent: 5, .. })
        ));
    }

    #[test]
    fn test_try_manipulate_root_translates() {
        let figure = figure();
        let state = figure.create_ref_state();

        let result = figure
            .try_manipulate(&state, pos2(201.0, 201.0), PointerButton::Primary, Modifiers::NONE)
            .unwrap();
        assert_eq!(result.target, ManipulateTarget::Joint(0));
        assert_eq!(result.params.mode, DragMode::Translate);

        assert!(figure
            .try_manipulate(&state, pos2(0.0, 0.0), PointerButton::Primary, Modifiers::NONE)
            .is_none());
    }

    #[test]
    fn test_root_drag_moves_whole_figure() {
        let figure = figure();
        let mut state = figure.create_ref_state();
        let before = state.clone();

        let result = figure
            .try_manipulate(&state, pos2(200.0, 200.0), PointerButton::Primary, Modifiers::NONE)
            .unwrap();
        figure.manipulate_update(&mut state, &result, pos2(210.0, 195.0));

        for (a, b) in before.joints.iter().zip(&state.joints) {
            assert_eq!(*b - *a, vec2(10.0, -5.0));
        }
    }

    #[test]
    fn test_scale_leaves_pose_unchanged() {
        let figure = figure();
        let mut state = figure.create_ref_state();
        let before = state.clone();

        let result = ManipulateResult::new(ManipulateTarget::Joint(4), DragMode::Scale, Vec2::ZERO);
        figure.manipulate_update(&mut state, &result, pos2(300.0, 100.0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_rotate_keeps_bone_length() {
        let figure = figure();
        let mut state = figure.create_ref_state();
        let elbow = 4; // right elbow
        let hand = 5;
        let shoulder = 1;
        let upper = state.joints[elbow].distance(state.joints[shoulder]);
        let lower = state.joints[hand].distance(state.joints[elbow]);

        let grab = state.joints[elbow];
        let result = figure
            .try_manipulate(&state, grab, PointerButton::Primary, Modifiers::NONE)
            .unwrap();
        assert_eq!(result.params.mode, DragMode::Rotate);

        figure.manipulate_update(&mut state, &result, pos2(260.0, 147.0));

        let new_upper = state.joints[elbow].distance(state.joints[shoulder]);
        let new_lower = state.joints[hand].distance(state.joints[elbow]);
        assert!((upper - new_upper).abs() < 1e-3);
        assert!((lower - new_lower).abs() < 1e-3);
        // now pointing straight right from the shoulder
        assert!((state.joints[elbow].y - 147.0).abs() < 1e-3);
        // the hip did not move
        assert_eq!(state.joints[0], pos2(200.0, 200.0));
    }

    #[test]
    fn test_interpolate_midpoint() {
        let figure = figure();
        let a = figure.create_ref_state();
        let mut b = a.clone();
        for joint in &mut b.joints {
            *joint += vec2(20.0, 0.0);
        }

        let mid = figure.interpolate(&a, &b, 0.5);
        for (orig, blended) in a.joints.iter().zip(&mid.joints) {
            assert_eq!(*blended - *orig, vec2(10.0, 0.0));
        }
    }

    #[test]
    fn test_draw_handles_only_when_editing() {
        let figure = figure();
        let state = figure.create_ref_state();

        let render = figure.draw(&state, 0.0, true);
        let edit = figure.draw(&state, 0.0, false);

        // one primitive per non-root joint, plus one handle per joint while editing
        assert_eq!(render.len(), 10);
        assert_eq!(edit.len(), 21);
        assert!(render.iter().any(|s| matches!(s, Shape::Circle(_))));
    }
}
