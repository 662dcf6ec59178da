// SPDX-License-Identifier: MIT OR Apache-2.0
//! Closed set of entity kinds.
//!
//! Layers hold an [`Entity`] and keyframes hold an [`EntityState`]. Both are
//! plain enums over the known kinds, so dispatch is a `match` and the
//! persisted form carries the kind tag for free.

use crate::bitmap::{BitmapObject, BitmapState};
use crate::error::EntityError;
use crate::manipulate::{Manipulatable, ManipulateResult};
use crate::stick_figure::{StickFigure, StickFigureState};
use egui::{pos2, vec2, Modifiers, PointerButton, Pos2, Shape};
use serde::{Deserialize, Serialize};

/// Type tag of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Jointed stick figure
    StickFigure,
    /// Image
    Bitmap,
}

impl EntityKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::StickFigure => "Stick Figure",
            Self::Bitmap => "Bitmap",
        }
    }

    /// All kinds, in menu order
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::StickFigure, EntityKind::Bitmap]
    }

    /// Construct a default entity of this kind
    pub fn create_default(&self) -> Entity {
        match self {
            Self::StickFigure => Entity::StickFigure(StickFigure::humanoid(pos2(200.0, 200.0))),
            Self::Bitmap => Entity::Bitmap(BitmapObject::new(vec2(64.0, 64.0))),
        }
    }

    /// Get the track color used on the timeline
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::StickFigure => [70, 120, 255],
            Self::Bitmap => [40, 200, 120],
        }
    }
}

/// A posable entity owned by a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// Stick figure
    StickFigure(StickFigure),
    /// Bitmap
    Bitmap(BitmapObject),
}

/// A pose snapshot stored in a keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityState {
    /// Stick figure pose
    StickFigure(StickFigureState),
    /// Bitmap placement
    Bitmap(BitmapState),
}

impl EntityState {
    /// Kind of entity this pose belongs to
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::StickFigure(_) => EntityKind::StickFigure,
            Self::Bitmap(_) => EntityKind::Bitmap,
        }
    }
}

impl From<StickFigure> for Entity {
    fn from(figure: StickFigure) -> Self {
        Self::StickFigure(figure)
    }
}

impl From<BitmapObject> for Entity {
    fn from(bitmap: BitmapObject) -> Self {
        Self::Bitmap(bitmap)
    }
}

impl Entity {
    /// Kind tag
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::StickFigure(_) => EntityKind::StickFigure,
            Self::Bitmap(_) => EntityKind::Bitmap,
        }
    }

    /// Produce the reference pose
    pub fn create_ref_state(&self) -> EntityState {
        match self {
            Self::StickFigure(figure) => EntityState::StickFigure(figure.create_ref_state()),
            Self::Bitmap(bitmap) => EntityState::Bitmap(bitmap.create_ref_state()),
        }
    }

    /// Check that `state` can be applied to this entity
    pub fn check_state(&self, state: &EntityState) -> Result<(), EntityError> {
        match (self, state) {
            (Self::StickFigure(figure), EntityState::StickFigure(pose)) => figure.check_state(pose),
            (Self::Bitmap(_), EntityState::Bitmap(_)) => Ok(()),
            _ => Err(EntityError::KindMismatch {
                entity: self.kind(),
                state: state.kind(),
            }),
        }
    }

    /// Validate the entity definition itself
    pub fn validate(&self) -> Result<(), EntityError> {
        match self {
            Self::StickFigure(figure) => figure.validate(),
            Self::Bitmap(_) => Ok(()),
        }
    }

    /// Hit-test the pose's control points
    pub fn try_manipulate(
        &self,
        state: &EntityState,
        pos: Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> Option<ManipulateResult> {
        match (self, state) {
            (Self::StickFigure(figure), EntityState::StickFigure(pose)) => {
                figure.try_manipulate(pose, pos, button, modifiers)
            }
            (Self::Bitmap(bitmap), EntityState::Bitmap(pose)) => bitmap.try_manipulate(pose, pos, button, modifiers),
            _ => {
                self.warn_mismatch(state.kind());
                None
            }
        }
    }

    /// Apply an incremental drag to `state`
    pub fn manipulate_update(&self, state: &mut EntityState, result: &ManipulateResult, pos: Pos2) {
        let state_kind = state.kind();
        match (self, state) {
            (Self::StickFigure(figure), EntityState::StickFigure(pose)) => figure.manipulate_update(pose, result, pos),
            (Self::Bitmap(bitmap), EntityState::Bitmap(pose)) => bitmap.manipulate_update(pose, result, pos),
            _ => self.warn_mismatch(state_kind),
        }
    }

    /// Blend two poses of this entity
    ///
    /// Returns `None` when either pose belongs to another kind.
    pub fn interpolate(&self, from: &EntityState, to: &EntityState, t: f32) -> Option<EntityState> {
        match (self, from, to) {
            (Self::StickFigure(figure), EntityState::StickFigure(a), EntityState::StickFigure(b)) => {
                Some(EntityState::StickFigure(figure.interpolate(a, b, t)))
            }
            (Self::Bitmap(bitmap), EntityState::Bitmap(a), EntityState::Bitmap(b)) => {
                Some(EntityState::Bitmap(bitmap.interpolate(a, b, t)))
            }
            _ => {
                self.warn_mismatch(from.kind());
                None
            }
        }
    }

    /// Render a pose
    pub fn draw(&self, state: &EntityState, time: f32, for_render: bool) -> Vec<Shape> {
        match (self, state) {
            (Self::StickFigure(figure), EntityState::StickFigure(pose)) => figure.draw(pose, time, for_render),
            (Self::Bitmap(bitmap), EntityState::Bitmap(pose)) => bitmap.draw(pose, time, for_render),
            _ => {
                self.warn_mismatch(state.kind());
                Vec::new()
            }
        }
    }

    fn warn_mismatch(&self, state: EntityKind) {
        tracing::warn!("Ignoring {:?} state for {:?} entity", state, self.kind());
    }
}
