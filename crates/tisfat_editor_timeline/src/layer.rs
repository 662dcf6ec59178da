// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layers: one entity animated by a list of framesets.
//!
//! Framesets are kept sorted by end time and never share a frame, so list
//! order is also time order and each frameset's neighbours in the list are
//! its neighbours on the timeline.

use crate::error::{EditError, InvariantError};
use crate::frameset::{Frameset, FramesetId};
use crate::keyframe::{Keyframe, KeyframeId, Neighbor};
use egui::Shape;
use serde::{Deserialize, Serialize};
use tisfat_editor_entities::{Entity, EntityState};
use uuid::Uuid;

/// Length of the frameset a new layer starts with
pub const DEFAULT_FRAMESET_END: u32 = 20;

/// Unique identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub Uuid);

impl LayerId {
    /// Create a new random layer ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a layer holds at a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A keyframe sits exactly here
    Keyframe {
        /// Owning frameset
        frameset: FramesetId,
        /// The keyframe
        keyframe: KeyframeId,
    },
    /// Strictly inside a frameset, between keyframes
    Blank {
        /// Enclosing frameset
        frameset: FramesetId,
    },
    /// Not covered by any frameset
    Null,
}

/// Result of a pose query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pose<'a> {
    /// A keyframe exists at exactly this time
    Exact(&'a Keyframe),
    /// Interpolate between two keyframes of one frameset
    Between {
        /// Keyframe at or before the time
        from: &'a Keyframe,
        /// Keyframe after the time
        to: &'a Keyframe,
        /// Blend factor in `[0, 1)`
        t: f32,
    },
    /// The entity is not shown at this time
    Absent,
}

/// A timeline row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique layer ID
    pub id: LayerId,
    /// Display name
    pub name: String,
    /// Whether the layer is drawn
    pub visible: bool,
    /// The animated entity
    pub entity: Entity,
    /// Framesets sorted by end time
    framesets: Vec<Frameset>,
}

impl Layer {
    /// Create a layer with one frameset `0..=20` holding the reference pose
    pub fn new(name: impl Into<String>, entity: Entity) -> Self {
        let state = entity.create_ref_state();
        Self {
            id: LayerId::new(),
            name: name.into(),
            visible: true,
            entity,
            framesets: vec![Frameset::spanning(0, DEFAULT_FRAMESET_END, state)],
        }
    }

    /// Create a layer from existing framesets
    pub fn with_framesets(
        name: impl Into<String>,
        entity: Entity,
        mut framesets: Vec<Frameset>,
    ) -> Result<Self, InvariantError> {
        framesets.sort_by_key(|f| f.end_time());
        let layer = Self {
            id: LayerId::new(),
            name: name.into(),
            visible: true,
            entity,
            framesets,
        };
        layer.validate()?;
        Ok(layer)
    }

    /// Framesets in time order
    pub fn framesets(&self) -> &[Frameset] {
        &self.framesets
    }

    /// Get frameset by ID
    pub fn frameset(&self, id: FramesetId) -> Option<&Frameset> {
        self.framesets.iter().find(|f| f.id == id)
    }

    fn frameset_index(&self, id: FramesetId) -> Result<usize, EditError> {
        self.framesets
            .iter()
            .position(|f| f.id == id)
            .ok_or(EditError::FramesetNotFound(id))
    }

    /// Get keyframe by frameset and keyframe ID
    pub fn keyframe(&self, frameset: FramesetId, keyframe: KeyframeId) -> Option<&Keyframe> {
        self.frameset(frameset)?.keyframe(keyframe)
    }

    /// The entity together with one keyframe's pose, for editing
    pub fn entity_and_state_mut(
        &mut self,
        frameset: FramesetId,
        keyframe: KeyframeId,
    ) -> Option<(&Entity, &mut EntityState)> {
        let Self { entity, framesets, .. } = self;
        let state = framesets
            .iter_mut()
            .find(|f| f.id == frameset)?
            .keyframe_state_mut(keyframe)?;
        Some((&*entity, state))
    }

    /// Start of the first frameset
    pub fn start_time(&self) -> Option<u32> {
        self.framesets.first().map(|f| f.start_time())
    }

    /// End of the last frameset
    pub fn end_time(&self) -> Option<u32> {
        self.framesets.last().map(|f| f.end_time())
    }

    /// Classify a frame
    pub fn frame_kind(&self, time: u32) -> FrameKind {
        for frameset in &self.framesets {
            if let Some(keyframe) = frameset.keyframe_at(time) {
                return FrameKind::Keyframe {
                    frameset: frameset.id,
                    keyframe: keyframe.id,
                };
            }
            if frameset.contains_strictly(time) {
                return FrameKind::Blank { frameset: frameset.id };
            }
        }
        FrameKind::Null
    }

    /// Find the pose to show at a (fractional) time
    pub fn pose_at(&self, time: f32) -> Pose<'_> {
        if !time.is_finite() || time < 0.0 {
            return Pose::Absent;
        }

        if time.fract() == 0.0 {
            let frame = time as u32;
            if let Some(keyframe) = self.framesets.iter().find_map(|f| f.keyframe_at(frame)) {
                return Pose::Exact(keyframe);
            }
        }

        let enclosing = self
            .framesets
            .iter()
            .find(|f| f.start_time() as f32 <= time && time < f.end_time() as f32);
        match enclosing.and_then(|f| f.bounding_pair(time)) {
            Some((from, to)) => {
                let span = (to.time - from.time) as f32;
                Pose::Between {
                    from,
                    to,
                    t: (time - from.time as f32) / span,
                }
            }
            None => Pose::Absent,
        }
    }

    /// Resolve the pose at `time` into a concrete state
    pub fn resolve_pose(&self, time: f32) -> Option<EntityState> {
        match self.pose_at(time) {
            Pose::Exact(keyframe) => Some(keyframe.state.clone()),
            Pose::Between { from, to, t } => self.entity.interpolate(&from.state, &to.state, t),
            Pose::Absent => None,
        }
    }

    /// Draw this layer's entity at `time`
    pub fn draw(&self, time: f32, for_render: bool) -> Vec<Shape> {
        if !self.visible {
            return Vec::new();
        }
        match self.pose_at(time) {
            Pose::Exact(keyframe) => self.entity.draw(&keyframe.state, time, for_render),
            Pose::Between { from, to, t } => self
                .entity
                .interpolate(&from.state, &to.state, t)
                .map(|state| self.entity.draw(&state, time, for_render))
                .unwrap_or_default(),
            Pose::Absent => Vec::new(),
        }
    }

    /// Check whether a two-frame frameset could start at `time`
    pub fn can_insert_frameset(&self, time: u32) -> Result<(), EditError> {
        if self.framesets.iter().any(|f| f.contains(time)) {
            return Err(EditError::CoveredTime { time });
        }
        let end = time.checked_add(1).ok_or(EditError::TimeOverflow)?;
        if let Some(next) = self.framesets.iter().find(|f| f.start_time() > time) {
            if next.start_time() - time < 2 {
                return Err(EditError::InsufficientGap {
                    time,
                    next_start: next.start_time(),
                });
            }
        }
        debug_assert!(!self.framesets.iter().any(|f| f.overlaps(time, end)));
        Ok(())
    }

    /// Insert a frameset `time..=time+1` holding the reference pose
    ///
    /// Returns the new frameset and its start keyframe.
    pub fn insert_frameset(&mut self, time: u32) -> Result<(FramesetId, KeyframeId), EditError> {
        self.can_insert_frameset(time)?;
        let frameset = Frameset::spanning(time, time + 1, self.entity.create_ref_state());
        let ids = (frameset.id, frameset.keyframes()[0].id);
        let pos = self.framesets.partition_point(|f| f.end_time() < time + 1);
        self.framesets.insert(pos, frameset);
        debug_assert!(self.is_ordered());
        Ok(ids)
    }

    /// Remove a frameset, keeping at least one
    pub fn remove_frameset(&mut self, id: FramesetId) -> Result<Frameset, EditError> {
        let idx = self.frameset_index(id)?;
        if self.framesets.len() <= 1 {
            return Err(EditError::LastFrameset);
        }
        Ok(self.framesets.remove(idx))
    }

    /// Insert a keyframe into a frameset
    pub fn insert_keyframe(&mut self, frameset: FramesetId, time: u32) -> Result<KeyframeId, EditError> {
        let idx = self.frameset_index(frameset)?;
        self.framesets[idx].insert_keyframe(time)
    }

    /// Remove a keyframe from a frameset
    pub fn remove_keyframe(&mut self, frameset: FramesetId, keyframe: KeyframeId) -> Result<Keyframe, EditError> {
        let idx = self.frameset_index(frameset)?;
        self.framesets[idx].remove_keyframe(keyframe)
    }

    /// Move a keyframe to `new_time`
    ///
    /// Moving an end keyframe stretches or shrinks the frameset, which must
    /// still not touch its neighbours.
    pub fn move_keyframe(&mut self, frameset: FramesetId, keyframe: KeyframeId, new_time: u32) -> Result<(), EditError> {
        let idx = self.frameset_index(frameset)?;
        let (start, end) = self.framesets[idx].check_keyframe_move(keyframe, new_time)?;

        if let Some(prev) = idx.checked_sub(1).map(|i| &self.framesets[i]) {
            if prev.end_time() >= start {
                return Err(EditError::OverlapsFrameset {
                    start: prev.start_time(),
                    end: prev.end_time(),
                });
            }
        }
        if let Some(next) = self.framesets.get(idx + 1) {
            if next.start_time() <= end {
                return Err(EditError::OverlapsFrameset {
                    start: next.start_time(),
                    end: next.end_time(),
                });
            }
        }

        self.framesets[idx].set_keyframe_time(keyframe, new_time)?;
        debug_assert!(self.is_ordered());
        Ok(())
    }

    /// Shift a whole frameset by `delta` frames
    pub fn move_frameset(&mut self, frameset: FramesetId, delta: i64) -> Result<(), EditError> {
        let idx = self.frameset_index(frameset)?;
        let moving = &self.framesets[idx];
        let new_start = i64::from(moving.start_time()) + delta;
        let new_end = i64::from(moving.end_time()) + delta;
        if new_start < 0 {
            return Err(EditError::NegativeTime);
        }
        let new_end = u32::try_from(new_end).map_err(|_| EditError::TimeOverflow)?;
        let new_start = new_start as u32;

        if let Some(other) = self
            .framesets
            .iter()
            .find(|f| f.id != frameset && f.overlaps(new_start, new_end))
        {
            return Err(EditError::OverlapsFrameset {
                start: other.start_time(),
                end: other.end_time(),
            });
        }

        let mut moved = self.framesets.remove(idx);
        moved.shift(delta);
        let pos = self.framesets.partition_point(|f| f.end_time() < new_end);
        self.framesets.insert(pos, moved);
        debug_assert!(self.is_ordered());
        Ok(())
    }

    /// Copy the previous or next keyframe's pose into `keyframe`
    pub fn copy_neighbor_pose(
        &mut self,
        frameset: FramesetId,
        keyframe: KeyframeId,
        neighbor: Neighbor,
    ) -> Result<(), EditError> {
        let idx = self.frameset_index(frameset)?;
        self.framesets[idx].copy_neighbor_state(keyframe, neighbor)
    }

    fn is_ordered(&self) -> bool {
        self.framesets.windows(2).all(|w| w[0].end_time() < w[1].start_time())
    }

    /// Check the frameset invariants and that every pose fits the entity
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.framesets.is_empty() {
            return Err(InvariantError::EmptyLayer {
                layer: self.name.clone(),
            });
        }
        for frameset in &self.framesets {
            frameset.validate()?;
        }
        if let Some(w) = self
            .framesets
            .windows(2)
            .find(|w| w[0].end_time() >= w[1].start_time())
        {
            return Err(InvariantError::OverlappingFramesets {
                layer: self.name.clone(),
                first_end: w[0].end_time(),
                second_start: w[1].start_time(),
            });
        }

        let entity_error = |source| InvariantError::Entity {
            layer: self.name.clone(),
            source,
        };
        self.entity.validate().map_err(entity_error)?;
        for keyframe in self.framesets.iter().flat_map(|f| f.keyframes()) {
            self.entity.check_state(&keyframe.state).map_err(entity_error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tisfat_editor_entities::{EntityKind, StickFigureState};

    fn bitmap_layer(spans: &[(u32, u32)]) -> Layer {
        let entity = EntityKind::Bitmap.create_default();
        let state = entity.create_ref_state();
        let framesets = spans
            .iter()
            .map(|&(s, e)| Frameset::new(s, e, state.clone()).unwrap())
            .collect();
        Layer::with_framesets("Bitmap 1", entity, framesets).unwrap()
    }

    fn spans(layer: &Layer) -> Vec<(u32, u32)> {
        layer.framesets().iter().map(|f| (f.start_time(), f.end_time())).collect()
    }

    fn ids(layer: &Layer, frameset: usize, keyframe: usize) -> (FramesetId, KeyframeId) {
        let fs = &layer.framesets()[frameset];
        (fs.id, fs.keyframes()[keyframe].id)
    }

    #[test]
    fn test_new_layer_has_default_frameset() {
        let layer = Layer::new("Stick Figure 1", EntityKind::StickFigure.create_default());
        assert_eq!(spans(&layer), vec![(0, 20)]);
        assert!(layer.visible);
        assert!(layer.validate().is_ok());
    }

    #[test]
    fn test_with_framesets_rejects_overlap() {
        let entity = EntityKind::Bitmap.create_default();
        let state = entity.create_ref_state();
        let framesets = vec![
            Frameset::new(0, 10, state.clone()).unwrap(),
            Frameset::new(10, 20, state).unwrap(),
        ];
        let result = Layer::with_framesets("Bitmap", entity, framesets);
        assert!(matches!(
            result,
            Err(InvariantError::OverlappingFramesets { first_end: 10, second_start: 10, .. })
        ));
    }

    #[test]
    fn test_validate_catches_foreign_state() {
        let mut layer = bitmap_layer(&[(0, 10)]);
        layer.entity = EntityKind::StickFigure.create_default();
        assert!(matches!(layer.validate(), Err(InvariantError::Entity { .. })));
    }

    #[test]
    fn test_frame_kind() {
        let layer = bitmap_layer(&[(0, 10), (15, 20)]);
        let (fs0, kf0) = ids(&layer, 0, 0);
        assert_eq!(layer.frame_kind(0), FrameKind::Keyframe { frameset: fs0, keyframe: kf0 });
        assert_eq!(layer.frame_kind(5), FrameKind::Blank { frameset: fs0 });
        assert_eq!(layer.frame_kind(12), FrameKind::Null);
        assert_eq!(layer.frame_kind(30), FrameKind::Null);
    }

    #[test]
    fn test_pose_at_exact_between_absent() {
        let entity = EntityKind::StickFigure.create_default();
        let a = entity.create_ref_state();
        let b = match &a {
            EntityState::StickFigure(pose) => EntityState::StickFigure(StickFigureState {
                joints: pose.joints.iter().map(|p| *p + egui::vec2(20.0, 0.0)).collect(),
            }),
            other => other.clone(),
        };
        let framesets = vec![
            Frameset::from_keyframes(vec![Keyframe::new(0, a.clone()), Keyframe::new(10, b.clone())]).unwrap(),
        ];
        let layer = Layer::with_framesets("Figure", entity, framesets).unwrap();

        assert!(matches!(layer.pose_at(0.0), Pose::Exact(k) if k.time == 0));
        assert!(matches!(layer.pose_at(10.0), Pose::Exact(k) if k.time == 10));
        match layer.pose_at(2.5) {
            Pose::Between { from, to, t } => {
                assert_eq!((from.time, to.time), (0, 10));
                assert!((t - 0.25).abs() < 1e-6);
            }
            other => panic!("expected Between, got {other:?}"),
        }
        assert_eq!(layer.pose_at(10.5), Pose::Absent);
        assert_eq!(layer.pose_at(-1.0), Pose::Absent);

        let EntityState::StickFigure(mid) = layer.resolve_pose(5.0).unwrap() else {
            panic!("wrong kind");
        };
        let EntityState::StickFigure(start) = &a else { unreachable!() };
        assert!((mid.joints[0].x - (start.joints[0].x + 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_hidden_layer_draws_nothing() {
        let mut layer = bitmap_layer(&[(0, 10)]);
        assert!(!layer.draw(3.0, true).is_empty());
        layer.visible = false;
        assert!(layer.draw(3.0, true).is_empty());
        layer.visible = true;
        assert!(layer.draw(11.0, true).is_empty());
    }

    #[test]
    fn test_insert_frameset_rules() {
        let mut layer = bitmap_layer(&[(0, 20), (25, 30)]);
        assert_eq!(layer.insert_frameset(24), Err(EditError::InsufficientGap { time: 24, next_start: 25 }));
        assert_eq!(layer.insert_frameset(20), Err(EditError::CoveredTime { time: 20 }));

        let (fs, kf) = layer.insert_frameset(21).unwrap();
        assert_eq!(spans(&layer), vec![(0, 20), (21, 22), (25, 30)]);
        assert_eq!(layer.frame_kind(21), FrameKind::Keyframe { frameset: fs, keyframe: kf });

        layer.insert_frameset(40).unwrap();
        assert_eq!(spans(&layer).last(), Some(&(40, 41)));
        assert!(layer.validate().is_ok());
    }

    #[test]
    fn test_remove_last_frameset_rejected() {
        let mut layer = bitmap_layer(&[(0, 10), (15, 20)]);
        let (first, _) = ids(&layer, 0, 0);
        layer.remove_frameset(first).unwrap();
        let (only, _) = ids(&layer, 0, 0);
        assert_eq!(layer.remove_frameset(only), Err(EditError::LastFrameset));
    }

    #[test]
    fn test_move_end_keyframe_stops_at_neighbor() {
        let mut layer = bitmap_layer(&[(0, 10), (15, 20)]);
        let (fs, end) = ids(&layer, 0, 1);

        assert_eq!(layer.move_keyframe(fs, end, 14), Ok(()));
        assert_eq!(spans(&layer), vec![(0, 14), (15, 20)]);
        let before = layer.clone();
        assert_eq!(
            layer.move_keyframe(fs, end, 15),
            Err(EditError::OverlapsFrameset { start: 15, end: 20 })
        );
        assert_eq!(layer, before);

        let (next, next_start) = ids(&layer, 1, 0);
        assert_eq!(
            layer.move_keyframe(next, next_start, 14),
            Err(EditError::OverlapsFrameset { start: 0, end: 14 })
        );
        assert_eq!(layer, before);
    }

    #[test]
    fn test_move_frameset() {
        let mut layer = bitmap_layer(&[(0, 10), (15, 20), (30, 40)]);
        let (middle, _) = ids(&layer, 1, 0);

        assert_eq!(layer.move_frameset(middle, 4), Ok(()));
        assert_eq!(spans(&layer), vec![(0, 10), (19, 24), (30, 40)]);

        let before = layer.clone();
        assert_eq!(layer.move_frameset(middle, 6), Err(EditError::OverlapsFrameset { start: 30, end: 40 }));
        assert_eq!(layer.move_frameset(middle, -9), Err(EditError::OverlapsFrameset { start: 0, end: 10 }));
        let (first, _) = ids(&layer, 0, 0);
        assert_eq!(layer.move_frameset(first, -1), Err(EditError::NegativeTime));
        assert_eq!(layer, before);
    }

    #[test]
    fn test_move_frameset_past_neighbor_reorders() {
        let mut layer = bitmap_layer(&[(0, 2), (10, 20)]);
        let (first, _) = ids(&layer, 0, 0);
        layer.move_frameset(first, 25).unwrap();
        assert_eq!(spans(&layer), vec![(10, 20), (25, 27)]);
        assert_eq!(layer.framesets()[1].id, first);
        assert!(layer.validate().is_ok());
    }
}
