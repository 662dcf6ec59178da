// SPDX-License-Identifier: MIT OR Apache-2.0
//! Framesets: contiguous animated spans of a layer.
//!
//! A frameset covers the closed interval from its first keyframe to its last
//! one. Keyframes stay strictly ordered by time and there are always at least
//! two of them. Every mutation that can move a keyframe is `pub(crate)` so
//! only the owning [`Layer`](crate::layer::Layer) can change times, after
//! checking the neighbouring framesets.

use crate::error::{EditError, InvariantError};
use crate::keyframe::{Keyframe, KeyframeId, Neighbor};
use serde::{Deserialize, Serialize};
use tisfat_editor_entities::EntityState;
use uuid::Uuid;

/// Unique identifier for a frameset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramesetId(pub Uuid);

impl FramesetId {
    /// Create a new random frameset ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FramesetId {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered run of keyframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frameset {
    /// Unique frameset ID
    pub id: FramesetId,
    /// Keyframes sorted by time
    keyframes: Vec<Keyframe>,
}

impl Frameset {
    /// Create a frameset spanning `start..=end`, both ends holding `state`
    pub fn new(start: u32, end: u32, state: EntityState) -> Result<Self, EditError> {
        if start >= end {
            return Err(EditError::InvalidSpan { start, end });
        }
        Ok(Self::spanning(start, end, state))
    }

    /// Caller guarantees `start < end`
    pub(crate) fn spanning(start: u32, end: u32, state: EntityState) -> Self {
        debug_assert!(start < end);
        Self {
            id: FramesetId::new(),
            keyframes: vec![Keyframe::new(start, state.clone()), Keyframe::new(end, state)],
        }
    }

    /// Build from existing keyframes, sorting them first
    pub fn from_keyframes(mut keyframes: Vec<Keyframe>) -> Result<Self, InvariantError> {
        keyframes.sort_by_key(|k| k.time);
        let frameset = Self {
            id: FramesetId::new(),
            keyframes,
        };
        frameset.validate()?;
        Ok(frameset)
    }

    /// Keyframes in time order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Time of the first keyframe
    pub fn start_time(&self) -> u32 {
        self.keyframes.first().map(|k| k.time).unwrap_or(0)
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> u32 {
        self.keyframes.last().map(|k| k.time).unwrap_or(0)
    }

    /// Whether `time` lies in `start..=end`
    pub fn contains(&self, time: u32) -> bool {
        self.start_time() <= time && time <= self.end_time()
    }

    /// Whether `time` lies strictly between start and end
    pub fn contains_strictly(&self, time: u32) -> bool {
        self.start_time() < time && time < self.end_time()
    }

    /// Whether `start..=end` shares any frame with this frameset
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start <= self.end_time() && end >= self.start_time()
    }

    /// Get keyframe by ID
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    /// Get keyframe at an exact frame
    pub fn keyframe_at(&self, time: u32) -> Option<&Keyframe> {
        self.keyframes
            .binary_search_by_key(&time, |k| k.time)
            .ok()
            .map(|idx| &self.keyframes[idx])
    }

    /// Mutable access to a keyframe's pose (its time stays fixed)
    pub fn keyframe_state_mut(&mut self, id: KeyframeId) -> Option<&mut EntityState> {
        self.keyframes.iter_mut().find(|k| k.id == id).map(|k| &mut k.state)
    }

    fn index_of(&self, id: KeyframeId) -> Result<usize, EditError> {
        self.keyframes
            .iter()
            .position(|k| k.id == id)
            .ok_or(EditError::KeyframeNotFound(id))
    }

    /// The keyframes enclosing `time`
    ///
    /// Returns the latest keyframe at or before `time` and the earliest one
    /// after it. `None` outside `start..end`.
    pub fn bounding_pair(&self, time: f32) -> Option<(&Keyframe, &Keyframe)> {
        let next = self.keyframes.partition_point(|k| k.time as f32 <= time);
        if next == 0 || next == self.keyframes.len() {
            return None;
        }
        Some((&self.keyframes[next - 1], &self.keyframes[next]))
    }

    /// Insert a keyframe strictly between two consecutive keyframes
    ///
    /// The new pose is a copy of the preceding keyframe's.
    pub(crate) fn insert_keyframe(&mut self, time: u32) -> Result<KeyframeId, EditError> {
        let next = self.keyframes.partition_point(|k| k.time < time);
        let encloses = next > 0
            && next < self.keyframes.len()
            && self.keyframes[next].time != time;
        if !encloses {
            return Err(EditError::NoEnclosingGap { time });
        }

        let keyframe = Keyframe::new(time, self.keyframes[next - 1].state.clone());
        let id = keyframe.id;
        self.keyframes.insert(next, keyframe);
        debug_assert!(self.is_ordered());
        Ok(id)
    }

    /// Remove a keyframe, keeping at least two
    pub(crate) fn remove_keyframe(&mut self, id: KeyframeId) -> Result<Keyframe, EditError> {
        let idx = self.index_of(id)?;
        if self.keyframes.len() <= 2 {
            return Err(EditError::TooFewKeyframes);
        }
        Ok(self.keyframes.remove(idx))
    }

    /// Check a keyframe move against this frameset alone
    ///
    /// On success returns the span the frameset would have afterwards.
    pub(crate) fn check_keyframe_move(&self, id: KeyframeId, new_time: u32) -> Result<(u32, u32), EditError> {
        let idx = self.index_of(id)?;
        if self.keyframes.iter().any(|k| k.id != id && k.time == new_time) {
            return Err(EditError::KeyframeCollision { time: new_time });
        }

        let last = self.keyframes.len() - 1;
        let (start, end) = (self.start_time(), self.end_time());
        if idx == 0 {
            if new_time >= self.keyframes[1].time {
                return Err(EditError::NotExtremal { time: new_time });
            }
            Ok((new_time, end))
        } else if idx == last {
            if new_time <= self.keyframes[last - 1].time {
                return Err(EditError::NotExtremal { time: new_time });
            }
            Ok((start, new_time))
        } else {
            if new_time <= start || new_time >= end {
                return Err(EditError::OutsideFrameset {
                    time: new_time,
                    start,
                    end,
                });
            }
            Ok((start, end))
        }
    }

    /// Move a keyframe; the caller has already checked the move
    pub(crate) fn set_keyframe_time(&mut self, id: KeyframeId, new_time: u32) -> Result<(), EditError> {
        let idx = self.index_of(id)?;
        let mut keyframe = self.keyframes.remove(idx);
        keyframe.time = new_time;
        let pos = self.keyframes.partition_point(|k| k.time < new_time);
        self.keyframes.insert(pos, keyframe);
        debug_assert!(self.is_ordered());
        Ok(())
    }

    /// Shift every keyframe; the caller has already checked the bounds
    pub(crate) fn shift(&mut self, delta: i64) {
        for keyframe in &mut self.keyframes {
            keyframe.time = (i64::from(keyframe.time) + delta) as u32;
        }
    }

    /// Copy the pose of the previous or next keyframe into `id`
    pub(crate) fn copy_neighbor_state(&mut self, id: KeyframeId, neighbor: Neighbor) -> Result<(), EditError> {
        let idx = self.index_of(id)?;
        let source = match neighbor {
            Neighbor::Previous => idx.checked_sub(1),
            Neighbor::Next => Some(idx + 1).filter(|&i| i < self.keyframes.len()),
        }
        .ok_or(EditError::NoNeighbor)?;

        self.keyframes[idx].state = self.keyframes[source].state.clone();
        Ok(())
    }

    fn is_ordered(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].time < w[1].time)
    }

    /// Check the keyframe count and ordering
    pub fn validate(&self) -> Result<(), InvariantError> {
        if self.keyframes.len() < 2 {
            return Err(InvariantError::TooFewKeyframes {
                frameset: self.id,
                count: self.keyframes.len(),
            });
        }
        if let Some(w) = self.keyframes.windows(2).find(|w| w[0].time >= w[1].time) {
            return Err(InvariantError::UnorderedKeyframes {
                frameset: self.id,
                time: w[1].time,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tisfat_editor_entities::EntityKind;

    fn state() -> EntityState {
        EntityKind::Bitmap.create_default().create_ref_state()
    }

    fn frameset(times: &[u32]) -> Frameset {
        Frameset::from_keyframes(times.iter().map(|&t| Keyframe::new(t, state())).collect()).unwrap()
    }

    fn times(frameset: &Frameset) -> Vec<u32> {
        frameset.keyframes().iter().map(|k| k.time).collect()
    }

    #[test]
    fn test_span_is_closed() {
        let fs = frameset(&[0, 10, 20]);
        assert_eq!(fs.start_time(), 0);
        assert_eq!(fs.end_time(), 20);
        assert!(fs.contains(0));
        assert!(fs.contains(20));
        assert!(!fs.contains(21));
        assert!(!fs.contains_strictly(20));
        assert!(fs.overlaps(20, 25));
        assert!(!fs.overlaps(21, 25));
    }

    #[test]
    fn test_new_rejects_empty_span() {
        assert_eq!(
            Frameset::new(5, 5, state()).unwrap_err(),
            EditError::InvalidSpan { start: 5, end: 5 }
        );
        assert!(Frameset::new(5, 6, state()).is_ok());
    }

    #[test]
    fn test_from_keyframes_sorts_and_validates() {
        let fs = frameset(&[20, 0, 10]);
        assert_eq!(times(&fs), vec![0, 10, 20]);

        let single = Frameset::from_keyframes(vec![Keyframe::new(3, state())]);
        assert!(matches!(single, Err(InvariantError::TooFewKeyframes { count: 1, .. })));

        let dup = Frameset::from_keyframes(vec![Keyframe::new(3, state()), Keyframe::new(3, state())]);
        assert!(matches!(dup, Err(InvariantError::UnorderedKeyframes { time: 3, .. })));
    }

    #[test]
    fn test_bounding_pair() {
        let fs = frameset(&[0, 10, 20]);
        let (a, b) = fs.bounding_pair(15.0).unwrap();
        assert_eq!((a.time, b.time), (10, 20));
        let (a, b) = fs.bounding_pair(10.0).unwrap();
        assert_eq!((a.time, b.time), (10, 20));
        assert!(fs.bounding_pair(20.0).is_none());
        assert!(fs.bounding_pair(-1.0).is_none());
    }

    #[test]
    fn test_insert_keyframe_copies_previous_pose() {
        let mut fs = frameset(&[0, 20]);
        let first = fs.keyframes()[0].id;
        if let Some(EntityState::Bitmap(pose)) = fs.keyframe_state_mut(first) {
            pose.rect = pose.rect.translate(egui::vec2(7.0, 0.0));
        }

        let id = fs.insert_keyframe(12).unwrap();
        assert_eq!(times(&fs), vec![0, 12, 20]);
        assert_eq!(fs.keyframe(id).unwrap().state, fs.keyframes()[0].state);

        assert_eq!(fs.insert_keyframe(12), Err(EditError::NoEnclosingGap { time: 12 }));
        assert_eq!(fs.insert_keyframe(20), Err(EditError::NoEnclosingGap { time: 20 }));
        assert_eq!(fs.insert_keyframe(25), Err(EditError::NoEnclosingGap { time: 25 }));
    }

    #[test]
    fn test_remove_keeps_two_keyframes() {
        let mut fs = frameset(&[0, 10, 20]);
        let end = fs.keyframes()[2].id;
        fs.remove_keyframe(end).unwrap();
        assert_eq!(fs.end_time(), 10);

        let start = fs.keyframes()[0].id;
        assert_eq!(fs.remove_keyframe(start), Err(EditError::TooFewKeyframes));
    }

    #[test]
    fn test_keyframe_move_rules() {
        let fs = frameset(&[0, 10, 20]);
        let ids: Vec<_> = fs.keyframes().iter().map(|k| k.id).collect();

        assert_eq!(fs.check_keyframe_move(ids[1], 20), Err(EditError::KeyframeCollision { time: 20 }));
        assert_eq!(
            fs.check_keyframe_move(ids[1], 25),
            Err(EditError::OutsideFrameset { time: 25, start: 0, end: 20 })
        );
        assert_eq!(fs.check_keyframe_move(ids[1], 15), Ok((0, 20)));
        assert_eq!(fs.check_keyframe_move(ids[2], 25), Ok((0, 25)));
        assert_eq!(fs.check_keyframe_move(ids[2], 5), Err(EditError::NotExtremal { time: 5 }));
        assert_eq!(fs.check_keyframe_move(ids[0], 12), Err(EditError::NotExtremal { time: 12 }));
    }

    #[test]
    fn test_set_keyframe_time_keeps_order() {
        let mut fs = frameset(&[0, 5, 10, 20]);
        let moved = fs.keyframes()[1].id;
        fs.set_keyframe_time(moved, 15).unwrap();
        assert_eq!(times(&fs), vec![0, 10, 15, 20]);
        assert_eq!(fs.keyframes()[2].id, moved);
    }

    #[test]
    fn test_copy_neighbor_state() {
        let mut fs = frameset(&[0, 20]);
        let end = fs.keyframes()[1].id;
        if let Some(EntityState::Bitmap(pose)) = fs.keyframe_state_mut(end) {
            pose.rect = pose.rect.translate(egui::vec2(0.0, 9.0));
        }
        let start = fs.keyframes()[0].id;

        fs.copy_neighbor_state(start, Neighbor::Next).unwrap();
        assert_eq!(fs.keyframes()[0].state, fs.keyframes()[1].state);
        assert_eq!(fs.copy_neighbor_state(start, Neighbor::Previous), Err(EditError::NoNeighbor));
    }
}
