// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wall-clock playback.
//!
//! While playing, the frame is derived from the time elapsed since playback
//! started, so a slow repaint never makes the animation drift.

use std::time::Instant;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not advancing
    #[default]
    Stopped,
    /// Advancing with the clock
    Playing {
        /// When playback started
        started_at: Instant,
    },
}

/// Playback controller for the timeline
#[derive(Debug, Clone, Default)]
pub struct PlaybackController {
    /// Frame when stopped, or the frame playback started from
    frame: f32,
    /// Playback state
    state: PlaybackState,
}

impl PlaybackController {
    /// Create a stopped controller at frame 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    /// The stored frame, ignoring elapsed time
    pub fn playhead(&self) -> f32 {
        self.frame
    }

    /// Frame at `now`
    pub fn frame_at(&self, now: Instant, fps: f32) -> f32 {
        match self.state {
            PlaybackState::Stopped => self.frame,
            PlaybackState::Playing { started_at } => {
                self.frame + now.saturating_duration_since(started_at).as_secs_f32() * fps
            }
        }
    }

    /// Start playing from the stored frame
    pub fn play(&mut self, now: Instant) {
        if !self.is_playing() {
            self.state = PlaybackState::Playing { started_at: now };
        }
    }

    /// Stop, keeping the frame reached at `now`
    pub fn pause(&mut self, now: Instant, fps: f32) {
        self.frame = self.frame_at(now, fps);
        self.state = PlaybackState::Stopped;
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self, now: Instant, fps: f32) {
        if self.is_playing() {
            self.pause(now, fps);
        } else {
            self.play(now);
        }
    }

    /// Jump to a frame; stops playback
    pub fn seek(&mut self, frame: f32) {
        self.frame = frame.max(0.0);
        self.state = PlaybackState::Stopped;
    }
}
