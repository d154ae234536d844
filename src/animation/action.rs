use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Playback state of one clip on one mixer.
///
/// An action is either stopped (not scheduled, time reset) or running; a
/// running action may additionally be paused. A `Once` action that reaches
/// its end holds the last frame and reports itself finished.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,

    running: bool,
    finished: bool,
    // PingPong: currently playing from the end back toward zero.
    reversed: bool,

    pub(crate) bindings: Vec<PropertyBinding>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, bindings: Vec<PropertyBinding>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            running: false,
            finished: false,
            reversed: false,
            bindings,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[inline]
    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Schedules the action. Restarts it if it had finished.
    pub fn play(&mut self) {
        if self.finished {
            self.time = 0.0;
            self.finished = false;
            self.reversed = false;
        }
        self.running = true;
        self.paused = false;
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) {
        self.running = false;
        self.finished = false;
        self.paused = false;
        self.reversed = false;
        self.time = 0.0;
        self.track_cursors.fill(KeyframeCursor::default());
    }

    /// Scheduled, regardless of pause state.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Scheduled, unpaused and not finished: time is advancing.
    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.running && !self.paused && !self.finished
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances local time by `dt * time_scale` and applies the loop mode.
    pub fn advance(&mut self, dt: f32) {
        if !self.is_playing() {
            return;
        }
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        let step = dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                self.time += step;
                if self.time >= duration || self.time < 0.0 {
                    self.time = self.time.clamp(0.0, duration);
                    self.finished = true;
                }
            }
            LoopMode::Loop => {
                self.time = (self.time + step).rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // Unfold onto [0, 2 * duration): the second half is the
                // return leg.
                let period = duration * 2.0;
                let unfolded = if self.reversed { period - self.time } else { self.time };
                let t = (unfolded + step).rem_euclid(period);
                self.reversed = t > duration;
                self.time = if self.reversed { period - t } else { t };
            }
        }
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;
        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t
                .sample_with_cursor(self.time, cursor)
                .map(TrackValue::Quaternion),
        }
    }
}
