use std::sync::Arc;

use crate::animation::binding::{PropertyBinding, TrackValue};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;

/// What happens when playback runs past either end of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Play through once and hold the end pose.
    Once,
    /// Jump back to the start.
    #[default]
    Loop,
    /// Alternate forward and backward.
    PingPong,
}

impl LoopMode {
    /// Maps an unbounded local time into `[0, duration]`.
    ///
    /// The flag is set when a [`Once`](Self::Once) action ran off an end.
    #[must_use]
    pub fn wrap(self, time: f32, duration: f32) -> (f32, bool) {
        match self {
            Self::Once if time >= duration => (duration, true),
            Self::Once if time < 0.0 => (0.0, true),
            Self::Once => (time, false),
            Self::Loop => (time.rem_euclid(duration), false),
            Self::PingPong => {
                let t = time.rem_euclid(duration * 2.0);
                (if t > duration { duration * 2.0 - t } else { t }, false)
            }
        }
    }
}

/// Playback state of one clip on one target subtree.
///
/// Actions are created stopped by [`AnimationMixer::clip_action`](crate::animation::AnimationMixer::clip_action);
/// nothing is applied to the scene until [`play`](Self::play) is called.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    /// Local time in seconds.
    pub time: f32,
    pub time_scale: f32,
    /// Blend weight towards the sampled pose.
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    scheduled: bool,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_cursors = vec![KeyframeCursor::default(); clip.tracks.len()];
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::default(),
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            scheduled: false,
            track_cursors,
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<PropertyBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Schedules the action from its current time.
    pub fn play(&mut self) -> &mut Self {
        self.scheduled = true;
        self.enabled = true;
        self.paused = false;
        self
    }

    /// Unschedules the action and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.scheduled = false;
        self.time = 0.0;
        self.track_cursors.fill(KeyframeCursor::default());
        self
    }

    /// Whether the action advances and drives its targets.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduled && self.enabled && !self.paused && self.time_scale != 0.0
    }

    /// Whether [`play`](Self::play) was called and not undone by [`stop`](Self::stop).
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Advances the local time by `dt` seconds. A `Once` action that reaches
    /// an end pauses there.
    pub fn update(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if !self.is_running() || duration <= 0.0 {
            return;
        }

        let (time, finished) = self.loop_mode.wrap(self.time + dt * self.time_scale, duration);
        self.time = time;
        self.paused |= finished;
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;
        let time = self.time;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Quaternion),
        }
    }
}
