use std::time::Instant;

/// Wall clock for the render loop.
///
/// The clock starts on its first [`get_delta`](Self::get_delta), which
/// reports `0.0`; time spent between construction and the first frame
/// (renderer setup, for instance) is never handed to the animation. Later
/// calls report the time since the previous one. No smoothing or clamping is
/// applied; a long stall yields one long delta.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    previous: Option<Instant>,
}

impl Clock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks and returns the seconds since the previous tick.
    pub fn get_delta(&mut self) -> f32 {
        let now = Instant::now();
        let delta = self
            .previous
            .map_or(0.0, |previous| now.duration_since(previous).as_secs_f32());
        self.previous = Some(now);
        delta
    }
}
