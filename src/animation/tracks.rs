use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How many neighbouring keyframes the cursor scans before falling back to a
/// binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in, so that
/// steadily advancing playback finds the next interval in O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    /// For `CubicSpline` the length is `times.len() * 3`
    /// (in-tangent, value, out-tangent per keyframe).
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Number of values `times` calls for under this interpolation.
    #[must_use]
    pub fn expected_value_count(&self) -> usize {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.times.len() * 3,
            _ => self.times.len(),
        }
    }

    /// Whether there is exactly one value (or tangent triple) per keyframe.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.values.len() == self.expected_value_count()
    }

    /// Time of the last keyframe, or `0.0` for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling, mostly useful for tests and tools.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next_idx.saturating_sub(1), time)
    }

    /// Samples the track at `time`, reusing and updating `cursor`.
    ///
    /// Returns `None` for a track without keyframes, or when a keyframe has
    /// no value behind it.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return self.value_at(0),
            _ => {}
        }

        // A cursor left over from another clip may be out of range.
        let i = cursor.last_index.min(len - 1);

        let local = if time >= self.times[i] {
            // Playback moving forward: time is at or after times[i].
            (0..=MAX_SCAN_OFFSET)
                .map(|offset| i + offset)
                .take_while(|&idx| idx < len)
                .find(|&idx| idx == len - 1 || time < self.times[idx + 1])
        } else {
            // Loop wrap or reverse playback.
            (1..=MAX_SCAN_OFFSET)
                .filter_map(|offset| i.checked_sub(offset))
                .find(|&idx| time >= self.times[idx])
        };

        let index = local.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    /// Keyframe value accessor that skips cubic-spline tangents.
    fn value_at(&self, index: usize) -> Option<T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1).copied(),
            _ => self.values.get(index).copied(),
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> Option<T> {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next_idx] - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => Some(T::interpolate_linear(self.value_at(index)?, self.value_at(next_idx)?, t)),
            InterpolationMode::CubicSpline => {
                let prev = self.values.get(index * 3 + 1..index * 3 + 3)?;
                let next = self.values.get(next_idx * 3..next_idx * 3 + 2)?;
                Some(T::interpolate_cubic(prev[0], prev[1], next[0], next[1], t, dt))
            }
        }
    }
}
