use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

// How many segments the cursor walks before giving up and bisecting.
const MAX_SCAN: usize = 3;

/// Remembers the last keyframe segment a track was sampled in.
///
/// Playback is mostly monotonic, so the next lookup usually lands in the
/// same or the following segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes of a single animated property.
///
/// For [`InterpolationMode::CubicSpline`] `values` holds
/// `[in_tangent, value, out_tangent]` triplets, so its length is
/// `times.len() * 3`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
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

    /// Time of the last keyframe, or zero for an empty track.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Number of values `times` calls for under the interpolation mode.
    #[inline]
    #[must_use]
    pub fn expected_value_count(&self) -> usize {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.times.len() * 3,
            _ => self.times.len(),
        }
    }

    /// True when the track has keyframes and exactly the values they need.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.times.is_empty() && self.values.len() == self.expected_value_count()
    }

    /// Nothing to sample: no keyframes, or a value count that does not
    /// match them.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_valid()
    }

    /// Stateless sample; bisects every call. `None` for an invalid track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let segment = self.times.partition_point(|&t| t <= time).saturating_sub(1);
        Some(self.sample_segment(segment, time))
    }

    /// Samples at `time`, starting the search from `cursor` and updating it.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let segment = self.locate(time, cursor.last_index);
        cursor.last_index = segment;
        Some(self.sample_segment(segment, time))
    }

    /// Index `i` such that `times[i] <= time < times[i + 1]`, clamped to the
    /// first and last keyframe.
    fn locate(&self, time: f32, hint: usize) -> usize {
        let last = self.times.len() - 1;
        let hint = hint.min(last);

        if time >= self.times[hint] {
            for i in hint..(hint + MAX_SCAN).min(last) {
                if time < self.times[i + 1] {
                    return i;
                }
            }
            if time >= self.times[last] {
                return last;
            }
        } else {
            for i in (hint.saturating_sub(MAX_SCAN)..hint).rev() {
                if time >= self.times[i] {
                    return i;
                }
            }
        }

        self.times.partition_point(|&t| t <= time).saturating_sub(1)
    }

    fn keyframe_value(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_segment(&self, index: usize, time: f32) -> T {
        let last = self.times.len() - 1;
        if index >= last || time <= self.times[0] {
            let i = if time <= self.times[0] { 0 } else { last };
            return self.keyframe_value(i);
        }

        let (t0, t1) = (self.times[index], self.times[index + 1]);
        let dt = t1 - t0;
        let t = if dt > 1e-6 {
            ((time - t0) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            InterpolationMode::Step => self.keyframe_value(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.keyframe_value(index), self.keyframe_value(index + 1), t)
            }
            InterpolationMode::CubicSpline => {
                let a = index * 3;
                let b = (index + 1) * 3;
                T::interpolate_cubic(
                    self.values[a + 1],
                    self.values[a + 2],
                    self.values[b],
                    self.values[b + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
