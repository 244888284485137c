use std::collections::BTreeMap;

use crate::CYCLE_DURATION_MS;
use crate::animation::library::Animation;
use crate::animation::value::{AnimationValue, InterpolationType};

/// A single keyframe: the value at a point on the timeline, and the curve
/// used to reach the *next* keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame {
    pub value: AnimationValue,
    pub interpolation: InterpolationType,
}

/// A keyframed animation over a fixed duration in milliseconds.
///
/// Each call to [`Animation::advance`] samples the timeline at the current
/// elapsed time, then steps it by one logic cycle. When the end is reached
/// the sequence wraps and decrements its repeat budget; a budget of `-1`
/// loops forever.
///
/// A freshly constructed sequence is playing.
#[derive(Debug, Clone)]
pub struct Sequence {
    duration_ms: u32,
    repeat: i32,
    elapsed_ms: u32,
    playing: bool,
    key_frames: BTreeMap<u32, KeyFrame>,
}

impl Sequence {
    /// `repeat` is the number of passes through the timeline; negative means
    /// infinite.
    #[must_use]
    pub fn new(duration_ms: u32, repeat: i32) -> Self {
        Self {
            duration_ms: duration_ms.max(1),
            repeat,
            elapsed_ms: 0,
            playing: true,
            key_frames: BTreeMap::new(),
        }
    }

    /// An endlessly repeating sequence.
    #[must_use]
    pub fn looping(duration_ms: u32) -> Self {
        Self::new(duration_ms, -1)
    }

    /// Adds a keyframe at an absolute time code. A time code beyond the
    /// timeline is ignored with a warning.
    pub fn add_key_frame(
        &mut self,
        time_code_ms: u32,
        value: AnimationValue,
        interpolation: InterpolationType,
    ) -> bool {
        if time_code_ms > self.duration_ms {
            log::warn!(
                "Keyframe at {time_code_ms}ms is outside the {}ms timeline, ignoring",
                self.duration_ms
            );
            return false;
        }

        self.key_frames.insert(
            time_code_ms,
            KeyFrame {
                value,
                interpolation,
            },
        );
        true
    }

    /// Adds a keyframe at a position relative to the timeline (0.0 to 1.0).
    pub fn add_key_frame_at(
        &mut self,
        position: f32,
        value: AnimationValue,
        interpolation: InterpolationType,
    ) -> bool {
        let time_code = (position.clamp(0.0, 1.0) * self.duration_ms as f32).round() as u32;
        self.add_key_frame(time_code, value, interpolation)
    }

    /// Jumps the timeline to an absolute time code; out-of-range values are
    /// ignored.
    pub fn set_time(&mut self, time_code_ms: u32) {
        if time_code_ms > self.duration_ms {
            log::warn!(
                "Time code {time_code_ms}ms is outside the {}ms timeline, ignoring",
                self.duration_ms
            );
            return;
        }
        self.elapsed_ms = time_code_ms;
    }

    /// Jumps the timeline to a relative position (0.0 to 1.0).
    pub fn set_position(&mut self, position: f32) {
        self.elapsed_ms = (position.clamp(0.0, 1.0) * self.duration_ms as f32).round() as u32;
    }

    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Samples the timeline at the current elapsed time.
    fn sample(&self) -> Option<AnimationValue> {
        let (_, first) = self.key_frames.iter().next()?;

        // Last keyframe at or before the cursor; before the first one, hold
        // the first value.
        let Some((start_time, start)) = self.key_frames.range(..=self.elapsed_ms).next_back()
        else {
            return Some(first.value);
        };

        // Next keyframe after the cursor; past the last one, hold its value.
        let Some((end_time, end)) = self.key_frames.range(self.elapsed_ms + 1..).next() else {
            return Some(start.value);
        };

        let span = (end_time - start_time) as f32;
        let factor = if span > 0.0 {
            (self.elapsed_ms - start_time) as f32 / span
        } else {
            0.0
        };

        Some(AnimationValue::interpolate(
            &start.value,
            &end.value,
            factor,
            start.interpolation,
        ))
    }

    /// Steps the timeline by one logic cycle, wrapping and consuming the
    /// repeat budget at the end.
    fn advance_time(&mut self) {
        self.elapsed_ms += CYCLE_DURATION_MS as u32;

        if self.elapsed_ms < self.duration_ms {
            return;
        }

        if self.repeat < 0 {
            self.elapsed_ms %= self.duration_ms;
        } else if self.repeat > 0 {
            self.repeat -= 1;
            if self.repeat == 0 {
                self.elapsed_ms = self.duration_ms;
                self.playing = false;
            } else {
                self.elapsed_ms %= self.duration_ms;
            }
        } else {
            self.elapsed_ms = self.duration_ms;
            self.playing = false;
        }
    }
}

impl Animation for Sequence {
    fn advance(&mut self) -> Option<AnimationValue> {
        if !self.playing || self.is_finished() {
            return None;
        }

        let value = self.sample();
        self.advance_time();
        value
    }

    fn play(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.playing = true;
        true
    }

    fn pause(&mut self) -> bool {
        self.playing = false;
        true
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_finished(&self) -> bool {
        self.repeat == 0 && self.elapsed_ms >= self.duration_ms
    }
}
