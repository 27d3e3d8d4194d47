//! Designer-authored fade curves and their evaluation.

use serde::{Deserialize, Serialize};

use crate::error::AudioError;

pub mod evaluator;

pub use evaluator::{CurveEvaluator, CurveValue};

/// One point of a fade curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// An immutable keyframed curve with strictly increasing time coordinates.
///
/// Curves arrive from configuration data, so construction validates and
/// returns an error instead of panicking. Sampling clamps to the first
/// and last values outside the time domain.
#[derive(Debug, Clone, Serialize)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    pub fn from_keys(keys: Vec<Keyframe>) -> Result<Self, AudioError> {
        if keys.is_empty() {
            return Err(AudioError::Curve("curve has no keyframes".into()));
        }
        for pair in keys.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(AudioError::Curve(format!(
                    "keyframe times must be strictly increasing ({} then {})",
                    pair[0].time, pair[1].time
                )));
            }
        }

        Ok(Self { keys })
    }

    /// A straight ramp from `from` to `to` over `duration` seconds.
    ///
    /// # Panics
    ///
    /// Panics when `duration` is not strictly positive, which would
    /// break the strictly-increasing keyframe invariant.
    pub fn linear(from: f32, to: f32, duration: f32) -> Self {
        assert!(duration > 0.0, "linear curve duration must be positive");
        Self {
            keys: vec![Keyframe::new(0.0, from), Keyframe::new(duration, to)],
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn begin_time(&self) -> f32 {
        self.keys[0].time
    }

    pub fn end_time(&self) -> f32 {
        self.keys[self.keys.len() - 1].time
    }

    /// Evaluate the curve at `time` with linear interpolation.
    pub fn sample(&self, time: f32) -> f32 {
        sample_keys(&self.keys, time)
    }
}

impl<'de> Deserialize<'de> for Curve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let keys = Vec::<Keyframe>::deserialize(deserializer)?;
        Curve::from_keys(keys).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn sample_keys(keys: &[Keyframe], time: f32) -> f32 {
    let first = keys[0];
    let last = keys[keys.len() - 1];
    if time <= first.time {
        return first.value;
    }
    if time >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if time <= b.time {
            let t = (time - a.time) / (b.time - a.time);
            return a.value + (b.value - a.value) * t;
        }
    }

    last.value
}
