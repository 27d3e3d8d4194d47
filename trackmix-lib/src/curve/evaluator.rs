//! Reusable curve evaluator producing normalized crossfade progress.

use super::{sample_keys, Curve, Keyframe};

/// One evaluation result: the raw curve value and the value rescaled by
/// the elapsed-time progress ratio. The normalized value is what mixers
/// feed into volume interpolation; it stays meaningful even when the
/// curve's own value range is not `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurveValue {
    pub value: f32,
    pub normalized: f32,
}

/// Evaluation session over a [`Curve`].
///
/// A session is bounded by [`begin_evaluate`](Self::begin_evaluate) and
/// [`end_evaluate`](Self::end_evaluate); evaluating outside a session is
/// a usage error. The session works on a private copy of the keyframes
/// held in a scratch vector that is reused across episodes, so repeated
/// crossfades do not allocate.
pub struct CurveEvaluator {
    source: Curve,
    session: Vec<Keyframe>,
    simulated: f32,
    active: bool,
}

impl CurveEvaluator {
    pub fn new(source: Curve) -> Self {
        Self {
            source,
            session: Vec::new(),
            simulated: 0.0,
            active: false,
        }
    }

    /// Snapshot the curve and reset simulated time to zero.
    pub fn begin_evaluate(&mut self) {
        self.session.clear();
        self.session.extend_from_slice(self.source.keys());
        self.simulated = 0.0;
        self.active = true;
    }

    /// Close the session. The scratch copy stays allocated for reuse.
    pub fn end_evaluate(&mut self) {
        self.session.clear();
        self.simulated = 0.0;
        self.active = false;
    }

    /// Advance simulated time by `delta` and sample the session copy.
    ///
    /// The delta is added before sampling so the very first evaluation of
    /// an episode already reflects its own time slice.
    ///
    /// # Panics
    ///
    /// Panics when called outside a session, or when the curve spans zero
    /// time (normalization would be undefined).
    pub fn evaluate(&mut self, delta: f32) -> CurveValue {
        assert!(
            self.active,
            "curve evaluated outside a begin/end session"
        );

        self.simulated += delta;

        let time = self.simulated;
        let normalized_time = self.normalize_time(time);
        let value = sample_keys(&self.session, time);
        let normalized = if time != 0.0 {
            value * normalized_time / time
        } else {
            0.0
        };

        CurveValue { value, normalized }
    }

    /// Elapsed-time progress through the curve domain, clamped to `[0, 1]`.
    pub fn normalized_elapsed(&self) -> f32 {
        self.normalize_time(self.simulated).clamp(0.0, 1.0)
    }

    /// First keyframe time of the session copy; `0.0` outside a session.
    pub fn begin_time(&self) -> f32 {
        match self.session.first() {
            Some(key) => key.time,
            None => 0.0,
        }
    }

    /// Last keyframe time of the session copy; `0.0` outside a session.
    pub fn end_time(&self) -> f32 {
        match self.session.last() {
            Some(key) => key.time,
            None => 0.0,
        }
    }

    pub fn simulated_time(&self) -> f32 {
        self.simulated
    }

    pub fn is_finished(&self) -> bool {
        !self.active || self.simulated > self.end_time()
    }

    fn normalize_time(&self, time: f32) -> f32 {
        let keys = self.source.keys();
        let begin = keys[0].time;
        let end = keys[keys.len() - 1].time;
        let span = end - begin;
        assert!(span != 0.0, "curve spans zero time; cannot normalize");

        (time - begin) / span
    }
}
