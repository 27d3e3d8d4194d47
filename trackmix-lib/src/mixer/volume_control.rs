//! Uniform volume fade across every slot of a track.

use crate::curve::{Curve, CurveEvaluator, CurveValue};
use crate::playback::instance::AudioInstance;
use crate::playback::slot::Slot;

use super::{apply_gain_all, stop_and_eject_all, MixStatus, MixTimeline, Mixer, MixerKind};

/// Fades the whole track along a single curve.
///
/// Applies the normalized curve value to the outgoing and incoming
/// groups alike, so the pivot position does not matter beyond the
/// track's gating check. With `stop_on_end` the episode terminates in
/// silence: every instance in both groups is stopped and ejected when
/// the episode ends (fade-out-then-stop).
pub struct VolumeControl {
    curve: CurveEvaluator,
    latest: CurveValue,
    stop_on_end: bool,
    timeline: MixTimeline,
}

impl VolumeControl {
    pub fn new(curve: Curve, stop_on_end: bool) -> Self {
        Self {
            curve: CurveEvaluator::new(curve),
            latest: CurveValue::default(),
            stop_on_end,
            timeline: MixTimeline::new(),
        }
    }
}

impl<I: AudioInstance> Mixer<I> for VolumeControl {
    fn kind(&self) -> MixerKind {
        MixerKind::VolumeControl
    }

    // The fade applies to every slot on the track, so one is enough.
    fn minimum_slots(&self) -> usize {
        1
    }

    fn timeline_mut(&mut self) -> &mut MixTimeline {
        &mut self.timeline
    }

    fn begin(&mut self) {
        self.curve.begin_evaluate();
    }

    fn attune_entering(&mut self, slot: &mut Slot<I>) {
        slot.silence();
    }

    fn advance(&mut self, delta: f32) {
        self.latest = self.curve.evaluate(delta);
    }

    fn mix(&mut self, outgoing: &mut [Slot<I>], incoming: &mut [Slot<I>]) -> MixStatus {
        apply_gain_all(outgoing, self.latest.normalized);
        apply_gain_all(incoming, self.latest.normalized);

        if self.curve.normalized_elapsed() >= 1.0 {
            MixStatus::Done
        } else {
            MixStatus::Continue
        }
    }

    fn end(&mut self, outgoing: &mut [Slot<I>], incoming: &mut [Slot<I>]) {
        if self.stop_on_end {
            stop_and_eject_all(outgoing);
            stop_and_eject_all(incoming);
        }

        self.curve.end_evaluate();
    }
}
