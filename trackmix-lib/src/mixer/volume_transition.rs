//! Two-stage crossfade between the outgoing and incoming slot groups.

use crate::curve::{Curve, CurveEvaluator, CurveValue};
use crate::playback::instance::AudioInstance;
use crate::playback::slot::Slot;

use super::{apply_gain_all, stop_and_eject_all, MixStatus, MixTimeline, Mixer, MixerKind};

/// Fades the outgoing group to silence, waits out a configurable delay,
/// then fades the incoming group up. The two stages never overlap: until
/// `fade_in_begin` only the outgoing curve is evaluated, afterwards only
/// the incoming one.
pub struct VolumeTransition {
    fade_out: CurveEvaluator,
    fade_in: CurveEvaluator,
    delay: f32,
    fading_out: bool,
    out_factor: CurveValue,
    in_factor: CurveValue,
    fade_in_begin: f32,
    fade_in_end: f32,
    timeline: MixTimeline,
}

impl VolumeTransition {
    pub fn new(fade_out: Curve, fade_in: Curve, delay: f32) -> Self {
        Self {
            fade_out: CurveEvaluator::new(fade_out),
            fade_in: CurveEvaluator::new(fade_in),
            delay,
            fading_out: true,
            out_factor: CurveValue::default(),
            in_factor: CurveValue::default(),
            fade_in_begin: 0.0,
            fade_in_end: 0.0,
            timeline: MixTimeline::new(),
        }
    }
}

impl<I: AudioInstance> Mixer<I> for VolumeTransition {
    fn kind(&self) -> MixerKind {
        MixerKind::VolumeTransition
    }

    // A transition needs something to fade away from and something to
    // fade toward.
    fn minimum_slots(&self) -> usize {
        2
    }

    fn timeline_mut(&mut self) -> &mut MixTimeline {
        &mut self.timeline
    }

    fn begin(&mut self) {
        self.fade_out.begin_evaluate();
        self.fade_in.begin_evaluate();

        self.fade_in_begin = self.fade_out.end_time() + self.delay + self.fade_in.begin_time();
        self.fade_in_end = self.fade_out.end_time() + self.delay + self.fade_in.end_time();
    }

    fn attune_entering(&mut self, slot: &mut Slot<I>) {
        slot.silence();
    }

    fn prepare(&mut self, _outgoing: &mut [Slot<I>], incoming: &mut [Slot<I>]) {
        // The incoming group must start inaudible, whatever volume its
        // instances were configured with.
        apply_gain_all(incoming, 0.0);
    }

    fn advance(&mut self, delta: f32) {
        if self.timeline.elapsed() < self.fade_in_begin {
            self.fading_out = true;
            self.out_factor = self.fade_out.evaluate(delta);
        } else {
            self.fading_out = false;
            self.in_factor = self.fade_in.evaluate(delta);
        }
    }

    fn mix(&mut self, outgoing: &mut [Slot<I>], incoming: &mut [Slot<I>]) -> MixStatus {
        if self.fading_out {
            // Nothing left to fade out: skip straight to the fade-in
            // stage instead of stalling through the delay.
            if outgoing.is_empty() {
                self.timeline.clamp_forward(self.fade_in_begin);
            }

            apply_gain_all(outgoing, self.out_factor.normalized);
            MixStatus::Continue
        } else {
            if incoming.is_empty() {
                self.timeline.clamp_backward(self.fade_in_end);
            }

            apply_gain_all(incoming, self.in_factor.normalized);

            if self.timeline.elapsed() >= self.fade_in_end {
                MixStatus::Done
            } else {
                MixStatus::Continue
            }
        }
    }

    fn end(&mut self, outgoing: &mut [Slot<I>], _incoming: &mut [Slot<I>]) {
        // The outgoing group is silent by now; release the instances so
        // the sweep can return them to the pool.
        stop_and_eject_all(outgoing);

        self.fade_out.end_evaluate();
        self.fade_in.end_evaluate();
        self.fade_in_begin = 0.0;
        self.fade_in_end = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::run_step;
    use crate::playback::slot::{Slot, VolumeRange};
    use crate::test_data::MemoryInstance;

    fn playing_slot(id: u64) -> Slot<MemoryInstance> {
        let mut instance = MemoryInstance::new(id);
        instance.set_sample(Some(42));
        instance.set_volume(1.0);
        instance.play();
        Slot::new(instance, VolumeRange::new(0.0, 1.0))
    }

    fn transition() -> VolumeTransition {
        VolumeTransition::new(
            Curve::linear(1.0, 0.0, 1.0),
            Curve::linear(0.0, 1.0, 1.0),
            0.5,
        )
    }

    #[test]
    fn two_stage_timing_matches_the_configured_delay() {
        let mut mixer = transition();
        let mut outgoing = [playing_slot(0)];
        let mut incoming = [playing_slot(1)];
        Mixer::<MemoryInstance>::begin(&mut mixer);

        let mut elapsed = 0.0_f32;
        let mut status = MixStatus::Continue;
        while elapsed < 1.4 {
            status = run_step(&mut mixer, &mut outgoing[..], &mut incoming[..], 0.1);
            elapsed += 0.1;
        }

        // Still inside stage one: outgoing has faded to silence, the
        // incoming group has not been touched since prepare().
        assert_eq!(status, MixStatus::Continue);
        assert!(outgoing[0].instance().handle().volume() < 1e-3);
        assert!(incoming[0].instance().handle().volume() < 1e-6);

        while status != MixStatus::Done {
            status = run_step(&mut mixer, &mut outgoing[..], &mut incoming[..], 0.1);
            elapsed += 0.1;
            assert!(elapsed < 2.65, "transition never terminated");
        }

        assert!((incoming[0].instance().handle().volume() - 1.0).abs() < 1e-3);

        mixer.end(&mut outgoing[..], &mut incoming[..]);
        let state = outgoing[0].instance().handle().snapshot();
        assert!(!state.playing);
        assert!(state.sample.is_none());
    }

    #[test]
    fn empty_outgoing_group_skips_the_delay() {
        let mut mixer = transition();
        let mut outgoing: [Slot<MemoryInstance>; 0] = [];
        let mut incoming = [playing_slot(0)];
        Mixer::<MemoryInstance>::begin(&mut mixer);

        // First step clamps elapsed time forward to fade_in_begin, so the
        // second step is already in the fade-in stage.
        run_step(&mut mixer, &mut outgoing[..], &mut incoming[..], 0.1);
        let mut steps = 0;
        while run_step(&mut mixer, &mut outgoing[..], &mut incoming[..], 0.1) != MixStatus::Done {
            steps += 1;
            assert!(steps < 20, "clamped transition never terminated");
        }
    }
}
