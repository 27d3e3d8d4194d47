//! Mixing strategies driven by the per-track state machine.
//!
//! A [`Mixer`] is a stateful strategy bound to one track for the duration
//! of one crossfade episode. The track partitions its slots around the
//! pivot and hands the outgoing and incoming groups to [`run_step`] once
//! per tick; the mixer decides how the groups' volumes evolve and when
//! the episode is over.

use crate::playback::instance::AudioInstance;
use crate::playback::slot::Slot;

pub mod factory;
mod null;
mod volume_control;
mod volume_transition;

pub use factory::{MixMode, MixerFactory};
pub use null::NullMixer;
pub use volume_control::VolumeControl;
pub use volume_transition::VolumeTransition;

/// Concrete identity of a mixer, used by the track to ignore swaps that
/// would replace a mixer with another of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerKind {
    Null,
    VolumeControl,
    VolumeTransition,
}

/// Outcome of one mixing step. `Done` is authoritative: the track must
/// end the episode and not step the mixer again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixStatus {
    Continue,
    Done,
}

/// Elapsed mix time plus the one-time prepare latch for an episode.
#[derive(Debug)]
pub struct MixTimeline {
    elapsed: f32,
    first_step_pending: bool,
}

impl MixTimeline {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            first_step_pending: true,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns true exactly once per episode, on the first step.
    pub fn take_first_step(&mut self) -> bool {
        let first = self.first_step_pending;
        self.first_step_pending = false;
        first
    }

    pub fn accrue(&mut self, delta: f32) {
        self.elapsed += delta;
    }

    /// Pull elapsed time up to `floor` if it is behind it.
    pub fn clamp_forward(&mut self, floor: f32) {
        if self.elapsed < floor {
            self.elapsed = floor;
        }
    }

    /// Pull elapsed time back to `ceiling` if it is past it.
    pub fn clamp_backward(&mut self, ceiling: f32) {
        if self.elapsed > ceiling {
            self.elapsed = ceiling;
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.first_step_pending = true;
    }
}

impl Default for MixTimeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Template-method lifecycle of a crossfade strategy.
///
/// Required operations: [`kind`](Self::kind),
/// [`minimum_slots`](Self::minimum_slots),
/// [`timeline_mut`](Self::timeline_mut), [`advance`](Self::advance) and
/// [`mix`](Self::mix). The remaining hooks default to no-ops.
pub trait Mixer<I: AudioInstance> {
    fn kind(&self) -> MixerKind;

    /// Smallest slot count for which this mixer is allowed to run; the
    /// track checks it every tick while mixing is armed or active.
    fn minimum_slots(&self) -> usize;

    fn timeline_mut(&mut self) -> &mut MixTimeline;

    /// Called exactly once when the track enters the Mixing state.
    fn begin(&mut self) {}

    /// Called for a slot that joins the track while an episode is
    /// already active, so the mixer can prime it (usually: silence it so
    /// it does not pop before its first fade step).
    fn attune_entering(&mut self, _slot: &mut Slot<I>) {}

    /// One-time hook before the first step of an episode.
    fn prepare(&mut self, _outgoing: &mut [Slot<I>], _incoming: &mut [Slot<I>]) {}

    /// Per-step time update, invoked with the tick delta before `mix`.
    fn advance(&mut self, delta: f32);

    /// Apply this step's volumes to the groups and report whether the
    /// episode continues. Elapsed time observed here is pre-accrual.
    fn mix(&mut self, outgoing: &mut [Slot<I>], incoming: &mut [Slot<I>]) -> MixStatus;

    /// Per-step bookkeeping hook, invoked after `mix` and time accrual.
    fn finish_step(&mut self, _outgoing: &mut [Slot<I>], _incoming: &mut [Slot<I>]) {}

    /// Called exactly once when the track leaves the Mixing state, with
    /// the partition current at episode end. Mixers that consume the
    /// outgoing set stop and eject those instances here.
    fn end(&mut self, _outgoing: &mut [Slot<I>], _incoming: &mut [Slot<I>]) {}
}

/// Drive one mixing step: prepare (first step only), advance, mix,
/// accrue the delta, then the after-step hook. The ordering matters:
/// `mix` must observe elapsed time without this tick's delta.
pub fn run_step<I: AudioInstance>(
    mixer: &mut dyn Mixer<I>,
    outgoing: &mut [Slot<I>],
    incoming: &mut [Slot<I>],
    delta: f32,
) -> MixStatus {
    if mixer.timeline_mut().take_first_step() {
        mixer.prepare(outgoing, incoming);
    }

    mixer.advance(delta);
    let status = mixer.mix(outgoing, incoming);
    mixer.timeline_mut().accrue(delta);
    mixer.finish_step(outgoing, incoming);

    status
}

pub(crate) fn apply_gain_all<I: AudioInstance>(slots: &mut [Slot<I>], factor: f32) {
    for slot in slots {
        slot.apply_gain(factor);
    }
}

pub(crate) fn stop_and_eject_all<I: AudioInstance>(slots: &mut [Slot<I>]) {
    for slot in slots {
        slot.stop_and_eject();
    }
}
