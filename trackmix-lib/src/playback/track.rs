//! Per-track mixing and lifecycle state machine.

use log::debug;

use crate::error::AudioError;
use crate::mixer::{run_step, MixStatus, Mixer, MixerKind, NullMixer};
use crate::tools::pool::Pool;

use super::instance::{AudioInstance, AudioSetting};
use super::slot::{Slot, SlotFlag, VolumeRange};

/// How a play request interacts with the track's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Replace everything already on the track with the new sound.
    Single,
    /// Add the new sound on top of whatever is already playing.
    Additive,
}

/// One logical output lane: an unordered slot sequence, a pivot index
/// partitioning it into outgoing (`< pivot`) and incoming (`>= pivot`)
/// groups, and the currently installed mixer.
///
/// The track is a two-state machine (idle / mixing) advanced once per
/// host tick. While a crossfade episode is active the tick runs one
/// mixing step; otherwise it sweeps finished slots back to the pool and
/// applies any staged volume change. A pivot of `-1` means no partition
/// exists.
pub struct Track<I: AudioInstance> {
    slots: Vec<Slot<I>>,
    mixer: Box<dyn Mixer<I>>,
    pivot: isize,
    mix_armed: bool,
    mixing: bool,
    volume: f32,
    volume_dirty: bool,
    removal_scratch: Vec<usize>,
}

impl<I: AudioInstance> Track<I> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            mixer: Box::new(NullMixer::new()),
            pivot: -1,
            mix_armed: false,
            mixing: false,
            volume: 1.0,
            volume_dirty: false,
            removal_scratch: Vec::new(),
        }
    }

    /// Start a sound on this track.
    ///
    /// The instance comes out of `pool`, is configured from `setting` and
    /// the current track volume, and starts playing as the very last
    /// step, after all pivot and state bookkeeping. Acquisition failures
    /// are returned to the caller untouched.
    pub fn play(
        &mut self,
        pool: &mut Pool<I>,
        setting: &AudioSetting<I::Sample>,
        mode: PlayMode,
        crossfade: bool,
    ) -> Result<(), AudioError> {
        let mut instance = pool.get()?;
        instance.set_sample(Some(setting.sample.clone()));
        instance.set_looping(setting.looping);
        instance.set_volume(self.volume);
        let mut slot = Slot::new(instance, VolumeRange::new(0.0, self.volume));

        if crossfade {
            if self.mixing {
                // Mid-episode: a Single request re-points the pivot at
                // the insertion slot, demoting every currently-incoming
                // slot to the outgoing group. Additive joins the
                // incoming group as-is.
                if mode == PlayMode::Single {
                    self.pivot = self.slots.len() as isize;
                }
                self.mixer.attune_entering(&mut slot);
            } else {
                self.pivot = self.slots.len() as isize;
            }
        } else if mode == PlayMode::Single {
            self.stop(pool);
        }

        self.slots.push(slot);

        if crossfade && !self.mixing && self.can_mix() {
            self.mix_armed = true;
        }

        // Playback begins only once the slot is fully registered.
        if let Some(slot) = self.slots.last_mut() {
            slot.instance_mut().play();
        }

        Ok(())
    }

    /// Force the track to silence synchronously.
    ///
    /// An active crossfade episode is ended inline (end hook, flag
    /// clear) before any playback state is touched, so a play request
    /// issued right after never observes a half-torn-down mixer. Every
    /// slot's instance is stopped and released back to the pool.
    pub fn stop(&mut self, pool: &mut Pool<I>) {
        if self.mixing {
            self.end_mixing();
        }
        self.mix_armed = false;

        for mut slot in self.slots.drain(..) {
            slot.stop_and_eject();
            pool.release(slot.into_instance());
        }
        self.pivot = -1;
    }

    /// Stage a new track volume, clamped to `[0, 1]`. It reaches the
    /// live instances on the next non-mixing tick.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.volume_dirty = true;
    }

    /// Install a new mixer. While an episode is active, a request for a
    /// mixer of the same concrete kind is deliberately ignored; a
    /// different kind ends the running episode first so the old mixer's
    /// end hook still fires exactly once.
    pub fn set_mixer(&mut self, mixer: Box<dyn Mixer<I>>) {
        if self.mixing {
            if mixer.kind() == self.mixer.kind() {
                debug!(
                    "ignoring mixer swap: a {:?} mixer is already mid-episode",
                    mixer.kind()
                );
                return;
            }
            self.end_mixing();
        }
        self.mixer = mixer;
    }

    /// Advance the track by one host tick.
    pub fn tick(&mut self, pool: &mut Pool<I>, delta: f32) {
        if self.volume_dirty {
            for slot in &mut self.slots {
                slot.set_target_volume(self.volume);
            }
        }

        // A mixing step pre-empts the sweep: finished slots linger until
        // the first idle tick after the episode.
        if self.update_mixing(delta) {
            return;
        }

        self.sweep_finished(pool);

        if self.volume_dirty {
            for slot in &mut self.slots {
                slot.apply_gain(1.0);
            }
            self.volume_dirty = false;
        }
    }

    /// Flag query used by tests and diagnostics.
    ///
    /// # Panics
    ///
    /// Panics when `index` is outside the current slot count. That is a
    /// programmer error, not a recoverable condition.
    pub fn has_flag(&self, index: usize, flag: SlotFlag) -> bool {
        assert!(
            index < self.slots.len(),
            "slot index {} out of range (track holds {})",
            index,
            self.slots.len()
        );
        self.slots[index].has_flag(flag)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn playing_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.has_flag(SlotFlag::Playing))
            .count()
    }

    pub fn pivot(&self) -> isize {
        self.pivot
    }

    pub fn is_mixing(&self) -> bool {
        self.mixing
    }

    pub fn mixer_kind(&self) -> MixerKind {
        self.mixer.kind()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn can_mix(&self) -> bool {
        self.pivot > 0
            && (self.pivot as usize) < self.slots.len()
            && self.slots.len() >= self.mixer.minimum_slots()
    }

    /// Run one mixing step if an episode is armed or active. Returns
    /// true when a step ran this tick.
    fn update_mixing(&mut self, delta: f32) -> bool {
        if !self.mix_armed && !self.mixing {
            return false;
        }

        // The gate is re-checked every tick: outgoing slots finishing
        // naturally can drop the configuration below the mixer's
        // minimum mid-episode.
        if !self.can_mix() {
            if self.mixing {
                self.end_mixing();
            }
            // A pending arm request dies with the gate; it must not
            // linger and fire on some later unrelated mutation.
            self.mix_armed = false;
            return false;
        }

        if !self.mixing {
            self.mixing = true;
            self.mix_armed = false;
            self.mixer.begin();
        }

        let (outgoing, incoming) = self.slots.split_at_mut(self.pivot as usize);
        for slot in outgoing.iter_mut().chain(incoming.iter_mut()) {
            slot.set_flag(SlotFlag::Crossfade);
        }

        if run_step(self.mixer.as_mut(), outgoing, incoming, delta) == MixStatus::Done {
            self.end_mixing();
        }

        true
    }

    /// Leave the Mixing state: clear every crossfade flag, then invoke
    /// the mixer's end hook with the partition current right now.
    fn end_mixing(&mut self) {
        for slot in &mut self.slots {
            slot.clear_flag(SlotFlag::Crossfade);
        }

        let split = self.pivot.clamp(0, self.slots.len() as isize) as usize;
        let (outgoing, incoming) = self.slots.split_at_mut(split);
        self.mixer.end(outgoing, incoming);
        self.mixer.timeline_mut().reset();

        self.mixing = false;
        self.mix_armed = false;
    }

    /// Clear the Playing flag on slots whose instance stopped, then
    /// remove flagless slots back-to-front, re-deriving the pivot before
    /// each individual removal.
    fn sweep_finished(&mut self, pool: &mut Pool<I>) {
        debug_assert!(self.removal_scratch.is_empty());
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.has_flag(SlotFlag::Playing) && !slot.instance().is_playing() {
                slot.clear_flag(SlotFlag::Playing);
            }
            if slot.is_flagless() {
                self.removal_scratch.push(index);
            }
        }

        // Indices were recorded ascending; popping walks them highest
        // first so earlier removals never shift an index still pending.
        while let Some(index) = self.removal_scratch.pop() {
            self.pivot = remap_pivot(self.pivot, self.slots.len(), index);
            let slot = self.slots.remove(index);
            pool.release(slot.into_instance());
        }
    }
}

impl<I: AudioInstance> Default for Track<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-derive the pivot for the removal of `removed`, using the slot
/// count as it stands immediately before that removal.
fn remap_pivot(pivot: isize, len_before: usize, removed: usize) -> isize {
    if len_before <= 1 {
        return -1;
    }

    let removed = removed as isize;
    if removed < pivot {
        return pivot - 1;
    }
    if removed == pivot && removed == len_before as isize - 1 {
        return pivot - 1;
    }

    pivot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::{MixMode, MixerFactory};
    use crate::test_data::{memory_pool, CreatedHandles, MemoryInstance};
    use std::sync::{Arc, Mutex};

    fn setup() -> (Track<MemoryInstance>, Pool<MemoryInstance>, CreatedHandles) {
        let created: CreatedHandles = Arc::new(Mutex::new(Vec::new()));
        let pool = memory_pool(Arc::clone(&created));
        (Track::new(), pool, created)
    }

    fn setting(sample: u32) -> AudioSetting<u32> {
        AudioSetting::new(sample, false)
    }

    #[test]
    fn remap_table_matches_removal_rules() {
        // Last surviving slot gone: no partition left.
        assert_eq!(remap_pivot(0, 1, 0), -1);
        assert_eq!(remap_pivot(2, 1, 0), -1);
        // Removal strictly left of the pivot shifts the boundary left.
        assert_eq!(remap_pivot(2, 4, 0), 1);
        assert_eq!(remap_pivot(2, 4, 1), 1);
        // Removal at the pivot which is also the last index empties the
        // incoming group.
        assert_eq!(remap_pivot(3, 4, 3), 2);
        // Removal at or right of the pivot otherwise leaves it alone.
        assert_eq!(remap_pivot(2, 4, 2), 2);
        assert_eq!(remap_pivot(1, 4, 3), 1);
    }

    #[test]
    fn single_play_creates_one_playing_slot() {
        let (mut track, mut pool, created) = setup();
        track.play(&mut pool, &setting(1), PlayMode::Single, false).unwrap();

        assert_eq!(track.slot_count(), 1);
        assert!(track.has_flag(0, SlotFlag::Playing));
        assert!(!track.has_flag(0, SlotFlag::Crossfade));

        let handles = created.lock().unwrap();
        let state = handles[0].snapshot();
        assert!(state.playing);
        assert_eq!(state.sample, Some(1));
        assert_eq!(state.play_calls, 1);
    }

    #[test]
    fn single_replaces_existing_content_synchronously() {
        let (mut track, mut pool, created) = setup();
        track.play(&mut pool, &setting(1), PlayMode::Single, false).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Single, false).unwrap();

        assert_eq!(track.slot_count(), 1);
        let handles = created.lock().unwrap();
        let first = handles[0].snapshot();
        assert!(!first.playing);
        assert!(first.sample.is_none());
        // The new instance was acquired before the old one went back, so
        // the pool now holds two: one live, one idle.
        assert_eq!(pool.total(), 2);
        assert_eq!(pool.active(), 1);
        assert!(handles[1].snapshot().playing);
        assert_eq!(handles[1].snapshot().sample, Some(2));
    }

    #[test]
    fn additive_plays_stack_without_a_pivot() {
        let (mut track, mut pool, _created) = setup();
        track.play(&mut pool, &setting(1), PlayMode::Additive, false).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, false).unwrap();

        assert_eq!(track.slot_count(), 2);
        assert_eq!(track.pivot(), -1);
        assert!(!track.is_mixing());
    }

    #[test]
    fn crossfade_plays_arm_mixing_once_the_minimum_is_met() {
        let (mut track, mut pool, _created) = setup();
        track.set_mixer(MixerFactory::default().create(MixMode::Transition));

        track.play(&mut pool, &setting(1), PlayMode::Additive, true).unwrap();
        assert_eq!(track.pivot(), 0);
        assert!(!track.is_mixing());

        track.play(&mut pool, &setting(2), PlayMode::Additive, true).unwrap();
        assert_eq!(track.pivot(), 1);
        assert!(!track.is_mixing());

        track.tick(&mut pool, 0.1);
        assert!(track.is_mixing());
        assert!(track.has_flag(0, SlotFlag::Crossfade));
        assert!(track.has_flag(1, SlotFlag::Crossfade));
    }

    #[test]
    fn finished_slots_are_swept_back_to_the_pool() {
        let (mut track, mut pool, created) = setup();
        track.play(&mut pool, &setting(1), PlayMode::Additive, false).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, false).unwrap();

        created.lock().unwrap()[0].finish();
        track.tick(&mut pool, 0.1);

        assert_eq!(track.slot_count(), 1);
        assert_eq!(pool.active(), 1);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn staged_volume_applies_on_the_next_idle_tick() {
        let (mut track, mut pool, created) = setup();
        track.play(&mut pool, &setting(1), PlayMode::Single, false).unwrap();

        track.set_volume(0.25);
        {
            let handles = created.lock().unwrap();
            assert_eq!(handles[0].volume(), 1.0);
        }

        track.tick(&mut pool, 0.1);
        let handles = created.lock().unwrap();
        assert!((handles[0].volume() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn volume_input_is_clamped() {
        let (mut track, _pool, _created) = setup();
        track.set_volume(4.0);
        assert_eq!(track.volume(), 1.0);
        track.set_volume(-1.0);
        assert_eq!(track.volume(), 0.0);
    }

    #[test]
    fn stop_tears_down_an_active_episode_inline() {
        let (mut track, mut pool, created) = setup();
        track.set_mixer(MixerFactory::default().create(MixMode::Transition));
        track.play(&mut pool, &setting(1), PlayMode::Additive, true).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, true).unwrap();
        track.tick(&mut pool, 0.1);
        assert!(track.is_mixing());

        track.stop(&mut pool);

        assert!(!track.is_mixing());
        assert_eq!(track.slot_count(), 0);
        assert_eq!(track.pivot(), -1);
        assert_eq!(pool.active(), 0);
        for handle in created.lock().unwrap().iter() {
            assert!(!handle.snapshot().playing);
        }

        // The track is immediately reusable.
        track.play(&mut pool, &setting(3), PlayMode::Single, false).unwrap();
        assert_eq!(track.slot_count(), 1);
    }

    #[test]
    fn same_kind_mixer_swap_is_ignored_mid_episode() {
        let (mut track, mut pool, _created) = setup();
        let factory = MixerFactory::default();
        track.set_mixer(factory.create(MixMode::Transition));
        track.play(&mut pool, &setting(1), PlayMode::Additive, true).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, true).unwrap();
        track.tick(&mut pool, 0.1);
        assert!(track.is_mixing());

        track.set_mixer(factory.create(MixMode::Transition));
        assert!(track.is_mixing());
        assert_eq!(track.mixer_kind(), MixerKind::VolumeTransition);
    }

    #[test]
    fn finished_slots_survive_the_episode_and_sweep_afterwards() {
        let (mut track, mut pool, created) = setup();
        track.set_mixer(MixerFactory::default().create(MixMode::Transition));
        track.play(&mut pool, &setting(1), PlayMode::Additive, true).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, true).unwrap();
        track.tick(&mut pool, 0.1);
        assert!(track.is_mixing());

        // The outgoing instance finishes on its own mid-fade. The sweep
        // is deferred while mixing, so the slot stays put and the pivot
        // gate keeps the episode alive to its natural end.
        created.lock().unwrap()[0].finish();
        track.tick(&mut pool, 0.1);
        track.tick(&mut pool, 0.1);
        assert!(track.is_mixing());
        assert_eq!(track.slot_count(), 2);

        created.lock().unwrap()[1].finish();
        for _ in 0..40 {
            track.tick(&mut pool, 0.1);
        }
        assert!(!track.is_mixing());
        assert_eq!(track.slot_count(), 0);
        assert_eq!(track.pivot(), -1);
        assert_eq!(pool.active(), 0);
    }

    #[test]
    fn arming_is_dropped_when_the_gate_fails() {
        let (mut track, mut pool, _created) = setup();
        let factory = MixerFactory::default();
        track.set_mixer(factory.create(MixMode::Transition));
        track.play(&mut pool, &setting(1), PlayMode::Additive, true).unwrap();
        track.play(&mut pool, &setting(2), PlayMode::Additive, true).unwrap();

        // Swap in the null mixer before the armed episode can begin; its
        // minimum can never be met, so the gate fails on the next tick.
        track.set_mixer(factory.null());
        track.tick(&mut pool, 0.1);
        assert!(!track.is_mixing());

        // Restoring a satisfiable mixer must not revive the dead arm
        // request: only a new crossfaded play may start an episode.
        track.set_mixer(factory.create(MixMode::Transition));
        track.play(&mut pool, &setting(3), PlayMode::Additive, false).unwrap();
        track.tick(&mut pool, 0.1);
        assert!(!track.is_mixing());
    }

    #[test]
    #[should_panic(expected = "slot index")]
    fn flag_query_outside_the_slot_count_is_fatal() {
        let (track, _pool, _created) = setup();
        track.has_flag(0, SlotFlag::Playing);
    }
}
