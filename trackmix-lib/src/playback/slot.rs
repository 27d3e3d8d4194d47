//! Per-instance slot records held by a track.

use super::instance::AudioInstance;
use crate::tools::lerp::lerp;

/// Fade endpoints for one slot. Mixers interpolate the instance's gain
/// between `min` and `max`; staged track volume lands in `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    pub min: f32,
    pub max: f32,
}

impl VolumeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Membership flags on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFlag {
    /// The slot's instance was started and has not been seen stopped.
    Playing,
    /// The slot belongs to the current crossfade episode.
    Crossfade,
}

impl SlotFlag {
    fn bit(self) -> u8 {
        match self {
            SlotFlag::Playing => 0b01,
            SlotFlag::Crossfade => 0b10,
        }
    }
}

/// One playing sound on a track: the pooled instance, its fade range and
/// a flag bitset. A slot with no flags left is swept back to the pool.
pub struct Slot<I: AudioInstance> {
    instance: I,
    volume: VolumeRange,
    flags: u8,
}

impl<I: AudioInstance> Slot<I> {
    pub fn new(instance: I, volume: VolumeRange) -> Self {
        Self {
            instance,
            volume,
            flags: SlotFlag::Playing.bit(),
        }
    }

    pub fn instance(&self) -> &I {
        &self.instance
    }

    pub fn instance_mut(&mut self) -> &mut I {
        &mut self.instance
    }

    /// Give the instance back, consuming the slot.
    pub(crate) fn into_instance(self) -> I {
        self.instance
    }

    pub fn has_flag(&self, flag: SlotFlag) -> bool {
        self.flags & flag.bit() != 0
    }

    pub(crate) fn set_flag(&mut self, flag: SlotFlag) {
        self.flags |= flag.bit();
    }

    pub(crate) fn clear_flag(&mut self, flag: SlotFlag) {
        self.flags &= !flag.bit();
    }

    pub(crate) fn is_flagless(&self) -> bool {
        self.flags == 0
    }

    pub fn volume_range(&self) -> VolumeRange {
        self.volume
    }

    /// Stage a new fade ceiling. Data-only: the instance's live gain is
    /// untouched until the track applies it.
    pub(crate) fn set_target_volume(&mut self, volume: f32) {
        self.volume.max = volume;
    }

    /// Set the instance gain by interpolating the fade range with a
    /// normalized factor. Both the factor and the resulting volume
    /// clamp, so an out-of-range fade range never reaches the instance.
    pub fn apply_gain(&mut self, factor: f32) {
        let volume = lerp(self.volume.min, self.volume.max, factor).clamp(0.0, 1.0);
        self.instance.set_volume(volume);
    }

    /// Force the instance inaudible without touching the fade range.
    pub fn silence(&mut self) {
        self.instance.set_volume(0.0);
    }

    pub fn stop_and_eject(&mut self) {
        self.instance.stop_and_eject();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::MemoryInstance;

    fn slot() -> Slot<MemoryInstance> {
        Slot::new(MemoryInstance::new(0), VolumeRange::new(0.0, 0.8))
    }

    #[test]
    fn new_slots_are_flagged_playing_only() {
        let slot = slot();
        assert!(slot.has_flag(SlotFlag::Playing));
        assert!(!slot.has_flag(SlotFlag::Crossfade));
        assert!(!slot.is_flagless());
    }

    #[test]
    fn gain_interpolates_the_fade_range_and_clamps() {
        let mut slot = slot();
        slot.apply_gain(0.5);
        assert!((slot.instance().handle().volume() - 0.4).abs() < 1e-6);

        slot.apply_gain(7.0);
        assert!((slot.instance().handle().volume() - 0.8).abs() < 1e-6);

        slot.apply_gain(-1.0);
        assert_eq!(slot.instance().handle().volume(), 0.0);
    }

    #[test]
    fn gain_clamps_out_of_range_fade_ranges() {
        let mut wide = Slot::new(MemoryInstance::new(0), VolumeRange::new(0.0, 2.0));
        wide.apply_gain(1.0);
        assert_eq!(wide.instance().handle().volume(), 1.0);

        let mut low = Slot::new(MemoryInstance::new(1), VolumeRange::new(-1.0, 0.5));
        low.apply_gain(0.0);
        assert_eq!(low.instance().handle().volume(), 0.0);
    }

    #[test]
    fn staged_volume_moves_the_ceiling_only() {
        let mut slot = slot();
        slot.apply_gain(1.0);
        slot.set_target_volume(0.2);
        // Staging alone must not touch the live instance.
        assert!((slot.instance().handle().volume() - 0.8).abs() < 1e-6);
        slot.apply_gain(1.0);
        assert!((slot.instance().handle().volume() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn clearing_both_flags_marks_the_slot_for_removal() {
        let mut slot = slot();
        slot.set_flag(SlotFlag::Crossfade);
        slot.clear_flag(SlotFlag::Playing);
        assert!(!slot.is_flagless());
        slot.clear_flag(SlotFlag::Crossfade);
        assert!(slot.is_flagless());
    }
}
