//! Routing layer fanning commands out to tracks.

use std::collections::HashMap;

use log::trace;

use crate::error::AudioError;
use crate::mixer::{MixMode, MixerFactory};
use crate::tools::pool::Pool;

use super::instance::{AudioInstance, AudioSetting};
use super::track::{PlayMode, Track};

/// Application-level track identifier.
pub type TrackId = u32;

/// The in-process command surface: a track table, the shared instance
/// pool and the mixer factory, owned together and driven by a single
/// external scheduler calling [`tick`](Self::tick).
///
/// Tracks are created implicitly: addressing an unknown id on a play
/// request materializes the track. `stop` and `set_volume` on unknown
/// ids are no-ops.
pub struct AudioService<I: AudioInstance> {
    tracks: HashMap<TrackId, Track<I>>,
    pool: Pool<I>,
    mixers: MixerFactory,
}

impl<I: AudioInstance> AudioService<I> {
    pub fn new(pool: Pool<I>, mixers: MixerFactory) -> Self {
        Self {
            tracks: HashMap::new(),
            pool,
            mixers,
        }
    }

    /// Play without a crossfade.
    pub fn play(
        &mut self,
        track: TrackId,
        setting: &AudioSetting<I::Sample>,
        mode: PlayMode,
    ) -> Result<(), AudioError> {
        trace!("play on track {} ({:?})", track, mode);
        let pool = &mut self.pool;
        self.tracks
            .entry(track)
            .or_default()
            .play(pool, setting, mode, false)
    }

    /// Install the factory mixer for `mix_mode` on the track, then play
    /// with crossfade requested.
    pub fn play_mixed(
        &mut self,
        track: TrackId,
        setting: &AudioSetting<I::Sample>,
        mode: PlayMode,
        mix_mode: MixMode,
    ) -> Result<(), AudioError> {
        trace!("play on track {} ({:?}, {:?})", track, mode, mix_mode);
        let mixer = self.mixers.create(mix_mode);
        let pool = &mut self.pool;
        let entry = self.tracks.entry(track).or_default();
        entry.set_mixer(mixer);
        entry.play(pool, setting, mode, true)
    }

    /// Force-stop one track synchronously. Unknown ids are ignored.
    pub fn stop(&mut self, track: TrackId) {
        if let Some(entry) = self.tracks.get_mut(&track) {
            entry.stop(&mut self.pool);
        }
    }

    /// Set the output volume of one track, or of every track when
    /// `target` is `None`. The value is clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32, target: Option<TrackId>) {
        match target {
            Some(track) => {
                if let Some(entry) = self.tracks.get_mut(&track) {
                    entry.set_volume(volume);
                }
            }
            None => {
                for entry in self.tracks.values_mut() {
                    entry.set_volume(volume);
                }
            }
        }
    }

    /// Advance every track by one step. Negative deltas clamp to zero.
    pub fn tick(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        for entry in self.tracks.values_mut() {
            entry.tick(&mut self.pool, delta);
        }
    }

    pub fn has_track(&self, track: TrackId) -> bool {
        self.tracks.contains_key(&track)
    }

    pub fn track(&self, track: TrackId) -> Option<&Track<I>> {
        self.tracks.get(&track)
    }

    /// True when no track holds a slot anymore.
    pub fn is_idle(&self) -> bool {
        self.tracks.values().all(|track| track.slot_count() == 0)
    }

    pub fn active_instances(&self) -> usize {
        self.pool.active()
    }

    pub fn total_instances(&self) -> usize {
        self.pool.total()
    }
}
