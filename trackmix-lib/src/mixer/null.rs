use crate::playback::instance::AudioInstance;
use crate::playback::slot::Slot;

use super::{MixStatus, MixTimeline, Mixer, MixerKind};

/// Safe default mixer installed on every freshly created track.
///
/// Its minimum slot count can never be met, so the track's gating check
/// keeps it from ever running a real episode; if stepped anyway it
/// reports done immediately and touches nothing.
pub struct NullMixer {
    timeline: MixTimeline,
}

impl NullMixer {
    pub fn new() -> Self {
        Self {
            timeline: MixTimeline::new(),
        }
    }
}

impl Default for NullMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: AudioInstance> Mixer<I> for NullMixer {
    fn kind(&self) -> MixerKind {
        MixerKind::Null
    }

    fn minimum_slots(&self) -> usize {
        usize::MAX
    }

    fn timeline_mut(&mut self) -> &mut MixTimeline {
        &mut self.timeline
    }

    fn advance(&mut self, _delta: f32) {}

    fn mix(&mut self, _outgoing: &mut [Slot<I>], _incoming: &mut [Slot<I>]) -> MixStatus {
        MixStatus::Done
    }
}
