//! The playable-instance contract the mixing layer is written against.

use crate::error::AudioError;
use crate::tools::pool::Pool;

/// One playable audio instance, as seen by tracks and mixers.
///
/// The mixing layer never touches sample data: it assigns a sample,
/// adjusts gain, starts and stops playback, and asks whether playback is
/// still running. The production implementation sits on a `rodio::Sink`;
/// tests substitute an in-memory double.
pub trait AudioInstance {
    /// Whatever a loaded, playable sample is for this backend.
    type Sample: Clone;

    /// Stable identity used by the pool's duplicate-release check.
    fn id(&self) -> u64;

    fn set_sample(&mut self, sample: Option<Self::Sample>);

    fn set_looping(&mut self, looping: bool);

    fn set_volume(&mut self, volume: f32);

    fn is_playing(&self) -> bool;

    /// Start playback of the assigned sample.
    fn play(&mut self);

    /// Halt playback and drop the assigned sample.
    fn stop_and_eject(&mut self);
}

/// What to play: a sample plus the loop flag.
#[derive(Debug, Clone)]
pub struct AudioSetting<S: Clone> {
    pub sample: S,
    pub looping: bool,
}

impl<S: Clone> AudioSetting<S> {
    pub fn new(sample: S, looping: bool) -> Self {
        Self { sample, looping }
    }
}

/// Build a [`Pool`] of audio instances around a creation function.
///
/// Released instances come back stopped, with no sample and zero volume,
/// so a later `get()` always hands out a quiet blank slate.
pub fn instance_pool<I, C>(create: C) -> Pool<I>
where
    I: AudioInstance + 'static,
    C: FnMut() -> Result<I, AudioError> + 'static,
{
    Pool::new(
        create,
        |instance: &mut I| {
            instance.stop_and_eject();
            instance.set_sample(None);
            instance.set_looping(false);
            instance.set_volume(0.0);
        },
        |a: &I, b: &I| a.id() == b.id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::MemoryInstance;

    #[test]
    fn released_instances_come_back_blank() {
        let mut next = 0_u64;
        let mut pool = instance_pool(move || {
            let instance = MemoryInstance::new(next);
            next += 1;
            Ok(instance)
        });

        let mut instance = pool.get().unwrap();
        instance.set_sample(Some(3));
        instance.set_looping(true);
        instance.set_volume(0.8);
        instance.play();
        let handle = instance.handle();

        pool.release(instance);
        let state = handle.snapshot();
        assert!(!state.playing);
        assert!(state.sample.is_none());
        assert!(!state.looping);
        assert_eq!(handle.volume(), 0.0);

        let reused = pool.get().unwrap();
        assert_eq!(reused.id(), 0);
        assert_eq!(pool.total(), 1);
    }

    #[test]
    #[should_panic(expected = "already idle")]
    fn double_release_by_identity_is_fatal() {
        let mut pool = instance_pool(|| Ok(MemoryInstance::new(7)));
        let first = pool.get().unwrap();
        let twin = MemoryInstance::new(7);
        pool.release(first);
        pool.release(twin);
    }
}
