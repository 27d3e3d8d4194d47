//! In-memory playback double used by the unit and integration tests.

use std::sync::{Arc, Mutex};

use crate::error::AudioError;
use crate::playback::instance::{instance_pool, AudioInstance};
use crate::tools::pool::Pool;

/// Observable state of one [`MemoryInstance`].
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub playing: bool,
    pub volume: f32,
    pub sample: Option<u32>,
    pub looping: bool,
    pub play_calls: usize,
    pub stop_calls: usize,
}

/// Shared view into a memory instance, kept alive by tests even after
/// the instance itself went back to the pool.
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHandle {
    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    /// Simulate the instance reaching the end of its sample.
    pub fn finish(&self) {
        self.state.lock().unwrap().playing = false;
    }
}

/// `AudioInstance` double whose "sample" is a plain number.
pub struct MemoryInstance {
    id: u64,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryInstance {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl AudioInstance for MemoryInstance {
    type Sample = u32;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_sample(&mut self, sample: Option<u32>) {
        self.state.lock().unwrap().sample = sample;
    }

    fn set_looping(&mut self, looping: bool) {
        self.state.lock().unwrap().looping = looping;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().unwrap().volume = volume;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().playing
    }

    fn play(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.play_calls += 1;
        state.playing = state.sample.is_some();
    }

    fn stop_and_eject(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.stop_calls += 1;
        state.playing = false;
        state.sample = None;
    }
}

/// Handles of every instance a [`memory_pool`] ever constructed, in
/// creation order.
pub type CreatedHandles = Arc<Mutex<Vec<MemoryHandle>>>;

/// A pool of memory instances that records a handle to each one it
/// creates, so tests can observe instances the engine currently owns.
pub fn memory_pool(created: CreatedHandles) -> Pool<MemoryInstance> {
    let mut next_id = 0_u64;
    instance_pool(move || {
        let instance = MemoryInstance::new(next_id);
        next_id += 1;
        created.lock().unwrap().push(instance.handle());
        Ok(instance)
    })
}

/// A pool whose every acquisition fails, for exercising the transient
/// error path.
pub fn failing_pool() -> Pool<MemoryInstance> {
    instance_pool(|| Err(AudioError::Acquire("no voices available".into())))
}
