//! Production `AudioInstance` backed by a `rodio::Sink`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use rodio::source::Buffered;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};

use crate::error::AudioError;
use crate::tools::pool::Pool;

use super::instance::{instance_pool, AudioInstance};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// A decoded audio file, buffered so clones share the decoded data and
/// replaying does not hit the disk again.
#[derive(Clone)]
pub struct Sample {
    source: Buffered<Decoder<BufReader<File>>>,
}

impl Sample {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let file = File::open(path)?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Sample(e.to_string()))?;
        Ok(Self {
            source: decoder.buffered(),
        })
    }
}

/// One pooled playback voice over a dedicated `rodio::Sink`.
pub struct SinkInstance {
    id: u64,
    sink: Sink,
    sample: Option<Sample>,
    looping: bool,
}

impl SinkInstance {
    pub fn new(handle: &OutputStreamHandle) -> Result<Self, AudioError> {
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Acquire(e.to_string()))?;
        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            sink,
            sample: None,
            looping: false,
        })
    }
}

impl AudioInstance for SinkInstance {
    type Sample = Sample;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_sample(&mut self, sample: Option<Sample>) {
        self.sample = sample;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    fn play(&mut self) {
        if let Some(sample) = &self.sample {
            if self.looping {
                self.sink.append(sample.source.clone().repeat_infinite());
            } else {
                self.sink.append(sample.source.clone());
            }
            self.sink.play();
        }
    }

    fn stop_and_eject(&mut self) {
        self.sink.stop();
        self.sample = None;
    }
}

/// The production instance pool: every acquisition opens one sink on
/// `handle`. Sink creation failure surfaces as a transient acquisition
/// error on `get()`.
pub fn sink_pool(handle: OutputStreamHandle) -> Pool<SinkInstance> {
    instance_pool(move || SinkInstance::new(&handle))
}
