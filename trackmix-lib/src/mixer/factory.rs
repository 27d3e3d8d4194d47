//! Builds mixers from a shared pair of fade curves.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::curve::Curve;
use crate::error::AudioError;
use crate::playback::instance::AudioInstance;

use super::{Mixer, NullMixer, VolumeControl, VolumeTransition};

/// Which mixer a crossfaded play request installs on its track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixMode {
    /// Fade the old content out, wait the transition delay, fade the new
    /// content in.
    Transition,
    /// Fade the whole track up along the fade-in curve.
    FadeIn,
    /// Fade the whole track down along the fade-out curve, then stop and
    /// eject everything on it.
    FadeOut,
}

/// Curve settings shared by every mixer the factory produces.
///
/// Construct one programmatically, deserialize it from JSON, or take the
/// default (one-second linear ramps, no transition delay).
#[derive(Debug, Clone, Deserialize)]
pub struct MixerFactory {
    fade_in: Curve,
    fade_out: Curve,
    #[serde(default)]
    transition_delay: f32,
}

impl MixerFactory {
    pub fn new(fade_in: Curve, fade_out: Curve, transition_delay: f32) -> Self {
        Self {
            fade_in,
            fade_out,
            transition_delay,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, AudioError> {
        serde_json::from_str(json).map_err(|e| AudioError::Curve(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|e| AudioError::Curve(e.to_string()))
    }

    pub fn create<I: AudioInstance>(&self, mode: MixMode) -> Box<dyn Mixer<I>> {
        match mode {
            MixMode::Transition => Box::new(VolumeTransition::new(
                self.fade_out.clone(),
                self.fade_in.clone(),
                self.transition_delay,
            )),
            MixMode::FadeIn => Box::new(VolumeControl::new(self.fade_in.clone(), false)),
            MixMode::FadeOut => Box::new(VolumeControl::new(self.fade_out.clone(), true)),
        }
    }

    pub fn null<I: AudioInstance>(&self) -> Box<dyn Mixer<I>> {
        Box::new(NullMixer::new())
    }

    pub fn transition_delay(&self) -> f32 {
        self.transition_delay
    }
}

impl Default for MixerFactory {
    fn default() -> Self {
        Self {
            fade_in: Curve::linear(0.0, 1.0, 1.0),
            fade_out: Curve::linear(1.0, 0.0, 1.0),
            transition_delay: 0.0,
        }
    }
}
