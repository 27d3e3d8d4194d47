//! # Trackmix Library
//!
//! Real-time audio mixing layer for interactive applications: many
//! simultaneously-playing sound instances multiplexed onto logical
//! tracks, with curve-driven crossfades between the sounds occupying a
//! track and pooled instance lifecycles.

pub mod curve;
pub mod error;
pub mod mixer;
pub mod playback;
pub mod test_data;
pub mod tools;

pub use curve::{Curve, CurveEvaluator, CurveValue, Keyframe};
pub use error::AudioError;
pub use mixer::{MixMode, MixerFactory, MixerKind};
pub use playback::{
    instance_pool, sink_pool, AudioInstance, AudioService, AudioSetting, PlayMode, Sample,
    SinkInstance, SlotFlag, TrackId,
};
