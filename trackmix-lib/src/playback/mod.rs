//! Tracks, slots, pooled instances and the routing service.

pub mod instance;
pub mod service;
pub mod sink;
pub mod slot;
pub mod track;

pub use instance::{instance_pool, AudioInstance, AudioSetting};
pub use service::{AudioService, TrackId};
pub use sink::{sink_pool, Sample, SinkInstance};
pub use slot::{Slot, SlotFlag, VolumeRange};
pub use track::{PlayMode, Track};
