//! Small reusable utilities shared across the playback machinery.

pub mod lerp;
pub mod pool;
