//! Synthetic flow over the sphere: fractal noise, the curl-noise velocity
//! generator with its counter-rotating band overlay, the cached per-face
//! velocity field, field checkpoints, and the structured parallel-for used to
//! fan work out over faces and particle ranges.

mod checkpoint;
mod curl;
mod error;
mod field;
mod noise;
mod parallel;

pub use checkpoint::{CheckpointMode, CheckpointStore, read_field, write_field};
pub use curl::{BandParams, CurlVelocityGenerator, FlowParams, band_speed, band_velocity, curl};
pub use error::CheckpointError;
pub use field::VelocityField;
pub use noise::{NoiseField, OCTAVES};
pub use parallel::{WorkerPool, for_each_face, partition_ranges, resolve_thread_count};
