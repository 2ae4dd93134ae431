//! Configuration for the gas-giant texture generator.
//!
//! A single immutable [`Config`] is assembled once (defaults, then an optional
//! RON file, then command-line overrides), sanitized, and handed to the
//! simulation. Nothing reads configuration from ambient globals.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CheckpointConfig, Config, DebugConfig, FIELD_DIM_MAX, FIELD_DIM_MIN, FlowConfig, IoConfig,
    PolarAxis, REFERENCE_FIELD_DIM, RenderConfig, RenderMode, SeedMode, SimulationConfig,
};
pub use error::ConfigError;
