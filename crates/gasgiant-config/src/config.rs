//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted velocity-field resolution.
pub const FIELD_DIM_MIN: u32 = 16;
/// Largest accepted velocity-field resolution.
pub const FIELD_DIM_MAX: u32 = 2048;
/// Field resolution the velocity and band factors are calibrated for.
pub const REFERENCE_FIELD_DIM: u32 = 2048;

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Particle and iteration settings.
    pub simulation: SimulationConfig,
    /// Noise and velocity-field settings.
    pub flow: FlowConfig,
    /// Output raster settings.
    pub render: RenderConfig,
    /// Input/output file settings.
    pub io: IoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How particle colors are picked from the source image.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// Treat the source image as an unfolded cubemap cross.
    Cubemap,
    /// Use a single vertical stripe through the middle of the image.
    Stripe,
    /// Sinusoidal (equal-area) projection of the image onto the sphere.
    #[default]
    Sinusoidal,
}

/// Axis the counter-rotating bands are wrapped around.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolarAxis {
    /// Bands circle the Y axis.
    Y,
    /// Bands circle the Z axis ("vertical bands").
    #[default]
    Z,
}

/// How particles are composited onto the output faces.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Blend particle colors over a slowly fading background.
    #[default]
    Blend,
    /// Paint a noise-mottled white alpha mask for cloud layers.
    Cloud,
}

/// Particle and iteration configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulation iterations.
    pub iterations: u32,
    /// Number of particles.
    pub particles: usize,
    /// Seed for both the noise generator and particle placement.
    pub seed: u32,
    /// How particle colors are sampled from the source image.
    pub seed_mode: SeedMode,
    /// Worker thread override for particle advection (`None` = all CPUs).
    pub threads: Option<usize>,
}

/// Noise and velocity-field configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowConfig {
    /// Spatial scale of the noise field.
    pub noise_scale: f32,
    /// Multiplier applied to the curl velocity.
    pub velocity_factor: f32,
    /// Number of counter-rotating bands (0 disables banding).
    pub bands: f32,
    /// Multiplier applied to the band velocity.
    pub band_speed_factor: f32,
    /// Band velocity attenuation near the poles, in `[0, 1]`.
    pub pole_attenuation: f32,
    /// Amplitude falloff between fBm octaves.
    pub fbm_falloff: f32,
    /// Velocity-field resolution per face, in `[FIELD_DIM_MIN, FIELD_DIM_MAX]`.
    pub field_dim: u32,
    /// Axis the bands (and stripe/sinusoidal seeding) are oriented around.
    pub polar_axis: PolarAxis,
    /// Scales both the velocity and band factors.
    pub speed_multiplier: f32,
    /// Starting offset along the noise field's fourth dimension.
    pub w_offset: f32,
    /// Advance `w_offset` by this much every `wstep_period` iterations.
    pub wstep: Option<f32>,
    /// Iterations between velocity-field recomputations when stepping.
    pub wstep_period: u32,
}

/// Output raster configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Side length of each output face image in pixels.
    pub face_dim: u32,
    /// Compositing mode.
    pub mode: RenderMode,
    /// Minimum particle opacity, in `[0, 1]`.
    pub opacity_floor: f32,
    /// Fade previously painted pixels every iteration.
    pub fade: bool,
    /// Fixed fade color overriding the darkest source pixel.
    pub tint: Option<[f32; 3]>,
}

/// Input/output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IoConfig {
    /// Source image used to color the particles.
    pub input: PathBuf,
    /// Output file prefix; faces are written as `<prefix><face>.png`.
    pub output_prefix: String,
    /// Iterations between image saves.
    pub save_period: u32,
    /// Optional velocity-field checkpoint.
    pub checkpoint: Option<CheckpointConfig>,
}

/// Velocity-field checkpoint file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointConfig {
    /// Checkpoint file path (step-suffixed when time stepping).
    pub path: PathBuf,
    /// Restore the field from `path` instead of dumping to it.
    pub restore: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Iterations between progress log lines.
    pub progress_interval: u32,
}

// --- Default implementations ---

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            particles: 8_000_000,
            seed: 3_141_592,
            seed_mode: SeedMode::default(),
            threads: None,
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            noise_scale: 2.6,
            velocity_factor: 1200.0,
            bands: 6.0,
            band_speed_factor: 2.9,
            pole_attenuation: 0.5,
            fbm_falloff: 0.5,
            field_dim: FIELD_DIM_MAX,
            polar_axis: PolarAxis::default(),
            speed_multiplier: 1.0,
            w_offset: 0.0,
            wstep: None,
            wstep_period: 10,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            face_dim: 1024,
            mode: RenderMode::default(),
            opacity_floor: 0.2,
            fade: true,
            tint: None,
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("gasgiant-input.png"),
            output_prefix: "gasgiant-".to_string(),
            save_period: 20,
            checkpoint: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            progress_interval: 50,
        }
    }
}

// --- Derived values ---

impl FlowConfig {
    /// Curl velocity multiplier, scaled so that the field resolution and the
    /// speed multiplier do not change how far particles travel per iteration.
    #[must_use]
    pub fn effective_velocity_factor(&self) -> f32 {
        self.resolution_scale() * self.velocity_factor * self.speed_multiplier
    }

    /// Band velocity multiplier, scaled like [`Self::effective_velocity_factor`].
    #[must_use]
    pub fn effective_band_speed_factor(&self) -> f32 {
        self.resolution_scale() * self.band_speed_factor * self.speed_multiplier
    }

    fn resolution_scale(&self) -> f32 {
        self.field_dim as f32 / REFERENCE_FIELD_DIM as f32
    }
}

impl Config {
    /// Clamp out-of-range values into their accepted ranges, logging a
    /// warning for each adjustment.
    pub fn sanitize(&mut self) {
        let flow = &mut self.flow;
        if !(0.0..=1.0).contains(&flow.pole_attenuation) {
            let clamped = flow.pole_attenuation.clamp(0.0, 1.0);
            log::warn!(
                "pole attenuation {} out of range, using {clamped}",
                flow.pole_attenuation
            );
            flow.pole_attenuation = clamped;
        }
        if flow.field_dim < FIELD_DIM_MIN || flow.field_dim > FIELD_DIM_MAX {
            let clamped = flow.field_dim.clamp(FIELD_DIM_MIN, FIELD_DIM_MAX);
            log::warn!("Bad value of field dim specified, using {clamped}");
            flow.field_dim = clamped;
        }
        if flow.wstep_period == 0 {
            log::warn!("wstep period must be at least 1, using 1");
            flow.wstep_period = 1;
        }

        let render = &mut self.render;
        if !(0.0..=1.0).contains(&render.opacity_floor) {
            let clamped = render.opacity_floor.clamp(0.0, 1.0);
            log::warn!(
                "opacity floor {} out of range, using {clamped}",
                render.opacity_floor
            );
            render.opacity_floor = clamped;
        }
        if render.face_dim == 0 {
            log::warn!("face dim must be at least 1, using 1024");
            render.face_dim = 1024;
        }

        if self.io.save_period == 0 {
            log::warn!("image save period must be at least 1, using 1");
            self.io.save_period = 1;
        }
        if self.debug.progress_interval == 0 {
            self.debug.progress_interval = 1;
        }
        if self.simulation.threads == Some(0) {
            self.simulation.threads = None;
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from a RON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save config to a RON file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Encode)?;

        std::fs::write(path, serialized).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("iterations: 1000"));
        assert!(ron_str.contains("field_dim: 2048"));
        assert!(ron_str.contains("seed_mode: sinusoidal"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.flow.wstep = Some(0.05);
        config.render.tint = Some([1.0, 0.5, 0.25]);
        config.io.checkpoint = Some(CheckpointConfig {
            path: PathBuf::from("vf.bin"),
            restore: true,
        });
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(simulation: (particles: 4), render: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.simulation.particles, 4);
        assert_eq!(config.simulation.iterations, 1000);
        assert_eq!(config.flow, FlowConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gasgiant.ron");
        let mut config = Config::default();
        config.flow.bands = 10.0;
        config.render.mode = RenderMode::Cloud;
        config.io.output_prefix = "p13-".to_string();

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ron");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Read { path: p, .. } if *p == path));
        assert!(err.to_string().contains("absent.ron"));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        std::fs::write(&path, "(simulation: (iterations: \"many\"))").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if *p == path));
        assert!(err.to_string().starts_with("invalid generator config"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let mut config = Config::default();
        config.flow.pole_attenuation = 1.5;
        config.flow.field_dim = 4;
        config.render.opacity_floor = -0.5;
        config.io.save_period = 0;
        config.simulation.threads = Some(0);
        config.sanitize();
        assert_eq!(config.flow.pole_attenuation, 1.0);
        assert_eq!(config.flow.field_dim, FIELD_DIM_MIN);
        assert_eq!(config.render.opacity_floor, 0.0);
        assert_eq!(config.io.save_period, 1);
        assert_eq!(config.simulation.threads, None);

        config.flow.field_dim = 4096;
        config.sanitize();
        assert_eq!(config.flow.field_dim, FIELD_DIM_MAX);
    }

    #[test]
    fn test_sanitize_keeps_valid_config() {
        let mut config = Config::default();
        config.sanitize();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_effective_factors_scale_with_field_dim() {
        let mut flow = FlowConfig::default();
        assert_eq!(flow.effective_velocity_factor(), 1200.0);
        flow.field_dim = 1024;
        flow.speed_multiplier = 2.0;
        assert_eq!(flow.effective_velocity_factor(), 1200.0);
        assert!((flow.effective_band_speed_factor() - 2.9).abs() < 1e-6);
    }
}
