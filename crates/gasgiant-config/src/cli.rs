//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::{CheckpointConfig, Config, PolarAxis, RenderMode, SeedMode};

/// Fade color used by `--hot-pink`.
const HOT_PINK: [f32; 3] = [1.0, 0.078_43, 0.576_47];

/// Gas-giant cubemap generator command-line arguments.
///
/// CLI values override settings loaded from `--config`. `-h` is taken by
/// `--hot-pink`, so help lives on `-H`/`--help`.
#[derive(Parser, Debug)]
#[command(
    name = "gasgiant",
    about = "Generate gas-giant cubemap textures by advecting particles through curl noise",
    disable_help_flag = true,
    after_help = "Example:\n  gasgiant --sinusoidal --noise-scale 2.5 --velocity-factor 1300 -i image.png -o p13- --bands 10"
)]
pub struct CliArgs {
    /// Print help.
    #[arg(short = 'H', long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Attenuate band velocity near the poles, 0.0 to 1.0.
    #[arg(short = 'a', long)]
    pub pole_attenuation: Option<f32>,

    /// Number of counter-rotating bands.
    #[arg(short = 'b', long)]
    pub bands: Option<f32>,

    /// Multiply band velocity by this number.
    #[arg(short = 'B', long = "band-vel-factor")]
    pub band_speed_factor: Option<f32>,

    /// Number of iterations to run the simulation.
    #[arg(short = 'c', long = "count")]
    pub iterations: Option<u32>,

    /// Modulate the output by noise to produce a cloud layer.
    #[arg(short = 'C', long)]
    pub cloudmode: bool,

    /// Dump the velocity field to this file after each computation.
    #[arg(short = 'd', long = "dump-velocity-field", conflicts_with = "restore_velocity_field")]
    pub dump_velocity_field: Option<PathBuf>,

    /// Restore the velocity field from this file instead of computing it.
    #[arg(short = 'r', long = "restore-velocity-field")]
    pub restore_velocity_field: Option<PathBuf>,

    /// Amplitude falloff between fBm noise octaves.
    #[arg(short = 'f', long)]
    pub fbm_falloff: Option<f32>,

    /// Velocity field resolution per face (16 to 2048).
    #[arg(short = 'F', long = "vfdim")]
    pub field_dim: Option<u32>,

    /// Output face image resolution.
    #[arg(long)]
    pub face_dim: Option<u32>,

    /// Fade pixels toward hot pink so unpainted regions stand out.
    #[arg(short = 'h', long)]
    pub hot_pink: bool,

    /// Input image filename (8-bit RGB or RGBA).
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Iterations between image saves.
    #[arg(short = 'I', long)]
    pub image_save_period: Option<u32>,

    /// Multiply both the velocity and band factors.
    #[arg(short = 'm', long)]
    pub speed_multiplier: Option<f32>,

    /// Do not fade the image between iterations.
    #[arg(short = 'n', long)]
    pub no_fade: bool,

    /// Output filename prefix; writes `<prefix>0.png` .. `<prefix>5.png`.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Minimum particle opacity, 0.0 to 1.0.
    #[arg(short = 'O', long)]
    pub opacity: Option<f32>,

    /// Number of particles.
    #[arg(short = 'p', long)]
    pub particles: Option<usize>,

    /// Seed particle colors by repeating the image as a cubemap cross.
    #[arg(short = 'P', long, conflicts_with_all = ["stripe", "sinusoidal", "seed_mode"])]
    pub plainmap: bool,

    /// Seed particle colors from a vertical stripe of the image.
    #[arg(short = 's', long, conflicts_with_all = ["sinusoidal", "seed_mode"])]
    pub stripe: bool,

    /// Seed particle colors with a sinusoidal projection of the image.
    #[arg(short = 'S', long, conflicts_with = "seed_mode")]
    pub sinusoidal: bool,

    /// Particle color seeding projection.
    #[arg(long, value_enum)]
    pub seed_mode: Option<SeedMode>,

    /// Axis the bands rotate around.
    #[arg(long, value_enum)]
    pub polar_axis: Option<PolarAxis>,

    /// Worker threads for particle motion (capped at the CPU count).
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Multiply the curl velocity by this number.
    #[arg(short = 'v', long)]
    pub velocity_factor: Option<f32>,

    /// Offset along the fourth noise dimension.
    #[arg(short = 'w', long)]
    pub w_offset: Option<f32>,

    /// Advance the w offset by this amount periodically and recompute the field.
    #[arg(short = 'W', long)]
    pub wstep: Option<f32>,

    /// Iterations between w steps.
    #[arg(long)]
    pub wstep_period: Option<u32>,

    /// Noise scale.
    #[arg(short = 'z', long)]
    pub noise_scale: Option<f32>,

    /// Noise and particle placement seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for JSON log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// RON config file to start from.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective config to this RON file.
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl CliArgs {
    /// Seeding mode selected by `--seed-mode` or one of its shorthands.
    fn selected_seed_mode(&self) -> Option<SeedMode> {
        if self.plainmap {
            Some(SeedMode::Cubemap)
        } else if self.stripe {
            Some(SeedMode::Stripe)
        } else if self.sinusoidal {
            Some(SeedMode::Sinusoidal)
        } else {
            self.seed_mode
        }
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let sim = &mut self.simulation;
        if let Some(n) = args.iterations {
            sim.iterations = n;
        }
        if let Some(n) = args.particles {
            sim.particles = n;
        }
        if let Some(seed) = args.seed {
            sim.seed = seed;
        }
        if let Some(mode) = args.selected_seed_mode() {
            sim.seed_mode = mode;
        }
        if let Some(t) = args.threads {
            sim.threads = Some(t);
        }

        let flow = &mut self.flow;
        if let Some(v) = args.noise_scale {
            flow.noise_scale = v;
        }
        if let Some(v) = args.velocity_factor {
            flow.velocity_factor = v;
        }
        if let Some(v) = args.bands {
            flow.bands = v;
        }
        if let Some(v) = args.band_speed_factor {
            flow.band_speed_factor = v;
        }
        if let Some(v) = args.pole_attenuation {
            flow.pole_attenuation = v;
        }
        if let Some(v) = args.fbm_falloff {
            flow.fbm_falloff = v;
        }
        if let Some(v) = args.field_dim {
            flow.field_dim = v;
        }
        if let Some(axis) = args.polar_axis {
            flow.polar_axis = axis;
        }
        if let Some(v) = args.speed_multiplier {
            flow.speed_multiplier = v;
        }
        if let Some(v) = args.w_offset {
            flow.w_offset = v;
        }
        if let Some(v) = args.wstep {
            flow.wstep = Some(v);
        }
        if let Some(v) = args.wstep_period {
            flow.wstep_period = v;
        }

        let render = &mut self.render;
        if let Some(v) = args.face_dim {
            render.face_dim = v;
        }
        if args.cloudmode {
            render.mode = RenderMode::Cloud;
        }
        if let Some(v) = args.opacity {
            render.opacity_floor = v;
        }
        if args.no_fade {
            render.fade = false;
        }
        if args.hot_pink {
            render.tint = Some(HOT_PINK);
        }

        let io = &mut self.io;
        if let Some(ref input) = args.input {
            io.input = input.clone();
        }
        if let Some(ref prefix) = args.output {
            io.output_prefix = prefix.clone();
        }
        if let Some(v) = args.image_save_period {
            io.save_period = v;
        }
        if let Some(ref path) = args.dump_velocity_field {
            io.checkpoint = Some(CheckpointConfig {
                path: path.clone(),
                restore: false,
            });
        }
        if let Some(ref path) = args.restore_velocity_field {
            io.checkpoint = Some(CheckpointConfig {
                path: path.clone(),
                restore: true,
            });
        }

        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("gasgiant").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = parse(&[
            "--noise-scale",
            "2.5",
            "-v",
            "1300",
            "-i",
            "image.png",
            "-o",
            "p13",
            "--bands",
            "10",
        ]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.flow.noise_scale, 2.5);
        assert_eq!(config.flow.velocity_factor, 1300.0);
        assert_eq!(config.flow.bands, 10.0);
        assert_eq!(config.io.input, PathBuf::from("image.png"));
        assert_eq!(config.io.output_prefix, "p13");
        // Non-overridden fields retain defaults
        assert_eq!(config.simulation.iterations, 1000);
        assert_eq!(config.flow.band_speed_factor, 2.9);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&parse(&[]));
        assert_eq!(config, original);
    }

    #[test]
    fn test_seed_mode_shorthands() {
        let mut config = Config::default();
        config.apply_cli_overrides(&parse(&["-P"]));
        assert_eq!(config.simulation.seed_mode, SeedMode::Cubemap);

        config.apply_cli_overrides(&parse(&["--stripe"]));
        assert_eq!(config.simulation.seed_mode, SeedMode::Stripe);

        config.apply_cli_overrides(&parse(&["--seed-mode", "sinusoidal"]));
        assert_eq!(config.simulation.seed_mode, SeedMode::Sinusoidal);
    }

    #[test]
    fn test_conflicting_seed_modes_rejected() {
        let result = CliArgs::try_parse_from(["gasgiant", "--stripe", "--sinusoidal"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_number_rejected() {
        let result = CliArgs::try_parse_from(["gasgiant", "--count", "many"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_hot_pink_and_flags() {
        let mut config = Config::default();
        config.apply_cli_overrides(&parse(&["-h", "-n", "-C", "--polar-axis", "y"]));
        assert_eq!(config.render.tint, Some(HOT_PINK));
        assert!(!config.render.fade);
        assert_eq!(config.render.mode, RenderMode::Cloud);
        assert_eq!(config.flow.polar_axis, PolarAxis::Y);
    }

    #[test]
    fn test_checkpoint_flags() {
        let mut config = Config::default();
        config.apply_cli_overrides(&parse(&["-d", "vf.bin", "-W", "0.1", "--wstep-period", "5"]));
        let checkpoint = config.io.checkpoint.clone().unwrap();
        assert_eq!(checkpoint.path, PathBuf::from("vf.bin"));
        assert!(!checkpoint.restore);
        assert_eq!(config.flow.wstep, Some(0.1));
        assert_eq!(config.flow.wstep_period, 5);

        config.apply_cli_overrides(&parse(&["-r", "vf.bin"]));
        assert!(config.io.checkpoint.unwrap().restore);

        let both = CliArgs::try_parse_from(["gasgiant", "-d", "a", "-r", "b"]);
        assert!(both.is_err());
    }
}
