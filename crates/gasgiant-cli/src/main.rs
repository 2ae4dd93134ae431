//! `gasgiant`: generate gas-giant cubemap textures.

mod output;

use std::process;

use clap::Parser;
use gasgiant_config::{CliArgs, Config};
use gasgiant_flow::CheckpointStore;
use gasgiant_sim::{Simulation, SourceTexture};

use crate::output::FrameWriter;

fn main() {
    let args = CliArgs::parse();

    // Defaults, then the optional RON file, then CLI overrides
    let mut config = Config::load_or_default(args.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}");
        process::exit(1);
    });
    config.apply_cli_overrides(&args);

    gasgiant_log::init_logging(args.log_dir.as_deref(), Some(&config));
    config.sanitize();

    if let Some(path) = &args.save_config
        && let Err(e) = config.save(path)
    {
        tracing::warn!("Failed to save config to {}: {e}", path.display());
    }

    let texture = SourceTexture::open(&config.io.input).unwrap_or_else(|e| {
        tracing::error!("{e}");
        process::exit(1);
    });

    let checkpoint = config.io.checkpoint.as_ref().map(CheckpointStore::from_config);
    if let Some(store) = &checkpoint {
        store.warn_if_existing();
    }
    let restored = checkpoint
        .as_ref()
        .and_then(|store| store.restore(config.flow.field_dim as usize));

    let prefix = config.io.output_prefix.clone();
    let mut sim = Simulation::new(config, &texture);
    match restored {
        Some(field) => sim = sim.with_field(field),
        None => sim.compute_field(),
    }
    if let Some(store) = &checkpoint {
        store.dump(sim.field(), sim.field_step());
    }

    let mut writer = FrameWriter::new(prefix, checkpoint);
    sim.run(&mut writer);
}
