//! Iteration loop tying advection, painting, saving and field stepping together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gasgiant_config::{Config, RenderMode};
use gasgiant_flow::{CurlVelocityGenerator, FlowParams, NoiseField, VelocityField, WorkerPool};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{CloudLayer, Color, Compositor, OutputFace, ParticleSystem, SeedParams, SourceTexture};

/// Callbacks for the side effects of [`Simulation::run`].
pub trait RunHooks {
    /// Called with the six faces after iteration `iteration` when a frame is due.
    fn save_frame(&mut self, iteration: u32, faces: &[OutputFace]);

    /// Called after the field has been recomputed for the `step`-th time.
    fn field_recomputed(&mut self, _step: u32, _field: &VelocityField) {}
}

/// Wall-clock time spent in each phase since the run started.
#[derive(Clone, Copy, Debug, Default)]
struct PhaseTimings {
    advect: Duration,
    paint: Duration,
}

/// The whole generator state for one run.
pub struct Simulation {
    config: Config,
    generator: CurlVelocityGenerator,
    field: VelocityField,
    particles: ParticleSystem,
    compositor: Compositor,
    pool: WorkerPool,
    w_offset: f32,
    field_computations: u32,
    timings: PhaseTimings,
}

impl Simulation {
    /// Seed the particles and allocate the output faces. The velocity field
    /// starts zeroed; supply one with [`Self::compute_field`] or
    /// [`Self::with_field`] before running.
    pub fn new(config: Config, texture: &SourceTexture) -> Self {
        let sim = &config.simulation;
        let flow = &config.flow;
        let render = &config.render;

        let noise = Arc::new(NoiseField::new(sim.seed, flow.fbm_falloff));
        let generator = CurlVelocityGenerator::new(Arc::clone(&noise), FlowParams::from_config(&config));

        let field_dim = flow.field_dim.max(1) as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(sim.seed));
        let particles = ParticleSystem::seed(
            sim.particles,
            texture,
            &SeedParams {
                mode: sim.seed_mode,
                polar_axis: flow.polar_axis,
                radius: field_dim as f32 / 2.0,
                face_dim: render.face_dim.max(1) as usize,
            },
            &mut rng,
        );

        let fade_color = match render.tint {
            Some([r, g, b]) => Color::new(r, g, b, 1.0),
            None => texture.darkest_color(),
        };
        let cloud = (render.mode == RenderMode::Cloud)
            .then(|| CloudLayer::new(Arc::clone(&noise), flow.noise_scale, flow.w_offset));
        let compositor = Compositor::new(render, fade_color, cloud);

        let pool = WorkerPool::new(sim.threads);
        tracing::info!(threads = pool.threads(), "Using worker threads for particle motion");

        Self {
            w_offset: flow.w_offset,
            generator,
            field: VelocityField::new(field_dim),
            particles,
            compositor,
            pool,
            field_computations: 0,
            timings: PhaseTimings::default(),
            config,
        }
    }

    /// Use a previously computed (restored) field. A field of the wrong
    /// resolution is discarded and the field is computed instead.
    #[must_use]
    pub fn with_field(mut self, field: VelocityField) -> Self {
        if field.dim() == self.field.dim() {
            self.field = field;
        } else {
            tracing::warn!(
                expected = self.field.dim(),
                actual = field.dim(),
                "Restored velocity field has the wrong size, recomputing"
            );
            self.compute_field();
        }
        self
    }

    /// Recompute the field at the current w offset.
    pub fn compute_field(&mut self) {
        self.field.recompute(&self.generator, self.w_offset);
        self.field_computations += 1;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn field(&self) -> &VelocityField {
        &self.field
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn faces(&self) -> &[OutputFace] {
        self.compositor.faces()
    }

    /// Current offset along the noise's fourth dimension.
    pub fn w_offset(&self) -> f32 {
        self.w_offset
    }

    /// Checkpoint suffix for the current field: the number of computations so
    /// far when time stepping, `None` otherwise.
    pub fn field_step(&self) -> Option<u32> {
        self.config.flow.wstep.map(|_| self.field_computations)
    }

    /// One iteration: move all particles, then repaint the faces.
    pub fn step(&mut self) {
        let started = Instant::now();
        self.particles.advect(&self.field, &self.pool);
        let moved = Instant::now();
        self.compositor.render(self.particles.particles());
        self.timings.advect += moved - started;
        self.timings.paint += moved.elapsed();
    }

    /// Run every configured iteration.
    ///
    /// Frames are handed to `hooks` every `save_period` iterations and after
    /// the last one. With time stepping enabled the w offset advances every
    /// `wstep_period` iterations and the field is recomputed.
    pub fn run(&mut self, hooks: &mut impl RunHooks) {
        let iterations = self.config.simulation.iterations;
        let save_period = self.config.io.save_period.max(1);
        let progress_interval = self.config.debug.progress_interval.max(1);
        let wstep = self.config.flow.wstep;
        let wstep_period = self.config.flow.wstep_period.max(1);
        let mut last_saved = None;

        for i in 0..iterations {
            if i % progress_interval == 0 {
                tracing::info!(
                    iteration = i,
                    iterations,
                    advect_s = self.timings.advect.as_secs(),
                    paint_s = self.timings.paint.as_secs(),
                    "progress"
                );
            }

            self.step();

            if i % save_period == 0 {
                hooks.save_frame(i, self.faces());
                last_saved = Some(i);
            }
            if let Some(wstep) = wstep
                && i % wstep_period == 0
            {
                self.w_offset += wstep;
                if let Some(cloud) = self.compositor.cloud_mut() {
                    cloud.set_w_offset(self.w_offset);
                }
                self.compute_field();
                hooks.field_recomputed(self.field_computations, &self.field);
            }
        }

        if let Some(last) = iterations.checked_sub(1)
            && last_saved != Some(last)
        {
            hooks.save_frame(last, self.faces());
        }
        tracing::info!(iterations, "done");
    }
}
