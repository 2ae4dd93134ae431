//! Particle advection and cubemap compositing.
//!
//! A [`Simulation`] owns the particles, the six output faces and the velocity
//! field. Each iteration moves every particle along the field and then paints
//! the particles onto the faces; the two phases never overlap.

mod color;
mod compositor;
mod particles;
mod simulation;
mod texture;

pub use color::{Color, channel_to_u8};
pub use compositor::{Brush, CloudLayer, Compositor, OPACITY_DECAY, OutputFace};
pub use particles::{Particle, ParticleSystem, SeedParams, random_point_on_sphere, seed_uv};
pub use simulation::{RunHooks, Simulation};
pub use texture::{SourceTexture, TextureError};
