//! Colored particles on the sphere surface.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use gasgiant_config::{PolarAxis, SeedMode};
use gasgiant_cubesphere::{FaceCell, point_to_cell};
use gasgiant_flow::{VelocityField, WorkerPool};
use glam::Vec3;
use rand::Rng;

use crate::{Color, SourceTexture};

/// Horizontal offset of each face in a 4×3 cubemap cross, as a fraction of the width.
const CROSS_COLUMN_OFFSET: [f32; 6] = [0.25, 0.5, 0.75, 0.0, 0.25, 0.25];
/// Vertical offset of each face in a 4×3 cubemap cross, as a fraction of the height.
const CROSS_ROW_OFFSET: [f32; 6] = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 0.0, 2.0 / 3.0];

/// A colored point on the sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position; its length is the working radius.
    pub position: Vec3,
    /// Paint color sampled from the source image at seeding; always opaque.
    pub color: Color,
    /// Output cell the particle is painted into.
    pub cell: FaceCell,
}

/// How particles are placed and colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedParams {
    /// How a sphere position is mapped to source-image coordinates.
    pub mode: SeedMode,
    /// World axis through the poles for the stripe and sinusoidal mappings.
    pub polar_axis: PolarAxis,
    /// Working radius particles live on.
    pub radius: f32,
    /// Output face resolution.
    pub face_dim: usize,
}

/// Uniformly distributed point on a sphere of `radius`.
pub fn random_point_on_sphere(rng: &mut impl Rng, radius: f32) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let theta: f32 = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z) * radius
}

/// Normalized source-image coordinates that color a particle at `unit_p`.
pub fn seed_uv(unit_p: Vec3, mode: SeedMode, polar_axis: PolarAxis, face_dim: usize) -> (f32, f32) {
    let axis = match polar_axis {
        PolarAxis::Y => unit_p.y,
        PolarAxis::Z => unit_p.z,
    };
    match mode {
        SeedMode::Cubemap => {
            let cell = point_to_cell(unit_p, face_dim);
            let f = cell.face.index();
            let dim = face_dim as f32;
            (
                CROSS_COLUMN_OFFSET[f] + cell.col as f32 / (4.0 * dim),
                CROSS_ROW_OFFSET[f] + cell.row as f32 / (3.0 * dim),
            )
        }
        SeedMode::Stripe => (0.5, (axis + 1.0) * 0.5),
        SeedMode::Sinusoidal => {
            let latitude = axis.clamp(-1.0, 1.0).asin();
            let v = (latitude + FRAC_PI_2) / PI;
            let across = match polar_axis {
                PolarAxis::Y => unit_p.z,
                PolarAxis::Z => unit_p.y,
            };
            let longitude = across.atan2(unit_p.x);
            let cos_latitude = latitude.cos().abs();
            let u = longitude.cos() * cos_latitude * cos_latitude * 0.5 + 0.5;
            (u, v)
        }
    }
}

/// All particles plus the geometry they are advected on.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    radius: f32,
    face_dim: usize,
}

impl ParticleSystem {
    /// Place `count` particles uniformly on the sphere and color them from
    /// `texture`. Colors are always fully opaque.
    pub fn seed(
        count: usize,
        texture: &SourceTexture,
        params: &SeedParams,
        rng: &mut impl Rng,
    ) -> Self {
        tracing::info!(count, mode = ?params.mode, "Initializing particles");
        let particles = (0..count)
            .map(|_| {
                let position = random_point_on_sphere(&mut *rng, params.radius);
                let unit = position.normalize_or_zero();
                let (u, v) = seed_uv(unit, params.mode, params.polar_axis, params.face_dim);
                Particle {
                    position,
                    color: texture.sample_uv(u, v).with_alpha(1.0),
                    cell: point_to_cell(position, params.face_dim),
                }
            })
            .collect();
        Self {
            particles,
            radius: params.radius,
            face_dim: params.face_dim,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Move every particle one step along `field`.
    ///
    /// The output cell is taken from the position before the move, then the
    /// sampled flow is added and the result is pushed back onto the sphere.
    pub fn advect(&mut self, field: &VelocityField, pool: &WorkerPool) {
        let radius = self.radius;
        let face_dim = self.face_dim;
        pool.for_each_partition("advect", &mut self.particles, |part| {
            for p in part {
                p.cell = point_to_cell(p.position, face_dim);
                let moved = p.position + field.sample(p.position);
                if let Some(unit) = moved.try_normalize() {
                    p.position = unit * radius;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use gasgiant_cubesphere::{CubeFace, cell_to_point};
    use image::{DynamicImage, RgbImage};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn texture() -> SourceTexture {
        let img = RgbImage::from_fn(16, 12, |x, y| image::Rgb([x as u8 * 16, y as u8 * 20, 7]));
        SourceTexture::from_dynamic(DynamicImage::ImageRgb8(img)).unwrap()
    }

    fn params(mode: SeedMode) -> SeedParams {
        SeedParams {
            mode,
            polar_axis: PolarAxis::Z,
            radius: 32.0,
            face_dim: 16,
        }
    }

    #[test]
    fn test_seeded_particles_on_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let system = ParticleSystem::seed(500, &texture(), &params(SeedMode::Sinusoidal), &mut rng);
        assert_eq!(system.len(), 500);
        for p in system.particles() {
            assert!((p.position.length() - 32.0).abs() < 1e-3);
            assert_eq!(p.color.a, 1.0);
        }
    }

    #[test]
    fn test_seeding_is_deterministic() {
        let seed = |s| {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            ParticleSystem::seed(64, &texture(), &params(SeedMode::Cubemap), &mut rng)
        };
        assert_eq!(seed(3).particles(), seed(3).particles());
        assert_ne!(seed(3).particles(), seed(4).particles());
    }

    #[test]
    fn test_stripe_uv() {
        let (u, v) = seed_uv(Vec3::Z, SeedMode::Stripe, PolarAxis::Z, 16);
        assert_eq!((u, v), (0.5, 1.0));
        let (_, v) = seed_uv(Vec3::NEG_Y, SeedMode::Stripe, PolarAxis::Y, 16);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_sinusoidal_uv() {
        // On the equator facing +x the image centre row's right edge is used.
        let (u, v) = seed_uv(Vec3::X, SeedMode::Sinusoidal, PolarAxis::Z, 16);
        assert!((u - 1.0).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
        // Poles collapse to the middle column.
        let (u, v) = seed_uv(Vec3::Z, SeedMode::Sinusoidal, PolarAxis::Z, 16);
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sinusoidal_uv_about_y_axis() {
        // Longitude is measured in the xz plane when y is the polar axis.
        let (u, v) = seed_uv(Vec3::X, SeedMode::Sinusoidal, PolarAxis::Y, 16);
        assert!((u - 1.0).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
        let (u, v) = seed_uv(Vec3::NEG_X, SeedMode::Sinusoidal, PolarAxis::Y, 16);
        assert!(u.abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
        // +z sits a quarter turn round the equator.
        let (u, v) = seed_uv(Vec3::Z, SeedMode::Sinusoidal, PolarAxis::Y, 16);
        assert!((u - 0.5).abs() < 1e-6, "u = {u}");
        assert!((v - 0.5).abs() < 1e-6);
        let (u, v) = seed_uv(Vec3::Y, SeedMode::Sinusoidal, PolarAxis::Y, 16);
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 1.0).abs() < 1e-6);
        let (_, v) = seed_uv(Vec3::NEG_Y, SeedMode::Sinusoidal, PolarAxis::Y, 16);
        assert!(v.abs() < 1e-6);
    }

    #[test]
    fn test_particle_is_compact() {
        assert_eq!(std::mem::size_of::<Particle>(), 40);
    }

    #[test]
    fn test_cubemap_uv_lands_in_face_tile() {
        let dim = 16;
        for face in CubeFace::ALL {
            let p = cell_to_point(face, 5, 9, dim);
            let (u, v) = seed_uv(p, SeedMode::Cubemap, PolarAxis::Z, dim);
            let f = face.index();
            assert!(u >= CROSS_COLUMN_OFFSET[f] && u < CROSS_COLUMN_OFFSET[f] + 0.25);
            assert!(v >= CROSS_ROW_OFFSET[f] && v < CROSS_ROW_OFFSET[f] + 1.0 / 3.0);
        }
    }

    #[test]
    fn test_advect_caches_pre_move_cell_and_keeps_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut system = ParticleSystem::seed(200, &texture(), &params(SeedMode::Stripe), &mut rng);
        let before: Vec<Particle> = system.particles().to_vec();

        let mut field = VelocityField::new(4);
        for face in CubeFace::ALL {
            for row in 0..4 {
                for col in 0..4 {
                    let n = cell_to_point(face, row, col, 4);
                    let tangent = n.any_orthonormal_vector();
                    field.set(FaceCell::clamped(face, row as i64, col as i64, 4), tangent * 0.5);
                }
            }
        }
        system.advect(&field, &WorkerPool::with_threads(3));

        for (old, new) in before.iter().zip(system.particles()) {
            assert_eq!(new.cell, point_to_cell(old.position, 16));
            assert!((new.position.length() - 32.0).abs() < 1e-3);
            assert_ne!(new.position, old.position);
            assert_eq!(new.color, old.color);
        }
    }

    #[test]
    fn test_uniform_distribution_covers_all_faces() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut counts = [0usize; 6];
        for _ in 0..6000 {
            let p = random_point_on_sphere(&mut rng, 1.0);
            counts[point_to_cell(p, 8).face.index()] += 1;
        }
        for c in counts {
            assert!((700..1300).contains(&c), "face counts {counts:?}");
        }
    }
}
