//! Curl-noise velocity generator with a counter-rotating band overlay.
//!
//! The noise gradient at a point is projected onto the sphere's tangent plane
//! and turned 90° about the local normal. The result runs along the noise
//! isolines instead of across them, so the flow has no sources or sinks.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use gasgiant_config::{Config, PolarAxis};
use gasgiant_cubesphere::{CubeFace, cell_to_point};
use glam::{Quat, Vec3};

use crate::NoiseField;

/// Finite-difference step, as a fraction of one output pixel at unit noise scale.
const GRADIENT_STEP: f32 = 0.05;

/// Latitude-banded flow parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandParams {
    /// Number of bands; `0` disables the overlay.
    pub bands: f32,
    /// Band speed multiplier.
    pub speed_factor: f32,
    /// Blend between constant (`0`) and `cos(latitude)` (`1`) pole attenuation.
    pub pole_attenuation: f32,
    /// Axis the bands circle.
    pub polar_axis: PolarAxis,
}

/// Everything the generator needs besides the noise itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowParams {
    /// Radius of the sphere the noise is sampled on.
    pub noise_scale: f32,
    /// Multiplier on the curl velocity.
    pub velocity_factor: f32,
    /// Raster resolution the gradient step is expressed in.
    pub gradient_dim: usize,
    /// Band overlay.
    pub bands: BandParams,
}

impl FlowParams {
    /// Derive flow parameters from the configuration, applying the field
    /// resolution and speed multiplier scaling.
    pub fn from_config(config: &Config) -> Self {
        let flow = &config.flow;
        Self {
            noise_scale: flow.noise_scale,
            velocity_factor: flow.effective_velocity_factor(),
            gradient_dim: config.render.face_dim as usize,
            bands: BandParams {
                bands: flow.bands,
                speed_factor: flow.effective_band_speed_factor(),
                pole_attenuation: flow.pole_attenuation,
                polar_axis: flow.polar_axis,
            },
        }
    }
}

/// Band speed for a point whose sine of latitude (its coordinate along the
/// polar axis on the unit sphere) is `sin_latitude`.
///
/// `((1 - pa) + pa·cos φ) · cos(φ·bands) · speed_factor`. `cos φ` is taken as
/// `sqrt(1 - sin²φ)`, so with `pa = 1` the speed is exactly zero at the poles.
pub fn band_speed(sin_latitude: f32, params: &BandParams) -> f32 {
    let s = sin_latitude.clamp(-1.0, 1.0);
    let latitude = s.asin();
    let cos_latitude = (1.0 - s * s).max(0.0).sqrt();
    let pa = params.pole_attenuation;
    ((1.0 - pa) + pa * cos_latitude) * (latitude * params.bands).cos() * params.speed_factor
}

/// Band velocity at a unit-sphere point: perpendicular to both the polar axis
/// and the radial direction, scaled by [`band_speed`].
pub fn band_velocity(unit_p: Vec3, params: &BandParams) -> Vec3 {
    if params.bands == 0.0 {
        return Vec3::ZERO;
    }
    let (sin_latitude, direction) = match params.polar_axis {
        PolarAxis::Z => (unit_p.z, Vec3::new(-unit_p.y, unit_p.x, 0.0)),
        PolarAxis::Y => (unit_p.y, Vec3::new(unit_p.z, 0.0, -unit_p.x)),
    };
    direction.normalize_or_zero() * band_speed(sin_latitude, params)
}

/// Turn a noise gradient at `p` into a tangential flow vector.
///
/// `p + gradient` is pushed back onto the sphere of `radius`, `p` is
/// subtracted to leave the tangent displacement, and that displacement is
/// rotated a quarter turn about `normalized_p`. The radial sag of the chord
/// is removed so the result has no component along the normal.
pub fn curl(p: Vec3, normalized_p: Vec3, radius: f32, gradient: Vec3) -> Vec3 {
    let on_sphere = (p + gradient).normalize_or_zero() * radius;
    let displacement = on_sphere - p;
    let tangential = displacement - normalized_p * displacement.dot(normalized_p);

    let rotation = Quat::from_axis_angle(normalized_p, FRAC_PI_2);
    let rotated = rotation * tangential;
    rotated - normalized_p * rotated.dot(normalized_p)
}

/// Produces flow vectors at cubemap cells from a shared noise field.
pub struct CurlVelocityGenerator {
    noise: Arc<NoiseField>,
    params: FlowParams,
}

impl CurlVelocityGenerator {
    /// Create a generator over `noise` with the given parameters.
    pub fn new(noise: Arc<NoiseField>, params: FlowParams) -> Self {
        Self { noise, params }
    }

    /// The noise field the generator samples.
    pub fn noise(&self) -> &Arc<NoiseField> {
        &self.noise
    }

    /// The generator's flow parameters.
    pub fn params(&self) -> &FlowParams {
        &self.params
    }

    /// Central difference of the fractal noise along x, y and z at `(p, w)`.
    ///
    /// The step is `scale · 0.05 / gradient_dim`; the differences are not
    /// divided by the step, the velocity factor absorbs that constant.
    pub fn gradient(&self, p: Vec3, w: f32, scale: f32) -> Vec3 {
        let d = scale * (GRADIENT_STEP / self.params.gradient_dim.max(1) as f32);
        let n = &self.noise;
        Vec3::new(
            n.fractal_sample4(p.x + d, p.y, p.z, w) - n.fractal_sample4(p.x - d, p.y, p.z, w),
            n.fractal_sample4(p.x, p.y + d, p.z, w) - n.fractal_sample4(p.x, p.y - d, p.z, w),
            n.fractal_sample4(p.x, p.y, p.z + d, w) - n.fractal_sample4(p.x, p.y, p.z - d, w),
        )
    }

    /// Flow vector at a unit-sphere point for time parameter `w`.
    pub fn velocity_at_point(&self, unit_p: Vec3, w: f32) -> Vec3 {
        let scale = self.params.noise_scale;
        let p = unit_p * scale;
        let gradient = self.gradient(p, w * scale, scale);
        let c = curl(p, unit_p, scale, gradient) * self.params.velocity_factor;
        c + band_velocity(unit_p, &self.params.bands)
    }

    /// Flow vector at a cell of a `dim`×`dim` cubemap for time parameter `w`.
    pub fn velocity_at(&self, face: CubeFace, row: usize, col: usize, dim: usize, w: f32) -> Vec3 {
        self.velocity_at_point(cell_to_point(face, row, col, dim), w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(bands: f32) -> FlowParams {
        FlowParams {
            noise_scale: 2.6,
            velocity_factor: 1200.0,
            gradient_dim: 1024,
            bands: BandParams {
                bands,
                speed_factor: 2.9,
                pole_attenuation: 0.5,
                polar_axis: PolarAxis::Z,
            },
        }
    }

    fn generator(bands: f32) -> CurlVelocityGenerator {
        CurlVelocityGenerator::new(Arc::new(NoiseField::new(3_141_592, 0.5)), params(bands))
    }

    fn assert_tangent(v: Vec3, normal: Vec3, context: &str) {
        let radial = v.dot(normal);
        assert!(
            radial.abs() <= 1e-4 * v.length() + 1e-6,
            "{context}: radial component {radial} for flow {v:?}"
        );
    }

    #[test]
    fn test_curl_flow_is_tangent() {
        let generator = generator(0.0);
        let dim = 16;
        for face in CubeFace::ALL {
            for row in (0..dim).step_by(3) {
                for col in (0..dim).step_by(3) {
                    let n = cell_to_point(face, row, col, dim);
                    let v = generator.velocity_at(face, row, col, dim, 0.0);
                    assert_tangent(v, n, &format!("{face:?} ({row}, {col})"));
                }
            }
        }
    }

    #[test]
    fn test_banded_flow_is_tangent() {
        let mut generator = generator(6.0);
        for axis in [PolarAxis::Y, PolarAxis::Z] {
            generator.params.bands.polar_axis = axis;
            for i in 0..200 {
                let t = i as f32 * 0.61;
                let n = Vec3::new(t.sin(), (t * 1.7).cos(), (t * 0.3).sin() - 0.2).normalize();
                let v = generator.velocity_at_point(n, 0.5);
                assert_tangent(v, n, &format!("{axis:?} sample {i}"));
            }
        }
    }

    #[test]
    fn test_curl_of_large_gradient_is_tangent_and_perpendicular() {
        let n = Vec3::new(1.0, 2.0, -0.5).normalize();
        let p = n * 3.0;
        let g = Vec3::new(0.3, -0.2, 0.4);
        let c = curl(p, n, 3.0, g);
        assert_tangent(c, n, "large gradient");

        // The rotated vector is perpendicular to the tangential part of the gradient.
        let g_tangent = g - n * g.dot(n);
        assert!(c.dot(g_tangent).abs() < 1e-4, "curl not rotated: {}", c.dot(g_tangent));
    }

    #[test]
    fn test_zero_gradient_gives_zero_curl() {
        let n = Vec3::Y;
        let c = curl(n * 2.0, n, 2.0, Vec3::ZERO);
        assert!(c.length() < 1e-6);
    }

    #[test]
    fn test_band_speed_zero_at_poles_with_full_attenuation() {
        for bands in [1.0, 2.5, 6.0, 10.0, 37.0] {
            let params = BandParams {
                bands,
                speed_factor: 2.9,
                pole_attenuation: 1.0,
                polar_axis: PolarAxis::Z,
            };
            assert_eq!(band_speed(1.0, &params), 0.0, "north pole, {bands} bands");
            assert_eq!(band_speed(-1.0, &params), 0.0, "south pole, {bands} bands");
        }
    }

    #[test]
    fn test_band_speed_at_equator() {
        let params = BandParams {
            bands: 6.0,
            speed_factor: 2.9,
            pole_attenuation: 0.5,
            polar_axis: PolarAxis::Z,
        };
        assert!((band_speed(0.0, &params) - 2.9).abs() < 1e-6);
    }

    #[test]
    fn test_band_direction_circles_polar_axis() {
        let params = BandParams {
            bands: 6.0,
            speed_factor: 1.0,
            pole_attenuation: 0.0,
            polar_axis: PolarAxis::Z,
        };
        let p = Vec3::new(0.6, 0.0, 0.8);
        let v = band_velocity(p, &params);
        assert!(v.z.abs() < 1e-6, "band flow must not move along the axis");
        assert!(v.dot(p).abs() < 1e-6, "band flow must be tangent");

        let params = BandParams {
            polar_axis: PolarAxis::Y,
            ..params
        };
        let v = band_velocity(p, &params);
        assert!(v.y.abs() < 1e-6);
        assert!(v.dot(p).abs() < 1e-6);
    }

    #[test]
    fn test_no_bands_adds_nothing() {
        let params = params(0.0).bands;
        assert_eq!(band_velocity(Vec3::X, &params), Vec3::ZERO);
    }

    #[test]
    fn test_band_velocity_at_pole_is_finite() {
        let v = band_velocity(Vec3::Z, &params(6.0).bands);
        assert!(v.is_finite());
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_generator_is_deterministic() {
        let a = generator(6.0);
        let b = generator(6.0);
        for face in CubeFace::ALL {
            let va = a.velocity_at(face, 3, 5, 8, 0.25);
            let vb = b.velocity_at(face, 3, 5, 8, 0.25);
            assert_eq!(va, vb);
        }
    }

    #[test]
    fn test_from_config_scales_factors() {
        let mut config = Config::default();
        config.flow.field_dim = 512;
        let params = FlowParams::from_config(&config);
        assert!((params.velocity_factor - 300.0).abs() < 1e-4);
        assert!((params.bands.speed_factor - 0.725).abs() < 1e-6);
        assert_eq!(params.gradient_dim, 1024);
    }
}
