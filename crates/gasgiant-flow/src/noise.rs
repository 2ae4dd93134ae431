//! Four-dimensional fractal noise sampler.
//!
//! The fourth dimension acts as time: moving along `w` smoothly morphs the
//! field without translating it across the sphere.

use noise::{NoiseFn, OpenSimplex};

/// Number of fBm octaves summed by [`NoiseField::fractal_sample4`].
pub const OCTAVES: usize = 4;

/// A single seeded OpenSimplex generator with fBm octave weights.
///
/// Each octave doubles the frequency of all four coordinates and is weighted
/// by successive powers of the falloff: `[1, f, f², f³]`.
pub struct NoiseField {
    noise: OpenSimplex,
    octave_weights: [f32; OCTAVES],
}

impl NoiseField {
    /// Create a sampler with the given seed and octave falloff.
    pub fn new(seed: u32, falloff: f32) -> Self {
        let mut octave_weights = [1.0; OCTAVES];
        for i in 1..OCTAVES {
            octave_weights[i] = octave_weights[i - 1] * falloff;
        }
        Self {
            noise: OpenSimplex::new(seed),
            octave_weights,
        }
    }

    /// Raw single-octave noise at a 4D point.
    #[inline]
    pub fn sample4(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        self.noise.get([x as f64, y as f64, z as f64, w as f64]) as f32
    }

    /// Four-octave fractal sum at a 4D point.
    pub fn fractal_sample4(&self, x: f32, y: f32, z: f32, w: f32) -> f32 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        for weight in self.octave_weights {
            total += weight * self.sample4(x * frequency, y * frequency, z * frequency, w * frequency);
            frequency *= 2.0;
        }
        total
    }

    /// Weights applied to each octave, lowest frequency first.
    pub fn octave_weights(&self) -> [f32; OCTAVES] {
        self.octave_weights
    }
}
