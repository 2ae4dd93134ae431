//! Painting particles onto the six output faces.

use std::sync::Arc;

use gasgiant_config::{RenderConfig, RenderMode};
use gasgiant_cubesphere::{CubeFace, FACE_COUNT, FaceCell, cell_to_point};
use gasgiant_flow::{NoiseField, for_each_face};
use image::{Rgba, RgbaImage};

use crate::{Color, Particle, channel_to_u8};

/// Per-iteration opacity multiplier until the floor is reached.
pub const OPACITY_DECAY: f32 = 0.95;

/// Alpha of the fade color in blend mode.
const FADE_ALPHA: f32 = 0.01;

/// Per-iteration alpha multiplier in cloud mode.
const CLOUD_FADE: f32 = 0.9;

/// One square RGBA8 output raster. Its size never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFace {
    image: RgbaImage,
}

impl OutputFace {
    /// A fully transparent black face of `dim`×`dim` pixels.
    pub fn new(dim: u32) -> Self {
        Self {
            image: RgbaImage::new(dim, dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.image.width() as usize
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn pixel_mut(&mut self, cell: FaceCell) -> Option<&mut Rgba<u8>> {
        if !cell.in_bounds(self.dim()) {
            return None;
        }
        Some(self.image.get_pixel_mut(cell.col, cell.row))
    }
}

/// Noise mottling applied to cloud-mode output.
pub struct CloudLayer {
    noise: Arc<NoiseField>,
    scale: f32,
    w: f32,
}

impl CloudLayer {
    /// Sample `noise` at `3.6 · noise_scale` on the unit sphere.
    pub fn new(noise: Arc<NoiseField>, noise_scale: f32, w_offset: f32) -> Self {
        let mut layer = Self {
            noise,
            scale: 3.6 * noise_scale,
            w: 0.0,
        };
        layer.set_w_offset(w_offset);
        layer
    }

    /// Follow the flow's time offset.
    pub fn set_w_offset(&mut self, w_offset: f32) {
        self.w = (w_offset + 10.0) * 3.33;
    }

    /// Shaped noise value in `[0.001, 1.0]` for an output cell.
    pub fn density(&self, face: CubeFace, cell: FaceCell, dim: usize) -> f32 {
        let p = cell_to_point(face, cell.row as usize, cell.col as usize, dim) * self.scale;
        let mut n = self.noise.fractal_sample4(p.x, p.y, p.z, self.w);
        if n > 0.5 {
            n *= 1.0 + n - 0.5;
        }
        if n < 0.0 {
            n *= 1.0 + n + 0.25;
        }
        n.clamp(-0.333, 0.666) + 0.334
    }
}

/// Stateless pixel operations for one render mode.
pub struct Brush {
    mode: RenderMode,
    fade: Option<Color>,
    cloud: Option<CloudLayer>,
}

impl Brush {
    /// `fade` is the color blended over every pixel each iteration, or `None`
    /// to disable fading. `cloud` is required for cloud-mode mottling; without
    /// it cloud mode paints unmodulated alpha.
    pub fn new(mode: RenderMode, fade: Option<Color>, cloud: Option<CloudLayer>) -> Self {
        Self { mode, fade, cloud }
    }

    /// Age every pixel of `face` by one iteration.
    pub fn fade(&self, face: &mut OutputFace) {
        let Some(fade) = self.fade else {
            return;
        };
        match self.mode {
            RenderMode::Blend => {
                for px in face.image.pixels_mut() {
                    let under = Color::from_rgb8([px[0], px[1], px[2]]);
                    let [r, g, b] = fade.over(under).to_rgb8();
                    *px = Rgba([r, g, b, px[3]]);
                }
            }
            RenderMode::Cloud => {
                for px in face.image.pixels_mut() {
                    px[3] = (px[3] as f32 * CLOUD_FADE).round_ties_even() as u8;
                }
            }
        }
    }

    /// Composite `color` into `cell` of `face`. Cells outside the raster are
    /// ignored.
    pub fn paint(&self, which: CubeFace, face: &mut OutputFace, cell: FaceCell, color: Color) {
        let dim = face.dim();
        let density = match (self.mode, &self.cloud) {
            (RenderMode::Cloud, Some(cloud)) => cloud.density(which, cell, dim),
            _ => 1.0,
        };
        let mode = self.mode;
        let Some(px) = face.pixel_mut(cell) else {
            return;
        };
        let blended = color.over(Color::from_rgb8([px[0], px[1], px[2]]));
        *px = match mode {
            RenderMode::Blend => {
                let [r, g, b] = blended.to_rgb8();
                Rgba([r, g, b, 255])
            }
            RenderMode::Cloud => Rgba([255, 255, 255, channel_to_u8(blended.mean() * density)]),
        };
    }
}

/// The six output faces and the global particle opacity.
pub struct Compositor {
    faces: Vec<OutputFace>,
    brush: Brush,
    opacity: f32,
    opacity_floor: f32,
}

impl Compositor {
    /// Blank faces at `config.face_dim`. `fade_color` is the darkest source
    /// pixel or the configured tint; its alpha is set per mode here.
    pub fn new(config: &RenderConfig, fade_color: Color, cloud: Option<CloudLayer>) -> Self {
        let fade = config.fade.then(|| fade_color.with_alpha(FADE_ALPHA));
        Self {
            faces: (0..FACE_COUNT).map(|_| OutputFace::new(config.face_dim)).collect(),
            brush: Brush::new(config.mode, fade, cloud),
            opacity: 1.0,
            opacity_floor: config.opacity_floor,
        }
    }

    pub fn faces(&self) -> &[OutputFace] {
        &self.faces
    }

    pub fn face(&self, face: CubeFace) -> &OutputFace {
        &self.faces[face.index()]
    }

    /// Opacity particles are painted with this iteration.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Cloud layer, if this compositor mottles its output.
    pub fn cloud_mut(&mut self) -> Option<&mut CloudLayer> {
        self.brush.cloud.as_mut()
    }

    /// Shrink the opacity towards the floor. Once at or below the floor it
    /// no longer changes.
    pub fn decay_opacity(&mut self) {
        if self.opacity > self.opacity_floor {
            self.opacity = (self.opacity * OPACITY_DECAY).max(self.opacity_floor);
        }
    }

    /// Fade every face, paint each particle on the face of its cached cell,
    /// then decay the opacity. One worker per face.
    pub fn render(&mut self, particles: &[Particle]) {
        let brush = &self.brush;
        let opacity = self.opacity;
        for_each_face("paint", self.faces.iter_mut(), |which, face| {
            brush.fade(face);
            for p in particles.iter().filter(|p| p.cell.face == which) {
                brush.paint(which, face, p.cell, p.color.with_alpha(opacity));
            }
        });
        self.decay_opacity();
    }
}
