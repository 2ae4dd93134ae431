//! Source image the particle colors are sampled from.

use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage};
use thiserror::Error;

use crate::Color;

/// Errors returned while loading the source image.
#[derive(Debug, Error)]
pub enum TextureError {
    /// The file could not be opened or decoded.
    #[error("{path}: cannot load image: {source}")]
    Load {
        /// File that failed to open or decode.
        path: PathBuf,
        /// Decoder or I/O failure reported by `image`.
        #[source]
        source: image::ImageError,
    },

    /// Only 8-bit RGB and RGBA images are accepted.
    #[error("unsupported color type {0:?}, expected 8-bit RGB or RGBA")]
    UnsupportedColor(ColorType),

    /// The image has no pixels.
    #[error("image has zero width or height")]
    Empty,
}

/// Decoded 8-bit RGB(A) image with rows padded to a 4-byte boundary.
#[derive(Clone, Debug)]
pub struct SourceTexture {
    width: u32,
    height: u32,
    channels: usize,
    stride: usize,
    data: Vec<u8>,
}

impl SourceTexture {
    /// Load and validate an image file.
    pub fn open(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let texture = Self::from_dynamic(image)?;
        tracing::info!(
            path = %path.display(),
            width = texture.width,
            height = texture.height,
            stride = texture.stride,
            "Loaded source image"
        );
        Ok(texture)
    }

    /// Wrap an already decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, TextureError> {
        match image {
            DynamicImage::ImageRgb8(rgb) => {
                let (w, h) = rgb.dimensions();
                Self::from_packed(w, h, 3, rgb.as_raw())
            }
            DynamicImage::ImageRgba8(rgba) => {
                let (w, h) = rgba.dimensions();
                Self::from_packed(w, h, 4, rgba.as_raw())
            }
            other => Err(TextureError::UnsupportedColor(other.color())),
        }
    }

    fn from_packed(
        width: u32,
        height: u32,
        channels: usize,
        packed: &[u8],
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        let row_bytes = width as usize * channels;
        let stride = row_bytes.next_multiple_of(4);
        let mut data = vec![0; stride * height as usize];
        for (dst, src) in data.chunks_exact_mut(stride).zip(packed.chunks_exact(row_bytes)) {
            dst[..row_bytes].copy_from_slice(src);
        }
        Ok(Self {
            width,
            height,
            channels,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 3 for RGB, 4 for RGBA.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Bytes per stored row, including padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Color of pixel `(x, y)`, clamped to the image. RGB images are opaque.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = y * self.stride + x * self.channels;
        let rgb = [self.data[i], self.data[i + 1], self.data[i + 2]];
        if self.channels == 4 {
            Color::from_rgba8([rgb[0], rgb[1], rgb[2], self.data[i + 3]])
        } else {
            Color::from_rgb8(rgb)
        }
    }

    /// Color at normalized image coordinates, truncated to a pixel and
    /// clamped to the image.
    pub fn sample_uv(&self, u: f32, v: f32) -> Color {
        let to_pixel = |t: f32, extent: u32| (t * extent as f32).max(0.0) as u32;
        self.pixel(to_pixel(u, self.width), to_pixel(v, self.height))
    }

    /// The pixel with the smallest `r + g + b`, scanning column by column.
    /// The first one found wins ties.
    pub fn darkest_color(&self) -> Color {
        let mut darkest = self.pixel(0, 0);
        for x in 0..self.width {
            for y in 0..self.height {
                let c = self.pixel(x, y);
                if c.luminance_sum() < darkest.luminance_sum() {
                    darkest = c;
                }
            }
        }
        darkest.with_alpha(1.0)
    }
}
