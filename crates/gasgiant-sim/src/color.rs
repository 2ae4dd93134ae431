//! Floating-point RGBA color with source-over compositing.

/// Linear RGBA color, each channel nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Coverage; `0` is fully transparent.
    pub a: f32,
}

impl Color {
    /// Fully transparent black, the starting value of every output pixel.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit RGB channels.
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
            1.0,
        )
    }

    /// Color from 8-bit RGBA channels.
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self {
            a: rgba[3] as f32 / 255.0,
            ..Self::from_rgb8([rgba[0], rgba[1], rgba[2]])
        }
    }

    /// Same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Sum of the color channels, ignoring alpha.
    pub fn luminance_sum(self) -> f32 {
        self.r + self.g + self.b
    }

    /// Mean of the color channels, ignoring alpha.
    pub fn mean(self) -> f32 {
        self.luminance_sum() / 3.0
    }

    /// Composite `self` over `dst`.
    ///
    /// `out_a = src_a + dst_a·(1 - src_a)`, and each channel is
    /// `(src·src_a + dst·dst_a·(1 - src_a)) / out_a`. A fully opaque source
    /// is returned unchanged and a fully transparent one leaves `dst` as is.
    #[must_use]
    pub fn over(self, dst: Color) -> Color {
        if self.a >= 1.0 {
            return self;
        }
        if self.a <= 0.0 {
            return dst;
        }
        let under = dst.a * (1.0 - self.a);
        let a = self.a + under;
        if a <= 0.0 {
            return Self::TRANSPARENT;
        }
        let blend = |s: f32, d: f32| (s * self.a + d * under) / a;
        Self {
            r: blend(self.r, dst.r),
            g: blend(self.g, dst.g),
            b: blend(self.b, dst.b),
            a,
        }
    }

    /// RGB channels as bytes.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
        ]
    }
}

/// Scale a `[0, 1]` channel to a byte, rounding half to even and saturating.
#[inline]
pub fn channel_to_u8(v: f32) -> u8 {
    (255.0 * v).round_ties_even().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const DST: Color = Color::new(0.2, 0.4, 0.6, 1.0);

    #[test]
    fn test_opaque_source_replaces_destination() {
        let src = Color::new(0.9, 0.1, 0.3, 1.0);
        assert_eq!(src.over(DST), src);
    }

    #[test]
    fn test_transparent_source_keeps_destination() {
        let src = Color::new(0.9, 0.1, 0.3, 0.0);
        assert_eq!(src.over(DST), DST);
    }

    #[test]
    fn test_half_alpha_over_opaque() {
        let src = Color::new(1.0, 0.0, 0.0, 0.5);
        let out = src.over(DST);
        assert!((out.a - 1.0).abs() < 1e-6);
        assert!((out.r - 0.6).abs() < 1e-6);
        assert!((out.g - 0.2).abs() < 1e-6);
        assert!((out.b - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_over_transparent_destination_keeps_source_color() {
        let src = Color::new(0.5, 0.25, 1.0, 0.3);
        let out = src.over(Color::TRANSPARENT);
        assert!((out.a - 0.3).abs() < 1e-6);
        assert!((out.r - 0.5).abs() < 1e-6);
        assert!((out.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_to_u8_saturates() {
        assert_eq!(channel_to_u8(0.0), 0);
        assert_eq!(channel_to_u8(1.0), 255);
        assert_eq!(channel_to_u8(1.5), 255);
        assert_eq!(channel_to_u8(-0.2), 0);
        // 0.5 * 255 = 127.5 rounds to even
        assert_eq!(channel_to_u8(0.5), 128);
    }

    #[test]
    fn test_byte_round_trip() {
        for v in [0u8, 1, 17, 128, 254, 255] {
            let c = Color::from_rgb8([v, v, v]);
            assert_eq!(c.to_rgb8(), [v, v, v]);
        }
        assert_eq!(Color::from_rgba8([0, 0, 0, 51]).a, 0.2);
    }
}
