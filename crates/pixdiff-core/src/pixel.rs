//! Pixel and overlay color types.
//!
//! # Types
//!
//! - [`Rgba`] - a 4-channel pixel with components in [0, 1]
//! - [`MismatchColor`] - the opaque RGB color painted over mismatching pixels
//!
//! # Channel Encoding
//!
//! Values are sRGB-encoded unless stated otherwise. Pixels read back from a
//! canonical [`Image`](crate::Image) carry premultiplied color, because that
//! is the layout the comparison kernels operate on.

use std::fmt;

/// A 4-channel pixel (R, G, B, A) with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
    /// Alpha channel
    pub a: f32,
}

impl Rgba {
    /// Creates a pixel from its four channels.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a pixel from 8-bit channels, mapping 0..=255 onto [0, 1].
    #[inline]
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self {
            r: px[0] as f32 / 255.0,
            g: px[1] as f32 / 255.0,
            b: px[2] as f32 / 255.0,
            a: px[3] as f32 / 255.0,
        }
    }

    /// Quantizes the pixel to 8 bits per channel (round to nearest, clamped).
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }

    /// Returns the color channels, ignoring alpha.
    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Maps a [0, 1] float onto 0..=255 with round-to-nearest.
#[inline]
pub fn quantize(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Overlay color used to paint mismatching pixels in a difference image.
///
/// The overlay is always written fully opaque.
///
/// # Example
///
/// ```rust
/// use pixdiff_core::MismatchColor;
///
/// assert_eq!(MismatchColor::default(), MismatchColor::GREEN);
/// assert_eq!(MismatchColor::RED.to_rgba8(), [255, 0, 0, 255]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MismatchColor {
    /// Red component in [0, 1]
    pub red: f32,
    /// Green component in [0, 1]
    pub green: f32,
    /// Blue component in [0, 1]
    pub blue: f32,
}

impl MismatchColor {
    /// Pure red overlay.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    /// Pure green overlay (default).
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    /// Pure blue overlay.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);

    /// Creates an overlay color from three components in [0, 1].
    #[inline]
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Returns the overlay as an opaque pixel.
    #[inline]
    pub fn to_rgba(self) -> Rgba {
        Rgba::new(self.red, self.green, self.blue, 1.0)
    }

    /// Returns the overlay as an opaque 8-bit pixel.
    ///
    /// Opaque colors are identical in straight and premultiplied layouts,
    /// so this value can be written directly into a canonical image.
    #[inline]
    pub fn to_rgba8(self) -> [u8; 4] {
        self.to_rgba().to_rgba8()
    }

    /// Returns `true` if every component lies in [0, 1].
    pub fn is_valid(&self) -> bool {
        [self.red, self.green, self.blue]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for MismatchColor {
    fn default() -> Self {
        Self::GREEN
    }
}

impl fmt::Display for MismatchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_rgba8() {
        let px = Rgba::from_rgba8([255, 0, 51, 255]);
        assert_relative_eq!(px.r, 1.0);
        assert_relative_eq!(px.g, 0.0);
        assert_relative_eq!(px.b, 0.2);
        assert_relative_eq!(px.a, 1.0);
    }

    #[test]
    fn test_quantize_roundtrip() {
        for v in 0..=255u8 {
            let px = Rgba::from_rgba8([v, v, v, v]);
            assert_eq!(px.to_rgba8(), [v, v, v, v]);
        }
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(-0.5), 0);
        assert_eq!(quantize(1.5), 255);
        assert_eq!(quantize(f32::NAN), 0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(MismatchColor::GREEN.to_rgba8(), [0, 255, 0, 255]);
        assert_eq!(MismatchColor::BLUE.to_rgba8(), [0, 0, 255, 255]);
        assert!(MismatchColor::RED.is_valid());
        assert!(!MismatchColor::new(1.2, 0.0, 0.0).is_valid());
    }
}
