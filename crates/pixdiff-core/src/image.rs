//! Canonical image buffer.
//!
//! Every image that reaches a comparison kernel has been redrawn into one
//! fixed layout:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! - sRGB color, 8 bits per channel
//! - alpha last, **premultiplied** into the color channels
//! - rows tightly packed, top-to-bottom (stride = width * 4)
//!
//! Two canonical images are byte-comparable, which is what the exact and
//! cluster kernels rely on.

use crate::error::{Error, Result};

/// Bytes per canonical pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Exclusive upper bound on the pixel count of a comparison.
pub const MAX_PIXELS: u64 = 56_250_000;

/// Checks that a `width x height` grid is within the supported range.
///
/// Returns the pixel count on success.
///
/// # Errors
///
/// [`Error::UnsupportedInput`] if the count is zero or reaches [`MAX_PIXELS`].
///
/// # Example
///
/// ```rust
/// use pixdiff_core::check_pixel_count;
///
/// assert_eq!(check_pixel_count(9, 9).unwrap(), 81);
/// assert!(check_pixel_count(0, 9).is_err());
/// assert!(check_pixel_count(7500, 7500).is_err());
/// ```
pub fn check_pixel_count(width: u32, height: u32) -> Result<u64> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels >= MAX_PIXELS {
        return Err(Error::unsupported_input(pixels, MAX_PIXELS));
    }
    Ok(pixels)
}

/// Canonical RGBA8 premultiplied image.
///
/// # Example
///
/// ```rust
/// use pixdiff_core::Image;
///
/// let mut img = Image::filled(4, 4, [255, 255, 255, 255]);
/// img.set_pixel(1, 2, [0, 0, 0, 255]);
/// assert_eq!(img.pixel(1, 2), [0, 0, 0, 255]);
/// assert_eq!(img.pixel_count(), 16);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Image {
    /// Creates a fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Creates an image filled with one premultiplied pixel.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self { data, width, height }
    }

    /// Wraps a buffer that is already in the canonical premultiplied layout.
    ///
    /// # Errors
    ///
    /// [`Error::Normalization`] if the buffer length does not equal
    /// `width * height * 4` or the image has zero area.
    pub fn from_premultiplied_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::normalization(format!(
                "image has zero area ({}x{})",
                width, height
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| Error::normalization("image dimensions overflow"))?;
        if data.len() != expected {
            return Err(Error::normalization(format!(
                "expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the raw premultiplied bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer as a slice of pixels.
    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// Returns the buffer as a mutable slice of pixels.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Consumes the image and returns its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels()[self.index(x, y)]
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = self.index(x, y);
        self.pixels_mut()[idx] = pixel;
    }

    /// Fails with [`Error::DimensionMismatch`] unless both images have the same size.
    pub fn ensure_same_size(&self, other: &Image) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    /// Converts the buffer back to straight (non-premultiplied) alpha.
    ///
    /// Encoders expect straight alpha; fully transparent pixels become
    /// transparent black.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for &[r, g, b, a] in self.pixels() {
            match a {
                0 => out.extend_from_slice(&[0, 0, 0, 0]),
                255 => out.extend_from_slice(&[r, g, b, a]),
                _ => out.extend_from_slice(&[
                    unpremultiply(r, a),
                    unpremultiply(g, a),
                    unpremultiply(b, a),
                    a,
                ]),
            }
        }
        out
    }
}

/// Multiplies an 8-bit color channel by an 8-bit alpha (round to nearest).
#[inline]
pub fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

#[inline]
fn unpremultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}
