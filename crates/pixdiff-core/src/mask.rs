//! Boolean mismatch grid produced by a kernel.

use crate::error::{Error, Result};

/// Per-pixel mismatch flags, same dimensions as the compared images.
///
/// Kernels that work on blocks mark every pixel of a mismatching block,
/// so the mask is always addressed in pixel coordinates.
#[derive(Clone, PartialEq, Eq)]
pub struct MismatchMask {
    bits: Vec<bool>,
    width: u32,
    height: u32,
}

impl MismatchMask {
    /// Creates an all-false mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bits: vec![false; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wraps row-major flags.
    ///
    /// # Errors
    ///
    /// [`Error::Execution`] if `bits.len() != width * height`.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(Error::execution(format!(
                "mask has {} entries, expected {} for {}x{}",
                bits.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self { bits, width, height })
    }

    /// Returns the mask dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the row-major flags.
    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Returns the flag at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(x < self.width && y < self.height, "mask index out of bounds");
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Sets the flag at (x, y).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        debug_assert!(x < self.width && y < self.height, "mask index out of bounds");
        self.bits[y as usize * self.width as usize + x as usize] = value;
    }

    /// Number of marked pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

impl std::fmt::Debug for MismatchMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MismatchMask")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("marked", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_count() {
        let mut mask = MismatchMask::new(3, 3);
        mask.set(0, 0, true);
        mask.set(2, 1, true);
        assert!(mask.get(2, 1));
        assert!(!mask.get(1, 2));
        assert_eq!(mask.count(), 2);
        assert!(mask.as_slice()[5]);
    }

    #[test]
    fn test_from_bits_len() {
        assert!(MismatchMask::from_bits(2, 2, vec![false; 4]).is_ok());
        assert!(MismatchMask::from_bits(2, 2, vec![false; 3]).is_err());
    }
}
