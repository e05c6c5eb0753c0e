//! sRGB transfer function.
//!
//! The sRGB standard uses a piecewise function combining a linear segment
//! near black with a power curve for the rest.
//!
//! The decode breakpoint is `0.0404482362771082` (the exact intersection of
//! the two segments) rather than the rounded `0.04045` from the standard;
//! the comparison kernels depend on this value to reproduce reference
//! outcomes bit-for-bit near black.
//!
//! # Range
//!
//! - Input/Output: [0, 1]
//!
//! # Reference
//!
//! IEC 61966-2-1:1999

/// Encoded value below which the linear segment applies.
pub const DECODE_THRESHOLD: f32 = 0.040_448_236_277_108_2;

/// Exponent of the power segment.
pub const GAMMA: f32 = 2.4;

/// sRGB EOTF: decodes an sRGB encoded value to linear light.
///
/// # Formula
///
/// ```text
/// if V > 0.0404482362771082:
///     L = ((V + 0.055) / 1.055)^2.4
/// else:
///     L = V / 12.92
/// ```
///
/// # Example
///
/// ```rust
/// use pixdiff_color::srgb::decode;
///
/// let linear = decode(0.5);
/// assert!((linear - 0.214).abs() < 0.01);
/// ```
#[inline]
pub fn decode(v: f32) -> f32 {
    if v > DECODE_THRESHOLD {
        ((v + 0.055) / 1.055).powf(GAMMA)
    } else {
        v / 12.92
    }
}

/// Applies [`decode`] to an RGB triplet.
#[inline]
pub fn decode_rgb(rgb: [f32; 3]) -> [f32; 3] {
    [decode(rgb[0]), decode(rgb[1]), decode(rgb[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert!((decode(0.5) - 0.214_041_14).abs() < 1e-5);
        assert!((decode(0.04) - 0.04 / 12.92).abs() < 1e-9);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(decode(0.0), 0.0);
        assert!((decode(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_segments_meet_at_threshold() {
        let below = DECODE_THRESHOLD / 12.92;
        let above = ((DECODE_THRESHOLD + 0.055) / 1.055).powf(GAMMA);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = -1.0;
        for i in 0..=255 {
            let l = decode(i as f32 / 255.0);
            assert!(l > prev);
            prev = l;
        }
    }
}
