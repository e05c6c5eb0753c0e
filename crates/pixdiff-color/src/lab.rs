//! sRGB to CIE Lab conversion.
//!
//! ```text
//! sRGB --decode--> linear RGB --SRGB_TO_XYZ x100--> XYZ --/D65--> f(t) --> Lab
//! ```
//!
//! All inputs in [0, 1] map to non-negative XYZ, so the cube root never sees
//! a negative argument.

use crate::matrix::Mat3;
use crate::srgb;
use pixdiff_core::Rgba;

/// Linear sRGB (D65) to CIE XYZ matrix, unscaled.
pub const SRGB_TO_XYZ: Mat3 = Mat3::from_rows([
    [0.412_456_44, 0.357_576_08, 0.180_437_48],
    [0.212_672_85, 0.715_152_16, 0.072_174_99],
    [0.019_333_896, 0.119_192_03, 0.950_304_1],
]);

/// D65 reference white (X, Y, Z), scaled so that Y = 100.
pub const D65_WHITE: [f32; 3] = [95.047, 100.0, 108.883];

/// Lab nonlinearity breakpoint, (6/29)^3.
pub const LAB_EPSILON: f32 = 216.0 / 24389.0;

/// Slope of the linear Lab segment, (29/6)^2 / 3.
pub const LAB_KAPPA: f32 = 841.0 / 108.0;

/// Offset of the linear Lab segment.
pub const LAB_OFFSET: f32 = 4.0 / 29.0;

/// A color in CIE Lab space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    /// Lightness, 0 (black) to 100 (diffuse white)
    pub l: f32,
    /// Green (-) to red (+)
    pub a: f32,
    /// Blue (-) to yellow (+)
    pub b: f32,
}

impl Lab {
    /// Creates a Lab color.
    #[inline]
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Chroma, the distance from the neutral axis.
    #[inline]
    pub fn chroma(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

/// Converts gamma-encoded sRGB to XYZ scaled to Y = 100.
#[inline]
pub fn rgb_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = SRGB_TO_XYZ * srgb::decode_rgb(rgb);
    [100.0 * x, 100.0 * y, 100.0 * z]
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + LAB_OFFSET
    }
}

/// Converts XYZ (Y = 100 scale) to Lab relative to [`D65_WHITE`].
#[inline]
pub fn xyz_to_lab(xyz: [f32; 3]) -> Lab {
    let fx = lab_f(xyz[0] / D65_WHITE[0]);
    let fy = lab_f(xyz[1] / D65_WHITE[1]);
    let fz = lab_f(xyz[2] / D65_WHITE[2]);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Converts a gamma-encoded sRGB triplet to Lab.
#[inline]
pub fn rgb_to_lab(rgb: [f32; 3]) -> Lab {
    xyz_to_lab(rgb_to_xyz(rgb))
}

/// Converts an already-decoded (linear) sRGB triplet to Lab.
///
/// Callers that decode through a lookup table use this to skip the
/// transfer function.
#[inline]
pub fn linear_rgb_to_lab(linear: [f32; 3]) -> Lab {
    let [x, y, z] = SRGB_TO_XYZ * linear;
    xyz_to_lab([100.0 * x, 100.0 * y, 100.0 * z])
}

/// Converts a pixel to Lab. Alpha is ignored.
///
/// # Example
///
/// ```rust
/// use pixdiff_color::to_lab;
/// use pixdiff_core::Rgba;
///
/// let white = to_lab(Rgba::new(1.0, 1.0, 1.0, 1.0));
/// assert!((white.l - 100.0).abs() < 0.01);
/// ```
#[inline]
pub fn to_lab(pixel: Rgba) -> Lab {
    rgb_to_lab(pixel.rgb())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_white() {
        let lab = rgb_to_lab([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(lab.l, 100.0, epsilon = 0.01);
        assert_abs_diff_eq!(lab.a, 0.0, epsilon = 0.01);
        assert_abs_diff_eq!(lab.b, 0.0, epsilon = 0.01);
    }

    #[test]
    fn test_black() {
        let lab = rgb_to_lab([0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(lab.l, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(lab.a, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(lab.b, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_primaries() {
        let red = rgb_to_lab([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(red.l, 53.24, epsilon = 0.05);
        assert_abs_diff_eq!(red.a, 80.09, epsilon = 0.05);
        assert_abs_diff_eq!(red.b, 67.20, epsilon = 0.05);

        let blue = rgb_to_lab([0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(blue.l, 32.30, epsilon = 0.05);
        assert_abs_diff_eq!(blue.a, 79.19, epsilon = 0.05);
        assert_abs_diff_eq!(blue.b, -107.86, epsilon = 0.05);
    }

    #[test]
    fn test_mid_gray_is_neutral() {
        let lab = rgb_to_lab([0.5, 0.5, 0.5]);
        assert_abs_diff_eq!(lab.l, 53.39, epsilon = 0.05);
        assert!(lab.chroma() < 0.01);
    }

    #[test]
    fn test_linear_path_matches() {
        for v in [0u8, 10, 11, 64, 128, 200, 255] {
            let c = v as f32 / 255.0;
            let direct = rgb_to_lab([c, 0.25, 0.75]);
            let linear = linear_rgb_to_lab(srgb::decode_rgb([c, 0.25, 0.75]));
            assert_eq!(direct, linear);
        }
    }

    #[test]
    fn test_alpha_ignored() {
        let opaque = to_lab(Rgba::new(0.2, 0.4, 0.6, 1.0));
        let clear = to_lab(Rgba::new(0.2, 0.4, 0.6, 0.0));
        assert_eq!(opaque, clear);
    }

    #[test]
    fn test_matrix_maps_white_to_d65() {
        let [x, y, z] = SRGB_TO_XYZ.row_sums();
        assert_abs_diff_eq!(x * 100.0, D65_WHITE[0], epsilon = 0.01);
        assert_abs_diff_eq!(y * 100.0, D65_WHITE[1], epsilon = 0.01);
        assert_abs_diff_eq!(z * 100.0, D65_WHITE[2], epsilon = 0.01);
    }
}
