//! Embedded ICC profile handling.
//!
//! Decoded pixels tagged with a color profile are converted to sRGB before
//! premultiplication, so a Display P3 capture and an sRGB capture of the
//! same content land on the same canonical bytes.

use lcms2::{ColorSpaceSignature, Intent, PixelFormat, Profile, Transform};
use tracing::{trace, warn};

use pixdiff_core::{Error, Result, BYTES_PER_PIXEL};

/// Rendering intent used for every conversion to sRGB.
pub const INTENT: Intent = Intent::RelativeColorimetric;

fn transform_error(err: lcms2::Error) -> Error {
    Error::normalization(format!("icc transform failed: {}", err))
}

/// Converts straight-alpha RGBA8 pixels from the space described by `icc`
/// to sRGB in place. Alpha is left untouched.
///
/// RGB and gray profiles are supported; any other color space is logged
/// and the pixels are kept as decoded.
///
/// # Errors
///
/// [`Error::Normalization`] if `icc` is not a parsable ICC profile or no
/// transform to sRGB can be built from it.
pub fn to_srgb(straight: &mut [u8], icc: &[u8]) -> Result<()> {
    let source = Profile::new_icc(icc)
        .map_err(|e| Error::normalization(format!("invalid icc profile: {}", e)))?;
    let srgb = Profile::new_srgb();
    let space = source.color_space();
    trace!(bytes = icc.len(), ?space, "icc profile");

    match space {
        ColorSpaceSignature::RgbData => {
            let transform: Transform<[u8; 3], [u8; 3]> = Transform::new(
                &source,
                PixelFormat::RGB_8,
                &srgb,
                PixelFormat::RGB_8,
                INTENT,
            )
            .map_err(transform_error)?;
            let mut rgb: Vec<[u8; 3]> = straight
                .chunks_exact(BYTES_PER_PIXEL)
                .map(|px| [px[0], px[1], px[2]])
                .collect();
            transform.transform_in_place(&mut rgb);
            write_back(straight, &rgb);
        }
        ColorSpaceSignature::GrayData => {
            let transform: Transform<u8, [u8; 3]> = Transform::new(
                &source,
                PixelFormat::GRAY_8,
                &srgb,
                PixelFormat::RGB_8,
                INTENT,
            )
            .map_err(transform_error)?;
            let gray: Vec<u8> = straight.chunks_exact(BYTES_PER_PIXEL).map(|px| px[0]).collect();
            let mut rgb = vec![[0u8; 3]; gray.len()];
            transform.transform_pixels(&gray, &mut rgb);
            write_back(straight, &rgb);
        }
        other => {
            warn!(space = ?other, "unsupported icc color space, pixels left as decoded");
        }
    }
    Ok(())
}

fn write_back(straight: &mut [u8], rgb: &[[u8; 3]]) {
    for (px, c) in straight.chunks_exact_mut(BYTES_PER_PIXEL).zip(rgb) {
        px[..3].copy_from_slice(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcms2::{CIExyY, CIExyYTRIPLE, ToneCurve};

    fn display_p3() -> Vec<u8> {
        let white = CIExyY { x: 0.3127, y: 0.3290, Y: 1.0 };
        let primaries = CIExyYTRIPLE {
            Red: CIExyY { x: 0.680, y: 0.320, Y: 1.0 },
            Green: CIExyY { x: 0.265, y: 0.690, Y: 1.0 },
            Blue: CIExyY { x: 0.150, y: 0.060, Y: 1.0 },
        };
        let curve = ToneCurve::new(2.2);
        Profile::new_rgb(&white, &primaries, &[&curve, &curve, &curve])
            .unwrap()
            .icc()
            .unwrap()
    }

    #[test]
    fn test_srgb_profile_near_identity() {
        let icc = Profile::new_srgb().icc().unwrap();
        let mut px = vec![200, 100, 50, 77, 0, 255, 128, 255];
        to_srgb(&mut px, &icc).unwrap();
        for (got, want) in px.iter().zip([200u8, 100, 50, 77, 0, 255, 128, 255]) {
            assert!(got.abs_diff(want) <= 1, "{} vs {}", got, want);
        }
        assert_eq!(px[3], 77);
    }

    #[test]
    fn test_wide_gamut_saturates() {
        let mut px = vec![200, 100, 50, 255];
        to_srgb(&mut px, &display_p3()).unwrap();
        assert!(px[0] > 205, "red {}", px[0]);
        assert!(px[2] < 45, "blue {}", px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_gray_profile() {
        let curve = ToneCurve::new(2.2);
        let icc = Profile::new_gray(&CIExyY::d50(), &curve).unwrap().icc().unwrap();
        let mut px = vec![90, 90, 90, 255];
        to_srgb(&mut px, &icc).unwrap();
        assert!(px[0].abs_diff(px[1]) <= 1);
        assert!(px[1].abs_diff(px[2]) <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_garbage_profile() {
        let mut px = vec![0, 0, 0, 255];
        let err = to_srgb(&mut px, b"definitely not icc").unwrap_err();
        assert!(matches!(err, Error::Normalization(_)));
    }
}
