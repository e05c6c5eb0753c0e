//! Input normalization.
//!
//! Every image is redrawn into the canonical layout before a kernel sees
//! it: sRGB, 8 bits per channel, RGBA order, premultiplied alpha, tightly
//! packed. Two captures of the same content therefore compare equal
//! regardless of the color type or bit depth they were decoded with.
//!
//! ```text
//! DynamicImage (L8, La8, Rgb8, Rgba16, Rgb32F, ...)
//!     --to_rgba8--> straight RGBA8
//!     --icc profile? to_srgb--> straight sRGB RGBA8
//!     --premultiply--> canonical Image
//! ```
//!
//! Untagged images are taken to be sRGB already.

use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader, RgbaImage};
use tracing::{debug, trace};

use pixdiff_core::{premultiply, quantize, Error, Image, Result, BYTES_PER_PIXEL};

use crate::profile;

fn map_image_error(err: ImageError) -> Error {
    match err {
        ImageError::IoError(e) => Error::Io(e),
        other => Error::normalization(other.to_string()),
    }
}

fn premultiplied(width: u32, height: u32, mut straight: Vec<u8>) -> Result<Image> {
    for px in straight.chunks_exact_mut(BYTES_PER_PIXEL) {
        let a = px[3];
        if a != 255 {
            px[0] = premultiply(px[0], a);
            px[1] = premultiply(px[1], a);
            px[2] = premultiply(px[2], a);
        }
    }
    Image::from_premultiplied_rgba8(width, height, straight)
}

fn expected_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::normalization(format!(
            "image has zero area ({}x{})",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| Error::normalization("image dimensions overflow"))
}

/// Normalizes a decoded image of any color type, taking it to be sRGB.
pub fn normalize(img: &DynamicImage) -> Result<Image> {
    normalize_with_profile(img, None)
}

/// Normalizes a decoded image whose pixels are in the color space of the
/// ICC profile `icc`. `None` means sRGB.
pub fn normalize_with_profile(img: &DynamicImage, icc: Option<&[u8]>) -> Result<Image> {
    let (width, height) = (img.width(), img.height());
    trace!(width, height, color = ?img.color(), tagged = icc.is_some(), "normalize");
    expected_len(width, height)?;
    let mut straight = img.to_rgba8().into_raw();
    if let Some(icc) = icc {
        profile::to_srgb(&mut straight, icc)?;
    }
    premultiplied(width, height, straight)
}

/// Normalizes a straight-alpha RGBA8 buffer.
pub fn normalize_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Image> {
    trace!(width, height, "normalize_rgba8");
    let expected = expected_len(width, height)?;
    if data.len() != expected {
        return Err(Error::normalization(format!(
            "expected {} bytes for {}x{} RGBA8, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    premultiplied(width, height, data.to_vec())
}

/// Normalizes a straight-alpha RGBA f32 buffer with channels in [0, 1].
///
/// Channels are quantized to 8 bits before premultiplication, so the
/// result matches [`normalize_rgba8`] on the quantized data.
pub fn normalize_rgba32f(width: u32, height: u32, data: &[f32]) -> Result<Image> {
    trace!(width, height, "normalize_rgba32f");
    let expected = expected_len(width, height)?;
    if data.len() != expected {
        return Err(Error::normalization(format!(
            "expected {} floats for {}x{} RGBA, got {}",
            expected,
            width,
            height,
            data.len()
        )));
    }
    let bytes = data.iter().map(|&v| quantize(v)).collect();
    premultiplied(width, height, bytes)
}

fn read<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<Image> {
    let mut decoder = reader
        .with_guessed_format()?
        .into_decoder()
        .map_err(map_image_error)?;
    let icc = decoder.icc_profile().map_err(map_image_error)?;
    let img = DynamicImage::from_decoder(decoder).map_err(map_image_error)?;
    normalize_with_profile(&img, icc.as_deref())
}

/// Decodes an encoded image (PNG) from memory and normalizes it, honoring
/// an embedded ICC profile.
pub fn decode(bytes: &[u8]) -> Result<Image> {
    read(ImageReader::new(Cursor::new(bytes)))
}

/// Reads an image file and normalizes it, honoring an embedded ICC profile.
pub fn load(path: impl AsRef<Path>) -> Result<Image> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading image");
    read(ImageReader::open(path)?)
}

fn to_rgba_image(img: &Image) -> Result<RgbaImage> {
    RgbaImage::from_raw(img.width(), img.height(), img.to_straight_rgba8())
        .ok_or_else(|| Error::normalization("buffer does not match image dimensions"))
}

/// Encodes an image as PNG (straight alpha).
pub fn encode_png(img: &Image) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    to_rgba_image(img)?
        .write_to(&mut out, ImageFormat::Png)
        .map_err(map_image_error)?;
    Ok(out.into_inner())
}

/// File output for canonical images.
pub trait ImageFileExt {
    /// Writes the image as a PNG file (straight alpha).
    fn save_png(&self, path: impl AsRef<Path>) -> Result<()>;
}

impl ImageFileExt for Image {
    fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), width = self.width(), height = self.height(), "saving png");
        to_rgba_image(self)?
            .save_with_format(path, ImageFormat::Png)
            .map_err(map_image_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn test_rgb_becomes_opaque() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])));
        let out = normalize(&img).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().iter().all(|&p| p == [10, 20, 30, 255]));
    }

    #[test]
    fn test_gray_expands() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([77])));
        let out = normalize(&img).unwrap();
        assert_eq!(out.pixel(1, 1), [77, 77, 77, 255]);
    }

    #[test]
    fn test_alpha_premultiplied() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 128])));
        let out = normalize(&img).unwrap();
        assert_eq!(
            out.pixel(0, 0),
            [premultiply(200, 128), premultiply(100, 128), premultiply(50, 128), 128]
        );
    }

    #[test]
    fn test_transparent_colors_collapse() {
        let a = normalize_rgba8(1, 1, &[255, 0, 0, 0]).unwrap();
        let b = normalize_rgba8(1, 1, &[0, 0, 255, 0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_buffer_length_checked() {
        let err = normalize_rgba8(2, 2, &[0; 15]).unwrap_err();
        assert!(matches!(err, Error::Normalization(_)));
        let err = normalize_rgba32f(2, 2, &[0.0; 4]).unwrap_err();
        assert!(matches!(err, Error::Normalization(_)));
    }

    #[test]
    fn test_zero_area() {
        assert!(normalize_rgba8(0, 3, &[]).unwrap_err().is_input_error());
    }

    #[test]
    fn test_float_matches_bytes() {
        let floats = [1.0, 0.5, 0.0, 1.0, 0.2, 0.4, 0.6, 0.5];
        let bytes: Vec<u8> = floats.iter().map(|&v| quantize(v)).collect();
        assert_eq!(
            normalize_rgba32f(2, 1, &floats).unwrap(),
            normalize_rgba8(2, 1, &bytes).unwrap()
        );
    }

    #[test]
    fn test_png_roundtrip_in_memory() {
        let img = normalize_rgba8(2, 1, &[255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let png = encode_png(&img).unwrap();
        assert_eq!(decode(&png).unwrap(), img);
    }

    fn tagged_png(pixel: [u8; 4], icc: Option<Vec<u8>>) -> Vec<u8> {
        use image::codecs::png::PngEncoder;
        use image::{ExtendedColorType, ImageEncoder};

        let mut out = Vec::new();
        let mut encoder = PngEncoder::new(&mut out);
        if let Some(icc) = icc {
            encoder.set_icc_profile(icc).unwrap();
        }
        encoder
            .write_image(&pixel.repeat(4), 2, 2, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn display_p3_icc() -> Vec<u8> {
        use lcms2::{CIExyY, CIExyYTRIPLE, Profile, ToneCurve};

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
    fn test_decode_converts_tagged_profile() {
        let plain = decode(&tagged_png([200, 100, 50, 255], None)).unwrap();
        assert_eq!(plain.pixel(1, 1), [200, 100, 50, 255]);

        let p3 = decode(&tagged_png([200, 100, 50, 255], Some(display_p3_icc()))).unwrap();
        let [r, _, b, a] = p3.pixel(1, 1);
        assert!(r > 205, "red {}", r);
        assert!(b < 45, "blue {}", b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_srgb_tag_matches_untagged() {
        let srgb = lcms2::Profile::new_srgb().icc().unwrap();
        let tagged = decode(&tagged_png([30, 140, 220, 255], Some(srgb))).unwrap();
        let plain = decode(&tagged_png([30, 140, 220, 255], None)).unwrap();
        for (t, p) in tagged.pixel(0, 0).iter().zip(plain.pixel(0, 0)) {
            assert!(t.abs_diff(p) <= 1);
        }
    }

    #[test]
    fn test_load_reads_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p3.png");
        std::fs::write(&path, tagged_png([200, 100, 50, 255], Some(display_p3_icc()))).unwrap();
        let img = load(&path).unwrap();
        assert!(img.pixel(0, 0)[0] > 205);
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode(b"not an image").unwrap_err();
        assert!(matches!(err, Error::Normalization(_)));
    }
}
