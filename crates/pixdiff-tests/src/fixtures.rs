//! Reference image pairs.
//!
//! All fixtures are 9x9 so every strategy sees the same 81-pixel total.

use pixdiff_core::Image;

/// Side length of every fixture.
pub const SIZE: u32 = 9;

/// Pixels changed by [`altered`].
pub const ALTERED_PIXELS: [(u32, u32); 3] = [(1, 1), (4, 4), (7, 7)];

/// Opaque white.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];
/// Opaque mid gray.
pub const GRAY: [u8; 4] = [128, 128, 128, 255];
/// Opaque black.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Solid 9x9 image.
pub fn solid(pixel: [u8; 4]) -> Image {
    Image::filled(SIZE, SIZE, pixel)
}

/// White image with three black pixels on the diagonal.
pub fn altered() -> Image {
    let mut img = solid(WHITE);
    for (x, y) in ALTERED_PIXELS {
        img.set_pixel(x, y, BLACK);
    }
    img
}

/// Straight-alpha RGBA8 bytes of a horizontal gradient.
pub fn gradient_rgba8(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _y in 0..height {
        for x in 0..width {
            let v = (x * 255 / (width - 1).max(1)).min(255) as u8;
            data.extend_from_slice(&[v, 255 - v, v / 2, 255]);
        }
    }
    data
}
