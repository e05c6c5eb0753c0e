//! Difference image synthesis.

use tracing::trace;

use pixdiff_core::{Image, MismatchColor, MismatchMask};

use crate::{ComputeError, ComputeResult};

/// Paints `overlay` (opaque) over every masked pixel of `image`.
///
/// Unmasked pixels keep their original canonical value.
///
/// # Errors
///
/// [`ComputeError::DimensionMismatch`] if mask and image sizes differ.
///
/// # Example
///
/// ```rust
/// use pixdiff_compute::synthesize;
/// use pixdiff_core::{Image, MismatchColor, MismatchMask};
///
/// let img = Image::filled(2, 1, [255, 255, 255, 255]);
/// let mut mask = MismatchMask::new(2, 1);
/// mask.set(1, 0, true);
///
/// let diff = synthesize(&img, &mask, MismatchColor::RED).unwrap();
/// assert_eq!(diff.pixel(0, 0), [255, 255, 255, 255]);
/// assert_eq!(diff.pixel(1, 0), [255, 0, 0, 255]);
/// ```
pub fn synthesize(image: &Image, mask: &MismatchMask, overlay: MismatchColor) -> ComputeResult<Image> {
    trace!(
        width = image.width(),
        height = image.height(),
        overlay = %overlay,
        "synthesize"
    );
    if image.dimensions() != mask.dimensions() {
        return Err(ComputeError::dimension_mismatch(image.dimensions(), mask.dimensions()));
    }

    let color = overlay.to_rgba8();
    let mut out = image.clone();
    for (px, &hit) in out.pixels_mut().iter_mut().zip(mask.as_slice()) {
        if hit {
            *px = color;
        }
    }
    Ok(out)
}
