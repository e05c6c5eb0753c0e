//! Byte-exact per-pixel kernel.

use pixdiff_core::Image;

use super::{ComparisonKernel, KernelKind, UnitEval};

/// Counts pixels whose RGBA8 bytes differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactKernel;

impl ComparisonKernel for ExactKernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Exact
    }

    #[inline]
    fn evaluate(&self, lhs: &Image, rhs: &Image, x: u32, y: u32) -> UnitEval {
        UnitEval::exact(lhs.pixel(x, y) != rhs.pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_channel_difference() {
        let a = Image::filled(2, 2, [10, 20, 30, 255]);
        let mut b = a.clone();
        b.set_pixel(1, 0, [10, 20, 30, 254]);

        let k = ExactKernel;
        assert!(!k.evaluate(&a, &b, 0, 0).mismatch);
        assert!(k.evaluate(&a, &b, 1, 0).mismatch);
        assert_eq!(k.evaluate(&a, &b, 1, 0).delta_e, 0.0);
        assert_eq!(k.grid(2, 2), (2, 2));
        assert_eq!(k.footprint(1, 0, 2, 2), (1, 0, 2, 1));
    }
}
