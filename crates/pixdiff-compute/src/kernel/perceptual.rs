//! CIEDE2000 kernel.
//!
//! Channels are read as `value / 255` straight from the canonical buffer,
//! so colors are compared premultiplied. A pixel mismatches when its
//! difference exceeds the tolerance and the noise floor [`MIN_DELTA_E`].

use std::sync::Arc;

use pixdiff_color::{delta_e, linear_rgb_to_lab, Lab};
use pixdiff_core::Image;

use super::{CompiledKernel, ComparisonKernel, KernelKind, UnitEval};

/// Differences at or below this value are treated as float noise.
pub const MIN_DELTA_E: f32 = 1e-5;

/// Counts pixels whose CIEDE2000 difference exceeds a tolerance.
#[derive(Debug, Clone)]
pub struct PerceptualKernel {
    compiled: Arc<CompiledKernel>,
    tolerance: f32,
}

impl PerceptualKernel {
    pub fn new(compiled: Arc<CompiledKernel>, tolerance: f32) -> Self {
        Self {
            compiled,
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    #[inline]
    fn lab(&self, px: [u8; 4]) -> Lab {
        let k = &self.compiled;
        linear_rgb_to_lab([k.linear(px[0]), k.linear(px[1]), k.linear(px[2])])
    }

    /// Difference between two canonical pixels.
    #[inline]
    pub fn pixel_delta(&self, a: [u8; 4], b: [u8; 4]) -> f32 {
        delta_e(self.lab(a), self.lab(b))
    }
}

impl ComparisonKernel for PerceptualKernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Perceptual
    }

    #[inline]
    fn evaluate(&self, lhs: &Image, rhs: &Image, x: u32, y: u32) -> UnitEval {
        let de = self.pixel_delta(lhs.pixel(x, y), rhs.pixel(x, y));
        UnitEval {
            mismatch: de > self.tolerance && de > MIN_DELTA_E,
            delta_e: de,
        }
    }

    fn reports_delta_e(&self) -> bool {
        true
    }
}
