//! Comparison kernels.
//!
//! A kernel describes its logical grid (one unit per pixel, or per block for
//! [`ClusterKernel`]) and evaluates a single unit. Executors own the
//! iteration, the bounds check and the aggregation, so kernels stay pure.

mod cache;
mod cluster;
mod exact;
mod perceptual;

pub use cache::{compiled, CompiledKernel};
pub use cluster::{ClusterKernel, MAX_BLOCK_SIZE};
pub use exact::ExactKernel;
pub use perceptual::{PerceptualKernel, MIN_DELTA_E};

use std::fmt;
use std::sync::Arc;

use pixdiff_core::Image;

use crate::{ComputeError, ComputeResult};

/// Kernel family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Byte-exact per-pixel comparison.
    Exact,
    /// Byte-exact comparison over square blocks.
    Cluster,
    /// CIEDE2000 comparison with a tolerance.
    Perceptual,
}

impl KernelKind {
    /// All kinds, in cache slot order.
    pub const ALL: [KernelKind; 3] = [Self::Exact, Self::Cluster, Self::Perceptual];

    /// Lowercase name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Cluster => "cluster",
            Self::Perceptual => "perceptual",
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved tolerance consumed by every kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// Kernel family.
    pub kind: KernelKind,
    /// Accepted mismatch count.
    pub threshold: u64,
    /// Maximum CIEDE2000 difference still counted as equal (perceptual only).
    pub tolerance: f32,
    /// Block edge in pixels (cluster only, 1 otherwise).
    pub block_size: u32,
}

impl KernelParams {
    /// Byte-exact comparison.
    pub fn exact(threshold: u64) -> Self {
        Self {
            kind: KernelKind::Exact,
            threshold,
            tolerance: 0.0,
            block_size: 1,
        }
    }

    /// Block comparison.
    pub fn cluster(threshold: u64, block_size: u32) -> Self {
        Self {
            kind: KernelKind::Cluster,
            threshold,
            tolerance: 0.0,
            block_size,
        }
    }

    /// Perceptual comparison with a CIEDE2000 tolerance.
    pub fn perceptual(threshold: u64, tolerance: f32) -> Self {
        Self {
            kind: KernelKind::Perceptual,
            threshold,
            tolerance,
            block_size: 1,
        }
    }

    /// Rejects parameters no kernel can run with.
    pub fn validate(&self) -> ComputeResult<()> {
        if self.kind == KernelKind::Cluster && !(1..=MAX_BLOCK_SIZE).contains(&self.block_size) {
            return Err(ComputeError::InvalidParams(format!(
                "block size {} outside 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.kind == KernelKind::Perceptual && !(self.tolerance >= 0.0) {
            return Err(ComputeError::InvalidParams(format!(
                "tolerance {} is negative or NaN",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Result of evaluating one logical unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitEval {
    /// Whether the unit counts as a mismatch.
    pub mismatch: bool,
    /// Color difference of the unit (0 for byte-exact kernels).
    pub delta_e: f32,
}

impl UnitEval {
    #[inline]
    pub fn exact(mismatch: bool) -> Self {
        Self {
            mismatch,
            delta_e: 0.0,
        }
    }
}

/// A data-parallel comparison over a logical grid.
///
/// `evaluate` is only called for in-bounds units and both images are
/// guaranteed to have the same dimensions.
pub trait ComparisonKernel: Send + Sync {
    /// Kernel family.
    fn kind(&self) -> KernelKind;

    /// Logical grid extent for an image of the given size.
    fn grid(&self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    /// Evaluates unit `(x, y)` of the logical grid.
    fn evaluate(&self, lhs: &Image, rhs: &Image, x: u32, y: u32) -> UnitEval;

    /// Pixel rectangle `(x0, y0, x1, y1)`, exclusive end, covered by a unit.
    fn footprint(&self, x: u32, y: u32, _width: u32, _height: u32) -> (u32, u32, u32, u32) {
        (x, y, x + 1, y + 1)
    }

    /// Whether the kernel reports a color difference aggregate.
    fn reports_delta_e(&self) -> bool {
        false
    }
}

/// Binds cached kernel state to per-call parameters.
pub fn bind(params: &KernelParams) -> ComputeResult<Box<dyn ComparisonKernel>> {
    params.validate()?;
    let compiled: Arc<CompiledKernel> = compiled(params.kind);
    Ok(match params.kind {
        KernelKind::Exact => Box::new(ExactKernel),
        KernelKind::Cluster => Box::new(ClusterKernel::new(params.block_size)),
        KernelKind::Perceptual => Box::new(PerceptualKernel::new(compiled, params.tolerance)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validate() {
        assert!(KernelParams::exact(0).validate().is_ok());
        assert!(KernelParams::cluster(0, 1).validate().is_ok());
        assert!(KernelParams::cluster(0, 7).validate().is_ok());
        assert!(KernelParams::cluster(0, 0).validate().is_err());
        assert!(KernelParams::cluster(0, 8).validate().is_err());
        assert!(KernelParams::perceptual(0, 0.0).validate().is_ok());
        assert!(KernelParams::perceptual(0, -1.0).validate().is_err());
        assert!(KernelParams::perceptual(0, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_bind_kinds() {
        assert_eq!(bind(&KernelParams::exact(0)).unwrap().kind(), KernelKind::Exact);
        assert_eq!(bind(&KernelParams::cluster(0, 3)).unwrap().kind(), KernelKind::Cluster);
        let k = bind(&KernelParams::perceptual(0, 2.0)).unwrap();
        assert_eq!(k.kind(), KernelKind::Perceptual);
        assert!(k.reports_delta_e());
    }
}
