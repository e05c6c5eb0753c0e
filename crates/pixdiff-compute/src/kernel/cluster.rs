//! Block kernel.
//!
//! The image is tiled by non-overlapping `block_size x block_size` blocks
//! starting at the origin. Blocks on the right and bottom edges are clipped
//! to the image, so the grid is `ceil(w / bs) x ceil(h / bs)`.

use pixdiff_core::Image;

use super::{ComparisonKernel, KernelKind, UnitEval};

/// Largest supported block edge.
pub const MAX_BLOCK_SIZE: u32 = 7;

/// Counts blocks containing at least one byte-different pixel.
#[derive(Debug, Clone, Copy)]
pub struct ClusterKernel {
    block_size: u32,
}

impl ClusterKernel {
    /// Creates a block kernel. `block_size` must be at least 1.
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Block edge in pixels.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl ComparisonKernel for ClusterKernel {
    fn kind(&self) -> KernelKind {
        KernelKind::Cluster
    }

    fn grid(&self, width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(self.block_size), height.div_ceil(self.block_size))
    }

    fn evaluate(&self, lhs: &Image, rhs: &Image, x: u32, y: u32) -> UnitEval {
        let (x0, y0, x1, y1) = self.footprint(x, y, lhs.width(), lhs.height());
        let differs = (y0..y1).any(|py| (x0..x1).any(|px| lhs.pixel(px, py) != rhs.pixel(px, py)));
        UnitEval::exact(differs)
    }

    fn footprint(&self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x0 = x * self.block_size;
        let y0 = y * self.block_size;
        (
            x0,
            y0,
            (x0 + self.block_size).min(width),
            (y0 + self.block_size).min(height),
        )
    }
}
