//! Single-threaded reference backend.
//!
//! Visits threadgroups in row-major order on the calling thread. Results
//! are identical to the rayon backend; only scheduling differs.

use pixdiff_core::Image;

use super::primitives::{Accumulator, KernelPrimitives, Tally};
use super::tiling::{DispatchGrid, Limits};
use crate::kernel::ComparisonKernel;
use crate::{ComputeError, ComputeResult};

/// Sequential primitives.
pub struct ScalarPrimitives {
    limits: Limits,
}

impl ScalarPrimitives {
    pub fn new() -> Self {
        Self {
            limits: Limits::detect(1),
        }
    }

    fn run(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
        record: bool,
    ) -> (Tally, Option<Vec<bool>>) {
        let acc = Accumulator::new(grid.units() as usize, record);
        for i in 0..grid.group_count() {
            acc.run_group(grid, grid.group(i), kernel, lhs, rhs);
        }
        acc.finish()
    }
}

impl Default for ScalarPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelPrimitives for ScalarPrimitives {
    fn dispatch_count(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<Tally> {
        Ok(self.run(grid, kernel, lhs, rhs, false).0)
    }

    fn dispatch_record(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<(Tally, Vec<bool>)> {
        match self.run(grid, kernel, lhs, rhs, true) {
            (tally, Some(mask)) => Ok((tally, mask)),
            (_, None) => Err(ComputeError::DispatchFailed("mask was not allocated".into())),
        }
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "scalar"
    }
}
