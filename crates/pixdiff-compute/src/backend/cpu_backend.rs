//! CPU backend using rayon for parallelization.

use rayon::prelude::*;
use tracing::trace;

use pixdiff_core::Image;

use super::primitives::{Accumulator, KernelPrimitives, Tally};
use super::tiling::{DispatchGrid, Limits};
use crate::kernel::ComparisonKernel;
use crate::{ComputeError, ComputeResult};

/// CPU primitives: one rayon task per threadgroup.
pub struct CpuPrimitives {
    limits: Limits,
}

impl CpuPrimitives {
    pub fn new() -> Self {
        Self {
            limits: Limits::detect(rayon::current_num_threads()),
        }
    }

    fn run(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
        record: bool,
    ) -> ComputeResult<(Tally, Option<Vec<bool>>)> {
        let acc = Accumulator::new(grid.units() as usize, record);
        trace!(
            groups = grid.group_count(),
            threads = self.limits.threads,
            "cpu::dispatch"
        );
        (0..grid.group_count())
            .into_par_iter()
            .for_each(|i| acc.run_group(grid, grid.group(i), kernel, lhs, rhs));
        Ok(acc.finish())
    }
}

impl Default for CpuPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelPrimitives for CpuPrimitives {
    fn dispatch_count(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<Tally> {
        self.run(grid, kernel, lhs, rhs, false).map(|(tally, _)| tally)
    }

    fn dispatch_record(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<(Tally, Vec<bool>)> {
        let (tally, mask) = self.run(grid, kernel, lhs, rhs, true)?;
        let mask = mask.ok_or_else(|| ComputeError::DispatchFailed("mask was not allocated".into()))?;
        Ok((tally, mask))
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}
