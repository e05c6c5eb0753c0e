//! Dispatch primitives shared by all execution hosts.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use pixdiff_core::Image;

use super::tiling::{DispatchGrid, Limits, Threadgroup};
use crate::kernel::ComparisonKernel;
use crate::ComputeResult;

/// Aggregate of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tally {
    /// Mismatching units.
    pub mismatches: u64,
    /// Largest unit difference seen.
    pub max_delta_e: f32,
}

/// Shared sink that threadgroups fold their local results into.
///
/// The count is an `AtomicU64` updated with relaxed `fetch_add`. The max
/// difference is kept as IEEE bits in an `AtomicU32`; for non-negative
/// floats bit order equals numeric order, so `fetch_max` is exact.
pub struct Accumulator {
    count: AtomicU64,
    max_bits: AtomicU32,
    mask: Option<Vec<AtomicBool>>,
}

impl Accumulator {
    /// Creates a sink, optionally with one mask slot per unit.
    pub fn new(units: usize, record: bool) -> Self {
        Self {
            count: AtomicU64::new(0),
            max_bits: AtomicU32::new(0),
            mask: record.then(|| (0..units).map(|_| AtomicBool::new(false)).collect()),
        }
    }

    /// Evaluates every in-bounds invocation of `group` and folds the result.
    pub fn run_group(
        &self,
        grid: &DispatchGrid,
        group: Threadgroup,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) {
        let mut local = 0u64;
        let mut local_max = 0.0f32;
        grid.for_each_invocation(group, |x, y| {
            let eval = kernel.evaluate(lhs, rhs, x, y);
            if eval.mismatch {
                local += 1;
                if let Some(mask) = &self.mask {
                    mask[grid.index(x, y)].store(true, Ordering::Relaxed);
                }
            }
            if eval.delta_e > local_max {
                local_max = eval.delta_e;
            }
        });
        if local > 0 {
            self.count.fetch_add(local, Ordering::Relaxed);
        }
        if local_max > 0.0 {
            self.max_bits.fetch_max(local_max.to_bits(), Ordering::Relaxed);
        }
    }

    /// Reads the folded totals.
    pub fn tally(&self) -> Tally {
        Tally {
            mismatches: self.count.load(Ordering::Relaxed),
            max_delta_e: f32::from_bits(self.max_bits.load(Ordering::Relaxed)),
        }
    }

    /// Consumes the sink, returning the totals and the per-unit mask.
    pub fn finish(self) -> (Tally, Option<Vec<bool>>) {
        let tally = self.tally();
        let mask = self
            .mask
            .map(|m| m.into_iter().map(AtomicBool::into_inner).collect());
        (tally, mask)
    }
}

/// Core dispatch operations of an execution host.
///
/// Implementations decide how threadgroups are scheduled; the grid, the
/// bounds check and the aggregation rules are fixed by [`Accumulator`].
pub trait KernelPrimitives: Send + Sync {
    /// Runs `kernel` over `grid` and returns the aggregate only.
    fn dispatch_count(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<Tally>;

    /// Runs `kernel` over `grid` and also returns a per-unit mismatch mask
    /// in row-major order.
    fn dispatch_record(
        &self,
        grid: &DispatchGrid,
        kernel: &dyn ComparisonKernel,
        lhs: &Image,
        rhs: &Image,
    ) -> ComputeResult<(Tally, Vec<bool>)>;

    /// Host limits.
    fn limits(&self) -> &Limits;

    /// Backend name.
    fn name(&self) -> &'static str;
}
