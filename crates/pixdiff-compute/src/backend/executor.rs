//! Kernel executor shared by all backends.
//!
//! # Flow
//!
//! ```text
//! Executor<P: KernelPrimitives>::execute(lhs, rhs, params, record)
//!     |
//!     +-- size + pixel ceiling checks
//!     +-- kernel::bind(params)      (cached compiled state)
//!     +-- DispatchGrid over the kernel's logical grid
//!     +-- memory budget check
//!     +-- P::dispatch_count / P::dispatch_record
//!     +-- unit mask -> per-pixel MismatchMask
//! ```

use tracing::{debug, trace};

use pixdiff_core::{ComparisonOutcome, Image, MismatchMask, MAX_PIXELS};

use super::memory::{dispatch_memory, format_bytes};
use super::primitives::KernelPrimitives;
use super::tiling::{DispatchGrid, Limits, THREADGROUP_SIZE};
use crate::kernel::{self, ComparisonKernel, KernelParams};
use crate::{ComputeError, ComputeResult};

/// Executor configuration.
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    /// Threadgroup edge.
    pub group_size: u32,
    /// Memory budget override in bytes (None = environment / system).
    pub memory_budget: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            group_size: THREADGROUP_SIZE,
            memory_budget: None,
        }
    }
}

/// Result of one kernel run.
#[derive(Debug, Clone)]
pub struct DispatchOutput {
    /// Aggregate counts.
    pub outcome: ComparisonOutcome,
    /// Per-pixel mismatch mask, present for recording runs.
    pub mask: Option<MismatchMask>,
}

/// Runs comparison kernels on a [`KernelPrimitives`] host.
pub struct Executor<P: KernelPrimitives> {
    primitives: P,
    config: ExecutorConfig,
}

impl<P: KernelPrimitives> Executor<P> {
    /// Create new executor with default config.
    pub fn new(primitives: P) -> Self {
        Self::with_config(primitives, ExecutorConfig::default())
    }

    /// Create with custom config.
    pub fn with_config(primitives: P, config: ExecutorConfig) -> Self {
        Self { primitives, config }
    }

    /// Host limits.
    pub fn limits(&self) -> &Limits {
        self.primitives.limits()
    }

    /// Backend name.
    pub fn name(&self) -> &'static str {
        self.primitives.name()
    }

    /// Executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Reference to the inner primitives.
    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    /// Host limits with the configured memory budget applied.
    pub fn effective_limits(&self) -> Limits {
        let limits = *self.primitives.limits();
        match self.config.memory_budget {
            Some(bytes) => limits.with_memory(bytes),
            None => limits,
        }
    }

    /// Runs the kernel described by `params` over an image pair.
    ///
    /// With `record` set, the output carries a per-pixel mask; for the
    /// cluster kernel every pixel of a mismatching block is marked.
    pub fn execute(
        &self,
        lhs: &Image,
        rhs: &Image,
        params: &KernelParams,
        record: bool,
    ) -> ComputeResult<DispatchOutput> {
        let (width, height) = lhs.dimensions();
        trace!(
            width,
            height,
            kind = params.kind.name(),
            record,
            backend = self.name(),
            "executor::execute"
        );

        if lhs.dimensions() != rhs.dimensions() {
            return Err(ComputeError::dimension_mismatch(lhs.dimensions(), rhs.dimensions()));
        }
        let pixels = width as u64 * height as u64;
        if pixels == 0 || pixels >= MAX_PIXELS {
            return Err(ComputeError::UnsupportedInput {
                pixels,
                limit: MAX_PIXELS,
            });
        }

        let kernel = kernel::bind(params)?;
        let (gw, gh) = kernel.grid(width, height);
        let grid = DispatchGrid::with_group_size(gw, gh, self.config.group_size);

        let required = dispatch_memory(pixels, grid.units(), record);
        let limits = self.effective_limits();
        if !limits.fits_memory(required) {
            return Err(ComputeError::OutOfMemory {
                required,
                budget: limits.available_memory,
            });
        }
        debug!(
            units = grid.units(),
            groups = grid.group_count(),
            working_set = %format_bytes(required),
            "dispatch planned"
        );

        let (tally, mask) = if record {
            let (tally, units) =
                self.primitives
                    .dispatch_record(&grid, kernel.as_ref(), lhs, rhs)?;
            (tally, Some(expand_mask(kernel.as_ref(), &grid, units, width, height)?))
        } else {
            let tally = self
                .primitives
                .dispatch_count(&grid, kernel.as_ref(), lhs, rhs)?;
            (tally, None)
        };

        let mut outcome = ComparisonOutcome::new(tally.mismatches, grid.units());
        if kernel.reports_delta_e() {
            outcome = outcome.with_max_delta_e(tally.max_delta_e);
        }
        debug!(
            mismatches = outcome.mismatch_count,
            units = outcome.units,
            max_delta_e = ?outcome.max_delta_e,
            "dispatch finished"
        );

        Ok(DispatchOutput { outcome, mask })
    }
}

fn expand_mask(
    kernel: &dyn ComparisonKernel,
    grid: &DispatchGrid,
    units: Vec<bool>,
    width: u32,
    height: u32,
) -> ComputeResult<MismatchMask> {
    if units.len() as u64 != grid.units() {
        return Err(ComputeError::DispatchFailed(format!(
            "mask has {} entries for {} units",
            units.len(),
            grid.units()
        )));
    }
    // One unit per pixel: the unit mask already is the pixel mask.
    if (grid.width, grid.height) == (width, height) {
        return MismatchMask::from_bits(width, height, units)
            .map_err(|e| ComputeError::DispatchFailed(e.to_string()));
    }
    let mut mask = MismatchMask::new(width, height);
    for uy in 0..grid.height {
        for ux in 0..grid.width {
            if !units[grid.index(ux, uy)] {
                continue;
            }
            let (x0, y0, x1, y1) = kernel.footprint(ux, uy, width, height);
            for y in y0..y1 {
                for x in x0..x1 {
                    mask.set(x, y, true);
                }
            }
        }
    }
    Ok(mask)
}
