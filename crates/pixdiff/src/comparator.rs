//! Comparison façade.
//!
//! # Flow
//!
//! ```text
//! compare_with(lhs, rhs, options)
//!     |
//!     +-- same size?                 -> DimensionMismatch
//!     +-- 0 < pixels < MAX_PIXELS?   -> UnsupportedInput
//!     +-- strategy.resolve(pixels)   -> Configuration
//!     +-- counting pass              -> ComparisonOutcome
//!     +-- accepted? done
//!     +-- record_difference? recording pass + synthesize(lhs)
//! ```

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, trace};

use pixdiff_compute::{
    auto_executor, create_executor_with_config, synthesize, AnyExecutor, Backend, ExecutorConfig,
};
use pixdiff_core::{check_pixel_count, ComparisonOutcome, Error, Image, MismatchColor, Result};

use crate::normalize::{load, normalize};
use crate::strategy::Strategy;

/// Per-call comparison options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    /// Tolerance strategy.
    pub strategy: Strategy,
    /// Overlay color for the difference image.
    pub color: MismatchColor,
    /// Produce a difference image when the comparison is rejected.
    pub record_difference: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            color: MismatchColor::default(),
            record_difference: true,
        }
    }
}

impl CompareOptions {
    /// Options for `strategy` with default color and recording.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Sets the overlay color.
    pub fn color(mut self, color: MismatchColor) -> Self {
        self.color = color;
        self
    }

    /// Enables or disables the difference image.
    pub fn record_difference(mut self, record: bool) -> Self {
        self.record_difference = record;
        self
    }
}

/// Decision of one comparison.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Kernel aggregate.
    pub outcome: ComparisonOutcome,
    /// Accepted mismatch count.
    pub threshold: u64,
    /// `outcome.mismatch_count <= threshold`.
    pub accepted: bool,
    /// Difference image; only set when rejected and recording was requested.
    pub difference: Option<Image>,
}

impl Verdict {
    /// Mismatch count reported by the kernel.
    pub fn difference_count(&self) -> u64 {
        self.outcome.mismatch_count
    }

    /// Turns a rejection into [`Error::ThresholdExceeded`].
    pub fn into_result(self) -> Result<Self> {
        if self.accepted {
            Ok(self)
        } else {
            Err(Error::ThresholdExceeded {
                difference: self.outcome.mismatch_count,
                threshold: self.threshold,
            })
        }
    }
}

/// Compares image pairs on one execution backend.
///
/// # Example
///
/// ```rust
/// use pixdiff::{Backend, Comparator, Image, Strategy};
///
/// let a = Image::filled(9, 9, [255, 255, 255, 255]);
/// let mut b = a.clone();
/// b.set_pixel(4, 4, [0, 0, 0, 255]);
///
/// let cmp = Comparator::new(Backend::Auto).unwrap();
/// let verdict = cmp.compare(&a, &b, &Strategy::Exact { threshold: 1 }).unwrap();
/// assert!(verdict.accepted);
/// assert_eq!(verdict.outcome.mismatch_count, 1);
/// ```
pub struct Comparator {
    executor: AnyExecutor,
}

impl Default for Comparator {
    /// Comparator on the automatically selected backend.
    fn default() -> Self {
        Self::from_executor(auto_executor(ExecutorConfig::default()))
    }
}

impl Comparator {
    /// Creates a comparator on `backend`.
    ///
    /// # Errors
    ///
    /// [`Error::Execution`] if an explicitly requested backend is not
    /// available.
    pub fn new(backend: Backend) -> Result<Self> {
        Self::with_config(backend, ExecutorConfig::default())
    }

    /// Creates a comparator with a custom executor configuration.
    pub fn with_config(backend: Backend, config: ExecutorConfig) -> Result<Self> {
        Ok(Self::from_executor(create_executor_with_config(backend, config)?))
    }

    fn from_executor(executor: AnyExecutor) -> Self {
        debug!(backend = executor.name(), "comparator ready");
        Self { executor }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Compares two canonical images without producing a difference image.
    pub fn compare(&self, lhs: &Image, rhs: &Image, strategy: &Strategy) -> Result<Verdict> {
        self.compare_with(lhs, rhs, &CompareOptions::new(*strategy).record_difference(false))
    }

    /// Compares two canonical images.
    ///
    /// The difference image, when produced, is `lhs` with every mismatching
    /// pixel (or block) painted in the overlay color.
    pub fn compare_with(&self, lhs: &Image, rhs: &Image, options: &CompareOptions) -> Result<Verdict> {
        let (width, height) = lhs.dimensions();
        trace!(
            width,
            height,
            strategy = options.strategy.name(),
            record = options.record_difference,
            "comparator::compare"
        );

        lhs.ensure_same_size(rhs)?;
        let total = check_pixel_count(width, height)?;
        let params = options.strategy.resolve(total)?;
        if options.record_difference && !options.color.is_valid() {
            return Err(Error::configuration(
                options.strategy.name(),
                "color",
                options.color,
                "components in 0.0..=1.0",
            ));
        }

        let run = self.executor.execute(lhs, rhs, &params, false)?;
        let outcome = run.outcome;
        let accepted = outcome.accepts(params.threshold);
        debug!(
            difference = outcome.mismatch_count,
            ratio = outcome.mismatch_ratio(),
            threshold = params.threshold,
            accepted,
            "comparison decided"
        );

        let difference = if !accepted && options.record_difference {
            let recorded = self.executor.execute(lhs, rhs, &params, true)?;
            let mask = recorded
                .mask
                .ok_or_else(|| Error::execution("recording pass returned no mask"))?;
            Some(synthesize(lhs, &mask, options.color)?)
        } else {
            None
        };

        Ok(Verdict {
            outcome,
            threshold: params.threshold,
            accepted,
            difference,
        })
    }

    /// Normalizes two decoded images and compares them.
    pub fn compare_dynamic(
        &self,
        lhs: &DynamicImage,
        rhs: &DynamicImage,
        options: &CompareOptions,
    ) -> Result<Verdict> {
        let lhs = normalize(lhs)?;
        let rhs = normalize(rhs)?;
        self.compare_with(&lhs, &rhs, options)
    }

    /// Loads, normalizes and compares two image files.
    pub fn compare_files(
        &self,
        lhs: impl AsRef<Path>,
        rhs: impl AsRef<Path>,
        options: &CompareOptions,
    ) -> Result<Verdict> {
        let lhs = load(lhs)?;
        let rhs = load(rhs)?;
        self.compare_with(&lhs, &rhs, options)
    }
}
