//! Comparison kernels and the parallel execution host for pixdiff.
//!
//! Kernels are plain data-parallel functions over a logical grid (pixels,
//! or blocks for the cluster kernel). An executor covers that grid with
//! 16x16 threadgroups and hands them to a [`KernelPrimitives`]
//! implementation, which folds per-group counts into shared atomics.
//!
//! # Architecture
//!
//! ```text
//! Executor<P: KernelPrimitives>
//!     +-- kernel cache (OnceLock per KernelKind)
//!     +-- CpuPrimitives    (rayon)
//!     +-- ScalarPrimitives (single thread, reference order)
//!
//! ComparisonKernel
//!     +-- ExactKernel
//!     +-- ClusterKernel
//!     +-- PerceptualKernel (CIEDE2000)
//! ```
//!
//! # Example
//!
//! ```rust
//! use pixdiff_compute::{create_executor, Backend, KernelParams};
//! use pixdiff_core::Image;
//!
//! let a = Image::filled(9, 9, [255, 255, 255, 255]);
//! let b = Image::filled(9, 9, [0, 0, 0, 255]);
//!
//! let exec = create_executor(Backend::Auto).unwrap();
//! let run = exec.execute(&a, &b, &KernelParams::exact(0), false).unwrap();
//! assert_eq!(run.outcome.mismatch_count, 81);
//! ```

pub mod backend;
pub mod kernel;
pub mod synthesize;

pub use backend::{
    auto_executor, create_executor, create_executor_with_config, describe_backends, detect_backends,
    select_best_backend, AnyExecutor, Backend, BackendInfo, CpuPrimitives, DispatchGrid,
    DispatchOutput, Executor, ExecutorConfig, KernelPrimitives, Limits, ScalarPrimitives,
    THREADGROUP_SIZE,
};
pub use kernel::{
    ClusterKernel, ComparisonKernel, CompiledKernel, ExactKernel, KernelKind, KernelParams,
    PerceptualKernel, UnitEval,
};
pub use synthesize::synthesize;

use thiserror::Error;

/// Execution host errors.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Image size mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        a_width: u32,
        a_height: u32,
        b_width: u32,
        b_height: u32,
    },

    #[error("Invalid kernel parameters: {0}")]
    InvalidParams(String),

    #[error("Dispatch needs {required} bytes but the memory budget is {budget} bytes")]
    OutOfMemory { required: u64, budget: u64 },

    #[error("Unsupported input: {pixels} pixels (limit {limit})")]
    UnsupportedInput { pixels: u64, limit: u64 },

    #[error("Kernel dispatch failed: {0}")]
    DispatchFailed(String),
}

impl ComputeError {
    pub(crate) fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }
}

pub type ComputeResult<T> = Result<T, ComputeError>;

impl From<ComputeError> for pixdiff_core::Error {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::DimensionMismatch {
                a_width,
                a_height,
                b_width,
                b_height,
            } => pixdiff_core::Error::dimension_mismatch((a_width, a_height), (b_width, b_height)),
            ComputeError::UnsupportedInput { pixels, limit } => {
                pixdiff_core::Error::unsupported_input(pixels, limit)
            }
            other => pixdiff_core::Error::execution(other.to_string()),
        }
    }
}
