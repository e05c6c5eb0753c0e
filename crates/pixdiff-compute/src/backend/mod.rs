//! Execution backends.
//!
//! Provides a rayon backend and a single-threaded reference backend with
//! automatic selection.
//!
//! # Architecture
//!
//! ```text
//! Executor<P: KernelPrimitives>
//!     +-- CpuPrimitives    (rayon, one task per threadgroup)
//!     +-- ScalarPrimitives (calling thread, row-major group order)
//! ```
//!
//! Both backends share the same `Executor`, grid and aggregation rules, so
//! they return identical outcomes.

mod cpu_backend;
mod detect;
mod executor;
pub mod memory;
mod primitives;
mod scalar_backend;
mod tiling;

pub use cpu_backend::CpuPrimitives;
pub use detect::{describe_backends, detect_backends, select_best_backend, BackendInfo};
pub use executor::{DispatchOutput, Executor, ExecutorConfig};
pub use primitives::{Accumulator, KernelPrimitives, Tally};
pub use scalar_backend::ScalarPrimitives;
pub use tiling::{DispatchGrid, Limits, Threadgroup, THREADGROUP_SIZE};

use pixdiff_core::Image;

use crate::kernel::KernelParams;
use crate::{ComputeError, ComputeResult};

/// Available execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Backend {
    /// Auto-select best available (CPU > scalar).
    #[default]
    Auto,
    /// CPU backend using rayon for parallelization.
    Cpu,
    /// Single-threaded reference backend.
    Scalar,
}

impl Backend {
    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto => true,
            Self::Cpu | Self::Scalar => detect_backends()
                .iter()
                .any(|b| b.backend == *self && b.available),
        }
    }

    /// Get human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Scalar => "scalar",
        }
    }

    /// Parses a backend name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "cpu" | "rayon" => Some(Self::Cpu),
            "scalar" => Some(Self::Scalar),
            _ => None,
        }
    }
}

/// Executor type enum for dynamic dispatch.
pub enum AnyExecutor {
    Cpu(Executor<CpuPrimitives>),
    Scalar(Executor<ScalarPrimitives>),
}

impl AnyExecutor {
    /// Get backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu(e) => e.name(),
            Self::Scalar(e) => e.name(),
        }
    }

    /// Get host limits.
    pub fn limits(&self) -> &Limits {
        match self {
            Self::Cpu(e) => e.limits(),
            Self::Scalar(e) => e.limits(),
        }
    }

    /// Run a kernel over an image pair.
    pub fn execute(
        &self,
        lhs: &Image,
        rhs: &Image,
        params: &KernelParams,
        record: bool,
    ) -> ComputeResult<DispatchOutput> {
        match self {
            Self::Cpu(e) => e.execute(lhs, rhs, params, record),
            Self::Scalar(e) => e.execute(lhs, rhs, params, record),
        }
    }
}

/// Create an executor for the specified backend.
pub fn create_executor(backend: Backend) -> ComputeResult<AnyExecutor> {
    create_executor_with_config(backend, ExecutorConfig::default())
}

/// Executor on the highest-priority available backend.
///
/// Never fails: the scalar host is always available.
pub fn auto_executor(config: ExecutorConfig) -> AnyExecutor {
    match select_best_backend() {
        Backend::Scalar => AnyExecutor::Scalar(Executor::with_config(ScalarPrimitives::new(), config)),
        Backend::Auto | Backend::Cpu => {
            AnyExecutor::Cpu(Executor::with_config(CpuPrimitives::new(), config))
        }
    }
}

/// Create an executor with custom config.
///
/// An explicitly requested backend that is not available is an error;
/// only [`Backend::Auto`] selects.
pub fn create_executor_with_config(
    backend: Backend,
    config: ExecutorConfig,
) -> ComputeResult<AnyExecutor> {
    if !backend.is_available() {
        return Err(ComputeError::BackendNotAvailable(backend.name().to_string()));
    }
    match backend {
        Backend::Auto => Ok(auto_executor(config)),
        Backend::Cpu => Ok(AnyExecutor::Cpu(Executor::with_config(
            CpuPrimitives::new(),
            config,
        ))),
        Backend::Scalar => Ok(AnyExecutor::Scalar(Executor::with_config(
            ScalarPrimitives::new(),
            config,
        ))),
    }
}
