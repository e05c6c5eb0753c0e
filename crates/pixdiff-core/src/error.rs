//! Error types for pixdiff operations.
//!
//! Every failure of a comparison call is local and synchronous: the call
//! either produces a complete outcome or one of these errors. No partial or
//! degraded result is ever returned.
//!
//! # Categories
//!
//! - **Configuration**: [`Configuration`](Error::Configuration) - a strategy
//!   field outside its valid domain, detected before execution;
//!   [`Config`](Error::Config) - a malformed configuration document
//! - **Input**: [`UnsupportedInput`](Error::UnsupportedInput),
//!   [`DimensionMismatch`](Error::DimensionMismatch),
//!   [`Normalization`](Error::Normalization)
//! - **Execution**: [`Execution`](Error::Execution) - the parallel host failed
//! - **Decision**: [`ThresholdExceeded`](Error::ThresholdExceeded) - only
//!   produced when a rejected verdict is turned into a `Result`
//!
//! # Usage
//!
//! ```rust
//! use pixdiff_core::{Error, Result};
//!
//! fn check_block(block_size: u32) -> Result<()> {
//!     if !(1..=7).contains(&block_size) {
//!         return Err(Error::configuration(
//!             "cluster",
//!             "block_size",
//!             block_size,
//!             "1..=7",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_block(8).unwrap_err().is_configuration_error());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while comparing two images.
#[derive(Debug, Error)]
pub enum Error {
    /// A strategy field is outside its valid domain.
    ///
    /// Never retried; the message names the strategy, the offending field,
    /// the rejected value and the accepted bounds.
    #[error("invalid {field} for the .{strategy} strategy: got {value}, expected a value in {expected}")]
    Configuration {
        /// Strategy name (`exact`, `cluster`, `perceptual`, ...)
        strategy: &'static str,
        /// Offending field name
        field: &'static str,
        /// Rejected value, rendered for display
        value: String,
        /// Accepted range, rendered for display
        expected: String,
    },

    /// The pixel count is zero or reaches the execution ceiling.
    #[error("unsupported input: {pixels} pixels (supported range is 1..{limit})")]
    UnsupportedInput {
        /// Pixel count of the input
        pixels: u64,
        /// Exclusive upper bound
        limit: u64,
    },

    /// Images differ in width or height after normalization.
    ///
    /// Fatal for the call; images are never cropped or padded.
    #[error("snapshot size does not match: first size {a_width}x{a_height}, second size {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: u32,
        /// First image height
        a_height: u32,
        /// Second image width
        b_width: u32,
        /// Second image height
        b_height: u32,
    },

    /// Canonicalization could not produce a valid bitmap.
    #[error("failed to normalize image: {0}")]
    Normalization(String),

    /// The parallel execution host failed (resource exhaustion, missing backend).
    ///
    /// Surfaced verbatim; there is no silent fallback executor.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The mismatch count is above the accepted threshold.
    #[error("threshold exceeded: current difference ({difference}) is greater than the specified threshold ({threshold})")]
    ThresholdExceeded {
        /// Mismatch count reported by the kernel
        difference: u64,
        /// Accepted mismatch count
        threshold: u64,
    },

    /// A configuration document could not be parsed or serialized.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error while reading or writing an image file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates an [`Error::Configuration`] error.
    #[inline]
    pub fn configuration(
        strategy: &'static str,
        field: &'static str,
        value: impl ToString,
        expected: impl ToString,
    ) -> Self {
        Self::Configuration {
            strategy,
            field,
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Creates an [`Error::UnsupportedInput`] error.
    #[inline]
    pub fn unsupported_input(pixels: u64, limit: u64) -> Self {
        Self::UnsupportedInput { pixels, limit }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::Normalization`] error.
    #[inline]
    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    /// Creates an [`Error::Config`] error.
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an [`Error::Execution`] error.
    #[inline]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Returns `true` if this is a strategy configuration error.
    #[inline]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Config(_))
    }

    /// Returns `true` if the inputs themselves were rejected.
    #[inline]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedInput { .. } | Self::DimensionMismatch { .. } | Self::Normalization(_)
        )
    }

    /// Returns `true` if the images compared fine but differ too much.
    #[inline]
    pub fn is_threshold_exceeded(&self) -> bool {
        matches!(self, Self::ThresholdExceeded { .. })
    }
}
