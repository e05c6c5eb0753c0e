//! # pixdiff-core
//!
//! Core types for the pixdiff image-comparison engine.
//!
//! - [`Image`] - canonical RGBA8 premultiplied buffer that kernels compare
//! - [`Rgba`], [`MismatchColor`] - pixel and overlay color
//! - [`MismatchMask`] - boolean grid marking mismatching pixels
//! - [`ComparisonOutcome`] - aggregate result of a kernel pass
//! - [`Error`], [`Result`] - failure taxonomy shared by all crates
//!
//! ## Crate Structure
//!
//! ```text
//! pixdiff-core (this crate)
//!    ^
//!    +-- pixdiff-color   (sRGB -> Lab, CIEDE2000)
//!    +-- pixdiff-compute (kernels, executors, diff synthesis)
//!    +-- pixdiff         (strategies, normalization, comparator)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for [`MismatchColor`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod image;
pub mod mask;
pub mod outcome;
pub mod pixel;

pub use error::{Error, Result};
pub use image::{check_pixel_count, premultiply, Image, BYTES_PER_PIXEL, MAX_PIXELS};
pub use mask::MismatchMask;
pub use outcome::ComparisonOutcome;
pub use pixel::{quantize, MismatchColor, Rgba};
