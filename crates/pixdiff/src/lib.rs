//! # pixdiff
//!
//! Perceptual and exact pixel-difference engine.
//!
//! Decides whether two equally-sized raster images are "the same" under a
//! tolerance [`Strategy`] and, when they are not, produces a difference
//! image highlighting where they diverge.
//!
//! # Architecture
//!
//! ```text
//!                      pixdiff
//!   (Strategy, normalize, profile, CompareConfig, Comparator)
//!                         |
//!          +--------------+--------------+
//!          |                             |
//!   pixdiff-compute                pixdiff-color
//!   (kernels, executors)     (sRGB -> Lab, CIEDE2000)
//!          |                             |
//!          +--------------+--------------+
//!                         |
//!                   pixdiff-core
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use pixdiff::{normalize_rgba8, CompareOptions, Comparator, MismatchColor, Strategy};
//!
//! let white = vec![255u8; 9 * 9 * 4];
//! let mut altered = white.clone();
//! altered[0..4].copy_from_slice(&[0, 0, 0, 255]);
//!
//! let lhs = normalize_rgba8(9, 9, &altered).unwrap();
//! let rhs = normalize_rgba8(9, 9, &white).unwrap();
//!
//! let options = CompareOptions::new(Strategy::PerceptualAbsolute { threshold: 0, delta_e: 2.0 })
//!     .color(MismatchColor::RED);
//! let verdict = Comparator::default().compare_with(&lhs, &rhs, &options).unwrap();
//!
//! assert!(!verdict.accepted);
//! assert_eq!(verdict.outcome.mismatch_count, 1);
//! assert_eq!(verdict.difference.unwrap().pixel(0, 0), [255, 0, 0, 255]);
//! ```
//!
//! # Strategies
//!
//! | Strategy               | Unit   | Mismatch when                       |
//! |------------------------|--------|-------------------------------------|
//! | `Exact`                | pixel  | any RGBA8 byte differs              |
//! | `Cluster`              | block  | any pixel in the block differs      |
//! | `Perceptual*`          | pixel  | CIEDE2000 above the tolerance       |
//!
//! A comparison is accepted when the mismatch count is at most the
//! threshold.

#![warn(missing_docs)]

pub mod comparator;
pub mod config;
pub mod normalize;
pub mod profile;
pub mod strategy;

pub use comparator::{CompareOptions, Comparator, Verdict};
pub use config::{ColorPreset, ColorSetting, CompareConfig};
pub use normalize::{
    decode, encode_png, load, normalize, normalize_rgba32f, normalize_rgba8, normalize_with_profile,
    ImageFileExt,
};
pub use strategy::{precision_to_delta_e, Strategy};

pub use pixdiff_color::{delta_e, to_lab, Lab};
pub use pixdiff_compute::{Backend, ExecutorConfig, KernelKind, KernelParams};
pub use pixdiff_core::{
    ComparisonOutcome, Error, Image, MismatchColor, MismatchMask, Result, Rgba, MAX_PIXELS,
};
