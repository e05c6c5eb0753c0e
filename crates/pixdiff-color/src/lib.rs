//! # pixdiff-color
//!
//! Perceptual color model used by the pixdiff perceptual kernel.
//!
//! ```text
//! Rgba (gamma sRGB, [0,1])
//!   |  srgb::decode
//!   v
//! linear RGB --SRGB_TO_XYZ--> XYZ (Y = 100) --D65--> Lab
//!                                                     |
//!                                          ciede2000::delta_e
//! ```
//!
//! Everything is single precision, and every guard in [`safe`] is applied
//! so that no pixel can produce a NaN.
//!
//! # Quick Start
//!
//! ```rust
//! use pixdiff_color::{delta_e_rgba, to_lab};
//! use pixdiff_core::Rgba;
//!
//! let a = Rgba::new(1.0, 1.0, 1.0, 1.0);
//! let b = Rgba::new(0.5, 0.5, 0.5, 1.0);
//!
//! assert!((to_lab(a).l - 100.0).abs() < 0.01);
//! assert!(delta_e_rgba(a, b) > 30.0);
//! ```

#![warn(missing_docs)]

pub mod ciede2000;
pub mod lab;
pub mod matrix;
pub mod safe;
pub mod srgb;

pub use ciede2000::{delta_e, delta_e_rgba};
pub use lab::{
    linear_rgb_to_lab, rgb_to_lab, rgb_to_xyz, to_lab, xyz_to_lab, Lab, D65_WHITE, SRGB_TO_XYZ,
};
pub use matrix::Mat3;
