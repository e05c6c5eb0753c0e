//! Guarded arithmetic for the color-difference kernel.
//!
//! A single NaN or infinity coming out of one pixel would poison the
//! comparison it feeds, so the degenerate cases are mapped to finite values:
//!
//! | operation     | degenerate input            | result                     |
//! |---------------|-----------------------------|----------------------------|
//! | [`safe_sqrt`] | `x < 0`                     | `sqrt(|x|) * eps`          |
//! | [`safe_div`]  | `|den| <= eps`              | `f32::MAX` signed like num |
//! | [`safe_atan2`]| `|y| < eps` and `|x| < eps` | `eps`                      |
//!
//! For every other input the functions are identical to their std versions.

/// Guard threshold shared by all safe operations.
pub const EPS: f32 = 1e-6;

/// Square root that never returns NaN.
#[inline]
pub fn safe_sqrt(x: f32) -> f32 {
    if x >= 0.0 {
        x.sqrt()
    } else {
        x.abs().sqrt() * EPS
    }
}

/// Division that never returns NaN or infinity for a finite numerator.
#[inline]
pub fn safe_div(num: f32, den: f32) -> f32 {
    if den.abs() > EPS {
        num / den
    } else {
        f32::MAX.copysign(num)
    }
}

/// `atan2` with a fixed small angle at the origin.
#[inline]
pub fn safe_atan2(y: f32, x: f32) -> f32 {
    if y.abs() < EPS && x.abs() < EPS {
        EPS
    } else {
        y.atan2(x)
    }
}
