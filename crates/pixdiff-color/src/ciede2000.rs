//! CIEDE2000 color difference.
//!
//! Compact single-precision formulation with unit weighting factors
//! (`kL = kC = kH = 1`). Every sqrt, division and atan2 goes through the
//! guards in [`crate::safe`], so the result is finite for any finite input.
//!
//! # Reference
//!
//! Sharma, Wu, Dalal: "The CIEDE2000 Color-Difference Formula:
//! Implementation Notes, Supplementary Test Data, and Mathematical
//! Observations" (2005)

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::lab::{to_lab, Lab};
use crate::safe::{safe_atan2, safe_div, safe_sqrt};
use pixdiff_core::Rgba;

/// 25^7, the chroma pivot of the G and R_T terms.
const POW25_7: f32 = 6_103_515_625.0;

/// Width of the band around pi in which a hue difference snaps to pi.
const HUE_SNAP: f32 = 1e-14;

#[inline]
fn hypot(a: f32, b: f32) -> f32 {
    (a * a + b * b).sqrt()
}

/// CIEDE2000 difference between two Lab colors.
///
/// Non-negative and symmetric; identical inputs give exactly `0.0`.
///
/// # Example
///
/// ```rust
/// use pixdiff_color::{delta_e, Lab};
///
/// let de = delta_e(Lab::new(50.0, 2.6772, -79.7751), Lab::new(50.0, 0.0, -82.7485));
/// assert!((de - 2.0425).abs() < 1e-3);
/// ```
pub fn delta_e(lab1: Lab, lab2: Lab) -> f32 {
    let Lab { l: l1, a: a1, b: b1 } = lab1;
    let Lab { l: l2, a: a2, b: b2 } = lab2;

    // a* rescale factor (1 + G)
    let n = ((hypot(a1, b1) + hypot(a2, b2)) * 0.5).powi(7);
    let n = 1.0 + 0.5 * (1.0 - safe_sqrt(n / (n + POW25_7)));

    let c1 = hypot(a1 * n, b1);
    let c2 = hypot(a2 * n, b2);

    let mut h1 = safe_atan2(b1, a1 * n);
    let mut h2 = safe_atan2(b2, a2 * n);
    if h1 < 0.0 {
        h1 += TAU;
    }
    if h2 < 0.0 {
        h2 += TAU;
    }

    let mut delta_h = (h2 - h1).abs();
    if delta_h > PI - HUE_SNAP && delta_h < PI + HUE_SNAP {
        delta_h = PI;
    }

    let mut h_m = 0.5 * h1 + 0.5 * h2;
    let mut h_d = (h2 - h1) * 0.5;
    if delta_h > PI {
        h_d += if h_d > 0.0 { -PI } else { PI };
        h_m += PI;
    }

    let c_avg = ((c1 + c2) * 0.5).powi(7);
    let p = 36.0 * h_m - 55.0 * PI;
    let r_t = -2.0
        * safe_sqrt(c_avg / (c_avg + POW25_7))
        * (PI / 3.0 * (p * p / (-25.0 * PI * PI)).exp()).sin();

    let l_avg = (l1 + l2) * 0.5 - 50.0;
    let l_avg = l_avg * l_avg;
    let l_diff = safe_div(l2 - l1, 1.0 + 0.015 * l_avg / safe_sqrt(20.0 + l_avg));

    let t = 1.0 + 0.24 * (2.0 * h_m + FRAC_PI_2).sin() + 0.32 * (3.0 * h_m + 8.0 * PI / 15.0).sin()
        - 0.17 * (h_m + PI / 3.0).sin()
        - 0.20 * (4.0 * h_m + 3.0 * FRAC_PI_2 / 10.0).sin();

    let h_diff = safe_div(
        2.0 * safe_sqrt(c1 * c2) * h_d.sin(),
        1.0 + 0.0075 * (c1 + c2) * t,
    );
    let c_diff = safe_div(c2 - c1, 1.0 + 0.0225 * (c1 + c2));

    safe_sqrt(l_diff * l_diff + c_diff * c_diff + h_diff * h_diff + r_t * c_diff * h_diff)
}

/// CIEDE2000 difference between two pixels, converting both through Lab.
#[inline]
pub fn delta_e_rgba(p1: Rgba, p2: Rgba) -> f32 {
    delta_e(to_lab(p1), to_lab(p2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn de(l1: f32, a1: f32, b1: f32, l2: f32, a2: f32, b2: f32) -> f32 {
        delta_e(Lab::new(l1, a1, b1), Lab::new(l2, a2, b2))
    }

    #[test]
    fn test_identical() {
        assert_eq!(de(50.0, 0.0, 0.0, 50.0, 0.0, 0.0), 0.0);
        assert_eq!(de(62.1, -12.0, 33.5, 62.1, -12.0, 33.5), 0.0);
    }

    #[test]
    fn test_sharma_pairs() {
        assert_abs_diff_eq!(de(50.0, 2.6772, -79.7751, 50.0, 0.0, -82.7485), 2.0425, epsilon = 1e-4);
        assert_abs_diff_eq!(de(50.0, 3.1571, -77.2803, 50.0, 0.0, -82.7485), 2.8615, epsilon = 1e-4);
    }

    #[test]
    fn test_single_precision_pairs() {
        let cases: [([f32; 6], f32, f32); 10] = [
            ([58.18, 77.92, -17.7, 58.18, 77.86, -17.7], 0.0136, 0.0005),
            ([58.0931, -15.461, 109.0, 58.0931, -15.461, 110.782], 0.3161, 0.001),
            ([96.747, 60.386, -109.18, 96.747, 59.5, -106.76], 0.5186, 0.001),
            ([72.1, 90.7238, -94.158, 72.1, 90.7238, -87.79], 1.8870, 0.005),
            ([59.981, -70.0, -88.902, 62.8, -70.0, -96.92], 2.9103, 0.01),
            ([89.0, -27.068, -122.0, 94.39, -27.068, -122.0], 3.3233, 0.01),
            ([18.67, 4.8, -88.4, 18.67, 12.48, -88.4], 4.2486, 0.01),
            ([83.2491, -23.4, 28.0, 88.37, -23.4, 22.0], 4.4798, 0.01),
            ([53.4379, 124.735, -3.0, 50.0, 61.0134, -4.0], 12.8009, 0.05),
            ([52.4679, 91.46, 116.402, 49.1, 96.537, 75.95], 14.3417, 0.1),
        ];
        for ([l1, a1, b1, l2, a2, b2], expected, tol) in cases {
            let got = de(l1, a1, b1, l2, a2, b2);
            assert!(
                (got - expected).abs() <= tol,
                "({l1}, {a1}, {b1}) vs ({l2}, {a2}, {b2}): got {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_extreme_difference() {
        assert!(de(0.0, 0.0, 0.0, 100.0, 127.0, 127.0) > 100.0);
    }

    #[test]
    fn test_hue_quadrants_differ() {
        let d1 = de(50.0, 10.0, 10.0, 50.0, -10.0, 10.0);
        let d2 = de(50.0, 10.0, 10.0, 50.0, -10.0, -10.0);
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_neutral_grays_finite() {
        for l in [0.0, 1e-7, 25.0, 50.0, 100.0] {
            let d = de(l, 0.0, 0.0, 100.0 - l, 0.0, 0.0);
            assert!(d.is_finite(), "l={l} gave {d}");
            assert!(d >= 0.0);
        }
    }

    #[test]
    fn test_rgba() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(delta_e_rgba(red, red), 0.0);
        assert_abs_diff_eq!(delta_e_rgba(red, blue), 52.88, epsilon = 0.1);
    }

    proptest! {
        #[test]
        fn prop_identity(l in 0.0f32..100.0, a in -128.0f32..128.0, b in -128.0f32..128.0) {
            let c = Lab::new(l, a, b);
            prop_assert_eq!(delta_e(c, c), 0.0);
        }

        #[test]
        fn prop_symmetric_and_finite(
            l1 in 0.0f32..100.0, a1 in -128.0f32..128.0, b1 in -128.0f32..128.0,
            l2 in 0.0f32..100.0, a2 in -128.0f32..128.0, b2 in -128.0f32..128.0,
        ) {
            let x = Lab::new(l1, a1, b1);
            let y = Lab::new(l2, a2, b2);
            let xy = delta_e(x, y);
            let yx = delta_e(y, x);
            prop_assert!(xy.is_finite() && xy >= 0.0);
            prop_assert!((xy - yx).abs() <= 1e-3 * xy.max(1.0));
        }

        #[test]
        fn prop_srgb_inputs_finite(
            r1 in 0.0f32..=1.0, g1 in 0.0f32..=1.0, b1 in 0.0f32..=1.0,
            r2 in 0.0f32..=1.0, g2 in 0.0f32..=1.0, b2 in 0.0f32..=1.0,
        ) {
            let d = delta_e_rgba(Rgba::new(r1, g1, b1, 1.0), Rgba::new(r2, g2, b2, 1.0));
            prop_assert!(d.is_finite() && d >= 0.0);
        }
    }
}
