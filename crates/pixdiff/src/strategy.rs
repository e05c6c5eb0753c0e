//! Tolerance strategies.
//!
//! A [`Strategy`] is the user-facing description of "how different is too
//! different". It is validated against the pixel count of the inputs and
//! resolved once into the canonical [`KernelParams`] every kernel consumes.
//!
//! | strategy               | kernel     | threshold                       | tolerance                    |
//! |------------------------|------------|---------------------------------|------------------------------|
//! | `Exact`                | exact      | as given                        | -                            |
//! | `Cluster`              | cluster    | as given (blocks)               | -                            |
//! | `PerceptualAbsolute`   | perceptual | as given                        | `delta_e`                    |
//! | `PerceptualPrecision`  | perceptual | as given                        | `(1 - precision) * 100`      |
//! | `PerceptualRatio`      | perceptual | derived from `pixel_fraction`   | `(1 - precision) * 100`      |

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use pixdiff_compute::KernelParams;
use pixdiff_core::{Error, Result};

/// Largest cluster block edge.
pub const MAX_BLOCK_SIZE: i64 = 7;

/// Largest accepted absolute CIEDE2000 tolerance.
pub const MAX_DELTA_E: f32 = 100.0;

fn default_block_size() -> i64 {
    1
}

fn default_precision() -> f32 {
    1.0
}

/// How two images are compared and how many mismatches are accepted.
///
/// Thresholds are signed so that out-of-range input can be reported
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Byte-exact per pixel; accept up to `threshold` differing pixels.
    Exact {
        #[serde(default)]
        threshold: i64,
    },
    /// Byte-exact per block; accept up to `threshold` differing blocks.
    Cluster {
        #[serde(default)]
        threshold: i64,
        #[serde(default = "default_block_size")]
        block_size: i64,
    },
    /// Perceptual with an absolute CIEDE2000 tolerance in [0, 100].
    PerceptualAbsolute {
        #[serde(default)]
        threshold: i64,
        #[serde(default)]
        delta_e: f32,
    },
    /// Perceptual with the tolerance derived from a precision in [0, 1].
    PerceptualPrecision {
        #[serde(default)]
        threshold: i64,
        #[serde(default = "default_precision")]
        perceptual_precision: f32,
    },
    /// Perceptual with the threshold derived from a pixel fraction in [0, 1].
    PerceptualRatio {
        #[serde(default = "default_precision")]
        pixel_fraction: f32,
        #[serde(default = "default_precision")]
        perceptual_precision: f32,
    },
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Exact { threshold: 0 }
    }
}

impl Strategy {
    /// Name used in configuration and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact { .. } => "exact",
            Self::Cluster { .. } => "cluster",
            Self::PerceptualAbsolute { .. } => "perceptual_absolute",
            Self::PerceptualPrecision { .. } => "perceptual_precision",
            Self::PerceptualRatio { .. } => "perceptual_ratio",
        }
    }

    /// Whether the strategy runs the CIEDE2000 kernel.
    pub fn is_perceptual(&self) -> bool {
        matches!(
            self,
            Self::PerceptualAbsolute { .. }
                | Self::PerceptualPrecision { .. }
                | Self::PerceptualRatio { .. }
        )
    }

    fn check_threshold(&self, threshold: i64, total: u64) -> Result<()> {
        if threshold < 0 || threshold as u64 > total {
            return Err(Error::configuration(
                self.name(),
                "threshold",
                threshold,
                format!("0..={}", total),
            ));
        }
        Ok(())
    }

    fn check_unit(&self, field: &'static str, value: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::configuration(self.name(), field, value, "0.0..=1.0"));
        }
        Ok(())
    }

    /// Checks every field against its domain for an input of `total` pixels.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] naming the first offending field.
    pub fn validate(&self, total: u64) -> Result<()> {
        let result = match *self {
            Self::Exact { threshold } => self.check_threshold(threshold, total),
            Self::Cluster {
                threshold,
                block_size,
            } => self.check_threshold(threshold, total).and_then(|_| {
                if (1..=MAX_BLOCK_SIZE).contains(&block_size) {
                    Ok(())
                } else {
                    Err(Error::configuration(
                        self.name(),
                        "block_size",
                        block_size,
                        format!("1..={}", MAX_BLOCK_SIZE),
                    ))
                }
            }),
            Self::PerceptualAbsolute { threshold, delta_e } => {
                self.check_threshold(threshold, total).and_then(|_| {
                    if (0.0..=MAX_DELTA_E).contains(&delta_e) {
                        Ok(())
                    } else {
                        Err(Error::configuration(
                            self.name(),
                            "delta_e",
                            delta_e,
                            format!("0.0..={:.1}", MAX_DELTA_E),
                        ))
                    }
                })
            }
            Self::PerceptualPrecision {
                threshold,
                perceptual_precision,
            } => self
                .check_threshold(threshold, total)
                .and_then(|_| self.check_unit("perceptual_precision", perceptual_precision)),
            Self::PerceptualRatio {
                pixel_fraction,
                perceptual_precision,
            } => self
                .check_unit("pixel_fraction", pixel_fraction)
                .and_then(|_| self.check_unit("perceptual_precision", perceptual_precision)),
        };
        if let Err(err) = &result {
            warn!(strategy = self.name(), total, %err, "strategy rejected");
        }
        result
    }

    /// Validates and resolves the strategy into kernel parameters.
    ///
    /// The ratio strategy keeps a known quirk: when `total * pixel_fraction`
    /// is below one pixel the accepted count falls back to `total`, which
    /// makes the threshold zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixdiff::Strategy;
    ///
    /// let s = Strategy::PerceptualRatio { pixel_fraction: 0.9, perceptual_precision: 0.98 };
    /// let params = s.resolve(100).unwrap();
    /// assert_eq!(params.threshold, 10);
    /// assert!((params.tolerance - 2.0).abs() < 1e-4);
    /// ```
    pub fn resolve(&self, total: u64) -> Result<KernelParams> {
        self.validate(total)?;
        let params = match *self {
            Self::Exact { threshold } => KernelParams::exact(threshold as u64),
            Self::Cluster {
                threshold,
                block_size,
            } => KernelParams::cluster(threshold as u64, block_size as u32),
            Self::PerceptualAbsolute { threshold, delta_e } => {
                KernelParams::perceptual(threshold as u64, delta_e)
            }
            Self::PerceptualPrecision {
                threshold,
                perceptual_precision,
            } => KernelParams::perceptual(threshold as u64, precision_to_delta_e(perceptual_precision)),
            Self::PerceptualRatio {
                pixel_fraction,
                perceptual_precision,
            } => KernelParams::perceptual(
                ratio_threshold(total, pixel_fraction),
                precision_to_delta_e(perceptual_precision),
            ),
        };
        trace!(
            strategy = self.name(),
            total,
            threshold = params.threshold,
            tolerance = params.tolerance,
            block_size = params.block_size,
            "strategy resolved"
        );
        Ok(params)
    }
}

/// Maps a precision in [0, 1] to a CIEDE2000 tolerance in [0, 100].
#[inline]
pub fn precision_to_delta_e(precision: f32) -> f32 {
    (1.0 - precision) * 100.0
}

/// Threshold for the ratio strategy.
///
/// Evaluated in single precision: `0.3 * 10` rounds to exactly 3.0 in f32,
/// where widening the fraction to f64 first would leave it just above 3.
fn ratio_threshold(total: u64, pixel_fraction: f32) -> u64 {
    let total_f = total as f32;
    let accepted = total_f * pixel_fraction;
    let accepted = if accepted >= 1.0 { accepted } else { total_f };
    (total_f - accepted).max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOTAL: u64 = 81;

    fn field_of(err: Error) -> &'static str {
        match err {
            Error::Configuration { field, .. } => field,
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[test]
    fn test_cluster_block_size_bounds() {
        for bad in [0, 8, -1] {
            let s = Strategy::Cluster {
                threshold: 0,
                block_size: bad,
            };
            assert_eq!(field_of(s.validate(TOTAL).unwrap_err()), "block_size");
        }
        for good in 1..=7 {
            let s = Strategy::Cluster {
                threshold: 0,
                block_size: good,
            };
            assert!(s.validate(TOTAL).is_ok());
        }
    }

    #[test]
    fn test_threshold_bounds() {
        let exact = Strategy::Exact { threshold: -1 };
        assert_eq!(field_of(exact.validate(TOTAL).unwrap_err()), "threshold");

        let cluster = Strategy::Cluster {
            threshold: -1,
            block_size: 2,
        };
        assert_eq!(field_of(cluster.validate(TOTAL).unwrap_err()), "threshold");

        assert!(Strategy::Exact { threshold: 81 }.validate(TOTAL).is_ok());
        assert!(Strategy::Exact { threshold: 82 }.validate(TOTAL).is_err());
    }

    #[test]
    fn test_delta_e_bounds() {
        for bad in [150.0, -1.0, f32::NAN] {
            let s = Strategy::PerceptualAbsolute {
                threshold: 0,
                delta_e: bad,
            };
            let err = s.validate(TOTAL).unwrap_err();
            assert!(err.to_string().contains("perceptual_absolute"));
            assert_eq!(field_of(err), "delta_e");
        }
        let edge = Strategy::PerceptualAbsolute {
            threshold: 0,
            delta_e: 100.0,
        };
        assert!(edge.validate(TOTAL).is_ok());
    }

    #[test]
    fn test_precision_bounds() {
        let s = Strategy::PerceptualPrecision {
            threshold: 0,
            perceptual_precision: 1.5,
        };
        assert_eq!(field_of(s.validate(TOTAL).unwrap_err()), "perceptual_precision");

        let s = Strategy::PerceptualRatio {
            pixel_fraction: -0.1,
            perceptual_precision: 0.5,
        };
        assert_eq!(field_of(s.validate(TOTAL).unwrap_err()), "pixel_fraction");

        let s = Strategy::PerceptualRatio {
            pixel_fraction: 0.5,
            perceptual_precision: 2.0,
        };
        assert_eq!(field_of(s.validate(TOTAL).unwrap_err()), "perceptual_precision");
    }

    #[test]
    fn test_resolve_precision() {
        let s = Strategy::PerceptualPrecision {
            threshold: 4,
            perceptual_precision: 0.8,
        };
        let p = s.resolve(TOTAL).unwrap();
        assert_eq!(p.threshold, 4);
        assert_abs_diff_eq!(p.tolerance, 20.0, epsilon = 1e-4);

        let p = Strategy::PerceptualPrecision {
            threshold: 0,
            perceptual_precision: 1.0,
        }
        .resolve(TOTAL)
        .unwrap();
        assert_eq!(p.tolerance, 0.0);
    }

    #[test]
    fn test_resolve_ratio() {
        let s = Strategy::PerceptualRatio {
            pixel_fraction: 0.5,
            perceptual_precision: 0.9,
        };
        let p = s.resolve(100).unwrap();
        assert_eq!(p.threshold, 50);
        assert_abs_diff_eq!(p.tolerance, 10.0, epsilon = 1e-4);

        let full = Strategy::PerceptualRatio {
            pixel_fraction: 1.0,
            perceptual_precision: 1.0,
        };
        assert_eq!(full.resolve(100).unwrap().threshold, 0);
    }

    #[test]
    fn test_resolve_ratio_single_precision() {
        let s = Strategy::PerceptualRatio {
            pixel_fraction: 0.3,
            perceptual_precision: 1.0,
        };
        assert_eq!(s.resolve(10).unwrap().threshold, 7);

        let s = Strategy::PerceptualRatio {
            pixel_fraction: 0.9,
            perceptual_precision: 1.0,
        };
        assert_eq!(s.resolve(81).unwrap().threshold, 8);
    }

    #[test]
    fn test_resolve_ratio_sub_pixel_fallback() {
        // accepted < 1 falls back to total, so nothing is tolerated
        let s = Strategy::PerceptualRatio {
            pixel_fraction: 0.001,
            perceptual_precision: 1.0,
        };
        assert_eq!(s.resolve(100).unwrap().threshold, 0);

        let zero = Strategy::PerceptualRatio {
            pixel_fraction: 0.0,
            perceptual_precision: 1.0,
        };
        assert_eq!(zero.resolve(100).unwrap().threshold, 0);
    }

    #[test]
    fn test_resolve_cluster() {
        let p = Strategy::Cluster {
            threshold: 2,
            block_size: 3,
        }
        .resolve(TOTAL)
        .unwrap();
        assert_eq!(p.threshold, 2);
        assert_eq!(p.block_size, 3);
    }
}
