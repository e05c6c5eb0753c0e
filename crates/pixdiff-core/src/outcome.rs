//! Aggregate result of one kernel pass.

/// Result of running a comparison kernel over a full image pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComparisonOutcome {
    /// Number of mismatching work units (pixels, or blocks for the cluster kernel).
    pub mismatch_count: u64,
    /// Number of logical work units visited.
    pub units: u64,
    /// Largest color difference observed; reported by the perceptual kernel only.
    pub max_delta_e: Option<f32>,
}

impl ComparisonOutcome {
    /// Outcome without an aggregate metric.
    pub fn new(mismatch_count: u64, units: u64) -> Self {
        Self {
            mismatch_count,
            units,
            max_delta_e: None,
        }
    }

    /// Attaches the maximum color difference.
    pub fn with_max_delta_e(mut self, max_delta_e: f32) -> Self {
        self.max_delta_e = Some(max_delta_e);
        self
    }

    /// `true` when `mismatch_count <= threshold`.
    #[inline]
    pub fn accepts(&self, threshold: u64) -> bool {
        self.mismatch_count <= threshold
    }

    /// Fraction of mismatching units in [0, 1].
    pub fn mismatch_ratio(&self) -> f64 {
        if self.units == 0 {
            0.0
        } else {
            self.mismatch_count as f64 / self.units as f64
        }
    }
}
