//! Contamination Threshold
//!
//! Turns raw outlier scores into a decision boundary. The offset is the
//! `contamination` percentile of the training scores, so roughly that
//! fraction of training rows falls below it.

/// Contamination-calibrated threshold
#[derive(Debug, Clone)]
pub struct ContaminationThreshold {
    offset: f64,
}

impl ContaminationThreshold {
    /// Calibrate against the raw scores of the training rows
    pub fn fit(contamination: f64, training_scores: &[f64]) -> Self {
        Self {
            offset: percentile(training_scores, 100.0 * contamination),
        }
    }

    /// Get current offset
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Shift a raw score so the boundary sits at zero
    pub fn decision(&self, raw_score: f64) -> f64 {
        raw_score - self.offset
    }
}

/// Percentile with linear interpolation between closest ranks.
/// `q` is in `[0, 100]`; returns NaN for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
