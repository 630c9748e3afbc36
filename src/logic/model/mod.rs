//! Model Module - Outlier Estimators
//!
//! Keeps the estimator behind a small trait so detection logic does not
//! depend on one model.

pub mod isolation_forest;
pub mod threshold;

use ndarray::Array2;
use thiserror::Error;

// Re-export common types
pub use isolation_forest::{
    average_path_length, ForestParams, IsolationForest, DEFAULT_CONTAMINATION,
    DEFAULT_N_ESTIMATORS, DEFAULT_RANDOM_STATE, MAX_SAMPLES_CAP,
};
pub use threshold::{percentile, ContaminationThreshold};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("cannot fit on an empty feature matrix")]
    EmptyInput,

    #[error("expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },
}

/// Unsupervised outlier estimator
///
/// `decision_function` follows the "higher is more normal" convention:
/// negative scores are outliers.
pub trait OutlierEstimator {
    fn fit(&mut self, features: &Array2<f64>) -> Result<(), ModelError>;

    fn decision_function(&self, features: &Array2<f64>) -> Result<Vec<f64>, ModelError>;

    /// Offset subtracted from raw scores to form decision scores
    fn offset(&self) -> Result<f64, ModelError>;

    /// 1 for inliers, -1 for outliers
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<i8>, ModelError> {
        Ok(self
            .decision_function(features)?
            .into_iter()
            .map(|s| if s < 0.0 { -1 } else { 1 })
            .collect())
    }
}
