//! Isolation Forest
//!
//! Ensemble of randomized isolation trees. Each tree partitions a random
//! subsample with random axis-aligned splits; rows that end up isolated
//! after few splits are outliers.
//!
//! Scoring follows the usual conventions:
//! - `score_samples = -2^(-E[h(x)] / c(max_samples))`, in `[-1, 0]`
//! - `decision_function = score_samples - offset`, where `offset` is the
//!   contamination percentile of the training scores
//! - rows with a negative decision score are outliers
//!
//! So higher scores mean more normal.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::threshold::ContaminationThreshold;
use super::{ModelError, OutlierEstimator};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Expected fraction of outliers
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Upper bound on rows drawn per tree
pub const MAX_SAMPLES_CAP: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub contamination: f64,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            contamination: DEFAULT_CONTAMINATION,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.n_estimators == 0 {
            return Err("n_estimators must be at least 1".to_string());
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TREES
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Internal {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn fit(features: &Array2<f64>, rows: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::grow(features, rows, 0, height_limit, rng),
        }
    }

    fn grow(
        features: &Array2<f64>,
        rows: Vec<usize>,
        depth: usize,
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= height_limit || rows.len() <= 1 {
            return Node::Leaf { size: rows.len() };
        }

        // Only features that still vary inside this node can split it
        let candidates: Vec<(usize, f64, f64)> = (0..features.ncols())
            .filter_map(|f| {
                let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    let v = features[[r, f]];
                    (lo.min(v), hi.max(v))
                });
                (max > min).then_some((f, min, max))
            })
            .collect();

        if candidates.is_empty() {
            return Node::Leaf { size: rows.len() };
        }

        let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
        // Interpolated draw; `max - min` can overflow for extreme finite values
        let t: f64 = rng.gen();
        let threshold = (min + t * max - t * min).clamp(min, max);

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| features[[r, feature]] <= threshold);

        Node::Internal {
            feature,
            threshold,
            left: Box::new(Self::grow(features, left, depth + 1, height_limit, rng)),
            right: Box::new(Self::grow(features, right, depth + 1, height_limit, rng)),
        }
    }

    /// Depth of the leaf reached plus the expected depth of its remaining rows
    fn path_length(&self, sample: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;

        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Internal { feature, threshold, left, right } => {
                    node = if sample[*feature] <= *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` rows
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Isolation Forest outlier detector
#[derive(Debug, Clone)]
pub struct IsolationForest {
    params: ForestParams,
    trees: Vec<IsolationTree>,
    max_samples: usize,
    n_features: usize,
    threshold: Option<ContaminationThreshold>,
}

impl IsolationForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            max_samples: 0,
            n_features: 0,
            threshold: None,
        }
    }

    /// Raw scores in `[-1, 0]`; lower is more abnormal
    pub fn score_samples(&self, features: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        self.check_features(features)?;
        Ok(self.raw_scores(features))
    }

    fn check_features(&self, features: &Array2<f64>) -> Result<(), ModelError> {
        if features.ncols() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                actual: features.ncols(),
            });
        }
        Ok(())
    }

    fn raw_scores(&self, features: &Array2<f64>) -> Vec<f64> {
        let denominator = average_path_length(self.max_samples);
        let n_trees = self.trees.len() as f64;

        features
            .rows()
            .into_iter()
            .map(|row| {
                let mean_depth = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>() / n_trees;
                let ratio = if denominator > 0.0 { mean_depth / denominator } else { 1.0 };
                -(2.0_f64.powf(-ratio))
            })
            .collect()
    }
}

impl OutlierEstimator for IsolationForest {
    fn fit(&mut self, features: &Array2<f64>) -> Result<(), ModelError> {
        let n_rows = features.nrows();
        if n_rows == 0 || features.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }

        let max_samples = n_rows.min(MAX_SAMPLES_CAP);
        let height_limit = (max_samples as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.params.random_state);

        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                let rows = rand::seq::index::sample(&mut rng, n_rows, max_samples).into_vec();
                IsolationTree::fit(features, rows, height_limit, &mut rng)
            })
            .collect();
        self.max_samples = max_samples;
        self.n_features = features.ncols();

        let training_scores = self.raw_scores(features);
        self.threshold = Some(ContaminationThreshold::fit(self.params.contamination, &training_scores));

        tracing::debug!(
            trees = self.trees.len(),
            max_samples,
            height_limit,
            "Isolation forest fitted"
        );
        Ok(())
    }

    fn decision_function(&self, features: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        let threshold = self.threshold.as_ref().ok_or(ModelError::NotFitted)?;
        Ok(self
            .score_samples(features)?
            .into_iter()
            .map(|s| threshold.decision(s))
            .collect())
    }

    fn offset(&self) -> Result<f64, ModelError> {
        self.threshold
            .as_ref()
            .map(|t| t.offset())
            .ok_or(ModelError::NotFitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clustered_with_outlier() -> Array2<f64> {
        let mut data = Array2::<f64>::zeros((40, 2));
        for i in 0..40 {
            data[[i, 0]] = 10.0 + (i % 5) as f64 * 0.1;
            data[[i, 1]] = 3.0 + (i % 4) as f64 * 0.05;
        }
        data[[17, 0]] = 55.0;
        data[[17, 1]] = -20.0;
        data
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is the usual normaliser, about 10.24
        assert!((average_path_length(256) - 10.244).abs() < 0.01);
    }

    #[test]
    fn test_params_validation() {
        assert!(ForestParams::default().validate().is_ok());
        let p = ForestParams { contamination: 0.6, ..Default::default() };
        assert!(p.validate().is_err());
        let p = ForestParams { n_estimators: 0, ..Default::default() };
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_outlier_scores_lowest() {
        let data = clustered_with_outlier();
        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&data).unwrap();

        let scores = forest.decision_function(&data).unwrap();
        let min_idx = scores
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();

        assert_eq!(min_idx, 17);
        assert_eq!(forest.predict(&data).unwrap()[17], -1);
    }

    #[test]
    fn test_raw_scores_in_range() {
        let data = clustered_with_outlier();
        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&data).unwrap();

        for s in forest.score_samples(&data).unwrap() {
            assert!((-1.0..=0.0).contains(&s));
        }
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let data = clustered_with_outlier();
        let params = ForestParams { random_state: 7, ..Default::default() };

        let mut a = IsolationForest::new(params);
        let mut b = IsolationForest::new(params);
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();

        assert_eq!(a.decision_function(&data).unwrap(), b.decision_function(&data).unwrap());
        assert_eq!(a.offset().unwrap(), b.offset().unwrap());
    }

    #[test]
    fn test_unfitted_and_mismatch() {
        let forest = IsolationForest::new(ForestParams::default());
        assert!(matches!(forest.offset(), Err(ModelError::NotFitted)));
        assert!(matches!(
            forest.decision_function(&array![[1.0]]),
            Err(ModelError::NotFitted)
        ));

        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&array![[1.0, 2.0], [2.0, 3.0], [3.0, 1.0]]).unwrap();
        assert!(matches!(
            forest.decision_function(&array![[1.0]]),
            Err(ModelError::FeatureMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_single_row_is_normal() {
        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&array![[4.2, 1.0]]).unwrap();

        let scores = forest.score_samples(&array![[4.2, 1.0]]).unwrap();
        assert_eq!(scores, vec![-0.5]);
        assert_eq!(forest.predict(&array![[4.2, 1.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_constant_data_has_no_outliers() {
        let data = Array2::<f64>::from_elem((30, 3), 1.5);
        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&data).unwrap();

        assert!(forest.predict(&data).unwrap().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_extreme_finite_values_fit() {
        let data = array![[-1.5e308], [1.5e308], [0.0], [1.0], [2.0]];
        let mut forest = IsolationForest::new(ForestParams::default());
        forest.fit(&data).unwrap();

        let scores = forest.decision_function(&data).unwrap();
        assert_eq!(scores.len(), 5);
        assert!(scores.iter().all(|s| s.is_finite()));
    }
}
