//! Anomaly Detector
//!
//! Fits an outlier estimator on the numeric columns of a dataset and
//! annotates every row with a label and decision score. Text columns are
//! left out of the feature matrix but kept in the output rows.

use ndarray::Array2;
use thiserror::Error;

use crate::logic::model::{ForestParams, IsolationForest, ModelError, OutlierEstimator};
use crate::models::{AnomalyLabel, AnomalyReport, Cell, Dataset, ScoredRow};

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("The dataset must contain numeric columns for anomaly detection.")]
    NoNumericColumns,

    #[error("Column '{column}' has a missing or non-finite value at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("{0}")]
    InvalidParameters(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Run isolation-forest detection with the given parameters
pub fn detect_anomalies(dataset: &Dataset, params: ForestParams) -> Result<AnomalyReport, DetectionError> {
    params.validate().map_err(DetectionError::InvalidParameters)?;
    detect_with(dataset, params, IsolationForest::new(params))
}

/// Run detection with any estimator. The numeric-column check happens
/// before the estimator is touched.
pub fn detect_with<E: OutlierEstimator>(
    dataset: &Dataset,
    params: ForestParams,
    mut estimator: E,
) -> Result<AnomalyReport, DetectionError> {
    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        return Err(DetectionError::NoNumericColumns);
    }

    let features = feature_matrix(dataset, &numeric)?;
    estimator.fit(&features)?;
    let scores = estimator.decision_function(&features)?;
    let labels = estimator.predict(&features)?;
    let offset = estimator.offset()?;

    let rows: Vec<ScoredRow> = dataset
        .rows()
        .iter()
        .zip(labels.into_iter().zip(scores))
        .enumerate()
        .map(|(index, (values, (label, score)))| {
            ScoredRow::new(index, values.clone(), AnomalyLabel::from_prediction(label), score)
        })
        .collect();

    let columns = dataset.column_names();
    let feature_columns = numeric.iter().map(|&i| columns[i].clone()).collect();
    let report = AnomalyReport::new(columns, feature_columns, rows, params, offset);

    tracing::info!(
        rows = report.total_rows,
        features = report.feature_columns.len(),
        anomalies = report.anomaly_count,
        "Anomaly detection complete"
    );
    Ok(report)
}

/// Feature matrix over the given numeric columns
fn feature_matrix(dataset: &Dataset, numeric: &[usize]) -> Result<Array2<f64>, DetectionError> {
    let columns = dataset.columns();
    let mut features = Array2::<f64>::zeros((dataset.row_count(), numeric.len()));

    for (r, row) in dataset.rows().iter().enumerate() {
        for (f, &c) in numeric.iter().enumerate() {
            match row.get(c).and_then(Cell::as_number) {
                Some(v) if v.is_finite() => features[[r, f]] = v,
                _ => {
                    return Err(DetectionError::NonFiniteValue {
                        column: columns[c].name.clone(),
                        row: r,
                    })
                }
            }
        }
    }

    Ok(features)
}
