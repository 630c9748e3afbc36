//! Anomaly detection models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::dataset::Cell;
use crate::logic::model::ForestParams;

/// Higher scores are more normal; negative scores are anomalous
pub const SCORE_CONVENTION: &str = "higher_is_more_normal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLabel {
    Normal,
    Anomalous,
}

impl AnomalyLabel {
    /// Label for an estimator prediction (-1 = anomalous)
    pub fn from_prediction(prediction: i8) -> Self {
        if prediction < 0 {
            AnomalyLabel::Anomalous
        } else {
            AnomalyLabel::Normal
        }
    }

    /// Numeric label: 1 for normal, -1 for anomalous
    pub fn as_i8(self) -> i8 {
        match self {
            AnomalyLabel::Normal => 1,
            AnomalyLabel::Anomalous => -1,
        }
    }
}

/// Input row augmented with its label and decision score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRow {
    pub index: usize,
    pub values: Vec<Cell>,
    pub anomaly: i8,
    pub label: AnomalyLabel,
    pub anomaly_score: f64,
}

impl ScoredRow {
    pub fn new(index: usize, values: Vec<Cell>, label: AnomalyLabel, anomaly_score: f64) -> Self {
        Self {
            index,
            values,
            anomaly: label.as_i8(),
            label,
            anomaly_score,
        }
    }

    pub fn is_anomalous(&self) -> bool {
        self.label == AnomalyLabel::Anomalous
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub columns: Vec<String>,
    pub feature_columns: Vec<String>,
    pub total_rows: usize,
    pub anomaly_count: usize,
    pub rows: Vec<ScoredRow>,
    pub anomalies: Vec<ScoredRow>,
    pub params: ForestParams,
    pub offset: f64,
    pub score_convention: String,
    pub detected_at: DateTime<Utc>,
}

impl AnomalyReport {
    /// Build a report; the anomalous subset is derived from row labels
    pub fn new(
        columns: Vec<String>,
        feature_columns: Vec<String>,
        rows: Vec<ScoredRow>,
        params: ForestParams,
        offset: f64,
    ) -> Self {
        let anomalies: Vec<ScoredRow> = rows.iter().filter(|r| r.is_anomalous()).cloned().collect();

        Self {
            columns,
            feature_columns,
            total_rows: rows.len(),
            anomaly_count: anomalies.len(),
            rows,
            anomalies,
            params,
            offset,
            score_convention: SCORE_CONVENTION.to_string(),
            detected_at: Utc::now(),
        }
    }
}

/// Optional detection parameters (query string)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DetectionParams {
    #[validate(range(min = 1, max = 1000))]
    pub n_estimators: Option<usize>,

    #[validate(range(exclusive_min = 0.0, max = 0.5))]
    pub contamination: Option<f64>,

    pub random_state: Option<u64>,
}

impl DetectionParams {
    /// Validate and fill defaults
    pub fn into_params(self) -> Result<ForestParams, validator::ValidationErrors> {
        self.validate()?;
        let defaults = ForestParams::default();

        Ok(ForestParams {
            n_estimators: self.n_estimators.unwrap_or(defaults.n_estimators),
            contamination: self.contamination.unwrap_or(defaults.contamination),
            random_state: self.random_state.unwrap_or(defaults.random_state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_prediction() {
        assert_eq!(AnomalyLabel::from_prediction(-1), AnomalyLabel::Anomalous);
        assert_eq!(AnomalyLabel::from_prediction(1), AnomalyLabel::Normal);
        assert_eq!(AnomalyLabel::Anomalous.as_i8(), -1);
    }

    #[test]
    fn test_report_subset_matches_labels() {
        let rows = vec![
            ScoredRow::new(0, vec![Cell::Number(1.0)], AnomalyLabel::Normal, 0.12),
            ScoredRow::new(1, vec![Cell::Number(9.0)], AnomalyLabel::Anomalous, -0.20),
            ScoredRow::new(2, vec![Cell::Number(1.1)], AnomalyLabel::Normal, 0.08),
        ];
        let report = AnomalyReport::new(
            vec!["x".into()],
            vec!["x".into()],
            rows,
            ForestParams::default(),
            -0.5,
        );

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.anomaly_count, 1);
        assert_eq!(report.anomalies[0].index, 1);
        assert_eq!(report.score_convention, SCORE_CONVENTION);
    }

    #[test]
    fn test_detection_params_defaults_and_bounds() {
        let params = DetectionParams::default().into_params().unwrap();
        assert_eq!(params, ForestParams::default());

        let bad = DetectionParams {
            contamination: Some(0.0),
            ..Default::default()
        };
        assert!(bad.into_params().is_err());

        let bad = DetectionParams {
            n_estimators: Some(0),
            ..Default::default()
        };
        assert!(bad.into_params().is_err());
    }
}
