//! Dataset session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dataset::{Cell, ColumnInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub session_id: Uuid,
    pub columns: Vec<ColumnInfo>,
    pub numeric_columns: Vec<String>,
    pub row_count: usize,
    pub preview: Vec<Vec<Cell>>,
    pub has_result: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
