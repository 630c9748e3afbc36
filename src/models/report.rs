//! Report link model

use serde::{Deserialize, Serialize};

pub const REPORT_TITLE: &str = "Aircraft Operational Insights";
pub const REPORT_NOTICE: &str =
    "To view the report, ensure you have accepted third-party cookies and are logged into Google.";
pub const REPORT_LINK_TEXT: &str = "Click here to view the report directly in Looker Studio";

/// Static pointer to the hosted reporting dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLink {
    pub title: String,
    pub notice: String,
    pub link_text: String,
    pub url: String,
}

impl ReportLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            notice: REPORT_NOTICE.to_string(),
            link_text: REPORT_LINK_TEXT.to_string(),
            url: url.into(),
        }
    }
}
