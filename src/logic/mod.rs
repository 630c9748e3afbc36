//! Logic Module
//!
//! Recommendation and anomaly-detection flows, independent of HTTP.

pub mod completion;
pub mod detector;
pub mod model;
pub mod recommendation;
