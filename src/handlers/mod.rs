//! HTTP handlers

pub mod anomalies;
pub mod dashboard;
pub mod datasets;
pub mod health;
pub mod recommendations;
pub mod reports;
