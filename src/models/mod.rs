//! Data models

pub mod anomaly;
pub mod dataset;
pub mod recommendation;
pub mod report;
pub mod session;

pub use anomaly::*;
pub use dataset::*;
pub use recommendation::*;
pub use report::*;
pub use session::*;
