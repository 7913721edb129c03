//! Survey statistics

pub mod metrics;

pub use metrics::{DispatchStats, SurveyStats};
