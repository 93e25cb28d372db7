//! Per-metric feedback cache.

pub mod store;
pub mod types;

pub use store::{Clock, MetricFeedbackStore, SystemClock};
pub use types::{FeedbackSnapshot, MechanismFeedback, MetricFeedback, MonitorOceanResponse};
