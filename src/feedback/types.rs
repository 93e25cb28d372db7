//! Metric feedback records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ocean::OceanScore;

/// Qualitative explanation of a metric's effect, one line per mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechanismFeedback {
    #[serde(default)]
    pub awareness: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default)]
    pub capability: String,
    #[serde(default)]
    pub opportunity: String,
}

/// Latest feedback for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFeedback {
    /// Metric key this record is stored under.
    pub metric: String,
    /// Today's raw value.
    pub vt: f64,
    /// Baseline value.
    pub bt: f64,
    /// Correlation coefficient between the metric and the trait.
    pub r: f64,
    /// Sample size behind the baseline.
    pub n: u32,
    /// Contribution delta applied to the trait.
    pub contrib: f64,
    pub new_ocean_score: OceanScore,
    pub mechanism_feedback: MechanismFeedback,
    pub reason: String,
    /// Set by the store on every write.
    pub timestamp: DateTime<Utc>,
}

/// Body returned by the metric-update services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorOceanResponse {
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub vt: f64,
    #[serde(default)]
    pub bt: f64,
    #[serde(default)]
    pub r: f64,
    #[serde(default)]
    pub n: u32,
    #[serde(default)]
    pub contrib: f64,
    #[serde(alias = "new_ocean")]
    pub new_ocean_score: OceanScore,
    #[serde(default)]
    pub mechanism_feedback: MechanismFeedback,
    #[serde(default)]
    pub reason: String,
}

impl MonitorOceanResponse {
    /// Convert into a feedback record.
    ///
    /// The timestamp is provisional; the store restamps on write.
    pub fn into_feedback(self) -> MetricFeedback {
        MetricFeedback {
            metric: self.metric,
            vt: self.vt,
            bt: self.bt,
            r: self.r,
            n: self.n,
            contrib: self.contrib,
            new_ocean_score: self.new_ocean_score,
            mechanism_feedback: self.mechanism_feedback,
            reason: self.reason,
            timestamp: Utc::now(),
        }
    }
}

/// Serializable copy of a store's contents, in store order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSnapshot {
    pub feedbacks: Vec<MetricFeedback>,
}
