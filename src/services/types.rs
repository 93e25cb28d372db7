//! Request and response bodies exchanged with the remote services.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{GreenMindError, Result};
use crate::ocean::OceanScore;

// ---------------------------------------------------------------------------
// Scoring and verification
// ---------------------------------------------------------------------------

/// Response of the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Raw scores; may be fractions or percentages.
    pub scores: OceanScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body sent once per personality model after a survey is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Personality model id the result is checked against.
    pub model: String,
    pub user_id: String,
    /// Normalized scores of the survey.
    pub survey_result: OceanScore,
}

// ---------------------------------------------------------------------------
// Metric updates
// ---------------------------------------------------------------------------

/// A behaviour event reported to one of the metric-update services.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricUpdate {
    /// Total spent today.
    DailySpending { amount: f64 },
    /// Distance moved today.
    DailyDistance { distance_km: f64 },
    /// Nights out over the tracking window.
    NightOutFrequency { nights_out: u32 },
    /// Todo items completed versus planned.
    ListAdherence { completed: u32, total: u32 },
    /// Healthy meals out of all meals logged.
    HealthyFoodRatio { healthy_meals: u32, total_meals: u32 },
    /// Visits to new places out of all visits.
    NovelLocationRatio { novel_locations: u32, total_locations: u32 },
    /// Public transit trips out of all trips.
    PublicTransitRatio { transit_trips: u32, total_trips: u32 },
}

impl MetricUpdate {
    /// Key the resulting feedback is stored under; also the route segment.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DailySpending { .. } => "daily_spending",
            Self::DailyDistance { .. } => "daily_distance_km",
            Self::NightOutFrequency { .. } => "night_out_freq",
            Self::ListAdherence { .. } => "list_adherence",
            Self::HealthyFoodRatio { .. } => "healthy_food_ratio",
            Self::NovelLocationRatio { .. } => "novel_location_ratio",
            Self::PublicTransitRatio { .. } => "public_transit_ratio",
        }
    }

    /// Service route relative to the AI base URL.
    pub fn path(&self) -> String {
        format!("monitor/{}", self.key())
    }

    fn ratio_parts(&self) -> Option<(u32, u32)> {
        match *self {
            Self::ListAdherence { completed, total } => Some((completed, total)),
            Self::HealthyFoodRatio {
                healthy_meals,
                total_meals,
            } => Some((healthy_meals, total_meals)),
            Self::NovelLocationRatio {
                novel_locations,
                total_locations,
            } => Some((novel_locations, total_locations)),
            Self::PublicTransitRatio {
                transit_trips,
                total_trips,
            } => Some((transit_trips, total_trips)),
            _ => None,
        }
    }

    /// Share of the total for ratio metrics.
    pub fn ratio(&self) -> Option<f64> {
        self.ratio_parts()
            .filter(|(_, total)| *total > 0)
            .map(|(part, total)| f64::from(part) / f64::from(total))
    }

    /// Reject inputs the service cannot use.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::DailySpending { amount } if !amount.is_finite() || amount < 0.0 => {
                Err(GreenMindError::InvalidInput(format!(
                    "Spending must be a non-negative amount, got {amount}"
                )))
            }
            Self::DailyDistance { distance_km }
                if !distance_km.is_finite() || distance_km < 0.0 =>
            {
                Err(GreenMindError::InvalidInput(format!(
                    "Distance must be a non-negative number of km, got {distance_km}"
                )))
            }
            _ => match self.ratio_parts() {
                Some((_, 0)) => Err(GreenMindError::InvalidInput(format!(
                    "{} needs a non-zero total",
                    self.key()
                ))),
                Some((part, total)) if part > total => Err(GreenMindError::InvalidInput(format!(
                    "{}: {part} exceeds total {total}",
                    self.key()
                ))),
                _ => Ok(()),
            },
        }
    }

    /// Metric-specific inputs only.
    pub fn inputs(&self) -> Value {
        let mut inputs = match *self {
            Self::DailySpending { amount } => json!({ "amount": amount }),
            Self::DailyDistance { distance_km } => json!({ "distance_km": distance_km }),
            Self::NightOutFrequency { nights_out } => json!({ "nights_out": nights_out }),
            Self::ListAdherence { completed, total } => {
                json!({ "completed": completed, "total": total })
            }
            Self::HealthyFoodRatio {
                healthy_meals,
                total_meals,
            } => json!({ "healthy_meals": healthy_meals, "total_meals": total_meals }),
            Self::NovelLocationRatio {
                novel_locations,
                total_locations,
            } => json!({ "novel_locations": novel_locations, "total_locations": total_locations }),
            Self::PublicTransitRatio {
                transit_trips,
                total_trips,
            } => json!({ "transit_trips": transit_trips, "total_trips": total_trips }),
        };
        if let Some(ratio) = self.ratio() {
            inputs["ratio"] = json!(ratio);
        }
        inputs
    }

    /// Full request body: inputs plus user id and the current OCEAN score.
    ///
    /// `ocean` must already be normalized.
    pub fn request_body(&self, user_id: &str, ocean: OceanScore) -> Value {
        let mut body = self.inputs();
        body["user_id"] = json!(user_id);
        body["ocean_score"] = json!(ocean);
        body
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
