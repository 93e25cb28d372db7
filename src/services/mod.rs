//! Remote service seams.
//!
//! Each collaborator the pipeline talks to sits behind a trait so the
//! pipeline can run against [`http::HttpOceanApi`] in production and
//! in-memory fakes in tests.

pub mod http;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::feedback::MonitorOceanResponse;
use crate::ocean::OceanScore;
use crate::survey::{QuestionDefinition, SurveyPayload};

pub use http::HttpOceanApi;
pub use types::{MetricUpdate, ScoreResponse, VerificationRequest};

/// Turns a combined survey into trait scores.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score(&self, payload: &SurveyPayload) -> Result<ScoreResponse>;
}

/// Reports a behaviour metric and receives the trait feedback.
#[async_trait]
pub trait MetricService: Send + Sync {
    /// `ocean` is the user's current score, already normalized.
    async fn update_metric(
        &self,
        user_id: &str,
        update: &MetricUpdate,
        ocean: OceanScore,
    ) -> Result<MonitorOceanResponse>;
}

/// Checks a fresh survey result against a reference personality model.
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> Result<Value>;
}

/// User profile and content endpoints of the backend.
#[async_trait]
pub trait BackendService: Send + Sync {
    async fn save_ocean(&self, user_id: &str, ocean: OceanScore) -> Result<()>;

    async fn fetch_question_set(&self, set_id: &str) -> Result<Vec<QuestionDefinition>>;
}
