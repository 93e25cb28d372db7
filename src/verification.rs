//! Best-effort survey verification.
//!
//! After a survey is scored, the result is checked against every personality
//! model the answered questions came from. Each check runs as its own task;
//! reports and failures are logged and never reach the caller.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::ocean::{normalize, OceanScore};
use crate::services::{VerificationRequest, VerificationService};

/// Spawns one verification request per model.
#[derive(Clone)]
pub struct VerificationFanout {
    service: Arc<dyn VerificationService>,
}

impl fmt::Debug for VerificationFanout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationFanout")
            .field("service", &"<verification service>")
            .finish()
    }
}

impl VerificationFanout {
    pub fn new(service: Arc<dyn VerificationService>) -> Self {
        Self { service }
    }

    /// Fire one request per model and return immediately.
    ///
    /// Must be called inside a tokio runtime. The handles resolve to `()`;
    /// awaiting them is optional and only tells you the task finished.
    pub fn dispatch(
        &self,
        models: &[String],
        user_id: &str,
        scores: OceanScore,
    ) -> Vec<JoinHandle<()>> {
        let survey_result = normalize(scores);
        models
            .iter()
            .map(|model| {
                let service = Arc::clone(&self.service);
                let request = VerificationRequest {
                    model: model.clone(),
                    user_id: user_id.to_string(),
                    survey_result,
                };
                tokio::spawn(async move {
                    match service.verify(&request).await {
                        Ok(report) => log::debug!(
                            "Verification against model '{}' for user {}: {}",
                            request.model,
                            request.user_id,
                            report
                        ),
                        Err(e) => log::warn!(
                            "Verification against model '{}' failed: {}",
                            request.model,
                            e
                        ),
                    }
                })
            })
            .collect()
    }
}
