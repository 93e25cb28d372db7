//! Orchestrates survey submission and metric updates.
//!
//! ```text
//! submit_survey:  answers ─ combine ─ score ─ normalize ─┬─ session
//!                                                        ├─ verification fan-out (detached)
//!                                                        └─ backend profile
//! update_metric:  precondition ─ validate ─ metric service ─ normalize ─┬─ session
//!                                                                       └─ feedback store
//! ```
//!
//! Concurrent calls are not serialized: two overlapping submissions both
//! run to completion and whichever finishes last leaves its score in the
//! session.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::{GreenMindError, Result};
use crate::feedback::MetricFeedback;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::ocean::{normalize, OceanScore};
use crate::services::{
    BackendService, HttpOceanApi, MetricService, MetricUpdate, ScoringService, VerificationService,
};
use crate::session::SessionState;
use crate::survey::{distinct_models, QuestionDefinition, SurveyCombiner, UserAnswer};
use crate::verification::VerificationFanout;

// ---------------------------------------------------------------------------
// Service wiring
// ---------------------------------------------------------------------------

/// The remote collaborators a pipeline talks to.
#[derive(Clone)]
pub struct PipelineServices {
    pub scoring: Arc<dyn ScoringService>,
    pub metrics: Arc<dyn MetricService>,
    pub verification: Arc<dyn VerificationService>,
    pub backend: Arc<dyn BackendService>,
}

impl PipelineServices {
    /// Route every service through one HTTP client.
    pub fn from_http(api: HttpOceanApi) -> Self {
        let api = Arc::new(api);
        Self {
            scoring: api.clone(),
            metrics: api.clone(),
            verification: api.clone(),
            backend: api,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Result of a scored survey.
#[derive(Debug)]
pub struct SurveyOutcome {
    /// Normalized scores now held by the session.
    pub scores: OceanScore,
    /// Answers sent to the scoring service.
    pub answered: usize,
    /// Answers whose question id was not in the set.
    pub unmatched: usize,
    /// Detached verification tasks; safe to drop.
    pub verification: Vec<JoinHandle<()>>,
}

/// Session-bound entry point for survey submission and metric updates.
///
/// Every failure is shown to the user through the [`Notifier`] and also
/// returned to the caller.
pub struct OceanPipeline {
    services: PipelineServices,
    verification: Option<VerificationFanout>,
    combiner: SurveyCombiner,
    session: SessionState,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for OceanPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OceanPipeline")
            .field("session", &self.session)
            .field("verification", &self.verification.is_some())
            .field("combiner", &self.combiner)
            .finish()
    }
}

impl OceanPipeline {
    /// Pipeline over the given services, with verification enabled.
    pub fn new(
        services: PipelineServices,
        session: SessionState,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let verification = Some(VerificationFanout::new(Arc::clone(&services.verification)));
        Self {
            services,
            verification,
            combiner: SurveyCombiner::default(),
            session,
            notifier,
        }
    }

    /// HTTP services, a fresh session and console notices.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let verify = config.verification_enabled;
        let api = HttpOceanApi::new(config)?;
        let pipeline = Self::new(
            PipelineServices::from_http(api),
            SessionState::new(),
            Arc::new(ConsoleNotifier::new()),
        );
        Ok(if verify {
            pipeline
        } else {
            pipeline.without_verification()
        })
    }

    /// Builder: replace the answer combiner (e.g. a fixed trait picker).
    pub fn with_combiner(mut self, combiner: SurveyCombiner) -> Self {
        self.combiner = combiner;
        self
    }

    /// Builder: skip the verification fan-out.
    pub fn without_verification(mut self) -> Self {
        self.verification = None;
        self
    }

    /// Session this pipeline reads and updates.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Notify the user, log, and hand the error back for propagation.
    fn report(&self, context: &str, err: GreenMindError) -> GreenMindError {
        log::error!("{}: {}", context, err);
        self.notifier
            .error(&format!("{}: {}", context, err.user_message()));
        err
    }

    fn precondition(&self, message: &str) -> GreenMindError {
        log::warn!("Precondition failed: {}", message);
        self.notifier.warning(message);
        GreenMindError::MissingPrecondition(message.to_string())
    }

    /// Fetch a question set from the backend.
    pub async fn load_question_set(&self, set_id: &str) -> Result<Vec<QuestionDefinition>> {
        self.services
            .backend
            .fetch_question_set(set_id)
            .await
            .map_err(|e| self.report("Could not load questions", e))
    }

    /// Score a completed survey for the logged-in user.
    pub async fn submit_survey(
        &self,
        questions: &[QuestionDefinition],
        answers: &[UserAnswer],
    ) -> Result<SurveyOutcome> {
        let user_id = self
            .session
            .user_id()
            .ok_or_else(|| self.precondition("Please log in before submitting the survey"))?;

        let payload = self.combiner.combine(&user_id, questions, answers);
        let unmatched = payload.answers.iter().filter(|a| a.is_unmatched()).count();
        log::info!(
            "Submitting survey for user {} ({} answers, {} unmatched)",
            user_id,
            payload.answers.len(),
            unmatched
        );

        let response = self
            .services
            .scoring
            .score(&payload)
            .await
            .map_err(|e| self.report("Could not calculate OCEAN scores", e))?;

        let scores = self.session.set_ocean(response.scores);

        let verification = match &self.verification {
            Some(fanout) => fanout.dispatch(&distinct_models(questions, answers), &user_id, scores),
            None => Vec::new(),
        };

        self.services
            .backend
            .save_ocean(&user_id, scores)
            .await
            .map_err(|e| self.report("Could not save OCEAN scores", e))?;

        self.notifier.success("Survey scored");
        Ok(SurveyOutcome {
            scores,
            answered: payload.answers.len(),
            unmatched,
            verification,
        })
    }

    /// Report a behaviour metric and store the feedback it produces.
    ///
    /// Without a logged-in user or a current score no request is made.
    pub async fn update_metric(&self, update: MetricUpdate) -> Result<MetricFeedback> {
        let user_id = self
            .session
            .user_id()
            .ok_or_else(|| self.precondition("Please log in before logging activity"))?;
        let current = self.session.ocean().ok_or_else(|| {
            self.precondition("No OCEAN score available yet, take the survey first")
        })?;

        if let Err(e) = update.validate() {
            self.notifier.warning(&e.user_message());
            return Err(e);
        }

        let response = self
            .services
            .metrics
            .update_metric(&user_id, &update, normalize(current))
            .await
            .map_err(|e| self.report("Could not update metric", e))?;

        let new_scores = self.session.set_ocean(response.new_ocean_score);
        let mut feedback = response.into_feedback();
        feedback.new_ocean_score = new_scores;
        let stored = self.session.feedback().set_feedback(update.key(), feedback);

        log::info!(
            "Metric {} for user {}: contrib {:+.3}",
            update.key(),
            user_id,
            stored.contrib
        );
        self.notifier.success("Activity logged");
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
