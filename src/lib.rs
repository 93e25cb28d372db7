//! # GreenMind
//!
//! Client core for the GreenMind behaviour-tracking app: turns survey
//! answers into OCEAN (Big Five) scores, keeps per-metric feedback for the
//! session, and drives the scoring, metric-update and verification services.
//!
//! ```text
//! survey ──► services::ScoringService ──► ocean::normalize ──► session
//!                                                   │
//!                         verification (detached) ◄─┘
//! MetricUpdate ──► services::MetricService ──► session + feedback store
//! ```

pub mod config;
pub mod error;
pub mod feedback;
pub mod notify;
pub mod ocean;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod survey;
pub mod verification;

pub use config::ClientConfig;
pub use error::{GreenMindError, Result};
pub use feedback::{MetricFeedback, MetricFeedbackStore};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use ocean::{normalize, OceanScore, Trait};
pub use pipeline::{OceanPipeline, PipelineServices, SurveyOutcome};
pub use services::{HttpOceanApi, MetricUpdate};
pub use session::SessionState;
pub use survey::{QuestionDefinition, SurveyCombiner, UserAnswer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
