//! Survey answer combination.
//!
//! ```text
//! QuestionDefinition[] + UserAnswer[]
//!   ↓  SurveyCombiner::combine()
//! SurveyPayload { user_id, answers: AnsweredQuestion[] }
//!   ↓  ScoringService::score()
//! ```

pub mod combiner;
pub mod lookup;
pub mod types;

pub use combiner::{
    distinct_models, FixedTraitPicker, RandomTraitPicker, SurveyCombiner, TraitPicker,
};
pub use types::{
    AnsweredQuestion, PersonalityModelRef, Polarity, QuestionDefinition, QuestionTemplate,
    SurveyPayload, UserAnswer, UNKNOWN,
};
