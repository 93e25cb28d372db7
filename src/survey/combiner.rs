//! Joins raw answers with their question definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;

use super::lookup::{answer_value, polarity_for, score_for};
use super::types::{AnsweredQuestion, QuestionDefinition, SurveyPayload, UserAnswer};
use crate::ocean::Trait;

/// Chooses a trait for questions the backend delivered without one.
pub trait TraitPicker: Send + Sync {
    fn pick(&self) -> Trait;
}

/// Uniform random choice over the five traits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTraitPicker;

impl TraitPicker for RandomTraitPicker {
    fn pick(&self) -> Trait {
        *Trait::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Trait::O)
    }
}

/// Always returns the same trait.
#[derive(Debug, Clone, Copy)]
pub struct FixedTraitPicker(pub Trait);

impl TraitPicker for FixedTraitPicker {
    fn pick(&self) -> Trait {
        self.0
    }
}

/// Builds the scoring payload from a question set and the user's answers.
#[derive(Clone)]
pub struct SurveyCombiner {
    picker: Arc<dyn TraitPicker>,
}

impl fmt::Debug for SurveyCombiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyCombiner")
            .field("picker", &"<trait picker>")
            .finish()
    }
}

impl Default for SurveyCombiner {
    fn default() -> Self {
        Self::new(Arc::new(RandomTraitPicker))
    }
}

impl SurveyCombiner {
    pub fn new(picker: Arc<dyn TraitPicker>) -> Self {
        Self { picker }
    }

    /// Combine every answer with its question.
    ///
    /// Answers referencing an id missing from `questions` become
    /// [`AnsweredQuestion::unmatched`] records; the payload is still built.
    pub fn combine(
        &self,
        user_id: &str,
        questions: &[QuestionDefinition],
        answers: &[UserAnswer],
    ) -> SurveyPayload {
        let by_id = index_by_id(questions);

        let answers = answers
            .iter()
            .map(|answer| match by_id.get(answer.question_id.as_str()) {
                Some(question) => self.bind(question, answer),
                None => {
                    log::warn!(
                        "Answer references unknown question '{}', sending degraded record",
                        answer.question_id
                    );
                    AnsweredQuestion::unmatched(answer)
                }
            })
            .collect();

        SurveyPayload {
            user_id: user_id.to_string(),
            answers,
        }
    }

    fn bind(&self, question: &QuestionDefinition, answer: &UserAnswer) -> AnsweredQuestion {
        let kind = question.behavior_normalized.as_str();

        let trait_code = match question.trait_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => {
                let picked = self.picker.pick();
                log::debug!(
                    "Question '{}' has no trait, assigned {}",
                    question.id,
                    picked
                );
                picked.code().to_string()
            }
        };

        AnsweredQuestion {
            question_id: question.id.clone(),
            trait_code,
            template_id: question.template_id.clone(),
            intent: question.template.intent.clone(),
            question: question.question.clone(),
            ans: answer_value(kind, &answer.answer),
            score: score_for(kind, &answer.answer),
            key: polarity_for(kind),
            kind: kind.to_string(),
        }
    }
}

/// Index a question set by id. A repeated id keeps its first definition.
fn index_by_id(questions: &[QuestionDefinition]) -> HashMap<&str, &QuestionDefinition> {
    let mut by_id = HashMap::with_capacity(questions.len());
    for question in questions {
        by_id.entry(question.id.as_str()).or_insert(question);
    }
    by_id
}

/// Personality model ids referenced by answered questions.
///
/// Deduplicated, in order of first appearance among the answers.
pub fn distinct_models(questions: &[QuestionDefinition], answers: &[UserAnswer]) -> Vec<String> {
    let by_id = index_by_id(questions);
    let mut seen = HashSet::new();
    let mut models = Vec::new();

    for answer in answers {
        let model = by_id
            .get(answer.question_id.as_str())
            .and_then(|q| q.model.as_ref());
        if let Some(model) = model {
            if seen.insert(model.id.as_str()) {
                models.push(model.id.clone());
            }
        }
    }
    models
}
