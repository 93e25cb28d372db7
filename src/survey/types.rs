//! Survey question definitions, raw answers and the scoring payload.

use serde::{Deserialize, Serialize};

/// Placeholder carried by records whose question could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// Template a question was generated from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    #[serde(default)]
    pub intent: String,
}

/// Personality model a question belongs to, used for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityModelRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A question as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    #[serde(alias = "_id")]
    pub id: String,
    /// Trait code; the backend sometimes leaves it empty.
    #[serde(default, rename = "trait")]
    pub trait_code: Option<String>,
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub template: QuestionTemplate,
    #[serde(default)]
    pub question: String,
    /// Normalized behaviour kind (`yesno`, `likert5`, ...).
    #[serde(default)]
    pub behavior_normalized: String,
    #[serde(default)]
    pub model: Option<PersonalityModelRef>,
}

impl QuestionDefinition {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            trait_code: None,
            template_id: String::new(),
            template: QuestionTemplate::default(),
            question: String::new(),
            behavior_normalized: kind.into(),
            model: None,
        }
    }

    /// Builder: set the trait code.
    pub fn with_trait(mut self, code: impl Into<String>) -> Self {
        self.trait_code = Some(code.into());
        self
    }

    /// Builder: set template id and intent.
    pub fn with_template(
        mut self,
        template_id: impl Into<String>,
        intent: impl Into<String>,
    ) -> Self {
        self.template_id = template_id.into();
        self.template.intent = intent.into();
        self
    }

    /// Builder: set the question text.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    /// Builder: attach a personality model.
    pub fn with_model(mut self, id: impl Into<String>) -> Self {
        self.model = Some(PersonalityModelRef {
            id: id.into(),
            name: None,
        });
        self
    }
}

/// A raw answer collected by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub question_id: String,
    pub answer: String,
}

impl UserAnswer {
    pub fn new(question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: answer.into(),
        }
    }
}

/// Direction in which an answer moves its trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Pos,
    Neg,
}

/// One answer bound to its question, ready for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question_id: String,
    /// Trait code, or [`UNKNOWN`] for unmatched answers.
    #[serde(rename = "trait")]
    pub trait_code: String,
    pub template_id: String,
    pub intent: String,
    pub question: String,
    pub ans: String,
    pub score: i32,
    pub key: Polarity,
    pub kind: String,
}

impl AnsweredQuestion {
    /// Record for an answer whose question id is not in the set.
    pub fn unmatched(answer: &UserAnswer) -> Self {
        Self {
            question_id: answer.question_id.clone(),
            trait_code: UNKNOWN.to_string(),
            template_id: UNKNOWN.to_string(),
            intent: UNKNOWN.to_string(),
            question: UNKNOWN.to_string(),
            ans: answer.answer.clone(),
            score: 0,
            key: Polarity::Pos,
            kind: UNKNOWN.to_string(),
        }
    }

    pub fn is_unmatched(&self) -> bool {
        self.kind == UNKNOWN && self.trait_code == UNKNOWN
    }
}

/// Body sent to the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPayload {
    pub user_id: String,
    pub answers: Vec<AnsweredQuestion>,
}
