//! Domain models for the quiz workflow: cascade selections, outcome
//! candidates, count policy, generation requests, and generated questions.
//!
//! Everything here is transient client state; nothing is persisted locally
//! except via the explicit save call in `remote`.

use serde::{Deserialize, Serialize};

/// One level of the dependent-selection cascade. Used for error reporting
/// and for keying the fallback table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeLevel {
  Grade,
  Subject,
  Chapter,
  Outcome,
}

impl std::fmt::Display for CascadeLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      CascadeLevel::Grade => write!(f, "grade"),
      CascadeLevel::Subject => write!(f, "subject"),
      CascadeLevel::Chapter => write!(f, "chapter"),
      CascadeLevel::Outcome => write!(f, "outcome"),
    }
  }
}

/// Root of the cascade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSelection {
  pub id: String,
  pub name: String,
}

/// Cleared whenever the grade changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSelection {
  pub id: String,
  pub name: String,
  pub grade_id: String,
}

/// Cleared whenever the subject changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSelection {
  pub id: String,
  pub name: String,
  pub subject_id: String,
}

/// An expected-learning-outcome candidate for the selected chapter.
/// The candidate set is replaced wholesale on chapter change; `included`
/// state never survives that replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCandidate {
  pub id: String,
  pub title: String,
  pub description: String,
  #[serde(default)]
  pub included: bool,
}

/// How many questions to ask the generator for.
/// Validated at generation time, not at set time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CountPolicy {
  /// A fixed total.
  Fixed { count: u32 },
  /// N questions per included outcome.
  PerOutcome { per_outcome: u32 },
}

impl Default for CountPolicy {
  fn default() -> Self {
    CountPolicy::Fixed { count: 5 }
  }
}

impl CountPolicy {
  /// Effective question count given how many outcomes are included.
  /// Zero means generation must be blocked, never silently attempted.
  pub fn effective_count(&self, included_outcomes: usize) -> u32 {
    match self {
      CountPolicy::Fixed { count } => *count,
      CountPolicy::PerOutcome { per_outcome } => per_outcome * included_outcomes as u32,
    }
  }
}

/// Value object handed to the generation endpoint. Constructible only when
/// all four cascade selections are non-empty (enforced by the session).
#[derive(Clone, Debug, Serialize)]
pub struct GenerationRequest {
  pub grade: GradeSelection,
  pub subject: SubjectSelection,
  pub chapter: ChapterSelection,
  /// Only the outcomes with `included = true`.
  pub outcomes: Vec<OutcomeCandidate>,
  pub question_count: u32,
}

/// Closed set of question shapes the generator may produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  #[serde(alias = "multiple-choice", alias = "mcq")]
  MultipleChoice,
  #[serde(alias = "true-false", alias = "truefalse")]
  TrueFalse,
  #[serde(alias = "short-answer")]
  ShortAnswer,
  #[serde(alias = "fill-in-blank", alias = "fill-in-the-blank", alias = "fill_in_the_blank")]
  FillInBlank,
}

/// One generated question. Created in bulk by the generation call; content
/// fields are individually mutable through the editor; the id and the
/// outcome back-reference are not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
  pub id: String,
  pub text: String,
  pub kind: QuestionKind,
  /// Present for multiple-choice (and sometimes true/false) questions.
  #[serde(default)]
  pub options: Vec<String>,
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
  /// Free-form tag (e.g. "easy", "medium", "hard") as delivered upstream.
  #[serde(default)]
  pub difficulty: String,
  /// Outcome this question was generated for.
  #[serde(default)]
  pub outcome_id: String,
}
