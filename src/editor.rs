//! The generated-set editor: owns the question list produced by one
//! generation call and applies user edits to it.
//!
//! The set is ordered (insertion order = display order) and unique by id.
//! Edits address entries by id, never by positional index. Only content
//! fields are mutable; the id and the outcome back-reference of an entry
//! never change, which `QuestionPatch` enforces by simply not having those
//! fields.

use tracing::{debug, warn};

use crate::domain::{GeneratedQuestion, QuestionKind};
use crate::error::{Result, WorkflowError};

/// Partial update for one question. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct QuestionPatch {
  pub text: Option<String>,
  pub kind: Option<QuestionKind>,
  pub options: Option<Vec<String>>,
  pub correct_answer: Option<String>,
  pub explanation: Option<String>,
  pub difficulty: Option<String>,
}

#[derive(Default)]
pub struct SetEditor {
  questions: Vec<GeneratedQuestion>,
}

impl SetEditor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the entire set. Used once after generation. Duplicate ids are
  /// dropped (first occurrence wins) to keep id addressing sound.
  pub fn load(&mut self, questions: Vec<GeneratedQuestion>) {
    let mut seen = std::collections::HashSet::new();
    let before = questions.len();
    self.questions = questions
      .into_iter()
      .filter(|q| seen.insert(q.id.clone()))
      .collect();
    if self.questions.len() != before {
      warn!(target: "quizforge", dropped = before - self.questions.len(), "Dropped duplicate question ids on load");
    }
    debug!(target: "quizforge", loaded = self.questions.len(), "Generated set loaded");
  }

  /// Merge a partial patch into the entry matching `id`. Ordering and every
  /// other entry are left untouched.
  pub fn update(&mut self, id: &str, patch: QuestionPatch) -> Result<()> {
    let q = self
      .questions
      .iter_mut()
      .find(|q| q.id == id)
      .ok_or_else(|| {
        warn!(target: "quizforge", %id, "update addressed an unknown question");
        WorkflowError::NotFound(id.to_string())
      })?;

    if let Some(text) = patch.text { q.text = text; }
    if let Some(kind) = patch.kind { q.kind = kind; }
    if let Some(options) = patch.options { q.options = options; }
    if let Some(correct_answer) = patch.correct_answer { q.correct_answer = correct_answer; }
    if let Some(explanation) = patch.explanation { q.explanation = explanation; }
    if let Some(difficulty) = patch.difficulty { q.difficulty = difficulty; }
    Ok(())
  }

  /// Remove the entry matching `id`. A missing id is a silent no-op,
  /// matching the observed filter-based deletion semantics.
  pub fn remove(&mut self, id: &str) {
    let before = self.questions.len();
    self.questions.retain(|q| q.id != id);
    if self.questions.len() == before {
      debug!(target: "quizforge", %id, "remove was a no-op (id not in set)");
    }
  }

  /// Owned copy of the current ordered set. Mutating the returned sequence
  /// never affects editor state.
  pub fn snapshot(&self) -> Vec<GeneratedQuestion> {
    self.questions.clone()
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }
}
