//! The selection cascade: grade → subject → chapter → outcome candidates.
//!
//! This module owns the four-level dependent selection chain and its
//! invalidation rule. Changing an ancestor clears every descendant level
//! synchronously and bumps the descendant epochs; a fetch resolving for a
//! stale epoch is discarded rather than applied, so the most recent
//! selection always wins regardless of response ordering ("last selection
//! wins"). There is no request cancellation; the discard rule substitutes
//! for it.
//!
//! Failure rule: a failed cascade fetch leaves the dependent option list
//! empty and surfaces a recoverable error. The ancestor selection is never
//! rolled back; the user retries by reselecting.

use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::domain::{
  CascadeLevel, ChapterSelection, CountPolicy, GenerationRequest, GradeSelection,
  OutcomeCandidate, SubjectSelection,
};
use crate::error::{Result, WorkflowError};
use crate::remote::ApiClient;

#[derive(Default)]
struct CascadeState {
  grade_epoch: u64,
  grades: Vec<GradeSelection>,
  grade: Option<GradeSelection>,

  subject_epoch: u64,
  subjects: Vec<SubjectSelection>,
  subject: Option<SubjectSelection>,

  chapter_epoch: u64,
  chapters: Vec<ChapterSelection>,
  chapter: Option<ChapterSelection>,

  outcome_epoch: u64,
  outcomes: Vec<OutcomeCandidate>,

  policy: CountPolicy,
}

impl CascadeState {
  fn clear_below_grade(&mut self) {
    self.subject = None;
    self.subjects.clear();
    self.subject_epoch += 1;
    self.clear_below_subject();
  }

  fn clear_below_subject(&mut self) {
    self.chapter = None;
    self.chapters.clear();
    self.chapter_epoch += 1;
    self.clear_below_chapter();
  }

  fn clear_below_chapter(&mut self) {
    self.outcomes.clear();
    self.outcome_epoch += 1;
  }
}

/// Read-only view of the current cascade state, for UI binding and for the
/// session façade. Cloned out under the lock; never a live reference.
#[derive(Clone, Debug, Default)]
pub struct CascadeSnapshot {
  pub grades: Vec<GradeSelection>,
  pub grade: Option<GradeSelection>,
  pub subjects: Vec<SubjectSelection>,
  pub subject: Option<SubjectSelection>,
  pub chapters: Vec<ChapterSelection>,
  pub chapter: Option<ChapterSelection>,
  pub outcomes: Vec<OutcomeCandidate>,
  pub policy: CountPolicy,
}

pub struct CascadeController {
  api: ApiClient,
  state: RwLock<CascadeState>,
}

impl CascadeController {
  pub fn new(api: ApiClient) -> Self {
    Self { api, state: RwLock::new(CascadeState::default()) }
  }

  /// Populate the grade options. Resets the whole cascade: any previous
  /// selection chain is invalid against a fresh grade list.
  #[instrument(level = "info", skip(self))]
  pub async fn load_grades(&self) -> Result<()> {
    let epoch = {
      let mut s = self.state.write().await;
      s.grade = None;
      s.grades.clear();
      s.grade_epoch += 1;
      s.clear_below_grade();
      s.grade_epoch
    };

    let fetched = self.api.fetch_grades().await;

    let mut s = self.state.write().await;
    if s.grade_epoch != epoch {
      debug!(target: "cascade", level = %CascadeLevel::Grade, "Discarding stale grade fetch");
      return Ok(());
    }
    match fetched {
      Ok(grades) => {
        s.grades = grades;
        Ok(())
      }
      Err(e) => {
        s.grades.clear();
        Err(e)
      }
    }
  }

  /// Select a grade by id. No-op if it is already the current grade.
  /// Clears subject/chapter/outcome state and fetches subjects for the new
  /// grade.
  #[instrument(level = "info", skip(self), fields(%id))]
  pub async fn set_grade(&self, id: &str) -> Result<()> {
    let epoch = {
      let mut s = self.state.write().await;
      if s.grade.as_ref().map(|g| g.id.as_str()) == Some(id) {
        debug!(target: "cascade", %id, "Grade unchanged; no-op");
        return Ok(());
      }
      let grade = s
        .grades
        .iter()
        .find(|g| g.id == id)
        .cloned()
        .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
      s.grade = Some(grade);
      s.clear_below_grade();
      s.subject_epoch
    };

    let fetched = self.api.fetch_subjects(id).await;

    let mut s = self.state.write().await;
    if s.subject_epoch != epoch {
      debug!(target: "cascade", %id, level = %CascadeLevel::Subject, "Discarding stale subject fetch");
      return Ok(());
    }
    match fetched {
      Ok(subjects) => {
        s.subjects = subjects;
        Ok(())
      }
      Err(e) => {
        s.subjects.clear();
        Err(e)
      }
    }
  }

  /// Select a subject by id. Requires a grade. Clears chapter/outcome state
  /// and fetches chapters. Reselecting the same subject refetches, which is
  /// how a user recovers from an earlier chapter-fetch failure.
  #[instrument(level = "info", skip(self), fields(%id))]
  pub async fn set_subject(&self, id: &str) -> Result<()> {
    let (grade_id, epoch) = {
      let mut s = self.state.write().await;
      let grade_id = s
        .grade
        .as_ref()
        .map(|g| g.id.clone())
        .ok_or(WorkflowError::InvalidState { operation: "set_subject", missing: CascadeLevel::Grade })?;
      let subject = s
        .subjects
        .iter()
        .find(|sub| sub.id == id)
        .cloned()
        .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
      s.subject = Some(subject);
      s.clear_below_subject();
      (grade_id, s.chapter_epoch)
    };

    let fetched = self.api.fetch_chapters(&grade_id, id).await;

    let mut s = self.state.write().await;
    if s.chapter_epoch != epoch {
      debug!(target: "cascade", %id, level = %CascadeLevel::Chapter, "Discarding stale chapter fetch");
      return Ok(());
    }
    match fetched {
      Ok(chapters) => {
        s.chapters = chapters;
        Ok(())
      }
      Err(e) => {
        s.chapters.clear();
        Err(e)
      }
    }
  }

  /// Select a chapter by id. Requires a subject. Replaces the outcome
  /// candidate set wholesale; previously toggled `included` flags are
  /// discarded. The outcome fetch itself never fails: on upstream failure
  /// the adapter substitutes the placeholder bank.
  #[instrument(level = "info", skip(self), fields(%id))]
  pub async fn set_chapter(&self, id: &str) -> Result<()> {
    let (grade_id, subject_id, epoch) = {
      let mut s = self.state.write().await;
      let subject_id = s
        .subject
        .as_ref()
        .map(|sub| sub.id.clone())
        .ok_or(WorkflowError::InvalidState { operation: "set_chapter", missing: CascadeLevel::Subject })?;
      // Subject present implies grade present (cascade invariant).
      let grade_id = s
        .grade
        .as_ref()
        .map(|g| g.id.clone())
        .ok_or(WorkflowError::InvalidState { operation: "set_chapter", missing: CascadeLevel::Grade })?;
      let chapter = s
        .chapters
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
      s.chapter = Some(chapter);
      s.clear_below_chapter();
      (grade_id, subject_id, s.outcome_epoch)
    };

    let outcomes = self.api.fetch_outcome_candidates(&grade_id, &subject_id, id).await;

    let mut s = self.state.write().await;
    if s.outcome_epoch != epoch {
      debug!(target: "cascade", %id, level = %CascadeLevel::Outcome, "Discarding stale outcome fetch");
      return Ok(());
    }
    s.outcomes = outcomes;
    Ok(())
  }

  /// Flip the `included` flag of one candidate. Synchronous; touches no
  /// ancestor state.
  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn toggle_outcome(&self, id: &str) -> Result<bool> {
    let mut s = self.state.write().await;
    match s.outcomes.iter_mut().find(|o| o.id == id) {
      Some(o) => {
        o.included = !o.included;
        Ok(o.included)
      }
      None => {
        warn!(target: "cascade", %id, "toggle_outcome addressed an unknown candidate");
        Err(WorkflowError::NotFound(id.to_string()))
      }
    }
  }

  /// Store the question-count policy. Validated only at generation time; a
  /// policy may be set before any outcome is chosen.
  pub async fn set_count_policy(&self, policy: CountPolicy) {
    self.state.write().await.policy = policy;
  }

  pub async fn snapshot(&self) -> CascadeSnapshot {
    let s = self.state.read().await;
    CascadeSnapshot {
      grades: s.grades.clone(),
      grade: s.grade.clone(),
      subjects: s.subjects.clone(),
      subject: s.subject.clone(),
      chapters: s.chapters.clone(),
      chapter: s.chapter.clone(),
      outcomes: s.outcomes.clone(),
      policy: s.policy,
    }
  }

  /// Build the generation request from the current chain. Requires all four
  /// selections: grade, subject, chapter, and at least one included outcome.
  /// A per-outcome policy with nothing included computes to zero and is
  /// rejected here, before any network call.
  pub async fn build_generation_request(&self) -> Result<GenerationRequest> {
    let s = self.state.read().await;
    let grade = s
      .grade
      .clone()
      .ok_or(WorkflowError::InvalidState { operation: "generate", missing: CascadeLevel::Grade })?;
    let subject = s
      .subject
      .clone()
      .ok_or(WorkflowError::InvalidState { operation: "generate", missing: CascadeLevel::Subject })?;
    let chapter = s
      .chapter
      .clone()
      .ok_or(WorkflowError::InvalidState { operation: "generate", missing: CascadeLevel::Chapter })?;

    let outcomes: Vec<OutcomeCandidate> =
      s.outcomes.iter().filter(|o| o.included).cloned().collect();

    // Per-outcome policy with nothing included computes to zero: blocked
    // before any network call. A fixed policy with nothing included is a
    // missing selection, not an empty request.
    let question_count = s.policy.effective_count(outcomes.len());
    if question_count == 0 {
      return Err(WorkflowError::EmptyRequest);
    }
    if outcomes.is_empty() {
      return Err(WorkflowError::InvalidState {
        operation: "generate",
        missing: CascadeLevel::Outcome,
      });
    }

    Ok(GenerationRequest { grade, subject, chapter, outcomes, question_count })
  }
}
