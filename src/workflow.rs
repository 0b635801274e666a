//! The workflow session: one Quiz Creation → Preview → Display instance.
//!
//! Ties the cascade controller, the generated-set editor, and the remote
//! adapter together behind a single façade:
//!   - cascade selection (delegated to `CascadeController`)
//!   - question generation (builds the request, seeds the editor
//!     all-or-nothing)
//!   - editing (id-addressed update/remove, read-only snapshots)
//!   - save and export, both consuming the current set as a snapshot
//!
//! One session per workflow instance; state is never shared across
//! instances. The single-threaded event-driven caller model means every
//! synchronous operation completes within one turn; only the fetches and
//! the generation call suspend.

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::cascade::{CascadeController, CascadeSnapshot};
use crate::config::{self, ServiceConfig};
use crate::domain::{GeneratedQuestion, OutcomeCandidate};
use crate::editor::{QuestionPatch, SetEditor};
use crate::error::{Result, WorkflowError};
use crate::export::{self, ExportFormat};
use crate::fallback;
use crate::remote::{ApiClient, SaveQuizRequest};
use crate::util::comma_join;

pub struct WorkflowSession {
  config: ServiceConfig,
  api: ApiClient,
  cascade: CascadeController,
  editor: RwLock<SetEditor>,
}

impl WorkflowSession {
  /// Build a session from env + optional TOML config, using the built-in
  /// placeholder bank unless the config file replaces it.
  pub fn from_env() -> reqwest::Result<Self> {
    let cfg = ServiceConfig::from_env();
    let bank = config::load_file_config_from_env()
      .map(|f| fallback::placeholder_outcomes_from_cfg(&f.placeholder_outcomes))
      .unwrap_or_else(fallback::placeholder_outcomes);
    Self::new(cfg, bank)
  }

  pub fn new(
    config: ServiceConfig,
    placeholder_bank: Vec<OutcomeCandidate>,
  ) -> reqwest::Result<Self> {
    let api = ApiClient::new(&config, placeholder_bank)?;
    Ok(Self {
      cascade: CascadeController::new(api.clone()),
      api,
      config,
      editor: RwLock::new(SetEditor::new()),
    })
  }

  /// The selection cascade: `load_grades`, `set_grade`, `set_subject`,
  /// `set_chapter`, `toggle_outcome`, `set_count_policy`.
  pub fn cascade(&self) -> &CascadeController {
    &self.cascade
  }

  pub async fn cascade_snapshot(&self) -> CascadeSnapshot {
    self.cascade.snapshot().await
  }

  // --- Generation ---

  /// Generate questions for the current selection chain and seed the editor
  /// with the result. All-or-nothing: on failure the previously loaded set
  /// (if any) is left untouched. Returns the number of questions loaded.
  #[instrument(level = "info", skip(self))]
  pub async fn generate(&self) -> Result<usize> {
    let request = self.cascade.build_generation_request().await?;
    let questions = self.api.generate_questions(&request).await?;
    let count = questions.len();
    self.editor.write().await.load(questions);
    info!(target: "generation", count, "Generated set loaded into editor");
    Ok(count)
  }

  // --- Editing ---

  /// Merge a partial patch into the question matching `id`.
  pub async fn update_question(&self, id: &str, patch: QuestionPatch) -> Result<()> {
    self.editor.write().await.update(id, patch)
  }

  /// Remove the question matching `id`; silent no-op for an unknown id.
  pub async fn remove_question(&self, id: &str) {
    self.editor.write().await.remove(id);
  }

  /// Owned copy of the current edited set, in display order.
  pub async fn snapshot(&self) -> Vec<GeneratedQuestion> {
    self.editor.read().await.snapshot()
  }

  // --- Terminal consumers ---

  /// Persist the edited set upstream. The in-memory set is preserved on
  /// failure so the user can retry without regenerating.
  #[instrument(level = "info", skip(self))]
  pub async fn save_quiz(&self) -> Result<()> {
    let snap = self.cascade.snapshot().await;
    let grade = snap.grade.ok_or(WorkflowError::InvalidState {
      operation: "save_quiz",
      missing: crate::domain::CascadeLevel::Grade,
    })?;
    let subject = snap.subject.ok_or(WorkflowError::InvalidState {
      operation: "save_quiz",
      missing: crate::domain::CascadeLevel::Subject,
    })?;
    let chapter = snap.chapter.ok_or(WorkflowError::InvalidState {
      operation: "save_quiz",
      missing: crate::domain::CascadeLevel::Chapter,
    })?;

    let outcome_ids: Vec<&str> = snap
      .outcomes
      .iter()
      .filter(|o| o.included)
      .map(|o| o.id.as_str())
      .collect();

    let payload = SaveQuizRequest {
      org_id: self.config.org_id.clone(),
      user_id: self.config.user_id.clone(),
      class_id: grade.id,
      subject_id: subject.id,
      chapter_id: chapter.id,
      outcome_ids: comma_join(&outcome_ids),
      questions: self.editor.read().await.snapshot(),
    };
    self.api.save_quiz(&payload).await
  }

  /// Render the current set to a downloadable file. Pure function of the
  /// snapshot; editor state is untouched.
  pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>> {
    let questions = self.snapshot().await;
    export::render(&questions, format)
  }
}
