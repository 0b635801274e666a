//! Error taxonomy for the workflow engine.
//!
//! Network-layer errors are converted at the `remote` adapter boundary;
//! nothing crosses an await point as a raw `reqwest::Error`. Variants map
//! one-to-one onto the recovery behaviors the session implements:
//! a failed cascade fetch leaves the level empty without rolling back the
//! ancestor selection, a failed generation leaves the previous set intact,
//! and a failed save preserves the in-memory set for retry.

use thiserror::Error;

use crate::domain::CascadeLevel;

#[derive(Debug, Error)]
pub enum WorkflowError {
  /// A cascade fetch (grades/subjects/chapters) failed. Recoverable: the
  /// dependent list is left empty and the ancestor selection stands.
  #[error("failed to fetch {level} list: {reason}")]
  FetchFailed { level: CascadeLevel, reason: String },

  /// Generation attempted with an effective question count of zero.
  /// Raised before any network call is made.
  #[error("nothing to generate: effective question count is zero")]
  EmptyRequest,

  /// The question-generation endpoint failed or timed out. All-or-nothing:
  /// no partial set is ever loaded into the editor.
  #[error("question generation failed: {0}")]
  GenerationFailed(String),

  /// An operation addressed an id that is not in the current set.
  /// A logic error, logged rather than shown to the end user.
  #[error("no entry with id '{0}'")]
  NotFound(String),

  /// A cascade setter was called before its parent selection existed.
  #[error("{operation} requires a {missing} selection first")]
  InvalidState {
    operation: &'static str,
    missing: CascadeLevel,
  },

  /// The save-quiz call failed; the in-memory set is preserved so the user
  /// can retry without regenerating.
  #[error("saving quiz failed: {0}")]
  SaveFailed(String),

  /// Rendering to PDF/DOCX failed; no partial file is handed out.
  #[error("export failed: {0}")]
  ExportFailed(String),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
