//! Quizforge · quiz-creation workflow engine
//!
//! - Cascading dependent selections (grade → subject → chapter → outcomes)
//!   with last-selection-wins epoch tracking
//! - Remote fetch adapter over the upstream quiz services (reqwest),
//!   normalizing inconsistent field naming into one canonical model
//! - Generated-set editor (id-addressed update/remove, read-only snapshots)
//! - PDF/DOCX export of the edited set
//!
//! Important env variables:
//!   QUIZFORGE_BASE_URL     : upstream base URL (default dev proxy path)
//!   QUIZFORGE_ORG_ID       : org scoping header value
//!   QUIZFORGE_USER_ID      : user id included in save payloads
//!   QUIZFORGE_CONFIG_PATH  : path to TOML config (service overrides +
//!                            optional placeholder-outcome bank)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

pub mod cascade;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod export;
pub mod fallback;
pub mod remote;
pub mod telemetry;
pub mod util;
pub mod workflow;

pub use cascade::{CascadeController, CascadeSnapshot};
pub use config::ServiceConfig;
pub use domain::{
  CascadeLevel, ChapterSelection, CountPolicy, GeneratedQuestion, GenerationRequest,
  GradeSelection, OutcomeCandidate, QuestionKind, SubjectSelection,
};
pub use editor::{QuestionPatch, SetEditor};
pub use error::{Result, WorkflowError};
pub use export::ExportFormat;
pub use remote::ApiClient;
pub use workflow::WorkflowSession;
