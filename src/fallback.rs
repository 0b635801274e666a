//! Built-in placeholder content used when upstream services fail.
//!
//! The outcome-candidate fetch is the one cascade level that must never
//! surface an empty list: downstream generation needs at least one candidate
//! to build a request from. All fallback content lives in this single table
//! rather than being scattered across call sites; a TOML config file may
//! replace the built-in bank (see `config::FileConfig`).

use uuid::Uuid;

use crate::config::PlaceholderOutcomeCfg;
use crate::domain::OutcomeCandidate;

/// Minimal set of generic outcome stubs that keep the workflow usable even
/// when the outcome service is down.
pub fn placeholder_outcomes() -> Vec<OutcomeCandidate> {
  vec![
    OutcomeCandidate {
      id: "fallback-co-1".into(),
      title: "Recall the key facts of the chapter".into(),
      description: "Students can state the main terms, definitions and facts covered.".into(),
      included: false,
    },
    OutcomeCandidate {
      id: "fallback-co-2".into(),
      title: "Explain the central concept".into(),
      description: "Students can describe the chapter's central idea in their own words.".into(),
      included: false,
    },
    OutcomeCandidate {
      id: "fallback-co-3".into(),
      title: "Apply the concept to a new example".into(),
      description: "Students can use what they learned on an unfamiliar problem.".into(),
      included: false,
    },
  ]
}

/// Build a placeholder bank from TOML config entries. Entries without an
/// explicit id get a generated one. An empty config list falls back to the
/// built-in bank so the invariant (never zero candidates) holds.
pub fn placeholder_outcomes_from_cfg(entries: &[PlaceholderOutcomeCfg]) -> Vec<OutcomeCandidate> {
  if entries.is_empty() {
    return placeholder_outcomes();
  }
  entries
    .iter()
    .map(|e| OutcomeCandidate {
      id: e.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
      title: e.title.clone(),
      description: e.description.clone(),
      included: false,
    })
    .collect()
}
