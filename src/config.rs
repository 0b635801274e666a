//! Service configuration: environment variables plus an optional TOML file.
//!
//! Env variables:
//!   QUIZFORGE_BASE_URL     : base URL of the upstream services
//!                            (default "http://localhost:8080/api/v1",
//!                            the development proxy path)
//!   QUIZFORGE_ORG_ID       : org identifier sent as the X-Org-Id header
//!   QUIZFORGE_USER_ID      : user identifier included in save payloads
//!   QUIZFORGE_BOARD        : curriculum board sent to outcome generation
//!   QUIZFORGE_TIMEOUT_SECS : per-request timeout (default 20)
//!   QUIZFORGE_CONFIG_PATH  : path to TOML config (service overrides +
//!                            optional placeholder-outcome bank)

use serde::Deserialize;
use tracing::{error, info};

/// Retry behavior for the idempotent cascade fetches. Generation and save
/// are never auto-retried.
#[derive(Clone, Debug, Deserialize)]
pub struct RetryPolicy {
  /// Total attempts, including the first one.
  #[serde(default = "default_attempts")]
  pub max_attempts: u32,
  /// Base delay; doubled per attempt, with jitter added on top.
  #[serde(default = "default_base_delay_ms")]
  pub base_delay_ms: u64,
}

fn default_attempts() -> u32 { 3 }
fn default_base_delay_ms() -> u64 { 200 }

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: default_attempts(), base_delay_ms: default_base_delay_ms() }
  }
}

/// Resolved configuration used by the remote adapter and the session.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
  pub base_url: String,
  pub org_id: String,
  pub user_id: String,
  pub board: String,
  pub timeout_secs: u64,
  pub retry: RetryPolicy,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8080/api/v1".into(),
      org_id: String::new(),
      user_id: String::new(),
      board: "general".into(),
      timeout_secs: 20,
      retry: RetryPolicy::default(),
    }
  }
}

impl ServiceConfig {
  /// Build from env, applying TOML overrides from QUIZFORGE_CONFIG_PATH
  /// first and explicit env variables on top.
  pub fn from_env() -> Self {
    let mut cfg = Self::default();

    if let Some(file) = load_file_config_from_env() {
      if let Some(s) = file.service {
        if let Some(v) = s.base_url { cfg.base_url = v; }
        if let Some(v) = s.org_id { cfg.org_id = v; }
        if let Some(v) = s.user_id { cfg.user_id = v; }
        if let Some(v) = s.board { cfg.board = v; }
        if let Some(v) = s.timeout_secs { cfg.timeout_secs = v; }
        if let Some(v) = s.retry { cfg.retry = v; }
      }
    }

    if let Ok(v) = std::env::var("QUIZFORGE_BASE_URL") { cfg.base_url = v; }
    if let Ok(v) = std::env::var("QUIZFORGE_ORG_ID") { cfg.org_id = v; }
    if let Ok(v) = std::env::var("QUIZFORGE_USER_ID") { cfg.user_id = v; }
    if let Ok(v) = std::env::var("QUIZFORGE_BOARD") { cfg.board = v; }
    if let Ok(v) = std::env::var("QUIZFORGE_TIMEOUT_SECS") {
      if let Ok(secs) = v.parse::<u64>() { cfg.timeout_secs = secs; }
    }

    cfg
  }
}

/// TOML file schema. Everything optional; unknown keys rejected so typos
/// in an override file fail loudly at load time.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
  #[serde(default)]
  pub service: Option<ServiceSection>,
  /// Optional replacement for the built-in placeholder outcome bank
  /// (see `fallback`).
  #[serde(default)]
  pub placeholder_outcomes: Vec<PlaceholderOutcomeCfg>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
  #[serde(default)] pub base_url: Option<String>,
  #[serde(default)] pub org_id: Option<String>,
  #[serde(default)] pub user_id: Option<String>,
  #[serde(default)] pub board: Option<String>,
  #[serde(default)] pub timeout_secs: Option<u64>,
  #[serde(default)] pub retry: Option<RetryPolicy>,
}

/// Placeholder outcome entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceholderOutcomeCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
}

/// Attempt to load `FileConfig` from QUIZFORGE_CONFIG_PATH.
/// On any parsing/IO error, returns None.
pub fn load_file_config_from_env() -> Option<FileConfig> {
  let path = std::env::var("QUIZFORGE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<FileConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quizforge", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizforge", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizforge", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_config_parses_service_and_placeholders() {
    let toml_src = r#"
      [service]
      base_url = "https://quiz.example.org/api/v1"
      org_id = "org-42"
      timeout_secs = 10

      [[placeholder_outcomes]]
      title = "Recall the key terms of the chapter"
      description = "Students can define the core vocabulary."

      [[placeholder_outcomes]]
      id = "po-2"
      title = "Apply the main concept"
    "#;
    let cfg: FileConfig = toml::from_str(toml_src).unwrap();
    let svc = cfg.service.unwrap();
    assert_eq!(svc.base_url.as_deref(), Some("https://quiz.example.org/api/v1"));
    assert_eq!(svc.timeout_secs, Some(10));
    assert_eq!(cfg.placeholder_outcomes.len(), 2);
    assert_eq!(cfg.placeholder_outcomes[1].id.as_deref(), Some("po-2"));
    assert!(cfg.placeholder_outcomes[0].id.is_none());
  }

  #[test]
  fn unknown_keys_are_rejected() {
    let toml_src = r#"
      [service]
      base_uri = "oops"
    "#;
    assert!(toml::from_str::<FileConfig>(toml_src).is_err());
  }
}
