//! HTTP adapter for the upstream quiz services.
//!
//! Issues the four cascade fetches, the question-generation call, and the
//! save call, and normalizes the inconsistent upstream field naming
//! (`classid` vs `classId`, numeric vs string ids, `co_id`/`co_title`
//! outcome rows, ...) into the canonical domain shapes. All naming drift is
//! isolated to the wire DTOs at the bottom of this file.
//!
//! Retry policy: the cascade fetches are idempotent and get bounded retry
//! with exponential backoff + jitter. Generation and save are treated as
//! non-idempotent and are never auto-retried; failures surface to the caller
//! for manual retry.
//!
//! NOTE: We keep payload truncations short in logs to avoid leaking content.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{RetryPolicy, ServiceConfig};
use crate::domain::{
  CascadeLevel, ChapterSelection, GeneratedQuestion, GenerationRequest, GradeSelection,
  OutcomeCandidate, QuestionKind, SubjectSelection,
};
use crate::error::{Result, WorkflowError};
use crate::util::trunc_for_log;

const ORG_HEADER: &str = "X-Org-Id";

#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: String,
  org_id: String,
  board: String,
  retry: RetryPolicy,
  /// Consolidated fallback bank for the outcome level (see `fallback`).
  placeholder_outcomes: Vec<OutcomeCandidate>,
}

impl ApiClient {
  /// Build the client from resolved config. The placeholder bank is the
  /// single fallback table consulted when the outcome fetch fails.
  pub fn new(
    cfg: &ServiceConfig,
    placeholder_outcomes: Vec<OutcomeCandidate>,
  ) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()?;

    Ok(Self {
      client,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      org_id: cfg.org_id.clone(),
      board: cfg.board.clone(),
      retry: cfg.retry.clone(),
      placeholder_outcomes,
    })
  }

  // --- Cascade fetches (idempotent, retried) ---

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_grades(&self) -> Result<Vec<GradeSelection>> {
    let url = format!("{}/grades", self.base_url);
    let rows: Vec<GradeRow> = self
      .get_with_retry(&url, &[], CascadeLevel::Grade)
      .await?;
    Ok(rows.into_iter().map(|r| GradeSelection { id: r.id, name: r.name }).collect())
  }

  #[instrument(level = "info", skip(self), fields(%grade_id))]
  pub async fn fetch_subjects(&self, grade_id: &str) -> Result<Vec<SubjectSelection>> {
    let url = format!("{}/subjects", self.base_url);
    let rows: Vec<SubjectRow> = self
      .get_with_retry(&url, &[("gradeId", grade_id)], CascadeLevel::Subject)
      .await?;
    Ok(
      rows
        .into_iter()
        .map(|r| SubjectSelection { id: r.id, name: r.name, grade_id: grade_id.to_string() })
        .collect(),
    )
  }

  #[instrument(level = "info", skip(self), fields(%grade_id, %subject_id))]
  pub async fn fetch_chapters(
    &self,
    grade_id: &str,
    subject_id: &str,
  ) -> Result<Vec<ChapterSelection>> {
    let url = format!("{}/chapters", self.base_url);
    let rows: Vec<ChapterRow> = self
      .get_with_retry(
        &url,
        &[("gradeId", grade_id), ("subjectId", subject_id)],
        CascadeLevel::Chapter,
      )
      .await?;
    Ok(
      rows
        .into_iter()
        .map(|r| ChapterSelection { id: r.id, name: r.name, subject_id: subject_id.to_string() })
        .collect(),
    )
  }

  /// Fetch outcome candidates for a chapter. Upstream models this as a
  /// generation POST, but it is semantically idempotent, so it shares the
  /// cascade retry policy. On final failure we substitute the placeholder
  /// bank: downstream generation needs at least one candidate, so an empty
  /// list here would leave the workflow broken.
  #[instrument(level = "info", skip(self), fields(%grade_id, %subject_id, %chapter_id))]
  pub async fn fetch_outcome_candidates(
    &self,
    grade_id: &str,
    subject_id: &str,
    chapter_id: &str,
  ) -> Vec<OutcomeCandidate> {
    let url = format!("{}/outcomes/generate", self.base_url);
    let body = OutcomeGenBody {
      board: self.board.clone(),
      grade_id: grade_id.to_string(),
      subject_id: subject_id.to_string(),
      chapter_id: chapter_id.to_string(),
    };

    let result: Result<OutcomeGenResponse> = self
      .post_with_retry(&url, &body, CascadeLevel::Outcome)
      .await;

    match result {
      Ok(resp) => {
        let candidates: Vec<OutcomeCandidate> = resp
          .course_outcomes
          .into_iter()
          .map(|r| OutcomeCandidate {
            id: r.co_id,
            title: r.co_title,
            description: r.co_description,
            included: false,
          })
          .collect();
        if candidates.is_empty() {
          warn!(target: "generation", %chapter_id, "Outcome service returned no candidates; using placeholder bank");
          self.placeholder_outcomes.clone()
        } else {
          candidates
        }
      }
      Err(e) => {
        error!(target: "generation", %chapter_id, error = %e, "Outcome fetch failed; using placeholder bank");
        self.placeholder_outcomes.clone()
      }
    }
  }

  // --- Generation & save (non-idempotent, never auto-retried) ---

  /// Call the question-generation endpoint. All-or-nothing: a failure
  /// returns an error and no partial set. A zero effective count is rejected
  /// before any network traffic.
  #[instrument(
    level = "info",
    skip(self, req),
    fields(grade = %req.grade.id, subject = %req.subject.id, chapter = %req.chapter.id, count = req.question_count)
  )]
  pub async fn generate_questions(
    &self,
    req: &GenerationRequest,
  ) -> Result<Vec<GeneratedQuestion>> {
    if req.question_count == 0 {
      return Err(WorkflowError::EmptyRequest);
    }

    let url = format!("{}/questions/generate", self.base_url);
    let body = QuestionGenBody {
      grade_id: req.grade.id.clone(),
      subject_id: req.subject.id.clone(),
      chapter_id: req.chapter.id.clone(),
      question_count: req.question_count,
      selected_outcomes: req
        .outcomes
        .iter()
        .map(|o| OutcomeRef {
          co_id: o.id.clone(),
          co_title: o.title.clone(),
          co_description: o.description.clone(),
        })
        .collect(),
    };

    let start = std::time::Instant::now();
    let resp: QuestionGenResponse = self
      .post_once(&url, &body)
      .await
      .map_err(WorkflowError::GenerationFailed)?;
    let elapsed = start.elapsed();

    let questions = normalize_questions(resp.questions);
    info!(target: "generation", ?elapsed, returned = questions.len(), "Question generation succeeded");
    Ok(questions)
  }

  /// Persist the edited set upstream. The caller keeps its snapshot; a
  /// failed save must never cost the user their edits.
  #[instrument(level = "info", skip(self, payload), fields(class = %payload.class_id, questions = payload.questions.len()))]
  pub async fn save_quiz(&self, payload: &SaveQuizRequest) -> Result<()> {
    let url = format!("{}/quizzes", self.base_url);
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "quizforge/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(ORG_HEADER, &self.org_id)
      .json(payload)
      .send()
      .await
      .map_err(|e| WorkflowError::SaveFailed(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(WorkflowError::SaveFailed(format!("HTTP {}: {}", status, msg)));
    }
    info!(target: "quizforge", "Quiz saved upstream");
    Ok(())
  }

  // --- Transport helpers ---

  async fn get_with_retry<T: DeserializeOwned>(
    &self,
    url: &str,
    query: &[(&str, &str)],
    level: CascadeLevel,
  ) -> Result<T> {
    let mut last_err = String::new();
    for attempt in 0..self.retry.max_attempts {
      if attempt > 0 {
        tokio::time::sleep(self.backoff_delay(attempt)).await;
      }
      let send = self
        .client
        .get(url)
        .query(query)
        .header(USER_AGENT, "quizforge/0.1")
        .header(ORG_HEADER, &self.org_id)
        .send()
        .await;
      match self.read_json::<T>(send).await {
        Ok(v) => return Ok(v),
        Err(e) => {
          warn!(target: "quizforge", %level, attempt, error = %e, "Cascade fetch attempt failed");
          last_err = e;
        }
      }
    }
    Err(WorkflowError::FetchFailed { level, reason: last_err })
  }

  async fn post_with_retry<B: Serialize, T: DeserializeOwned>(
    &self,
    url: &str,
    body: &B,
    level: CascadeLevel,
  ) -> Result<T> {
    let mut last_err = String::new();
    for attempt in 0..self.retry.max_attempts {
      if attempt > 0 {
        tokio::time::sleep(self.backoff_delay(attempt)).await;
      }
      match self.post_once(url, body).await {
        Ok(v) => return Ok(v),
        Err(e) => {
          warn!(target: "quizforge", %level, attempt, error = %e, "Cascade fetch attempt failed");
          last_err = e;
        }
      }
    }
    Err(WorkflowError::FetchFailed { level, reason: last_err })
  }

  /// Single POST request/response, no retry. Errors are plain strings so
  /// callers can wrap them in the right taxonomy variant.
  async fn post_once<B: Serialize, T: DeserializeOwned>(
    &self,
    url: &str,
    body: &B,
  ) -> std::result::Result<T, String> {
    let send = self
      .client
      .post(url)
      .header(USER_AGENT, "quizforge/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(ORG_HEADER, &self.org_id)
      .json(body)
      .send()
      .await;
    self.read_json(send).await
  }

  async fn read_json<T: DeserializeOwned>(
    &self,
    send: reqwest::Result<reqwest::Response>,
  ) -> std::result::Result<T, String> {
    let res = send.map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(format!("HTTP {}: {}", status, msg));
    }
    res.json::<T>().await.map_err(|e| format!("malformed body: {}", e))
  }

  fn backoff_delay(&self, attempt: u32) -> Duration {
    let base = self.retry.base_delay_ms;
    let exp = base.saturating_mul(1u64 << (attempt - 1).min(8));
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(exp + jitter)
  }
}

/// Canonicalize generated question rows: fill missing ids and replace
/// duplicates so the set invariant (unique ids) holds on load.
fn normalize_questions(rows: Vec<QuestionRow>) -> Vec<GeneratedQuestion> {
  let mut seen = std::collections::HashSet::new();
  rows
    .into_iter()
    .map(|r| {
      let id = match r.id {
        Some(id) if !id.is_empty() && seen.insert(id.clone()) => id,
        _ => Uuid::new_v4().to_string(),
      };
      seen.insert(id.clone());
      GeneratedQuestion {
        id,
        text: r.text,
        kind: r.kind,
        options: r.options,
        correct_answer: r.correct_answer,
        explanation: r.explanation,
        difficulty: r.difficulty,
        outcome_id: r.outcome_id,
      }
    })
    .collect()
}

// --- Wire DTOs ---
//
// Upstream services disagree on casing and naming for equivalent concepts
// (the grade service speaks in "class" terms). Every observed spelling is
// mapped here and nowhere else.

/// Accept ids delivered as either JSON strings or numbers.
fn de_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum IdVal {
    S(String),
    N(i64),
  }
  Ok(match IdVal::deserialize(d)? {
    IdVal::S(s) => s,
    IdVal::N(n) => n.to_string(),
  })
}

fn de_opt_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum IdVal {
    S(String),
    N(i64),
  }
  Ok(Option::<IdVal>::deserialize(d)?.map(|v| match v {
    IdVal::S(s) => s,
    IdVal::N(n) => n.to_string(),
  }))
}

#[derive(Deserialize)]
struct GradeRow {
  #[serde(alias = "classid", alias = "classId", alias = "class_id", deserialize_with = "de_id")]
  id: String,
  #[serde(alias = "className", alias = "classname", alias = "class_name")]
  name: String,
}

#[derive(Deserialize)]
struct SubjectRow {
  #[serde(alias = "subjectid", alias = "SubjectId", alias = "subjectId", deserialize_with = "de_id")]
  id: String,
  #[serde(alias = "subjectname", alias = "SubjectName", alias = "subjectName")]
  name: String,
}

#[derive(Deserialize)]
struct ChapterRow {
  #[serde(alias = "chapterid", alias = "chapterId", deserialize_with = "de_id")]
  id: String,
  #[serde(alias = "chapterName", alias = "chaptername")]
  name: String,
}

#[derive(Serialize)]
struct OutcomeGenBody {
  board: String,
  #[serde(rename = "gradeId")]
  grade_id: String,
  #[serde(rename = "subjectId")]
  subject_id: String,
  #[serde(rename = "chapterId")]
  chapter_id: String,
}

#[derive(Deserialize)]
struct OutcomeGenResponse {
  #[serde(default)]
  course_outcomes: Vec<OutcomeRow>,
}

#[derive(Deserialize)]
struct OutcomeRow {
  #[serde(deserialize_with = "de_id")]
  co_id: String,
  co_title: String,
  #[serde(default)]
  co_description: String,
}

#[derive(Serialize)]
struct QuestionGenBody {
  #[serde(rename = "gradeId")]
  grade_id: String,
  #[serde(rename = "subjectId")]
  subject_id: String,
  #[serde(rename = "chapterId")]
  chapter_id: String,
  #[serde(rename = "questionCount")]
  question_count: u32,
  #[serde(rename = "selectedOutcomes")]
  selected_outcomes: Vec<OutcomeRef>,
}

#[derive(Serialize)]
struct OutcomeRef {
  co_id: String,
  co_title: String,
  co_description: String,
}

#[derive(Deserialize)]
struct QuestionGenResponse {
  #[serde(default)]
  questions: Vec<QuestionRow>,
}

#[derive(Deserialize)]
struct QuestionRow {
  #[serde(
    default,
    alias = "questionId",
    alias = "question_id",
    deserialize_with = "de_opt_id"
  )]
  id: Option<String>,
  #[serde(alias = "question", alias = "questionText", alias = "question_text")]
  text: String,
  #[serde(alias = "type", alias = "questionType", alias = "question_type")]
  kind: QuestionKind,
  #[serde(default)]
  options: Vec<String>,
  #[serde(alias = "correctAnswer", alias = "answer", default)]
  correct_answer: String,
  #[serde(default)]
  explanation: String,
  #[serde(default)]
  difficulty: String,
  #[serde(alias = "outcomeId", alias = "co_id", default)]
  outcome_id: String,
}

/// Payload for the save-quiz endpoint: org/user/class scoping, the full
/// question array, and the selected outcome ids comma-joined.
#[derive(Serialize)]
pub struct SaveQuizRequest {
  #[serde(rename = "orgId")]
  pub org_id: String,
  #[serde(rename = "userId")]
  pub user_id: String,
  #[serde(rename = "classId")]
  pub class_id: String,
  #[serde(rename = "subjectId")]
  pub subject_id: String,
  #[serde(rename = "chapterId")]
  pub chapter_id: String,
  #[serde(rename = "outcomeIds")]
  pub outcome_ids: String,
  pub questions: Vec<GeneratedQuestion>,
}

/// Try to extract a clean error message from an upstream error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  #[derive(Deserialize)]
  struct Flat {
    message: String,
  }
  if let Ok(w) = serde_json::from_str::<EWrap>(body) {
    return Some(w.error.message);
  }
  serde_json::from_str::<Flat>(body).ok().map(|f| f.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CountPolicy;
  use crate::fallback::placeholder_outcomes;
  use serde_json::json;
  use wiremock::matchers::{body_partial_json, method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_client(base_url: &str) -> ApiClient {
    let cfg = ServiceConfig {
      base_url: base_url.to_string(),
      org_id: "org-1".into(),
      user_id: "user-1".into(),
      ..ServiceConfig::default()
    };
    ApiClient::new(&cfg, placeholder_outcomes()).unwrap()
  }

  fn fast_retry_client(base_url: &str) -> ApiClient {
    let cfg = ServiceConfig {
      base_url: base_url.to_string(),
      retry: RetryPolicy { max_attempts: 3, base_delay_ms: 10 },
      ..ServiceConfig::default()
    };
    ApiClient::new(&cfg, placeholder_outcomes()).unwrap()
  }

  #[tokio::test]
  async fn grades_normalize_class_field_spellings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/grades"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        { "classid": 7, "className": "Grade 7" },
        { "classId": "8", "classname": "Grade 8" }
      ])))
      .mount(&server)
      .await;

    let grades = test_client(&server.uri()).fetch_grades().await.unwrap();
    assert_eq!(grades.len(), 2);
    assert_eq!(grades[0], GradeSelection { id: "7".into(), name: "Grade 7".into() });
    assert_eq!(grades[1], GradeSelection { id: "8".into(), name: "Grade 8".into() });
  }

  #[tokio::test]
  async fn subjects_carry_parent_grade_reference() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/subjects"))
      .and(query_param("gradeId", "7"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        { "subjectid": "sci", "SubjectName": "Science" }
      ])))
      .mount(&server)
      .await;

    let subjects = test_client(&server.uri()).fetch_subjects("7").await.unwrap();
    assert_eq!(subjects[0].grade_id, "7");
    assert_eq!(subjects[0].name, "Science");
  }

  #[tokio::test]
  async fn cascade_fetch_retries_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/grades"))
      .respond_with(ResponseTemplate::new(500))
      .up_to_n_times(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/grades"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(json!([{ "classId": "7", "className": "Grade 7" }])),
      )
      .mount(&server)
      .await;

    let grades = fast_retry_client(&server.uri()).fetch_grades().await.unwrap();
    assert_eq!(grades.len(), 1);
  }

  #[tokio::test]
  async fn exhausted_retries_surface_fetch_failed_with_level() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/chapters"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let err = fast_retry_client(&server.uri())
      .fetch_chapters("7", "sci")
      .await
      .unwrap_err();
    match err {
      WorkflowError::FetchFailed { level, .. } => assert_eq!(level, CascadeLevel::Chapter),
      other => panic!("expected FetchFailed, got {other}"),
    }
  }

  #[tokio::test]
  async fn outcome_fetch_failure_substitutes_placeholder_bank() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/outcomes/generate"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let candidates = fast_retry_client(&server.uri())
      .fetch_outcome_candidates("7", "sci", "ch-1")
      .await;
    assert_eq!(candidates, placeholder_outcomes());
  }

  #[tokio::test]
  async fn outcome_rows_map_co_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/outcomes/generate"))
      .and(body_partial_json(json!({ "chapterId": "ch-1", "board": "general" })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "course_outcomes": [
          { "co_id": 11, "co_title": "Understand light reactions",
            "co_description": "Explain how light energy is captured." }
        ]
      })))
      .mount(&server)
      .await;

    let candidates = test_client(&server.uri())
      .fetch_outcome_candidates("7", "sci", "ch-1")
      .await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, "11");
    assert!(!candidates[0].included);
  }

  #[tokio::test]
  async fn zero_count_generation_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail differently.
    let req = GenerationRequest {
      grade: GradeSelection { id: "7".into(), name: "Grade 7".into() },
      subject: SubjectSelection { id: "sci".into(), name: "Science".into(), grade_id: "7".into() },
      chapter: ChapterSelection { id: "ch-1".into(), name: "Photosynthesis".into(), subject_id: "sci".into() },
      outcomes: vec![],
      question_count: CountPolicy::PerOutcome { per_outcome: 3 }.effective_count(0),
    };
    let err = test_client(&server.uri()).generate_questions(&req).await.unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyRequest));
    assert!(server.received_requests().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn generated_questions_normalize_ids_and_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/questions/generate"))
      .and(body_partial_json(json!({ "questionCount": 2 })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "questions": [
          { "questionId": "q-1", "question": "What absorbs light?",
            "type": "multiple-choice", "options": ["Chlorophyll", "Xylem"],
            "correctAnswer": "Chlorophyll", "difficulty": "easy", "co_id": "11" },
          { "question_text": "Photosynthesis releases oxygen.",
            "question_type": "true_false", "answer": "true" }
        ]
      })))
      .mount(&server)
      .await;

    let req = GenerationRequest {
      grade: GradeSelection { id: "7".into(), name: "Grade 7".into() },
      subject: SubjectSelection { id: "sci".into(), name: "Science".into(), grade_id: "7".into() },
      chapter: ChapterSelection { id: "ch-1".into(), name: "Photosynthesis".into(), subject_id: "sci".into() },
      outcomes: vec![],
      question_count: 2,
    };
    let questions = test_client(&server.uri()).generate_questions(&req).await.unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].id, "q-1");
    assert_eq!(questions[0].kind, QuestionKind::MultipleChoice);
    assert_eq!(questions[0].outcome_id, "11");
    // Missing upstream id gets generated locally.
    assert!(!questions[1].id.is_empty());
    assert_eq!(questions[1].kind, QuestionKind::TrueFalse);
  }

  #[tokio::test]
  async fn generation_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/questions/generate"))
      .respond_with(ResponseTemplate::new(500).set_body_json(json!({
        "error": { "message": "model overloaded" }
      })))
      .mount(&server)
      .await;

    let req = GenerationRequest {
      grade: GradeSelection { id: "7".into(), name: "Grade 7".into() },
      subject: SubjectSelection { id: "sci".into(), name: "Science".into(), grade_id: "7".into() },
      chapter: ChapterSelection { id: "ch-1".into(), name: "Photosynthesis".into(), subject_id: "sci".into() },
      outcomes: vec![],
      question_count: 5,
    };
    let client = fast_retry_client(&server.uri());
    let err = client.generate_questions(&req).await.unwrap_err();
    match err {
      WorkflowError::GenerationFailed(msg) => assert!(msg.contains("model overloaded")),
      other => panic!("expected GenerationFailed, got {other}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn save_posts_scoping_and_comma_joined_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/quizzes"))
      .and(body_partial_json(json!({
        "orgId": "org-1",
        "classId": "7",
        "outcomeIds": "11,12"
      })))
      .respond_with(ResponseTemplate::new(201))
      .expect(1)
      .mount(&server)
      .await;

    let payload = SaveQuizRequest {
      org_id: "org-1".into(),
      user_id: "user-1".into(),
      class_id: "7".into(),
      subject_id: "sci".into(),
      chapter_id: "ch-1".into(),
      outcome_ids: "11,12".into(),
      questions: vec![],
    };
    test_client(&server.uri()).save_quiz(&payload).await.unwrap();
  }

  #[tokio::test]
  async fn save_failure_carries_upstream_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/quizzes"))
      .respond_with(ResponseTemplate::new(400).set_body_json(json!({
        "message": "duplicate quiz title"
      })))
      .mount(&server)
      .await;

    let payload = SaveQuizRequest {
      org_id: "org-1".into(),
      user_id: "user-1".into(),
      class_id: "7".into(),
      subject_id: "sci".into(),
      chapter_id: "ch-1".into(),
      outcome_ids: String::new(),
      questions: vec![],
    };
    let err = test_client(&server.uri()).save_quiz(&payload).await.unwrap_err();
    match err {
      WorkflowError::SaveFailed(msg) => assert!(msg.contains("duplicate quiz title")),
      other => panic!("expected SaveFailed, got {other}"),
    }
  }
}
