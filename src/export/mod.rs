//! Export adapters: render an edited question set into a downloadable file.
//!
//! Pure functions of a snapshot; no internal state. A rendering error
//! surfaces as `ExportFailed` and no partial bytes are handed out.

use crate::domain::GeneratedQuestion;
use crate::error::Result;

pub mod docx;
pub mod pdf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
  Pdf,
  Docx,
}

/// Render the snapshot in set order: each question's text, options (if any),
/// correct answer, and explanation, paginated to fixed page geometry.
pub fn render(questions: &[GeneratedQuestion], format: ExportFormat) -> Result<Vec<u8>> {
  match format {
    ExportFormat::Pdf => pdf::render(questions),
    ExportFormat::Docx => docx::render(questions),
  }
}

/// The display lines for one question, shared by both renderers so the two
/// formats never drift apart in content.
pub(crate) fn question_lines(index: usize, q: &GeneratedQuestion) -> Vec<String> {
  let mut lines = vec![format!("Q{}. {}", index + 1, q.text)];
  for (i, opt) in q.options.iter().enumerate() {
    // A) .. B) .. past Z this wraps into punctuation, which is acceptable:
    // upstream never generates more than a handful of options.
    let label = (b'A' + (i % 26) as u8) as char;
    lines.push(format!("   {}) {}", label, opt));
  }
  lines.push(format!("   Answer: {}", q.correct_answer));
  if !q.explanation.is_empty() {
    lines.push(format!("   Explanation: {}", q.explanation));
  }
  lines
}

/// Greedy word wrap to a fixed column width (character-based; the renderers
/// use monospaced-ish layout margins wide enough for this approximation).
pub(crate) fn wrap(line: &str, width: usize) -> Vec<String> {
  let mut out = Vec::new();
  let mut current = String::new();
  for word in line.split_whitespace() {
    if current.is_empty() {
      current = word.to_string();
    } else if current.chars().count() + 1 + word.chars().count() <= width {
      current.push(' ');
      current.push_str(word);
    } else {
      out.push(current);
      current = word.to_string();
    }
  }
  if !current.is_empty() {
    out.push(current);
  }
  if out.is_empty() {
    out.push(String::new());
  }
  out
}
