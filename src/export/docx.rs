//! DOCX renderer for the edited question set.
//!
//! Structured paragraph generation via `docx-rs`: a title paragraph, then
//! one paragraph per display line, with a blank paragraph between questions.
//! Word handles pagination; we only fix the content order and shape.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};
use tracing::instrument;

use crate::domain::GeneratedQuestion;
use crate::error::{Result, WorkflowError};

use super::question_lines;

#[instrument(level = "info", skip(questions), fields(count = questions.len()))]
pub fn render(questions: &[GeneratedQuestion]) -> Result<Vec<u8>> {
  let mut doc = Docx::new().add_paragraph(
    Paragraph::new().add_run(Run::new().add_text("Quiz").bold().size(32)),
  );

  for (i, q) in questions.iter().enumerate() {
    for (n, line) in question_lines(i, q).into_iter().enumerate() {
      let mut run = Run::new().add_text(line);
      if n == 0 {
        // Question text stands out; options/answer/explanation stay plain.
        run = run.bold();
      }
      doc = doc.add_paragraph(Paragraph::new().add_run(run));
    }
    doc = doc.add_paragraph(Paragraph::new());
  }

  let mut cursor = Cursor::new(Vec::new());
  doc
    .build()
    .pack(&mut cursor)
    .map_err(|e| WorkflowError::ExportFailed(e.to_string()))?;
  Ok(cursor.into_inner())
}
