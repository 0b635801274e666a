//! PDF renderer for the edited question set.
//!
//! A4 pages, builtin Helvetica, fixed margins, simple top-down line layout
//! with page breaks when the cursor reaches the bottom margin.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::instrument;

use crate::domain::GeneratedQuestion;
use crate::error::{Result, WorkflowError};

use super::{question_lines, wrap};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 18.0;
const TOP_Y: f32 = 279.0;
const BOTTOM_Y: f32 = 18.0;
const LINE_STEP: f32 = 6.0;
const WRAP_COLUMNS: usize = 92;

#[instrument(level = "info", skip(questions), fields(count = questions.len()))]
pub fn render(questions: &[GeneratedQuestion]) -> Result<Vec<u8>> {
  let (doc, page1, layer1) = PdfDocument::new("Quiz", Mm(PAGE_W), Mm(PAGE_H), "content");
  let font = doc
    .add_builtin_font(BuiltinFont::Helvetica)
    .map_err(|e| WorkflowError::ExportFailed(e.to_string()))?;

  let mut layer = doc.get_page(page1).get_layer(layer1);
  let mut y = TOP_Y;

  layer.use_text("Quiz", 16.0, Mm(MARGIN_X), Mm(y), &font);
  y -= LINE_STEP * 2.0;

  for (i, q) in questions.iter().enumerate() {
    for line in question_lines(i, q) {
      for piece in wrap(&line, WRAP_COLUMNS) {
        if y < BOTTOM_Y {
          let (page, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "content");
          layer = doc.get_page(page).get_layer(l);
          y = TOP_Y;
        }
        layer.use_text(piece, 11.0, Mm(MARGIN_X), Mm(y), &font);
        y -= LINE_STEP;
      }
    }
    // Blank line between questions.
    y -= LINE_STEP;
  }

  let mut bytes = Vec::new();
  doc
    .save(&mut BufWriter::new(&mut bytes))
    .map_err(|e| WorkflowError::ExportFailed(e.to_string()))?;
  Ok(bytes)
}
