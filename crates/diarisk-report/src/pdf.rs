//! Single-page PDF rendering.

use std::io::BufWriter;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};
use tracing::debug;

use diarisk_model::{ClinicalRecord, EvaluationMetadata, EvaluationResult, RiskLabel};

use crate::lines::{LineStyle, REPORT_TITLE, report_lines};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: Mm = Mm(20.0);
const TOP: Mm = Mm(275.0);

/// Render the evaluation report as PDF bytes.
///
/// The content is bounded (eight fields plus a handful of optional lines) and
/// always fits one page.
///
/// # Errors
///
/// Font registration or serialisation failures from the PDF backend.
pub fn render_pdf(
    record: &ClinicalRecord,
    result: &EvaluationResult,
    metadata: &EvaluationMetadata,
    date: NaiveDate,
) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(REPORT_TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("PDF font error: {e}"))?;

    let mut y = TOP;
    for line in report_lines(record, result, metadata, date) {
        match line.style {
            LineStyle::Title => {
                layer.use_text(&line.text, 16.0, MARGIN_LEFT, y, &bold);
                y -= Mm(12.0);
            }
            LineStyle::Heading => {
                y -= Mm(4.0);
                layer.use_text(&line.text, 12.0, MARGIN_LEFT, y, &bold);
                y -= Mm(7.0);
            }
            LineStyle::Body => {
                layer.use_text(&line.text, 10.0, MARGIN_LEFT, y, &regular);
                y -= Mm(6.0);
            }
            LineStyle::Result(label) => {
                draw_result(&layer, &line.text, label, y, &bold);
                y -= Mm(10.0);
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| anyhow!("PDF save error: {e}"))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| anyhow!("PDF buffer error: {e}"))?;
    debug!(bytes = bytes.len(), "PDF report rendered");
    Ok(bytes)
}

fn draw_result(
    layer: &PdfLayerReference,
    text: &str,
    label: RiskLabel,
    y: Mm,
    font: &IndirectFontRef,
) {
    layer.set_fill_color(outcome_color(label));
    layer.use_text(text, 13.0, MARGIN_LEFT, y, font);
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

/// Red for risk, green otherwise.
fn outcome_color(label: RiskLabel) -> Color {
    match label {
        RiskLabel::Risk => Color::Rgb(Rgb::new(0.80, 0.10, 0.10, None)),
        RiskLabel::NoRisk => Color::Rgb(Rgb::new(0.10, 0.55, 0.20, None)),
    }
}
