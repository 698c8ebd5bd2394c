use anyhow::{Context, Result, anyhow};
use csv::WriterBuilder;

use diarisk_model::ClinicalRecord;

/// Header plus one row holding the eight raw clinical fields.
///
/// This is the quick per-session export; it carries no result or metadata.
///
/// # Errors
///
/// CSV serialisation failures.
pub fn render_csv_row(record: &ClinicalRecord) -> Result<Vec<u8>> {
    let values = record.formatted_values();
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(values.iter().map(|(column, _)| *column))
        .context("write csv header")?;
    writer
        .write_record(values.iter().map(|(_, value)| value.as_str()))
        .context("write csv row")?;
    writer.flush().context("flush csv export")?;
    writer
        .into_inner()
        .map_err(|e| anyhow!("finish csv export: {e}"))
}
