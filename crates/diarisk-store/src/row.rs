//! Mapping between [`StoredEvaluation`] and log rows.

use std::path::Path;

use chrono::NaiveDate;

use diarisk_model::{
    ClinicalField, ClinicalRecord, ComprehensionScore, EvaluationMetadata, RiskLabel,
    SatisfactionRating, StoredEvaluation, format_decimal,
};

use crate::error::{Result, StoreError};
use crate::table::RecordTable;

pub const COL_DATE: &str = "Fecha";
pub const COL_RESULT: &str = "Resultado";
pub const COL_PROBABILITY: &str = "Probabilidad";
pub const COL_NAME: &str = "Nombre";
pub const COL_PROFESSIONAL: &str = "Profesional";
pub const COL_EMAIL: &str = "Email";
pub const COL_SATISFACTION: &str = "Satisfacción";
pub const COL_COMPREHENSION: &str = "Mejora";

/// `DD/MM/YYYY`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Log columns in canonical order.
pub const CANONICAL_COLUMNS: [&str; 16] = [
    "Insulin",
    "DiabetesPedigreeFunction",
    "Age",
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "BMI",
    COL_DATE,
    COL_RESULT,
    COL_PROBABILITY,
    COL_NAME,
    COL_PROFESSIONAL,
    COL_EMAIL,
    COL_SATISFACTION,
    COL_COMPREHENSION,
];

/// `(column, cell)` pairs for one evaluation, in canonical order.
pub fn evaluation_to_row(evaluation: &StoredEvaluation) -> Vec<(&'static str, String)> {
    let mut row = evaluation.record.formatted_values();
    let metadata = &evaluation.metadata;
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    row.extend([
        (
            COL_DATE,
            evaluation
                .date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        (
            COL_RESULT,
            evaluation
                .label
                .map(|label| label.log_text().to_string())
                .unwrap_or_default(),
        ),
        (
            COL_PROBABILITY,
            evaluation.probability.map(format_decimal).unwrap_or_default(),
        ),
        (COL_NAME, text(&metadata.patient_name)),
        (COL_PROFESSIONAL, text(&metadata.professional)),
        (COL_EMAIL, text(&metadata.email)),
        (
            COL_SATISFACTION,
            metadata
                .satisfaction
                .map(|rating| rating.as_str().to_string())
                .unwrap_or_default(),
        ),
        (
            COL_COMPREHENSION,
            metadata
                .comprehension
                .map(|score| score.get().to_string())
                .unwrap_or_default(),
        ),
    ]);
    row
}

/// Parse every row of `table` back into evaluations.
///
/// Result and metadata columns may be absent or empty, as they are on rows
/// from older logs; those values read as `None`. Text metadata is returned
/// exactly as stored.
///
/// # Errors
///
/// [`StoreError::MissingColumn`] when a clinical column is absent,
/// [`StoreError::InvalidRow`] for an unreadable non-empty cell.
pub fn evaluations_from_table(table: &RecordTable, path: &Path) -> Result<Vec<StoredEvaluation>> {
    let required = |column: &str| {
        table
            .column_index(column)
            .ok_or_else(|| StoreError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })
    };
    let field_columns = ClinicalField::ALL.map(|field| required(field.column()));
    let mut fields = [0usize; 8];
    for (slot, column) in fields.iter_mut().zip(field_columns) {
        *slot = column?;
    }

    let mut evaluations = Vec::with_capacity(table.len());
    for (idx, row) in table.rows.iter().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let invalid = |column: &str, value: &str, message: String| StoreError::InvalidRow {
            path: path.to_path_buf(),
            line,
            column: column.to_string(),
            value: value.to_string(),
            message,
        };
        let cell = |col: usize| row.get(col).map_or("", |value| value.trim());

        let mut values = [0.0; 8];
        for field in ClinicalField::ALL {
            let raw = cell(fields[field.index()]);
            values[field.index()] = raw
                .parse::<f64>()
                .map_err(|error| invalid(field.column(), raw, error.to_string()))?;
        }
        let record = ClinicalRecord::from_values(values).map_err(|error| {
            let column = match &error {
                diarisk_model::ModelError::OutOfRange { field, .. }
                | diarisk_model::ModelError::NotInteger { field, .. } => *field,
                _ => "record",
            };
            invalid(column, "", error.to_string())
        })?;

        // Absent column or backfilled empty cell.
        let optional = |column: &str| {
            table
                .value(row, column)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };
        let text = |column: &str| {
            table
                .value(row, column)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let date = optional(COL_DATE)
            .map(|raw| {
                NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|error| invalid(COL_DATE, raw, error.to_string()))
            })
            .transpose()?;
        let label = optional(COL_RESULT)
            .map(|raw| {
                raw.parse::<RiskLabel>()
                    .map_err(|error| invalid(COL_RESULT, raw, error.to_string()))
            })
            .transpose()?;
        let probability = optional(COL_PROBABILITY)
            .map(|raw| {
                raw.parse::<f64>()
                    .map_err(|error| invalid(COL_PROBABILITY, raw, error.to_string()))
            })
            .transpose()?;
        let satisfaction = optional(COL_SATISFACTION)
            .map(|raw| {
                raw.parse::<SatisfactionRating>()
                    .map_err(|error| invalid(COL_SATISFACTION, raw, error.to_string()))
            })
            .transpose()?;
        let comprehension = optional(COL_COMPREHENSION)
            .map(|raw| {
                parse_comprehension(raw)
                    .map_err(|message| invalid(COL_COMPREHENSION, raw, message))
            })
            .transpose()?;

        evaluations.push(StoredEvaluation {
            record,
            date,
            label,
            probability,
            metadata: EvaluationMetadata {
                patient_name: text(COL_NAME),
                professional: text(COL_PROFESSIONAL),
                email: text(COL_EMAIL),
                satisfaction,
                comprehension,
            },
        });
    }
    Ok(evaluations)
}

/// Accepts `7` as well as `7.0`, which spreadsheet tools write for integer
/// columns containing blanks.
fn parse_comprehension(raw: &str) -> std::result::Result<ComprehensionScore, String> {
    let value: f64 = raw.parse().map_err(|_| "not a number".to_string())?;
    if value.fract() != 0.0 {
        return Err("not a whole number".to_string());
    }
    ComprehensionScore::new(value as i64).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diarisk_model::EvaluationResult;

    fn sample() -> StoredEvaluation {
        StoredEvaluation::new(
            ClinicalRecord::default(),
            &EvaluationResult {
                label: RiskLabel::Risk,
                probability: 0.6,
            },
            EvaluationMetadata {
                patient_name: Some("Ana Pérez".to_string()),
                satisfaction: Some(SatisfactionRating::Satisfied),
                comprehension: Some(ComprehensionScore::new(8).unwrap()),
                ..EvaluationMetadata::default()
            },
            NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
        )
    }

    #[test]
    fn row_uses_log_formats() {
        let row = evaluation_to_row(&sample());
        let columns: Vec<&str> = row.iter().map(|(column, _)| *column).collect();
        assert_eq!(columns, CANONICAL_COLUMNS);
        let get = |name: &str| row.iter().find(|(c, _)| *c == name).unwrap().1.as_str();
        assert_eq!(get("BMI"), "32.0");
        assert_eq!(get("Age"), "29");
        assert_eq!(get(COL_DATE), "09/01/2025");
        assert_eq!(get(COL_RESULT), "RIESGO DETECTADO");
        assert_eq!(get(COL_PROBABILITY), "0.6");
        assert_eq!(get(COL_EMAIL), "");
        assert_eq!(get(COL_SATISFACTION), "Satisfecho");
        assert_eq!(get(COL_COMPREHENSION), "8");
    }

    #[test]
    fn table_round_trip() {
        let mut table = RecordTable::with_headers(&CANONICAL_COLUMNS);
        table.push_row(&evaluation_to_row(&sample()));
        let parsed = evaluations_from_table(&table, Path::new("log.csv")).unwrap();
        assert_eq!(parsed, vec![sample()]);
    }

    #[test]
    fn comprehension_accepts_float_text() {
        assert_eq!(parse_comprehension("7.0").unwrap().get(), 7);
        assert!(parse_comprehension("7.5").is_err());
        assert!(parse_comprehension("11").is_err());
    }

    #[test]
    fn missing_clinical_column_is_reported() {
        let columns: Vec<&str> = CANONICAL_COLUMNS
            .iter()
            .copied()
            .filter(|column| *column != "Glucose")
            .collect();
        let table = RecordTable::with_headers(&columns);
        assert!(matches!(
            evaluations_from_table(&table, Path::new("log.csv")),
            Err(StoreError::MissingColumn { column, .. }) if column == "Glucose"
        ));
    }

    #[test]
    fn missing_result_columns_read_as_none() {
        let mut table = RecordTable::with_headers(&CANONICAL_COLUMNS[..8]);
        table.push_row(&ClinicalRecord::default().formatted_values());
        let parsed = evaluations_from_table(&table, Path::new("log.csv")).unwrap();
        assert_eq!(parsed[0].date, None);
        assert_eq!(parsed[0].label, None);
        assert_eq!(parsed[0].probability, None);
        assert_eq!(parsed[0].record, ClinicalRecord::default());
    }

    #[test]
    fn text_metadata_is_read_verbatim() {
        let mut evaluation = sample();
        evaluation.metadata.patient_name = Some(" Ana ".to_string());
        evaluation.metadata.email = Some("ana@centro1.com ".to_string());
        let mut table = RecordTable::with_headers(&CANONICAL_COLUMNS);
        table.push_row(&evaluation_to_row(&evaluation));
        let parsed = evaluations_from_table(&table, Path::new("log.csv")).unwrap();
        assert_eq!(parsed, vec![evaluation]);
    }
}
