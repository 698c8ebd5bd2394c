//! Evaluate and records flows, independent of argument parsing.
//!
//! Evaluation order: score the record, render the requested exports, then
//! append to the log. A failed export aborts before anything is logged.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use diarisk_model::{ClinicalRecord, EvaluationMetadata, EvaluationResult, StoredEvaluation};
use diarisk_predict::RiskEvaluator;
use diarisk_report::{render_csv_row, render_pdf};
use diarisk_store::{
    AccessDecision, AccessGate, RecordStore, RecordTable, evaluations_from_table, write_atomic,
};

use crate::logging::redact_value;

#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    pub record: ClinicalRecord,
    pub metadata: EvaluationMetadata,
    pub pdf_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub result: EvaluationResult,
    pub threshold: f64,
    pub stored: StoredEvaluation,
    pub pdf_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
    /// Log the row was appended to, if any.
    pub log_path: Option<PathBuf>,
}

/// Score one record, write its exports and optionally log it.
///
/// # Errors
///
/// Scoring, rendering or write failures. Each aborts the request.
pub fn run_evaluation(
    evaluator: &RiskEvaluator,
    store: Option<&RecordStore>,
    request: EvaluationRequest,
    date: NaiveDate,
) -> Result<EvaluationOutcome> {
    let EvaluationRequest {
        record,
        metadata,
        pdf_path,
        csv_path,
    } = request;

    let result = evaluator.evaluate(&record).context("evaluate record")?;
    info!(
        label = %result.label,
        probability = result.probability,
        threshold = evaluator.threshold(),
        patient = ?metadata.patient_name.as_deref().map(redact_value),
        "evaluation complete"
    );

    if let Some(path) = &pdf_path {
        let bytes = render_pdf(&record, &result, &metadata, date).context("render PDF report")?;
        write_atomic(path, &bytes)
            .with_context(|| format!("write PDF report {}", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "PDF report written");
    }
    if let Some(path) = &csv_path {
        let bytes = render_csv_row(&record).context("render CSV export")?;
        write_atomic(path, &bytes)
            .with_context(|| format!("write CSV export {}", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "CSV export written");
    }

    let stored = StoredEvaluation::new(record, &result, metadata, date);
    let log_path = match store {
        Some(store) => {
            store
                .append(&stored)
                .with_context(|| format!("append to results log {}", store.path().display()))?;
            Some(store.path().to_path_buf())
        }
        None => None,
    };

    Ok(EvaluationOutcome {
        result,
        threshold: evaluator.threshold(),
        stored,
        pdf_path,
        csv_path,
        log_path,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordsOutcome {
    Denied,
    /// Log missing, or nothing visible to this address.
    NoData,
    Rows {
        decision: AccessDecision,
        table: RecordTable,
        /// Parsed rows of `table`; `None` when a cell could not be parsed.
        evaluations: Option<Vec<StoredEvaluation>>,
    },
}

/// Resolve what `email` may read from the log.
///
/// The log is read once; the released table and its parsed evaluations come
/// from the same snapshot.
///
/// # Errors
///
/// Read failures of the log file. Unparsable cells do not block the raw
/// download.
pub fn collect_records(
    gate: &AccessGate,
    store: &RecordStore,
    email: &str,
) -> Result<RecordsOutcome> {
    let decision = gate.resolve(email);
    if decision.is_denied() {
        warn!(email = %redact_value(email), "records request denied");
        return Ok(RecordsOutcome::Denied);
    }

    let table = store
        .load_table()
        .with_context(|| format!("read results log {}", store.path().display()))?
        .and_then(|table| decision.visible_rows(&table))
        .unwrap_or_default();
    if table.is_empty() {
        info!(email = %redact_value(email), "no visible records");
        return Ok(RecordsOutcome::NoData);
    }
    let evaluations = match evaluations_from_table(&table, store.path()) {
        Ok(evaluations) => Some(evaluations),
        Err(error) => {
            warn!(%error, "results log rows could not be parsed; releasing raw rows only");
            None
        }
    };
    info!(
        email = %redact_value(email),
        rows = table.len(),
        "records released"
    );
    Ok(RecordsOutcome::Rows {
        decision,
        table,
        evaluations,
    })
}

/// Write `table` as CSV to `path`, or to `out` when no path is given.
///
/// # Errors
///
/// Write failures.
pub fn write_records<W: Write>(table: &RecordTable, path: Option<&Path>, out: W) -> Result<()> {
    match path {
        Some(path) => write_atomic(path, &table.to_csv_bytes())
            .with_context(|| format!("write records {}", path.display())),
        None => table.write_csv(out).context("write records to stdout"),
    }
}
