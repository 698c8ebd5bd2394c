use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use diarisk_cli::config::Settings;
use diarisk_cli::pipeline::{
    EvaluationOutcome, EvaluationRequest, RecordsOutcome, collect_records, run_evaluation,
    write_records,
};
use diarisk_model::{ClinicalRecord, ComprehensionScore, EvaluationMetadata};
use diarisk_predict::{ArtifactLoader, RiskEvaluator};

use crate::cli::{EvaluateArgs, RecordsArgs};
use crate::summary::{print_evaluation, print_fields, print_records_summary};

pub fn run_fields() -> Result<()> {
    print_fields();
    Ok(())
}

pub fn run_evaluate(args: &EvaluateArgs, settings: &Settings) -> Result<EvaluationOutcome> {
    let loader = ArtifactLoader::new(settings.artifact_paths());
    let artifacts = loader.load().context("load model artifacts")?;
    let threshold = args.threshold.or(settings.model.threshold);
    let evaluator =
        RiskEvaluator::from_artifacts(artifacts, threshold).context("configure classifier")?;

    let request = EvaluationRequest {
        record: record_from_args(args)?,
        metadata: metadata_from_args(args)?,
        pdf_path: args.pdf.clone(),
        csv_path: args.csv.clone(),
    };
    let store = (!args.no_record).then(|| settings.record_store());
    let outcome = run_evaluation(
        &evaluator,
        store.as_ref(),
        request,
        Local::now().date_naive(),
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.stored).context("serialize evaluation")?;
        println!("{json}");
    } else {
        print_evaluation(&outcome);
    }
    Ok(outcome)
}

/// Returns `false` when the address is not on the allow-list.
pub fn run_records(args: &RecordsArgs, settings: &Settings) -> Result<bool> {
    let gate = settings.access_gate();
    let store = settings.record_store();
    match collect_records(&gate, &store, &args.email)? {
        RecordsOutcome::Denied => {
            eprintln!("Acceso denegado: el email no está autorizado para consultar registros.");
            Ok(false)
        }
        RecordsOutcome::NoData => {
            println!("No hay datos registrados.");
            Ok(true)
        }
        RecordsOutcome::Rows {
            decision,
            table,
            evaluations,
        } => {
            write_records(&table, args.output.as_deref(), io::stdout().lock())?;
            if let Some(path) = &args.output {
                info!(path = %path.display(), rows = table.len(), "records exported");
                if let Some(evaluations) = &evaluations {
                    print_records_summary(&decision, evaluations);
                }
            }
            Ok(true)
        }
    }
}

fn record_from_args(args: &EvaluateArgs) -> Result<ClinicalRecord> {
    let mut values = ClinicalRecord::default().values();
    for (value, supplied) in values.iter_mut().zip(args.field_values()) {
        if let Some(supplied) = supplied {
            *value = supplied;
        }
    }
    ClinicalRecord::from_values(values).context("clinical values")
}

fn metadata_from_args(args: &EvaluateArgs) -> Result<EvaluationMetadata> {
    let comprehension = args
        .comprehension
        .map(|score| ComprehensionScore::new(i64::from(score)))
        .transpose()
        .context("comprehension score")?;
    Ok(EvaluationMetadata {
        patient_name: non_empty(args.patient_name.as_deref()),
        professional: non_empty(args.professional.as_deref()),
        email: non_empty(args.email.as_deref()),
        satisfaction: args.satisfaction.map(Into::into),
        comprehension,
    })
}

/// Empty strings count as absent; anything else is kept as typed.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
