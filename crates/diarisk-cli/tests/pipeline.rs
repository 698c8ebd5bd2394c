//! End-to-end flows: artifacts on disk, evaluation, exports, log and access.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use diarisk_cli::config::parse_settings;
use diarisk_cli::pipeline::{
    EvaluationRequest, RecordsOutcome, collect_records, run_evaluation, write_records,
};
use diarisk_model::{ClinicalRecord, EvaluationMetadata, RiskLabel};
use diarisk_predict::{ArtifactLoader, RiskEvaluator};
use diarisk_store::{AccessDecision, RecordStore};

const IDENTITY_PIPELINE: &str = r#"{
  "features": ["Pregnancies", "Glucose", "BloodPressure", "SkinThickness",
               "Insulin", "BMI", "DiabetesPedigreeFunction", "Age"],
  "steps": []
}"#;

/// Zero weights and intercept ln(1.5): every record scores 0.6.
const CONSTANT_LOGISTIC: &str = r#"{
  "kind": "logistic",
  "coefficients": [0, 0, 0, 0, 0, 0, 0, 0],
  "intercept": 0.4054651081081644,
  "threshold": 0.35
}"#;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn settings_in(dir: &Path) -> diarisk_cli::config::Settings {
    fs::write(dir.join("pipeline.json"), IDENTITY_PIPELINE).unwrap();
    fs::write(dir.join("model.json"), CONSTANT_LOGISTIC).unwrap();
    let text = format!(
        r#"
        [artifacts]
        transform = {transform:?}
        classifier = {classifier:?}

        [records]
        path = {records:?}
        "#,
        transform = dir.join("pipeline.json").display().to_string(),
        classifier = dir.join("model.json").display().to_string(),
        records = dir.join("resultados.csv").display().to_string(),
    );
    parse_settings(&text).unwrap()
}

fn evaluator(settings: &diarisk_cli::config::Settings, threshold: Option<f64>) -> RiskEvaluator {
    let loader = ArtifactLoader::new(settings.artifact_paths());
    RiskEvaluator::from_artifacts(loader.load().unwrap(), threshold).unwrap()
}

fn request(email: Option<&str>) -> EvaluationRequest {
    EvaluationRequest {
        record: ClinicalRecord::default(),
        metadata: EvaluationMetadata {
            patient_name: Some("Paciente Uno".to_string()),
            email: email.map(str::to_string),
            ..EvaluationMetadata::default()
        },
        pdf_path: None,
        csv_path: None,
    }
}

#[test]
fn stored_threshold_flags_risk_and_logs_row() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    assert_eq!(evaluator.threshold(), 0.35);

    let store = settings.record_store();
    let outcome = run_evaluation(&evaluator, Some(&store), request(None), date()).unwrap();
    assert_eq!(outcome.result.label, RiskLabel::Risk);
    assert!((outcome.result.probability - 0.6).abs() < 1e-9);
    assert_eq!(outcome.log_path.as_deref(), Some(store.path()));

    let table = store.load_table().unwrap().unwrap();
    assert_eq!(table.len(), 1);
    let row = &table.rows[0];
    assert_eq!(table.value(row, "Resultado"), Some("RIESGO DETECTADO"));
    assert_eq!(table.value(row, "Probabilidad"), Some("0.6"));
    assert_eq!(table.value(row, "Fecha"), Some("14/03/2025"));
    assert_eq!(table.value(row, "Nombre"), Some("Paciente Uno"));
    assert_eq!(table.value(row, "Glucose"), Some("117"));
}

#[test]
fn override_threshold_changes_decision() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, Some(0.7));
    let outcome = run_evaluation(&evaluator, None, request(None), date()).unwrap();
    assert_eq!(outcome.result.label, RiskLabel::NoRisk);
    assert_eq!(outcome.threshold, 0.7);
    assert!(outcome.log_path.is_none());
    assert!(!dir.path().join("resultados.csv").exists());
}

#[test]
fn exports_are_written_before_logging() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = settings.record_store();

    let mut req = request(None);
    req.pdf_path = Some(dir.path().join("out/informe.pdf"));
    req.csv_path = Some(dir.path().join("out/datos.csv"));
    run_evaluation(&evaluator, Some(&store), req, date()).unwrap();

    let pdf = fs::read(dir.path().join("out/informe.pdf")).unwrap();
    assert_eq!(&pdf[0..4], b"%PDF");
    let csv = fs::read_to_string(dir.path().join("out/datos.csv")).unwrap();
    assert_eq!(
        csv.lines().nth(1),
        Some("30.5,0.37,29,3,117,72,23,32.0")
    );
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[test]
fn failed_export_leaves_log_untouched() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = settings.record_store();

    let blocked = dir.path().join("blocked");
    fs::create_dir(&blocked).unwrap();
    let mut req = request(None);
    req.pdf_path = Some(blocked);
    assert!(run_evaluation(&evaluator, Some(&store), req, date()).is_err());
    assert!(store.load_table().unwrap().is_none());
}

#[test]
fn records_follow_the_allow_list() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = settings.record_store();
    let gate = settings.access_gate();

    assert_eq!(
        collect_records(&gate, &store, "lider@dominio.com").unwrap(),
        RecordsOutcome::NoData
    );

    for email in ["ana@centro1.com", "luis@centro2.com", "ana@centro1.com"] {
        run_evaluation(&evaluator, Some(&store), request(Some(email)), date()).unwrap();
    }

    match collect_records(&gate, &store, "lider@dominio.com").unwrap() {
        RecordsOutcome::Rows {
            decision,
            table,
            evaluations,
        } => {
            assert_eq!(decision, AccessDecision::Leader);
            assert_eq!(table.len(), 3);
            assert_eq!(evaluations.map(|rows| rows.len()), Some(3));
        }
        other => panic!("expected rows, got {other:?}"),
    }

    match collect_records(&gate, &store, "ana@centro1.com").unwrap() {
        RecordsOutcome::Rows {
            table, evaluations, ..
        } => {
            assert_eq!(table.len(), 2);
            let evaluations = evaluations.unwrap();
            assert_eq!(evaluations.len(), table.len());
            assert!(
                evaluations
                    .iter()
                    .all(|row| row.metadata.email.as_deref() == Some("ana@centro1.com"))
            );
            assert!(
                table
                    .rows
                    .iter()
                    .all(|row| table.value(row, "Email") == Some("ana@centro1.com"))
            );
        }
        other => panic!("expected rows, got {other:?}"),
    }

    assert_eq!(
        collect_records(&gate, &store, "marta@centro3.com").unwrap(),
        RecordsOutcome::NoData
    );
    assert_eq!(
        collect_records(&gate, &store, "intruso@otro.com").unwrap(),
        RecordsOutcome::Denied
    );
}

#[test]
fn released_rows_and_parsed_rows_come_from_one_read() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = settings.record_store();
    let gate = settings.access_gate();
    for email in ["luis@centro2.com", "ana@centro1.com", "luis@centro2.com"] {
        run_evaluation(&evaluator, Some(&store), request(Some(email)), date()).unwrap();
    }

    for email in ["lider@dominio.com", "luis@centro2.com", "ana@centro1.com"] {
        match collect_records(&gate, &store, email).unwrap() {
            RecordsOutcome::Rows {
                table, evaluations, ..
            } => {
                let evaluations = evaluations.unwrap();
                assert_eq!(table.len(), evaluations.len());
                for (row, parsed) in table.rows.iter().zip(&evaluations) {
                    assert_eq!(table.value(row, "Email"), parsed.metadata.email.as_deref());
                }
            }
            other => panic!("expected rows for {email}, got {other:?}"),
        }
    }
}

#[test]
fn leader_reads_log_written_before_result_columns() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = settings.record_store();
    let gate = settings.access_gate();
    fs::write(
        store.path(),
        "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age\n\
         1,100,70,20,80,25.0,0.5,40\n",
    )
    .unwrap();
    run_evaluation(&evaluator, Some(&store), request(None), date()).unwrap();

    match collect_records(&gate, &store, "lider@dominio.com").unwrap() {
        RecordsOutcome::Rows {
            table, evaluations, ..
        } => {
            assert_eq!(table.len(), 2);
            assert_eq!(table.value(&table.rows[0], "Fecha"), Some(""));
            let evaluations = evaluations.unwrap();
            assert_eq!(evaluations[0].date, None);
            assert_eq!(evaluations[1].date, Some(date()));
            assert_eq!(evaluations[1].label, Some(RiskLabel::Risk));
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn unparsable_row_still_releases_raw_table() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let store = settings.record_store();
    let gate = settings.access_gate();
    fs::write(
        store.path(),
        "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Fecha\n\
         1,abc,70,20,80,25.0,0.5,40,14/03/2025\n",
    )
    .unwrap();

    match collect_records(&gate, &store, "lider@dominio.com").unwrap() {
        RecordsOutcome::Rows {
            table, evaluations, ..
        } => {
            assert_eq!(table.len(), 1);
            assert_eq!(table.value(&table.rows[0], "Glucose"), Some("abc"));
            assert!(evaluations.is_none());
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn records_are_written_to_file_or_writer() {
    let dir = TempDir::new().unwrap();
    let settings = settings_in(dir.path());
    let evaluator = evaluator(&settings, None);
    let store = RecordStore::new(dir.path().join("resultados.csv"));
    run_evaluation(
        &evaluator,
        Some(&store),
        request(Some("luis@centro2.com")),
        date(),
    )
    .unwrap();
    let table = store.load_table().unwrap().unwrap();

    let mut stdout = Vec::new();
    write_records(&table, None, &mut stdout).unwrap();
    let target = dir.path().join("descarga.csv");
    write_records(&table, Some(target.as_path()), Vec::new()).unwrap();
    assert_eq!(fs::read(&target).unwrap(), stdout);
    assert!(String::from_utf8(stdout).unwrap().starts_with("Insulin,"));
}
