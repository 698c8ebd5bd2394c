//! Integration tests for single-evaluation exports.

use chrono::NaiveDate;

use diarisk_model::{
    ClinicalRecord, ComprehensionScore, EvaluationMetadata, EvaluationResult, RiskLabel,
    SatisfactionRating,
};
use diarisk_report::{LineStyle, render_csv_row, render_pdf, report_lines};

#[test]
fn csv_row_of_default_record() {
    let bytes = render_csv_row(&ClinicalRecord::default()).expect("render csv");
    let text = String::from_utf8(bytes).expect("utf-8");
    insta::assert_snapshot!("default_record_csv", text);
}

#[test]
fn csv_row_keeps_float_precision() {
    let record = ClinicalRecord {
        insulin: 846.0,
        diabetes_pedigree_function: 2.42,
        bmi: 67.1,
        ..ClinicalRecord::default()
    };
    let text = String::from_utf8(render_csv_row(&record).unwrap()).unwrap();
    let row = text.lines().nth(1).unwrap();
    assert_eq!(row, "846.0,2.42,29,3,117,72,23,67.1");
}

#[test]
fn pdf_with_every_optional_line() {
    let metadata = EvaluationMetadata {
        patient_name: Some("José Ramírez".to_string()),
        professional: Some("Centro de Salud Sur".to_string()),
        email: Some("luis@centro2.com".to_string()),
        satisfaction: Some(SatisfactionRating::VerySatisfied),
        comprehension: Some(ComprehensionScore::new(10).unwrap()),
    };
    let result = EvaluationResult {
        label: RiskLabel::NoRisk,
        probability: 0.2,
    };
    let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
    let bytes = render_pdf(&ClinicalRecord::default(), &result, &metadata, date).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let lines = report_lines(&ClinicalRecord::default(), &result, &metadata, date);
    let results: Vec<_> = lines
        .iter()
        .filter(|line| matches!(line.style, LineStyle::Result(_)))
        .collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].style, LineStyle::Result(RiskLabel::NoRisk));
}
