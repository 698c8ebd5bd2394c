//! Text content of the PDF report, independent of layout.

use chrono::NaiveDate;

use diarisk_model::{
    ClinicalField, ClinicalRecord, EvaluationMetadata, EvaluationResult, RiskLabel,
};

pub const REPORT_TITLE: &str = "Informe de evaluación de riesgo de diabetes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Heading,
    Body,
    /// Coloured by outcome.
    Result(RiskLabel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub style: LineStyle,
    pub text: String,
}

impl ReportLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Lines of the report in top-to-bottom order.
pub fn report_lines(
    record: &ClinicalRecord,
    result: &EvaluationResult,
    metadata: &EvaluationMetadata,
    date: NaiveDate,
) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine::new(LineStyle::Title, REPORT_TITLE),
        ReportLine::new(
            LineStyle::Body,
            format!("Fecha de evaluación: {}", date.format("%d/%m/%Y")),
        ),
    ];
    if let Some(name) = &metadata.patient_name {
        lines.push(ReportLine::new(LineStyle::Body, format!("Paciente: {name}")));
    }
    if let Some(professional) = &metadata.professional {
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Profesional / centro: {professional}"),
        ));
    }
    if let Some(email) = &metadata.email {
        lines.push(ReportLine::new(LineStyle::Body, format!("Email: {email}")));
    }

    lines.push(ReportLine::new(LineStyle::Heading, "Datos clínicos"));
    for field in ClinicalField::ALL {
        let spec = field.spec();
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("{}: {}", spec.label, spec.format_value(record.get(field))),
        ));
    }

    lines.push(ReportLine::new(LineStyle::Heading, "Resultado del modelo"));
    lines.push(ReportLine::new(
        LineStyle::Result(result.label),
        format!(
            "{}: {} ({})",
            result.label.log_text(),
            result.label.headline(),
            result.percentage()
        ),
    ));

    if let Some(satisfaction) = metadata.satisfaction {
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Satisfacción: {}", satisfaction.as_str()),
        ));
    }
    if let Some(score) = metadata.comprehension {
        lines.push(ReportLine::new(
            LineStyle::Body,
            format!("Comprensión del resultado: {}/10", score.get()),
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use diarisk_model::{ComprehensionScore, SatisfactionRating};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()
    }

    #[test]
    fn minimal_report_has_fields_and_result() {
        let result = EvaluationResult {
            label: RiskLabel::Risk,
            probability: 0.6,
        };
        let lines = report_lines(
            &ClinicalRecord::default(),
            &result,
            &EvaluationMetadata::default(),
            date(),
        );
        assert_eq!(lines[0].text, REPORT_TITLE);
        assert_eq!(lines[1].text, "Fecha de evaluación: 30/04/2025");
        assert!(lines.iter().any(|l| l.text == "IMC (Índice de Masa Corporal): 32.0"));
        assert!(lines.iter().any(|l| l.text == "Edad: 29"));
        let last = lines.last().unwrap();
        assert_eq!(last.style, LineStyle::Result(RiskLabel::Risk));
        assert_eq!(
            last.text,
            "RIESGO DETECTADO: Riesgo de diabetes detectado (60.00%)"
        );
        assert!(!lines.iter().any(|l| l.text.starts_with("Paciente")));
    }

    #[test]
    fn optional_lines_appear_when_supplied() {
        let metadata = EvaluationMetadata {
            patient_name: Some("Ana".to_string()),
            professional: Some("Centro Norte".to_string()),
            email: Some("ana@centro1.com".to_string()),
            satisfaction: Some(SatisfactionRating::Neutral),
            comprehension: Some(ComprehensionScore::new(7).unwrap()),
        };
        let result = EvaluationResult {
            label: RiskLabel::NoRisk,
            probability: 0.1234,
        };
        let lines = report_lines(&ClinicalRecord::default(), &result, &metadata, date());
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert!(texts.contains(&"Paciente: Ana"));
        assert!(texts.contains(&"Profesional / centro: Centro Norte"));
        assert!(texts.contains(&"Email: ana@centro1.com"));
        assert!(texts.contains(&"SIN RIESGO: No se detecta riesgo aparente (12.34%)"));
        assert_eq!(texts[texts.len() - 2], "Satisfacción: Neutral");
        assert_eq!(texts[texts.len() - 1], "Comprensión del resultado: 7/10");
    }
}
