//! Evaluation results and the records written to the results log.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::record::ClinicalRecord;

/// Binary screening outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Risk,
    NoRisk,
}

impl RiskLabel {
    /// Map a classifier decision (`1` positive, anything else negative).
    pub fn from_decision(decision: u8) -> Self {
        if decision == 1 {
            RiskLabel::Risk
        } else {
            RiskLabel::NoRisk
        }
    }

    /// Text stored in the `Resultado` column.
    pub const fn log_text(self) -> &'static str {
        match self {
            RiskLabel::Risk => "RIESGO DETECTADO",
            RiskLabel::NoRisk => "SIN RIESGO",
        }
    }

    /// Sentence shown to the clinician.
    pub const fn headline(self) -> &'static str {
        match self {
            RiskLabel::Risk => "Riesgo de diabetes detectado",
            RiskLabel::NoRisk => "No se detecta riesgo aparente",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_text())
    }
}

impl FromStr for RiskLabel {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "RIESGO DETECTADO" => Ok(RiskLabel::Risk),
            "SIN RIESGO" => Ok(RiskLabel::NoRisk),
            other => Err(ModelError::UnknownLabel(other.to_string())),
        }
    }
}

/// Label and positive-class probability for one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub label: RiskLabel,
    pub probability: f64,
}

impl EvaluationResult {
    /// Probability as a percentage with two decimals, e.g. `60.00%`.
    pub fn percentage(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Round a probability to the four decimals kept in the log.
pub fn round_probability(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 10_000.0
}

/// Five-level satisfaction survey answer, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SatisfactionRating {
    VeryDissatisfied,
    Dissatisfied,
    Neutral,
    Satisfied,
    VerySatisfied,
}

impl SatisfactionRating {
    pub const ALL: [SatisfactionRating; 5] = [
        SatisfactionRating::VeryDissatisfied,
        SatisfactionRating::Dissatisfied,
        SatisfactionRating::Neutral,
        SatisfactionRating::Satisfied,
        SatisfactionRating::VerySatisfied,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SatisfactionRating::VeryDissatisfied => "Muy insatisfecho",
            SatisfactionRating::Dissatisfied => "Insatisfecho",
            SatisfactionRating::Neutral => "Neutral",
            SatisfactionRating::Satisfied => "Satisfecho",
            SatisfactionRating::VerySatisfied => "Muy satisfecho",
        }
    }
}

impl FromStr for SatisfactionRating {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|rating| rating.as_str() == value)
            .ok_or_else(|| ModelError::UnknownSatisfaction(value.to_string()))
    }
}

/// Self-reported comprehension of the result, 0 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComprehensionScore(u8);

impl ComprehensionScore {
    pub const MAX: u8 = 10;

    /// # Errors
    ///
    /// Returns [`ModelError::InvalidComprehension`] outside `0..=10`.
    pub fn new(score: i64) -> Result<Self> {
        u8::try_from(score)
            .ok()
            .filter(|value| *value <= Self::MAX)
            .map(Self)
            .ok_or(ModelError::InvalidComprehension(score))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Optional context captured alongside an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetadata {
    pub patient_name: Option<String>,
    pub professional: Option<String>,
    pub email: Option<String>,
    pub satisfaction: Option<SatisfactionRating>,
    pub comprehension: Option<ComprehensionScore>,
}

/// One row of the results log.
///
/// `date`, `label` and `probability` are always set for new evaluations.
/// They are `None` only on rows written before the log had those columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvaluation {
    pub record: ClinicalRecord,
    pub date: Option<NaiveDate>,
    pub label: Option<RiskLabel>,
    /// Rounded to four decimals.
    pub probability: Option<f64>,
    pub metadata: EvaluationMetadata,
}

impl StoredEvaluation {
    pub fn new(
        record: ClinicalRecord,
        result: &EvaluationResult,
        metadata: EvaluationMetadata,
        date: NaiveDate,
    ) -> Self {
        Self {
            record,
            date: Some(date),
            label: Some(result.label),
            probability: Some(round_probability(result.probability)),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_text_round_trips() {
        for label in [RiskLabel::Risk, RiskLabel::NoRisk] {
            assert_eq!(label.log_text().parse::<RiskLabel>().unwrap(), label);
        }
        assert!("riesgo detectado".parse::<RiskLabel>().is_err());
    }

    #[test]
    fn percentage_has_two_decimals() {
        let result = EvaluationResult {
            label: RiskLabel::Risk,
            probability: 0.6,
        };
        assert_eq!(result.percentage(), "60.00%");
    }

    #[test]
    fn probability_is_rounded_to_four_places() {
        assert_eq!(round_probability(0.123_456), 0.1235);
        assert_eq!(round_probability(0.6), 0.6);
    }

    #[test]
    fn comprehension_bounds() {
        assert_eq!(ComprehensionScore::new(10).unwrap().get(), 10);
        assert!(ComprehensionScore::new(11).is_err());
        assert!(ComprehensionScore::new(-1).is_err());
    }

    #[test]
    fn stored_evaluation_serializes() {
        let stored = StoredEvaluation::new(
            ClinicalRecord::default(),
            &EvaluationResult {
                label: RiskLabel::NoRisk,
                probability: 0.21337,
            },
            EvaluationMetadata::default(),
            NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
        );
        let json = serde_json::to_string(&stored).expect("serialize");
        let round: StoredEvaluation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round.probability, Some(0.2134));
        assert_eq!(round.label, Some(RiskLabel::NoRisk));
    }
}
