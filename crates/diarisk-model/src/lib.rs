//! Data model for diabetes risk screening.

pub mod error;
pub mod evaluation;
pub mod field;
pub mod record;

pub use error::{ModelError, Result};
pub use evaluation::{
    ComprehensionScore, EvaluationMetadata, EvaluationResult, RiskLabel, SatisfactionRating,
    StoredEvaluation, round_probability,
};
pub use field::{ClinicalField, FieldKind, FieldSpec, format_decimal};
pub use record::ClinicalRecord;
