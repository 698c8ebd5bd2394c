//! Clinical field catalogue.
//!
//! Every measurement the screening form collects is described here once:
//! its log column name, numeric kind, admissible range, default value and the
//! label shown to clinicians. Input surfaces derive their bounds from this
//! table, so a [`crate::ClinicalRecord`] built through them is always in range.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One of the eight clinical measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClinicalField {
    Insulin,
    DiabetesPedigreeFunction,
    Age,
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Bmi,
}

impl ClinicalField {
    /// All fields in canonical log column order.
    pub const ALL: [ClinicalField; 8] = [
        ClinicalField::Insulin,
        ClinicalField::DiabetesPedigreeFunction,
        ClinicalField::Age,
        ClinicalField::Pregnancies,
        ClinicalField::Glucose,
        ClinicalField::BloodPressure,
        ClinicalField::SkinThickness,
        ClinicalField::Bmi,
    ];

    /// Column name used in the results log and in model artifacts.
    pub const fn column(self) -> &'static str {
        match self {
            ClinicalField::Insulin => "Insulin",
            ClinicalField::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            ClinicalField::Age => "Age",
            ClinicalField::Pregnancies => "Pregnancies",
            ClinicalField::Glucose => "Glucose",
            ClinicalField::BloodPressure => "BloodPressure",
            ClinicalField::SkinThickness => "SkinThickness",
            ClinicalField::Bmi => "BMI",
        }
    }

    /// Resolve a column name (exact match).
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == name)
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self.index()]
    }

    /// Position of the field in [`ClinicalField::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Numeric kind of a clinical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

/// Static description of a clinical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: ClinicalField,
    pub kind: FieldKind,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub label: &'static str,
    pub help: &'static str,
}

impl FieldSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check a candidate value against the field's kind and range.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotInteger`] for a fractional value on an integer
    /// field and [`ModelError::OutOfRange`] for anything outside `[min, max]`
    /// (NaN included).
    pub fn check(&self, value: f64) -> Result<f64> {
        if self.kind == FieldKind::Integer && value.fract() != 0.0 {
            return Err(ModelError::NotInteger {
                field: self.field.column(),
                value,
            });
        }
        if !self.contains(value) {
            return Err(ModelError::OutOfRange {
                field: self.field.column(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }

    /// Render a value the way the log and reports show it.
    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            FieldKind::Integer => format!("{value:.0}"),
            FieldKind::Float => format_decimal(value),
        }
    }
}

/// Format a float keeping a trailing `.0` for integral values (`32.0`, `0.6`).
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

static FIELD_SPECS: [FieldSpec; 8] = [
    FieldSpec {
        field: ClinicalField::Insulin,
        kind: FieldKind::Float,
        min: 0.0,
        max: 900.0,
        default: 30.5,
        label: "Insulina (uU/mL)",
        help: "Nivel de insulina en sangre. Valores altos pueden indicar resistencia a la insulina.",
    },
    FieldSpec {
        field: ClinicalField::DiabetesPedigreeFunction,
        kind: FieldKind::Float,
        min: 0.0,
        max: 2.5,
        default: 0.37,
        label: "Función Pedigrí de Diabetes (DPF)",
        help: "Índice de predisposición genética. Cuanto mayor, mayor riesgo.",
    },
    FieldSpec {
        field: ClinicalField::Age,
        kind: FieldKind::Integer,
        min: 21.0,
        max: 100.0,
        default: 29.0,
        label: "Edad",
        help: "Edad del paciente. El riesgo aumenta con la edad.",
    },
    FieldSpec {
        field: ClinicalField::Pregnancies,
        kind: FieldKind::Integer,
        min: 0.0,
        max: 20.0,
        default: 3.0,
        label: "Número de embarazos",
        help: "Número total de embarazos. Relevante en mujeres para evaluación de riesgo.",
    },
    FieldSpec {
        field: ClinicalField::Glucose,
        kind: FieldKind::Integer,
        min: 0.0,
        max: 250.0,
        default: 117.0,
        label: "Glucosa (mg/dL)",
        help: "Nivel de glucosa en ayunas. Valores altos indican riesgo de diabetes.",
    },
    FieldSpec {
        field: ClinicalField::BloodPressure,
        kind: FieldKind::Integer,
        min: 0.0,
        max: 160.0,
        default: 72.0,
        label: "Presión arterial (mm Hg)",
        help: "Presión arterial diastólica. Importante en control metabólico.",
    },
    FieldSpec {
        field: ClinicalField::SkinThickness,
        kind: FieldKind::Integer,
        min: 0.0,
        max: 100.0,
        default: 23.0,
        label: "Grosor del pliegue cutáneo (mm)",
        help: "Medida del tejido subcutáneo. Asociado a masa grasa corporal.",
    },
    FieldSpec {
        field: ClinicalField::Bmi,
        kind: FieldKind::Float,
        min: 10.0,
        max: 70.0,
        default: 32.0,
        label: "IMC (Índice de Masa Corporal)",
        help: "Relación peso/talla. IMC > 30 indica obesidad.",
    },
];
