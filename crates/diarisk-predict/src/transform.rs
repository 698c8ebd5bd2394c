//! Fitted preprocessing transform.
//!
//! The transform turns a [`ClinicalRecord`] into the feature vector the
//! classifier was trained on. Its parameters come from a JSON artifact:
//!
//! ```json
//! {
//!   "features": ["Pregnancies", "Glucose", "BloodPressure", "SkinThickness",
//!                "Insulin", "BMI", "DiabetesPedigreeFunction", "Age"],
//!   "steps": [
//!     { "kind": "impute_zero", "columns": ["Glucose", "BMI"], "values": [117.0, 32.3] },
//!     { "kind": "log1p", "columns": ["Insulin"] },
//!     { "kind": "standardize", "mean": [...], "scale": [...] }
//!   ]
//! }
//! ```
//!
//! `features` fixes the vector order and must name each clinical field once.

use std::fmt;

use serde::{Deserialize, Serialize};

use diarisk_model::{ClinicalField, ClinicalRecord};

use crate::error::{PredictError, Result};

/// Capability contract of a fitted preprocessing step.
pub trait Transform: Send + Sync + fmt::Debug {
    /// Number of features produced.
    fn output_width(&self) -> usize;

    /// Map a record to the classifier's feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::NonFinite`] when the fitted parameters turn a
    /// valid record into NaN or infinity.
    fn transform(&self, record: &ClinicalRecord) -> Result<Vec<f64>>;
}

/// Serialized form of a fitted pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub features: Vec<String>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    /// Replace zeros (unmeasured) by a fitted fill value.
    ImputeZero {
        columns: Vec<String>,
        values: Vec<f64>,
    },
    /// `ln(1 + x)` on the named columns.
    Log1p { columns: Vec<String> },
    /// `(x - mean) / scale` on every feature.
    Standardize { mean: Vec<f64>, scale: Vec<f64> },
}

#[derive(Debug, Clone)]
enum Step {
    ImputeZero(Vec<(usize, f64)>),
    Log1p(Vec<usize>),
    Standardize { mean: Vec<f64>, scale: Vec<f64> },
}

/// A validated pipeline with column names resolved to vector positions.
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    features: Vec<ClinicalField>,
    steps: Vec<Step>,
}

impl FittedPipeline {
    /// Validate a parsed spec.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn from_spec(spec: PipelineSpec) -> std::result::Result<Self, String> {
        let mut features = Vec::with_capacity(spec.features.len());
        for name in &spec.features {
            let field = ClinicalField::from_column(name)
                .ok_or_else(|| format!("unknown feature '{name}'"))?;
            if features.contains(&field) {
                return Err(format!("duplicate feature '{name}'"));
            }
            features.push(field);
        }
        if features.len() != ClinicalField::ALL.len() {
            return Err(format!(
                "expected {} features, found {}",
                ClinicalField::ALL.len(),
                features.len()
            ));
        }

        let position = |name: &str| {
            spec.features
                .iter()
                .position(|feature| feature == name)
                .ok_or_else(|| format!("step references unknown column '{name}'"))
        };

        let mut steps = Vec::with_capacity(spec.steps.len());
        for step in spec.steps {
            let resolved = match step {
                StepSpec::ImputeZero { columns, values } => {
                    if columns.len() != values.len() {
                        return Err(format!(
                            "impute_zero has {} columns but {} values",
                            columns.len(),
                            values.len()
                        ));
                    }
                    let mut fills = Vec::with_capacity(columns.len());
                    for (column, value) in columns.iter().zip(values) {
                        if !value.is_finite() {
                            return Err(format!("impute_zero value for '{column}' is not finite"));
                        }
                        fills.push((position(column)?, value));
                    }
                    Step::ImputeZero(fills)
                }
                StepSpec::Log1p { columns } => Step::Log1p(
                    columns
                        .iter()
                        .map(|column| position(column))
                        .collect::<std::result::Result<_, _>>()?,
                ),
                StepSpec::Standardize { mean, scale } => {
                    if mean.len() != features.len() || scale.len() != features.len() {
                        return Err(format!(
                            "standardize needs {} means and scales, found {} and {}",
                            features.len(),
                            mean.len(),
                            scale.len()
                        ));
                    }
                    if mean.iter().any(|value| !value.is_finite()) {
                        return Err("standardize mean is not finite".to_string());
                    }
                    if scale.iter().any(|value| !value.is_finite() || *value == 0.0) {
                        return Err("standardize scale must be finite and non-zero".to_string());
                    }
                    Step::Standardize { mean, scale }
                }
            };
            steps.push(resolved);
        }

        Ok(Self { features, steps })
    }

    pub fn features(&self) -> &[ClinicalField] {
        &self.features
    }
}

impl Transform for FittedPipeline {
    fn output_width(&self) -> usize {
        self.features.len()
    }

    fn transform(&self, record: &ClinicalRecord) -> Result<Vec<f64>> {
        let mut values: Vec<f64> = self
            .features
            .iter()
            .map(|field| record.get(*field))
            .collect();
        for step in &self.steps {
            match step {
                Step::ImputeZero(fills) => {
                    for (index, fill) in fills {
                        if values[*index] == 0.0 {
                            values[*index] = *fill;
                        }
                    }
                }
                Step::Log1p(columns) => {
                    for index in columns {
                        values[*index] = values[*index].ln_1p();
                    }
                }
                Step::Standardize { mean, scale } => {
                    for (index, value) in values.iter_mut().enumerate() {
                        *value = (*value - mean[index]) / scale[index];
                    }
                }
            }
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(PredictError::NonFinite { stage: "transform" });
        }
        Ok(values)
    }
}
