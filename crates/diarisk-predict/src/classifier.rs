//! Fitted probabilistic classifiers.
//!
//! Three artifact kinds are understood, tagged by `kind`:
//!
//! - `logistic`: `p = σ(w·x + b)`
//! - `linear_svm`: decision `f = w·x + b`, Platt-scaled
//! - `rbf_svm`: decision `f = Σ αᵢ·exp(-γ‖x - svᵢ‖²) + b`, Platt-scaled
//!
//! Platt scaling follows libsvm: `p = 1 / (1 + exp(A·f + B))`.
//! Every kind may carry the decision threshold it was tuned with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PredictError, Result};

/// Capability contract of a fitted classifier.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Number of features the classifier was fitted on.
    fn input_width(&self) -> usize;

    /// Probability of the positive class.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::Shape`] when `features` has the wrong width.
    fn predict_proba(&self, features: &[f64]) -> Result<f64>;

    /// Decision threshold stored with the fitted model, if any.
    fn stored_threshold(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
    },
    LinearSvm {
        coefficients: Vec<f64>,
        intercept: f64,
        platt_a: f64,
        platt_b: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
    },
    RbfSvm {
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
        gamma: f64,
        platt_a: f64,
        platt_b: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
    },
}

impl ClassifierArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierArtifact::Logistic { .. } => "logistic",
            ClassifierArtifact::LinearSvm { .. } => "linear_svm",
            ClassifierArtifact::RbfSvm { .. } => "rbf_svm",
        }
    }

    /// Check the fitted parameters for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let finite = |values: &[f64]| values.iter().all(|value| value.is_finite());
        match self {
            ClassifierArtifact::Logistic {
                coefficients,
                intercept,
                threshold,
            } => {
                if coefficients.is_empty() || !finite(coefficients) || !intercept.is_finite() {
                    return Err("logistic parameters must be non-empty and finite".to_string());
                }
                check_threshold(*threshold)
            }
            ClassifierArtifact::LinearSvm {
                coefficients,
                intercept,
                platt_a,
                platt_b,
                threshold,
            } => {
                if coefficients.is_empty() || !finite(coefficients) || !intercept.is_finite() {
                    return Err("linear_svm parameters must be non-empty and finite".to_string());
                }
                if !platt_a.is_finite() || !platt_b.is_finite() {
                    return Err("Platt parameters must be finite".to_string());
                }
                check_threshold(*threshold)
            }
            ClassifierArtifact::RbfSvm {
                support_vectors,
                dual_coef,
                intercept,
                gamma,
                platt_a,
                platt_b,
                threshold,
            } => {
                let Some(first) = support_vectors.first() else {
                    return Err("rbf_svm has no support vectors".to_string());
                };
                if first.is_empty() {
                    return Err("rbf_svm support vectors are empty".to_string());
                }
                if support_vectors.iter().any(|sv| sv.len() != first.len() || !finite(sv)) {
                    return Err("rbf_svm support vectors must share one width and be finite".to_string());
                }
                if dual_coef.len() != support_vectors.len() || !finite(dual_coef) {
                    return Err(format!(
                        "rbf_svm has {} support vectors but {} dual coefficients",
                        support_vectors.len(),
                        dual_coef.len()
                    ));
                }
                if !(gamma.is_finite() && *gamma > 0.0) {
                    return Err("rbf_svm gamma must be positive".to_string());
                }
                if !intercept.is_finite() || !platt_a.is_finite() || !platt_b.is_finite() {
                    return Err("rbf_svm intercept and Platt parameters must be finite".to_string());
                }
                check_threshold(*threshold)
            }
        }
    }

    fn decision(&self, features: &[f64]) -> f64 {
        match self {
            ClassifierArtifact::Logistic {
                coefficients,
                intercept,
                ..
            }
            | ClassifierArtifact::LinearSvm {
                coefficients,
                intercept,
                ..
            } => dot(coefficients, features) + intercept,
            ClassifierArtifact::RbfSvm {
                support_vectors,
                dual_coef,
                intercept,
                gamma,
                ..
            } => {
                support_vectors
                    .iter()
                    .zip(dual_coef)
                    .map(|(sv, alpha)| alpha * (-gamma * squared_distance(sv, features)).exp())
                    .sum::<f64>()
                    + intercept
            }
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn input_width(&self) -> usize {
        match self {
            ClassifierArtifact::Logistic { coefficients, .. }
            | ClassifierArtifact::LinearSvm { coefficients, .. } => coefficients.len(),
            ClassifierArtifact::RbfSvm {
                support_vectors, ..
            } => support_vectors.first().map_or(0, Vec::len),
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        let expected = self.input_width();
        if features.len() != expected {
            return Err(PredictError::Shape {
                expected,
                actual: features.len(),
            });
        }
        let decision = self.decision(features);
        let probability = match self {
            ClassifierArtifact::Logistic { .. } => sigmoid(decision),
            ClassifierArtifact::LinearSvm {
                platt_a, platt_b, ..
            }
            | ClassifierArtifact::RbfSvm {
                platt_a, platt_b, ..
            } => sigmoid(-(platt_a * decision + platt_b)),
        };
        if !probability.is_finite() {
            return Err(PredictError::NonFinite {
                stage: "classifier",
            });
        }
        Ok(probability)
    }

    fn stored_threshold(&self) -> Option<f64> {
        match self {
            ClassifierArtifact::Logistic { threshold, .. }
            | ClassifierArtifact::LinearSvm { threshold, .. }
            | ClassifierArtifact::RbfSvm { threshold, .. } => *threshold,
        }
    }
}

fn check_threshold(threshold: Option<f64>) -> std::result::Result<(), String> {
    match threshold {
        Some(value) if !(0.0..=1.0).contains(&value) => {
            Err(format!("stored threshold {value} is outside [0, 1]"))
        }
        _ => Ok(()),
    }
}

fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn squared_distance(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// Logistic function without overflow for large `|z|`.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
