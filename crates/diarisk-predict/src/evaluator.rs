use std::sync::Arc;

use tracing::debug;

use diarisk_model::{ClinicalRecord, EvaluationResult, RiskLabel};

use crate::error::{PredictError, Result};
use crate::loader::Artifacts;
use crate::threshold::{ThresholdClassifier, decide};
use crate::transform::Transform;

/// Scores clinical records with a fitted transform and a thresholded classifier.
///
/// Evaluation is pure: the same record and artifacts always give the same
/// result.
#[derive(Debug, Clone)]
pub struct RiskEvaluator {
    transform: Arc<dyn Transform>,
    classifier: ThresholdClassifier,
}

impl RiskEvaluator {
    pub fn new(transform: Arc<dyn Transform>, classifier: ThresholdClassifier) -> Self {
        Self {
            transform,
            classifier,
        }
    }

    /// Build from loaded artifacts, resolving the threshold as described in
    /// [`ThresholdClassifier::with_override`].
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::InvalidThreshold`] for an out-of-range override.
    pub fn from_artifacts(artifacts: &Artifacts, threshold: Option<f64>) -> Result<Self> {
        let classifier =
            ThresholdClassifier::with_override(Arc::clone(&artifacts.classifier), threshold)?;
        Ok(Self::new(Arc::clone(&artifacts.transform), classifier))
    }

    pub fn threshold(&self) -> f64 {
        self.classifier.threshold()
    }

    /// # Errors
    ///
    /// Shape and non-finite errors mean the artifacts do not fit the form's
    /// fixed input and are configuration errors.
    pub fn evaluate(&self, record: &ClinicalRecord) -> Result<EvaluationResult> {
        let features = self.transform.transform(record)?;
        let expected = self.classifier.input_width();
        if features.len() != expected {
            return Err(PredictError::Shape {
                expected,
                actual: features.len(),
            });
        }
        let probability = self.classifier.predict_proba(&features)?;
        let label = RiskLabel::from_decision(decide(probability, self.classifier.threshold()));
        debug!(
            label = label.log_text(),
            probability,
            threshold = self.classifier.threshold(),
            "record evaluated"
        );
        Ok(EvaluationResult { label, probability })
    }
}
