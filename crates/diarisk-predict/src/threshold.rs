use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::{PredictError, Result};

/// Threshold used when neither configuration nor the artifact sets one.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Positive decision iff `probability >= threshold`.
pub fn decide(probability: f64, threshold: f64) -> u8 {
    u8::from(probability >= threshold)
}

/// Binary decision on top of a probabilistic classifier.
///
/// A threshold below 0.5 trades false positives for fewer missed positives.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier {
    base: Arc<dyn Classifier>,
    threshold: f64,
}

impl ThresholdClassifier {
    /// # Errors
    ///
    /// Returns [`PredictError::InvalidThreshold`] outside `[0, 1]` or for NaN.
    pub fn new(base: Arc<dyn Classifier>, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PredictError::InvalidThreshold(threshold));
        }
        Ok(Self { base, threshold })
    }

    /// Resolve the threshold as override, then stored threshold, then
    /// [`DEFAULT_THRESHOLD`].
    ///
    /// # Errors
    ///
    /// See [`ThresholdClassifier::new`].
    pub fn with_override(base: Arc<dyn Classifier>, threshold: Option<f64>) -> Result<Self> {
        let threshold = threshold
            .or_else(|| base.stored_threshold())
            .unwrap_or(DEFAULT_THRESHOLD);
        Self::new(base, threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn input_width(&self) -> usize {
        self.base.input_width()
    }

    pub fn predict_proba(&self, features: &[f64]) -> Result<f64> {
        self.base.predict_proba(features)
    }

    pub fn predict(&self, features: &[f64]) -> Result<u8> {
        Ok(decide(self.predict_proba(features)?, self.threshold))
    }
}
