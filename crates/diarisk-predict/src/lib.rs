//! Diabetes risk scoring.
//!
//! - [`ArtifactLoader`]: reads and caches the fitted transform and classifier
//! - [`ThresholdClassifier`]: binary decision over a positive-class probability
//! - [`RiskEvaluator`]: record → transform → thresholded classifier → result

pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod threshold;
pub mod transform;

pub use classifier::{Classifier, ClassifierArtifact};
pub use error::{ArtifactError, PredictError, Result};
pub use evaluator::RiskEvaluator;
pub use loader::{ArtifactLoader, ArtifactPaths, Artifacts, sha256_hex};
pub use threshold::{DEFAULT_THRESHOLD, ThresholdClassifier, decide};
pub use transform::{FittedPipeline, PipelineSpec, StepSpec, Transform};
