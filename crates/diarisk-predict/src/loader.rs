//! One-shot loading and caching of the fitted artifacts.
//!
//! An [`ArtifactLoader`] owns its cache. The first [`ArtifactLoader::load`]
//! reads, checks and caches both artifacts; every later call returns the same
//! [`Artifacts`] without touching the filesystem. Dropping the loader drops
//! the cache. Cached artifacts are immutable and shared without locking.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use sha2::Digest;
use tracing::{debug, info};

use crate::classifier::{Classifier, ClassifierArtifact};
use crate::error::ArtifactError;
use crate::transform::{FittedPipeline, PipelineSpec, Transform};

/// Where the artifacts live and, optionally, which content they must have.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub transform: PathBuf,
    pub classifier: PathBuf,
    /// Expected lowercase hex SHA-256 of the transform file.
    pub transform_sha256: Option<String>,
    /// Expected lowercase hex SHA-256 of the classifier file.
    pub classifier_sha256: Option<String>,
}

impl ArtifactPaths {
    pub fn new(transform: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            transform: transform.into(),
            classifier: classifier.into(),
            transform_sha256: None,
            classifier_sha256: None,
        }
    }
}

/// The loaded transform and classifier.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub transform: Arc<dyn Transform>,
    pub classifier: Arc<dyn Classifier>,
    pub transform_sha256: String,
    pub classifier_sha256: String,
}

#[derive(Debug)]
pub struct ArtifactLoader {
    paths: ArtifactPaths,
    cache: OnceLock<Artifacts>,
}

impl ArtifactLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cache: OnceLock::new(),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Return the cached artifacts, reading them on first use.
    ///
    /// # Errors
    ///
    /// Any [`ArtifactError`] from the first read. A failed load caches
    /// nothing, but callers are expected to treat it as fatal.
    pub fn load(&self) -> Result<&Artifacts, ArtifactError> {
        if let Some(artifacts) = self.cache.get() {
            debug!("using cached artifacts");
            return Ok(artifacts);
        }
        let artifacts = read_artifacts(&self.paths)?;
        Ok(self.cache.get_or_init(|| artifacts))
    }
}

fn read_artifacts(paths: &ArtifactPaths) -> Result<Artifacts, ArtifactError> {
    let (spec, transform_sha256): (PipelineSpec, String) =
        read_json(&paths.transform, paths.transform_sha256.as_deref())?;
    let pipeline = FittedPipeline::from_spec(spec)
        .map_err(|message| ArtifactError::invalid(&paths.transform, message))?;

    let (classifier, classifier_sha256): (ClassifierArtifact, String) =
        read_json(&paths.classifier, paths.classifier_sha256.as_deref())?;
    classifier
        .validate()
        .map_err(|message| ArtifactError::invalid(&paths.classifier, message))?;

    if pipeline.output_width() != classifier.input_width() {
        return Err(ArtifactError::Incompatible {
            transform: pipeline.output_width(),
            classifier: classifier.input_width(),
        });
    }

    info!(
        transform = %paths.transform.display(),
        transform_sha256 = %transform_sha256,
        classifier = %paths.classifier.display(),
        classifier_sha256 = %classifier_sha256,
        classifier_kind = classifier.kind(),
        "artifacts loaded"
    );

    Ok(Artifacts {
        transform: Arc::new(pipeline),
        classifier: Arc::new(classifier),
        transform_sha256,
        classifier_sha256,
    })
}

fn read_json<T: DeserializeOwned>(
    path: &Path,
    expected_sha256: Option<&str>,
) -> Result<(T, String), ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::io(path, source))?;
    let actual = sha256_hex(&bytes);
    if let Some(expected) = expected_sha256
        && !expected.eq_ignore_ascii_case(&actual)
    {
        return Err(ArtifactError::DigestMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    let value = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, actual))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha2::Sha256::digest(bytes))
}
