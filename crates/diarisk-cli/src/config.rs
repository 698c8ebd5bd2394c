//! Settings file.
//!
//! Resolution order:
//! 1. `--config PATH`
//! 2. `DIARISK_CONFIG` environment variable
//! 3. `settings.toml` in the platform config directory:
//!    - macOS: ~/Library/Application Support/com.diarisk.diarisk/
//!    - Windows: %APPDATA%/diarisk/diarisk/config/
//!    - Linux: ~/.config/diarisk/
//! 4. Built-in defaults
//!
//! An explicitly named file must exist and parse. The platform file is
//! optional and falls back to defaults when it cannot be used.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use diarisk_predict::ArtifactPaths;
use diarisk_store::{AccessGate, DEFAULT_LEADER_EMAIL, DEFAULT_PROFESSIONAL_EMAILS, RecordStore};

pub const CONFIG_ENV_VAR: &str = "DIARISK_CONFIG";

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "diarisk";
const APP_NAME: &str = "diarisk";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub artifacts: ArtifactSettings,
    pub model: ModelSettings,
    pub records: RecordSettings,
    pub access: AccessSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub transform: PathBuf,
    pub classifier: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_sha256: Option<String>,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            transform: PathBuf::from("pipelines/pipeline_v1.json"),
            classifier: PathBuf::from("models/svc_v1_threshold035.json"),
            transform_sha256: None,
            classifier_sha256: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Overrides the threshold stored in the classifier artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSettings {
    pub path: PathBuf,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("resultados/resultados.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    pub leader_email: String,
    pub professional_emails: Vec<String>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            leader_email: DEFAULT_LEADER_EMAIL.to_string(),
            professional_emails: DEFAULT_PROFESSIONAL_EMAILS
                .iter()
                .map(|email| (*email).to_string())
                .collect(),
        }
    }
}

impl Settings {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            transform: self.artifacts.transform.clone(),
            classifier: self.artifacts.classifier.clone(),
            transform_sha256: self.artifacts.transform_sha256.clone(),
            classifier_sha256: self.artifacts.classifier_sha256.clone(),
        }
    }

    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(
            self.access.leader_email.clone(),
            self.access.professional_emails.iter().cloned(),
        )
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(self.records.path.clone())
    }
}

/// Path of the platform settings file, if the platform has a config dir.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Parse settings from TOML text.
///
/// # Errors
///
/// Returns the TOML parse error.
pub fn parse_settings(content: &str) -> Result<Settings> {
    toml::from_str(content).context("parse settings")
}

/// Load settings following the resolution order in the module docs.
///
/// # Errors
///
/// Fails only for an explicit file (flag or environment variable) that
/// cannot be read or parsed.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));
    if let Some(path) = explicit {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        let settings = parse_settings(&content)
            .with_context(|| format!("settings file {}", path.display()))?;
        tracing::info!("Loaded settings from {:?}", path);
        return Ok(settings);
    }

    let Some(path) = settings_path() else {
        tracing::warn!("Could not determine settings path, using defaults");
        return Ok(Settings::default());
    };
    match fs::read_to_string(&path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {:?}", path);
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file: {:#}, using defaults", e);
                Ok(Settings::default())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file found at {:?}, using defaults", path);
            Ok(Settings::default())
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file: {}, using defaults", e);
            Ok(Settings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_round_trip() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(parse_settings(&text).unwrap(), settings);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = parse_settings(
            r#"
            [model]
            threshold = 0.5

            [access]
            leader_email = "jefa@hospital.org"
            "#,
        )
        .unwrap();
        assert_eq!(settings.model.threshold, Some(0.5));
        assert_eq!(settings.access.leader_email, "jefa@hospital.org");
        assert_eq!(settings.access.professional_emails.len(), 3);
        assert_eq!(settings.records, RecordSettings::default());
    }

    #[test]
    fn gate_uses_configured_addresses() {
        let settings = parse_settings(
            r#"
            [access]
            leader_email = "jefa@hospital.org"
            professional_emails = ["pablo@centro9.com"]
            "#,
        )
        .unwrap();
        let gate = settings.access_gate();
        assert!(gate.is_leader("jefa@hospital.org"));
        assert!(!gate.is_leader("lider@dominio.com"));
        assert!(gate.is_authorized_professional("pablo@centro9.com"));
        assert!(!gate.is_authorized_professional("ana@centro1.com"));
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(&dir.path().join("missing.toml"))).is_err());

        let path = dir.path().join("settings.toml");
        fs::write(&path, "[records]\npath = \"/tmp/log.csv\"\n").unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.records.path, PathBuf::from("/tmp/log.csv"));
    }

    #[test]
    fn explicit_file_must_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[model\nthreshold = ").unwrap();
        assert!(load_settings(Some(&path)).is_err());
    }
}
