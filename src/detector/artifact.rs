use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::monitor::{FEATURE_NAMES, FeatureRow};

use super::{
    corpus::CorpusError,
    isolation_forest::{ForestParams, IsolationForest},
};

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomalous,
}

impl Verdict {
    pub fn is_anomalous(self) -> bool {
        matches!(self, Verdict::Anomalous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Normal => "normal",
            Verdict::Anomalous => "anomalous",
        }
    }
}

/// Binary outlier predicate over a single feature row.
pub trait Classifier: Send + Sync {
    fn classify(&self, row: &FeatureRow) -> Verdict;
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write model artifact {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    Format {
        path: String,
        source: serde_json::Error,
    },
    #[error("model artifact version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("model artifact features {found:?} do not match the monitored features")]
    FeatureMismatch { found: Vec<String> },
    #[error("model artifact {path} is invalid: {reason}")]
    InvalidModel { path: String, reason: String },
    #[error("training corpus is empty")]
    EmptyCorpus,
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub samples: usize,
    pub contamination: f64,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub training: TrainingInfo,
    pub forest: IsolationForest,
}

impl ModelArtifact {
    pub fn train(rows: &[FeatureRow], params: ForestParams) -> Result<Self, ModelError> {
        let forest = IsolationForest::fit(rows, params).ok_or(ModelError::EmptyCorpus)?;
        Ok(Self {
            version: ARTIFACT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            training: TrainingInfo {
                samples: rows.len(),
                contamination: params.contamination,
                seed: params.seed,
                trained_at: Utc::now(),
            },
            forest,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path_str.clone(),
            source,
        })?;
        let artifact: Self = serde_json::from_str(&raw).map_err(|source| ModelError::Format {
            path: path_str,
            source,
        })?;
        artifact.check_compatible()?;
        artifact
            .forest
            .validate()
            .map_err(|reason| ModelError::InvalidModel {
                path: path.display().to_string(),
                reason,
            })?;
        Ok(artifact)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let body = serde_json::to_string(self).map_err(|source| ModelError::Format {
            path: path_str.clone(),
            source,
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| ModelError::Write {
                path: path_str.clone(),
                source,
            })?;
        }
        fs::write(path, body).map_err(|source| ModelError::Write {
            path: path_str,
            source,
        })
    }

    fn check_compatible(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.version,
                expected: ARTIFACT_VERSION,
            });
        }
        if self.feature_names.len() != FEATURE_NAMES.len()
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(found, expected)| found != expected)
        {
            return Err(ModelError::FeatureMismatch {
                found: self.feature_names.clone(),
            });
        }
        Ok(())
    }
}

impl Classifier for ModelArtifact {
    fn classify(&self, row: &FeatureRow) -> Verdict {
        if self.forest.is_anomalous(row) {
            Verdict::Anomalous
        } else {
            Verdict::Normal
        }
    }
}
