//! Persistence Module - Model artifacts on disk
//!
//! One JSON file per estimator plus one for the scaler, named so `load`
//! finds them without an index. Every file carries the feature layout it
//! was trained on and a payload checksum.

pub mod artifact;
pub mod storage;

#[cfg(test)]
mod tests;

pub use artifact::{Artifact, ArtifactPayload, ARTIFACT_FORMAT_VERSION};
pub use storage::{
    artifact_exists, artifact_path, default_models_dir, list_artifacts, load_artifact, save_artifact,
};

/// Scaler artifact name, shared by every wrapper directory
pub const SCALER_ARTIFACT: &str = "scaler";
pub const FRAUD_DETECTOR_ARTIFACT: &str = "fraud_detector";
pub const FRAUD_CLASSIFIER_ARTIFACT: &str = "fraud_classifier";
pub const RISK_ANALYZER_ARTIFACT: &str = "risk_analyzer";
pub const DELINQUENCY_PREDICTOR_ARTIFACT: &str = "delinquency_predictor";
