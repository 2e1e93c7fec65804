//! Artifact envelope: schema tag + payload checksum around a serialized state.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::error::{ModelError, ModelResult};
use crate::logic::estimators::{GradientBoostingClassifier, IsolationForest, RandomForestClassifier};
use crate::logic::features::FeatureSchema;
use crate::logic::scaler::ScalerState;

/// Bump when the envelope layout changes
pub const ARTIFACT_FORMAT_VERSION: u8 = 1;

/// State that can be stored as an artifact
pub trait ArtifactPayload: Serialize + DeserializeOwned {
    /// Tag written into the envelope, checked on load
    const KIND: &'static str;
}

impl ArtifactPayload for ScalerState {
    const KIND: &'static str = "standard_scaler";
}

impl ArtifactPayload for IsolationForest {
    const KIND: &'static str = "isolation_forest";
}

impl ArtifactPayload for RandomForestClassifier {
    const KIND: &'static str = "random_forest";
}

impl ArtifactPayload for GradientBoostingClassifier {
    const KIND: &'static str = "gradient_boosting";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub format_version: u8,
    pub kind: String,
    pub schema_name: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    /// Hex SHA-256 of the serialized payload
    pub checksum: String,
    pub saved_at: DateTime<Utc>,
    pub payload: T,
}

impl<T: Serialize> Artifact<T> {
    pub fn new(kind: &str, schema: &FeatureSchema, payload: T) -> ModelResult<Self> {
        let checksum = payload_checksum(&payload)?;
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            kind: kind.to_string(),
            schema_name: schema.name().to_string(),
            feature_version: schema.version(),
            layout_hash: schema.layout_hash(),
            checksum,
            saved_at: Utc::now(),
            payload,
        })
    }

    /// Reject envelopes written for another kind, format or feature layout,
    /// then verify the payload digest.
    pub fn verify(&self, name: &str, kind: &str, schema: &FeatureSchema) -> ModelResult<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION
            || self.kind != kind
            || self.feature_version != schema.version()
            || self.layout_hash != schema.layout_hash()
        {
            return Err(ModelError::SchemaMismatch {
                artifact: name.to_string(),
                expected_kind: format!("{} (format {})", kind, ARTIFACT_FORMAT_VERSION),
                expected_version: schema.version(),
                expected_hash: schema.layout_hash(),
                actual_kind: format!("{} (format {})", self.kind, self.format_version),
                actual_version: self.feature_version,
                actual_hash: self.layout_hash,
            });
        }

        if payload_checksum(&self.payload)? != self.checksum {
            return Err(ModelError::ChecksumMismatch { artifact: name.to_string() });
        }

        Ok(())
    }
}

pub fn payload_checksum<T: Serialize>(payload: &T) -> ModelResult<String> {
    let bytes = serde_json::to_vec(payload)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
