//! Error taxonomy for the model pipeline.

use std::path::PathBuf;

use crate::logic::features::LayoutMismatchError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// `transform`/`predict`/`score`/`save` called before `fit`/`train`
    #[error("{component} is not fitted; train it before use")]
    Unfitted { component: &'static str },

    #[error("missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// Present but non-numeric field under `DecodePolicy::Strict`
    #[error("malformed record: field '{field}' has non-numeric value {value}")]
    MalformedRecord { field: String, value: String },

    #[error("cannot fit {component} on an empty dataset")]
    EmptyDataset { component: &'static str },

    #[error("dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("label count {labels} does not match row count {rows}")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "artifact '{artifact}' schema mismatch: expected {expected_kind} v{expected_version} ({expected_hash:08x}), \
         got {actual_kind} v{actual_version} ({actual_hash:08x})"
    )]
    SchemaMismatch {
        artifact: String,
        expected_kind: String,
        expected_version: u8,
        expected_hash: u32,
        actual_kind: String,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("artifact '{artifact}' checksum mismatch")]
    ChecksumMismatch { artifact: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub fn unfitted(component: &'static str) -> Self {
        ModelError::Unfitted { component }
    }

    pub fn is_unfitted(&self) -> bool {
        matches!(self, ModelError::Unfitted { .. })
    }

    /// Errors caused by caller input rather than engine state
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ModelError::MalformedRecord { .. }
                | ModelError::DimensionMismatch { .. }
                | ModelError::LayoutMismatch(_)
                | ModelError::LabelMismatch { .. }
                | ModelError::EmptyDataset { .. }
        )
    }
}
