//! Scaler Stage - Standardization fitted once, reapplied at inference
//!
//! Centers each feature on its training mean and divides by the population
//! standard deviation. A feature with zero variance keeps scale 1.0 so it
//! is only centered.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::logic::error::{ModelError, ModelResult};
use crate::logic::features::FeatureVector;

const COMPONENT: &str = "scaler";

/// Fitted normalization parameters (immutable until re-fit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerState {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub n_samples: usize,
    /// Layout of the vectors this state was fitted on
    pub layout_hash: u32,
}

impl ScalerState {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    state: Option<ScalerState>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self { state: None }
    }

    pub fn from_state(state: ScalerState) -> Self {
        Self { state: Some(state) }
    }

    pub fn state(&self) -> Option<&ScalerState> {
        self.state.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Compute per-feature mean/scale; replaces any previous state wholesale
    pub fn fit(&mut self, dataset: &[FeatureVector]) -> ModelResult<()> {
        self.state = Some(Self::compute_state(dataset)?);
        Ok(())
    }

    /// Compute a state without touching `self`
    pub fn compute_state(dataset: &[FeatureVector]) -> ModelResult<ScalerState> {
        let first = dataset
            .first()
            .ok_or(ModelError::EmptyDataset { component: COMPONENT })?;
        let n_features = first.len();
        let layout_hash = first.layout_hash;

        let mut flat = Vec::with_capacity(dataset.len() * n_features);
        for vector in dataset {
            if vector.len() != n_features {
                return Err(ModelError::DimensionMismatch {
                    expected: n_features,
                    actual: vector.len(),
                });
            }
            if vector.layout_hash != layout_hash {
                return Err(ModelError::InvalidParameter(format!(
                    "mixed feature layouts in scaler input ({:08x} vs {:08x})",
                    layout_hash, vector.layout_hash
                )));
            }
            flat.extend_from_slice(vector.as_slice());
        }

        let matrix = Array2::from_shape_vec((dataset.len(), n_features), flat)
            .map_err(|e| ModelError::InvalidParameter(format!("scaler input shape: {}", e)))?;

        let mean = matrix
            .mean_axis(Axis(0))
            .ok_or(ModelError::EmptyDataset { component: COMPONENT })?;
        let std = matrix.std_axis(Axis(0), 0.0);

        let scale = std
            .iter()
            .map(|&s| if s.is_finite() && s > f64::EPSILON { s } else { 1.0 })
            .collect();

        Ok(ScalerState {
            mean: mean.to_vec(),
            scale,
            n_samples: dataset.len(),
            layout_hash,
        })
    }

    pub fn transform(&self, vector: &FeatureVector) -> ModelResult<Vec<f64>> {
        let state = self.state.as_ref().ok_or(ModelError::unfitted(COMPONENT))?;
        Self::check_vector(state, vector)?;

        Ok(vector
            .as_slice()
            .iter()
            .zip(state.mean.iter().zip(state.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform_batch(&self, vectors: &[FeatureVector]) -> ModelResult<Vec<Vec<f64>>> {
        vectors.iter().map(|v| self.transform(v)).collect()
    }

    pub fn fit_transform(&mut self, dataset: &[FeatureVector]) -> ModelResult<Vec<Vec<f64>>> {
        self.fit(dataset)?;
        self.transform_batch(dataset)
    }

    /// Map scaled values back to the original units
    pub fn inverse_transform(&self, scaled: &[f64]) -> ModelResult<Vec<f64>> {
        let state = self.state.as_ref().ok_or(ModelError::unfitted(COMPONENT))?;
        if scaled.len() != state.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: state.n_features(),
                actual: scaled.len(),
            });
        }

        Ok(scaled
            .iter()
            .zip(state.mean.iter().zip(state.scale.iter()))
            .map(|(z, (m, s))| z * s + m)
            .collect())
    }

    fn check_vector(state: &ScalerState, vector: &FeatureVector) -> ModelResult<()> {
        if vector.len() != state.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: state.n_features(),
                actual: vector.len(),
            });
        }
        if vector.layout_hash != state.layout_hash {
            return Err(ModelError::InvalidParameter(format!(
                "vector layout {:08x} does not match fitted layout {:08x}",
                vector.layout_hash, state.layout_hash
            )));
        }
        Ok(())
    }
}
