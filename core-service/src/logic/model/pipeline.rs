//! Pipeline - Feature Extractor → Scaler
//!
//! Shared front half of every wrapper. Training builds a new scaler aside
//! and hands it back with the scaled matrix; the wrapper swaps it in only
//! after its estimator fit succeeds.

use std::path::Path;

use crate::logic::error::{ModelError, ModelResult};
use crate::logic::features::{DecodePolicy, FeatureExtractor, FeatureSchema, Record};
use crate::logic::persistence::{self, SCALER_ARTIFACT};
use crate::logic::scaler::{ScalerState, StandardScaler};

#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: FeatureExtractor,
    scaler: StandardScaler,
}

/// Scaler fitted on a training set, plus that set already scaled
pub(crate) struct FittedInput {
    pub scaler: StandardScaler,
    pub matrix: Vec<Vec<f64>>,
}

impl Pipeline {
    pub fn new(schema: FeatureSchema, policy: DecodePolicy) -> Self {
        Self {
            extractor: FeatureExtractor::with_policy(schema, policy),
            scaler: StandardScaler::new(),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.extractor.schema()
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.scaler.is_fitted()
    }

    /// Extract + fit a fresh scaler; `self` is untouched
    pub(crate) fn fit_aside(&self, records: &[Record]) -> ModelResult<FittedInput> {
        let vectors = self.extractor.extract_batch(records)?;
        let mut scaler = StandardScaler::new();
        let matrix = scaler.fit_transform(&vectors)?;
        Ok(FittedInput { scaler, matrix })
    }

    pub(crate) fn install(&mut self, scaler: StandardScaler) {
        self.scaler = scaler;
    }

    pub fn transform(&self, record: &Record) -> ModelResult<Vec<f64>> {
        let vector = self.extractor.extract(record)?;
        self.scaler.transform(&vector)
    }

    pub fn transform_batch(&self, records: &[Record]) -> ModelResult<Vec<Vec<f64>>> {
        let vectors = self.extractor.extract_batch(records)?;
        self.scaler.transform_batch(&vectors)
    }

    pub(crate) fn save_scaler(&self, dir: &Path) -> ModelResult<()> {
        let state = self
            .scaler
            .state()
            .ok_or(ModelError::unfitted("scaler"))?;
        persistence::save_artifact(dir, SCALER_ARTIFACT, self.schema(), state)?;
        Ok(())
    }

    pub(crate) fn load_scaler(&self, dir: &Path) -> ModelResult<StandardScaler> {
        let state: ScalerState = persistence::load_artifact(dir, SCALER_ARTIFACT, self.schema())?;
        Ok(StandardScaler::from_state(state))
    }
}
