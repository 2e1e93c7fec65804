//! Engine configuration: estimator hyperparameters, decoding policy and
//! where trained artifacts live. Built once and passed by reference.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::error::{ModelError, ModelResult};
use crate::logic::estimators::{BoostingConfig, ForestConfig, IsolationForestConfig};
use crate::logic::features::DecodePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub decode_policy: DecodePolicy,
    pub fraud_gain: f64,
    /// Rows per synthetic training set
    pub synthetic_samples: usize,
    pub seed: u64,
    pub isolation_forest: IsolationForestConfig,
    pub fraud_classifier: ForestConfig,
    pub risk_forest: ForestConfig,
    pub delinquency_boosting: BoostingConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: crate::logic::persistence::default_models_dir(),
            decode_policy: DecodePolicy::default(),
            fraud_gain: constants::DEFAULT_FRAUD_GAIN,
            synthetic_samples: constants::DEFAULT_SYNTHETIC_SAMPLES,
            seed: constants::DEFAULT_SEED,
            isolation_forest: IsolationForestConfig::default(),
            fraud_classifier: ForestConfig::default(),
            risk_forest: ForestConfig::default(),
            delinquency_boosting: BoostingConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Defaults overridden by `FINANCE_AI_*` variables
    pub fn from_env() -> Self {
        let mut config = Self::default()
            .with_seed(constants::get_seed())
            .with_n_estimators(constants::get_n_estimators())
            .with_models_dir(constants::get_models_dir());

        config.decode_policy = constants::get_decode_policy();
        config.fraud_gain = constants::get_fraud_gain();
        config.synthetic_samples = constants::get_synthetic_samples();
        config.isolation_forest.contamination = constants::get_contamination();
        config
    }

    /// Same seed for every estimator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.isolation_forest.seed = seed;
        self.fraud_classifier.seed = seed;
        self.risk_forest.seed = seed;
        self.delinquency_boosting.seed = seed;
        self
    }

    /// Trees per forest and boosting rounds
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.isolation_forest.n_estimators = n;
        self.fraud_classifier.n_estimators = n;
        self.risk_forest.n_estimators = n;
        self.delinquency_boosting.n_estimators = n;
        self
    }

    pub fn with_models_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.models_dir = dir.into();
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(self.fraud_gain.is_finite() && self.fraud_gain > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "fraud_gain must be a positive number, got {}",
                self.fraud_gain
            )));
        }
        if self.synthetic_samples < 10 {
            return Err(ModelError::InvalidParameter(format!(
                "synthetic_samples must be at least 10, got {}",
                self.synthetic_samples
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::estimators::Contamination;

    #[test]
    fn test_defaults_follow_reference_hyperparameters() {
        let config = ModelConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.isolation_forest.n_estimators, 100);
        assert_eq!(config.isolation_forest.contamination, Contamination::Auto);
        assert_eq!(config.risk_forest.n_estimators, 100);
        assert_eq!(config.delinquency_boosting.max_depth, 5);
        assert_eq!(config.delinquency_boosting.learning_rate, 0.1);
        assert_eq!(config.decode_policy, DecodePolicy::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders_apply_to_every_estimator() {
        let config = ModelConfig::default().with_seed(7).with_n_estimators(12);
        assert_eq!(config.isolation_forest.seed, 7);
        assert_eq!(config.fraud_classifier.seed, 7);
        assert_eq!(config.delinquency_boosting.seed, 7);
        assert_eq!(config.risk_forest.n_estimators, 12);
        assert_eq!(config.delinquency_boosting.n_estimators, 12);
    }

    #[test]
    fn test_validate_rejects_bad_gain() {
        let config = ModelConfig { fraud_gain: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ModelError::InvalidParameter(_))));
    }
}
