//! Model Suite - the three wrappers behind single-writer/multi-reader locks
//!
//! Readers take a read guard per request. Training builds complete new
//! wrappers outside the locks and swaps them in under the write locks, so a
//! reader never observes a half-trained scaler/estimator pair.

use std::path::{Path, PathBuf};

use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

use crate::logic::config::ModelConfig;
use crate::logic::dataset::TrainingData;
use crate::logic::error::ModelResult;
use crate::logic::features::FeatureSchema;
use crate::logic::persistence;

use super::classifier::{DelinquencyModel, RiskModel};
use super::fraud::FraudModel;

pub const FRAUD_DIR: &str = "fraud";
pub const RISK_DIR: &str = "risk";
pub const DELINQUENCY_DIR: &str = "delinquency";

/// Where the suite's current state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    Untrained,
    Loaded,
    Trained,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapperStatus {
    pub trained: bool,
    pub schema: String,
    pub feature_version: u8,
    pub layout_hash: String,
    pub features: Vec<String>,
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteStatus {
    pub source: ModelSource,
    pub models_dir: PathBuf,
    pub fraud: WrapperStatus,
    pub fraud_classifier: bool,
    pub risk: WrapperStatus,
    pub delinquency: WrapperStatus,
}

pub struct ModelSuite {
    config: ModelConfig,
    source: RwLock<ModelSource>,
    fraud: RwLock<FraudModel>,
    risk: RwLock<RiskModel>,
    delinquency: RwLock<DelinquencyModel>,
}

impl ModelSuite {
    /// Untrained suite
    pub fn new(config: ModelConfig) -> Self {
        Self {
            fraud: RwLock::new(FraudModel::new(&config)),
            risk: RwLock::new(RiskModel::new(&config)),
            delinquency: RwLock::new(DelinquencyModel::new(&config)),
            source: RwLock::new(ModelSource::Untrained),
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn source(&self) -> ModelSource {
        *self.source.read()
    }

    pub fn fraud(&self) -> RwLockReadGuard<'_, FraudModel> {
        self.fraud.read()
    }

    pub fn risk(&self) -> RwLockReadGuard<'_, RiskModel> {
        self.risk.read()
    }

    pub fn delinquency(&self) -> RwLockReadGuard<'_, DelinquencyModel> {
        self.delinquency.read()
    }

    pub fn is_trained(&self) -> bool {
        self.fraud.read().is_trained() && self.risk.read().is_trained() && self.delinquency.read().is_trained()
    }

    /// Train every wrapper; nothing is replaced unless all three succeed
    pub fn train_all(&self, data: &TrainingData) -> ModelResult<()> {
        self.train_with(&self.config, data)
    }

    fn train_with(&self, config: &ModelConfig, data: &TrainingData) -> ModelResult<()> {
        let started = std::time::Instant::now();

        let mut fraud = FraudModel::new(config);
        fraud.train(&data.transactions)?;
        fraud.train_supervised(&data.transactions, &data.fraud_labels)?;

        let mut risk = RiskModel::new(config);
        risk.train(&data.credit_profiles, &data.credit_labels)?;

        let mut delinquency = DelinquencyModel::new(config);
        delinquency.train(&data.contracts, &data.delinquency_labels)?;

        *self.fraud.write() = fraud;
        *self.risk.write() = risk;
        *self.delinquency.write() = delinquency;
        *self.source.write() = ModelSource::Trained;

        log::info!(
            "Model suite trained on {} rows per dataset in {:.2?}",
            data.len(),
            started.elapsed()
        );
        Ok(())
    }

    /// Fresh synthetic data from the configured seed
    pub fn train_synthetic(&self) -> ModelResult<()> {
        self.config.validate()?;
        let data = TrainingData::generate(self.config.synthetic_samples, self.config.seed);
        self.train_all(&data)
    }

    /// `<dir>/fraud`, `<dir>/risk`, `<dir>/delinquency`
    pub fn save(&self, dir: &Path) -> ModelResult<()> {
        self.fraud.read().save(&dir.join(FRAUD_DIR))?;
        self.risk.read().save(&dir.join(RISK_DIR))?;
        self.delinquency.read().save(&dir.join(DELINQUENCY_DIR))?;
        log::info!("Model suite saved to {}", dir.display());
        Ok(())
    }

    pub fn load(dir: &Path, config: ModelConfig) -> ModelResult<Self> {
        let mut fraud = FraudModel::new(&config);
        fraud.load(&dir.join(FRAUD_DIR))?;
        let mut risk = RiskModel::new(&config);
        risk.load(&dir.join(RISK_DIR))?;
        let mut delinquency = DelinquencyModel::new(&config);
        delinquency.load(&dir.join(DELINQUENCY_DIR))?;

        Ok(Self {
            config,
            source: RwLock::new(ModelSource::Loaded),
            fraud: RwLock::new(fraud),
            risk: RwLock::new(risk),
            delinquency: RwLock::new(delinquency),
        })
    }

    /// Load from `dir`, or train on synthetic data and persist when any
    /// artifact is missing or rejected
    pub fn load_or_train(dir: &Path, config: ModelConfig) -> ModelResult<Self> {
        match Self::load(dir, config.clone()) {
            Ok(suite) => {
                log::info!("Loaded models from {}", dir.display());
                Ok(suite)
            }
            Err(e) => {
                log::warn!("Could not load models from {} ({}), training from scratch", dir.display(), e);
                let suite = Self::new(config);
                suite.train_synthetic()?;
                if let Err(e) = suite.save(dir) {
                    log::error!("Failed to persist trained models: {}", e);
                }
                Ok(suite)
            }
        }
    }

    /// Retrain with `seed` driving both the synthetic data and the
    /// estimators, then persist to the configured models directory
    pub fn retrain(&self, seed: u64) -> ModelResult<()> {
        let config = self.config.clone().with_seed(seed);
        config.validate()?;
        let data = TrainingData::generate(config.synthetic_samples, seed);
        self.train_with(&config, &data)?;
        self.save(&self.config.models_dir)
    }

    pub fn status(&self) -> ModelResult<SuiteStatus> {
        let dir = &self.config.models_dir;

        let fraud = self.fraud.read();
        let risk = self.risk.read();
        let delinquency = self.delinquency.read();

        Ok(SuiteStatus {
            source: self.source(),
            models_dir: dir.clone(),
            fraud: wrapper_status(fraud.is_trained(), fraud.schema(), &dir.join(FRAUD_DIR))?,
            fraud_classifier: fraud.has_classifier(),
            risk: wrapper_status(risk.is_trained(), risk.schema(), &dir.join(RISK_DIR))?,
            delinquency: wrapper_status(
                delinquency.is_trained(),
                delinquency.schema(),
                &dir.join(DELINQUENCY_DIR),
            )?,
        })
    }
}

fn wrapper_status(
    trained: bool,
    schema: &FeatureSchema,
    dir: &Path,
) -> ModelResult<WrapperStatus> {
    Ok(WrapperStatus {
        trained,
        schema: schema.name().to_string(),
        feature_version: schema.version(),
        layout_hash: format!("{:08x}", schema.layout_hash()),
        features: schema.names().into_iter().map(String::from).collect(),
        artifacts: persistence::list_artifacts(dir)?,
    })
}
