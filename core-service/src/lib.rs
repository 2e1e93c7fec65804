//! Finance AI Core - feature pipeline, estimators and model persistence
//!
//! ```no_run
//! use finance_ai_core::{ModelConfig, ModelSuite, TransactionRecord};
//!
//! let config = ModelConfig::from_env();
//! let suite = ModelSuite::load_or_train(&config.models_dir.clone(), config)?;
//! let tx = TransactionRecord { amount: 9999.0, hour_of_day: 3, day_of_week: 6, merchant_category: 9 };
//! let assessment = suite.fraud().detect(&tx.to_record())?;
//! println!("fraud probability {:.3}", assessment.fraud_probability);
//! # Ok::<(), finance_ai_core::ModelError>(())
//! ```

pub mod constants;
pub mod logic;

pub use logic::config::ModelConfig;
pub use logic::dataset::TrainingData;
pub use logic::error::{ModelError, ModelResult};
pub use logic::features::{
    ContractRecord, CreditProfile, DecodePolicy, FeatureExtractor, FeatureSchema, FeatureVector, Record,
    TransactionRecord,
};
pub use logic::model::{
    credit_score, ClassProbabilities, DelinquencyModel, FraudAssessment, FraudModel, ModelSource, ModelSuite,
    RiskAssessment, RiskLevel, RiskModel, SuiteStatus,
};
pub use logic::scaler::StandardScaler;
