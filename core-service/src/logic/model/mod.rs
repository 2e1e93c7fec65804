//! Model Module - Model wrappers
//!
//! Each wrapper composes Feature Extractor → Scaler → estimator and turns
//! the estimator output into a domain result:
//! - `FraudModel`: anomaly score → fraud pseudo-probability
//! - `RiskModel` / `DelinquencyModel`: default probability → credit score
//! - `ModelSuite`: the three together, lock-guarded, with persistence

pub mod pipeline;
pub mod types;
pub mod fraud;
pub mod classifier;
pub mod suite;

#[cfg(test)]
mod tests;

// Re-export common types
pub use pipeline::Pipeline;
pub use types::{
    credit_score, AnomalyReport, ClassProbabilities, FraudAssessment, RiskAssessment, RiskLevel,
};
pub use fraud::FraudModel;
pub use classifier::{ClassifierModel, DelinquencyModel, RiskModel};
pub use suite::{ModelSource, ModelSuite, SuiteStatus, WrapperStatus};
