//! Model management models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use finance_ai_core::ModelSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrainRequest {
    /// Seeds both the synthetic data and the estimators; random when omitted
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrainResponse {
    pub status: &'static str,
    pub seed: u64,
    pub source: ModelSource,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportanceResponse {
    pub risk: BTreeMap<String, f64>,
    pub delinquency: BTreeMap<String, f64>,
}
