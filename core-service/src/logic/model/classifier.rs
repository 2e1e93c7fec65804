//! Classifier-style wrappers (risk analyzer, delinquency predictor)
//!
//! Same contract for both: records + binary labels in, class probabilities
//! and a credit score out. Only the schema and the estimator differ.

use std::collections::BTreeMap;
use std::path::Path;

use crate::logic::config::ModelConfig;
use crate::logic::error::{ModelError, ModelResult};
use crate::logic::estimators::{Classifier, GradientBoostingClassifier, RandomForestClassifier};
use crate::logic::features::{credit_schema, delinquency_schema, DecodePolicy, FeatureSchema, Record};
use crate::logic::persistence::{self, ArtifactPayload, DELINQUENCY_PREDICTOR_ARTIFACT, RISK_ANALYZER_ARTIFACT};

use super::pipeline::{FittedInput, Pipeline};
use super::types::{ClassProbabilities, RiskAssessment};

/// Credit-profile default risk (random forest)
pub type RiskModel = ClassifierModel<RandomForestClassifier>;

/// Contract delinquency (gradient boosting)
pub type DelinquencyModel = ClassifierModel<GradientBoostingClassifier>;

#[derive(Debug, Clone)]
pub struct ClassifierModel<C> {
    component: &'static str,
    artifact: &'static str,
    pipeline: Pipeline,
    classifier: C,
}

impl RiskModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_classifier(
            "risk model",
            RISK_ANALYZER_ARTIFACT,
            credit_schema(),
            config.decode_policy,
            RandomForestClassifier::new(config.risk_forest.clone()),
        )
    }
}

impl DelinquencyModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self::with_classifier(
            "delinquency model",
            DELINQUENCY_PREDICTOR_ARTIFACT,
            delinquency_schema(),
            config.decode_policy,
            GradientBoostingClassifier::new(config.delinquency_boosting.clone()),
        )
    }
}

impl<C> ClassifierModel<C>
where
    C: Classifier + ArtifactPayload + Clone,
{
    /// `classifier` is used as an unfitted template; `train` fits a copy
    pub fn with_classifier(
        component: &'static str,
        artifact: &'static str,
        schema: FeatureSchema,
        policy: DecodePolicy,
        classifier: C,
    ) -> Self {
        Self {
            component,
            artifact,
            pipeline: Pipeline::new(schema, policy),
            classifier,
        }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    /// File stem of the estimator artifact
    pub fn artifact(&self) -> &'static str {
        self.artifact
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.pipeline.schema()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn is_trained(&self) -> bool {
        self.pipeline.is_fitted() && self.classifier.is_fitted()
    }

    fn ensure_trained(&self) -> ModelResult<()> {
        if !self.is_trained() {
            return Err(ModelError::unfitted(self.component));
        }
        Ok(())
    }

    /// Fit scaler + classifier; on error the previous state is kept
    pub fn train(&mut self, records: &[Record], labels: &[u8]) -> ModelResult<()> {
        if records.len() != labels.len() {
            return Err(ModelError::LabelMismatch { rows: records.len(), labels: labels.len() });
        }

        let FittedInput { scaler, matrix } = self.pipeline.fit_aside(records)?;
        let mut classifier = self.classifier.clone();
        classifier.fit(&matrix, labels)?;

        self.pipeline.install(scaler);
        self.classifier = classifier;
        log::info!(
            "{} trained on {} records ({} positive)",
            self.component,
            records.len(),
            labels.iter().filter(|&&l| l == 1).count()
        );
        Ok(())
    }

    pub fn predict(&self, record: &Record) -> ModelResult<ClassProbabilities> {
        self.ensure_trained()?;
        let x = self.pipeline.transform(record)?;
        Ok(self.classifier.predict_proba(&x)?.into())
    }

    /// Probability of the positive (default) class
    pub fn predict_probability(&self, record: &Record) -> ModelResult<f64> {
        Ok(self.predict(record)?.default)
    }

    pub fn predict_batch(&self, records: &[Record]) -> ModelResult<Vec<ClassProbabilities>> {
        self.ensure_trained()?;
        self.pipeline
            .transform_batch(records)?
            .iter()
            .map(|x| self.classifier.predict_proba(x).map(ClassProbabilities::from))
            .collect()
    }

    /// Default probability plus derived credit score and risk level
    pub fn analyze(&self, record: &Record) -> ModelResult<RiskAssessment> {
        Ok(RiskAssessment::from_probability(self.predict_probability(record)?))
    }

    /// Schema field name → normalized importance
    pub fn feature_importance(&self) -> ModelResult<BTreeMap<String, f64>> {
        self.ensure_trained()?;
        let importances = self.classifier.feature_importances()?;
        Ok(self
            .schema()
            .names()
            .into_iter()
            .map(String::from)
            .zip(importances)
            .collect())
    }

    pub fn save(&self, dir: &Path) -> ModelResult<()> {
        self.ensure_trained()?;
        self.pipeline.save_scaler(dir)?;
        persistence::save_artifact(dir, self.artifact, self.schema(), &self.classifier)?;
        log::info!("{} saved to {}", self.component, dir.display());
        Ok(())
    }

    /// Replace state with the artifacts in `dir`; `self` is untouched on error
    pub fn load(&mut self, dir: &Path) -> ModelResult<()> {
        let scaler = self.pipeline.load_scaler(dir)?;
        let classifier: C = persistence::load_artifact(dir, self.artifact, self.schema())?;

        self.pipeline.install(scaler);
        self.classifier = classifier;
        log::info!("{} loaded from {}", self.component, dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::dataset::TrainingData;
    use crate::logic::features::CreditProfile;

    fn config() -> ModelConfig {
        ModelConfig::default().with_n_estimators(30)
    }

    fn safe_profile() -> Record {
        CreditProfile {
            income: 140_000.0,
            debt_ratio: 0.05,
            credit_history_length: 25,
            num_credit_lines: 4,
            payment_history_score: 98.0,
        }
        .to_record()
    }

    fn risky_profile() -> Record {
        CreditProfile {
            income: 22_000.0,
            debt_ratio: 0.78,
            credit_history_length: 0,
            num_credit_lines: 12,
            payment_history_score: 42.0,
        }
        .to_record()
    }

    #[test]
    fn test_risk_model_ranks_profiles() {
        let data = TrainingData::generate(400, 11);
        let mut model = RiskModel::new(&config());
        model.train(&data.credit_profiles, &data.credit_labels).unwrap();

        let safe = model.analyze(&safe_profile()).unwrap();
        let risky = model.analyze(&risky_profile()).unwrap();

        assert!(risky.default_risk > safe.default_risk);
        assert!(risky.credit_score < safe.credit_score);
        assert!(safe.credit_score <= 850.0 && risky.credit_score >= 300.0);

        let probs = model.predict(&safe_profile()).unwrap();
        assert!((probs.default + probs.no_default - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_feature_importance_names() {
        let data = TrainingData::generate(300, 5);
        let mut model = RiskModel::new(&config());
        model.train(&data.credit_profiles, &data.credit_labels).unwrap();

        let importance = model.feature_importance().unwrap();
        assert_eq!(importance.len(), 5);
        assert!(importance.contains_key("debt_ratio"));
        assert!((importance.values().sum::<f64>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_delinquency_model() {
        let data = TrainingData::generate(400, 9);
        let mut model = DelinquencyModel::new(&config());
        model.train(&data.contracts, &data.delinquency_labels).unwrap();

        let batch = model.predict_batch(&data.contracts[..10]).unwrap();
        assert_eq!(batch.len(), 10);
        for (probs, record) in batch.iter().zip(&data.contracts[..10]) {
            assert_eq!(probs.default, model.predict_probability(record).unwrap());
        }
        assert_eq!(model.feature_importance().unwrap().len(), 8);
    }

    #[test]
    fn test_untrained_models_reject_prediction() {
        let risk = RiskModel::new(&config());
        let err = risk.predict(&safe_profile()).unwrap_err();
        assert!(matches!(err, ModelError::Unfitted { component: "risk model" }));
        assert!(risk.feature_importance().unwrap_err().is_unfitted());

        let delinquency = DelinquencyModel::new(&config());
        assert!(delinquency.analyze(&Record::new()).unwrap_err().is_unfitted());
    }

    #[test]
    fn test_label_mismatch_keeps_model_untrained() {
        let mut model = RiskModel::new(&config());
        let err = model.train(&[safe_profile(), risky_profile()], &[1]).unwrap_err();
        assert!(matches!(err, ModelError::LabelMismatch { rows: 2, labels: 1 }));
        assert!(!model.is_trained());
    }
}
