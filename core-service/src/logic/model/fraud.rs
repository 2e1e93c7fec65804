//! Fraud Model - Anomaly-style wrapper
//!
//! Transaction records → scaler → isolation forest. The raw isolation score
//! is negated (higher = more abnormal) and squashed around the contamination
//! threshold, so the contamination boundary maps to exactly 0.5.
//! An optional supervised random forest scores the same scaled inputs when
//! labeled fraud is available.

use std::fs;
use std::path::Path;

use crate::logic::config::ModelConfig;
use crate::logic::error::{ModelError, ModelResult};
use crate::logic::estimators::{AnomalyDetector, Classifier, IsolationForest, RandomForestClassifier};
use crate::logic::features::{transaction_schema, FeatureSchema, Record};
use crate::logic::persistence::{self, FRAUD_CLASSIFIER_ARTIFACT, FRAUD_DETECTOR_ARTIFACT};

use super::pipeline::{FittedInput, Pipeline};
use super::types::{AnomalyReport, FraudAssessment, RiskLevel};

const COMPONENT: &str = "fraud model";
const CLASSIFIER_COMPONENT: &str = "fraud classifier";

#[derive(Debug, Clone)]
pub struct FraudModel {
    pipeline: Pipeline,
    detector: IsolationForest,
    classifier: RandomForestClassifier,
    gain: f64,
}

impl FraudModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            pipeline: Pipeline::new(transaction_schema(), config.decode_policy),
            detector: IsolationForest::new(config.isolation_forest.clone()),
            classifier: RandomForestClassifier::new(config.fraud_classifier.clone()),
            gain: config.fraud_gain,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.pipeline.schema()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn detector(&self) -> &IsolationForest {
        &self.detector
    }

    pub fn is_trained(&self) -> bool {
        self.pipeline.is_fitted() && self.detector.is_fitted()
    }

    pub fn has_classifier(&self) -> bool {
        self.pipeline.is_fitted() && self.classifier.is_fitted()
    }

    // ------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------

    /// Fit scaler + detector on unlabeled transactions.
    ///
    /// Refitting the scaler invalidates a previously trained supervised
    /// classifier, which is dropped.
    pub fn train(&mut self, records: &[Record]) -> ModelResult<()> {
        let FittedInput { scaler, matrix } = self.pipeline.fit_aside(records)?;

        let mut detector = IsolationForest::new(self.detector.config().clone());
        detector.fit(&matrix)?;

        if self.classifier.is_fitted() {
            log::warn!("Scaler refit: dropping supervised fraud classifier");
            self.classifier = RandomForestClassifier::new(self.classifier.config().clone());
        }

        self.pipeline.install(scaler);
        self.detector = detector;
        log::info!("Fraud detector trained on {} transactions", records.len());
        Ok(())
    }

    /// Fit the supervised classifier on labeled transactions, reusing the
    /// detector's scaler (or fitting one when the wrapper is fresh).
    pub fn train_supervised(&mut self, records: &[Record], labels: &[u8]) -> ModelResult<()> {
        if records.len() != labels.len() {
            return Err(ModelError::LabelMismatch { rows: records.len(), labels: labels.len() });
        }

        let (scaler, matrix) = if self.pipeline.is_fitted() {
            (None, self.pipeline.transform_batch(records)?)
        } else {
            let FittedInput { scaler, matrix } = self.pipeline.fit_aside(records)?;
            (Some(scaler), matrix)
        };

        let mut classifier = RandomForestClassifier::new(self.classifier.config().clone());
        classifier.fit(&matrix, labels)?;

        if let Some(scaler) = scaler {
            self.pipeline.install(scaler);
        }
        self.classifier = classifier;
        log::info!(
            "Fraud classifier trained on {} transactions ({} positive)",
            records.len(),
            labels.iter().filter(|&&l| l == 1).count()
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inference
    // ------------------------------------------------------------------

    fn ensure_trained(&self) -> ModelResult<()> {
        if !self.is_trained() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        Ok(())
    }

    /// (anomaly, threshold) on the "higher = more abnormal" scale
    fn anomaly(&self, x: &[f64]) -> ModelResult<(f64, f64)> {
        let anomaly = -self.detector.score_samples(x)?;
        let threshold = -self.detector.offset()?;
        Ok((anomaly, threshold))
    }

    fn squash(&self, anomaly: f64, threshold: f64) -> f64 {
        // Large gains saturate to 0/1; keep the score strictly inside
        let p = 1.0 / (1.0 + (-self.gain * (anomaly - threshold)).exp());
        p.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
    }

    /// Fraud pseudo-probability in (0, 1); higher = more anomalous
    pub fn score(&self, record: &Record) -> ModelResult<f64> {
        self.ensure_trained()?;
        let x = self.pipeline.transform(record)?;
        let (anomaly, threshold) = self.anomaly(&x)?;
        Ok(self.squash(anomaly, threshold))
    }

    pub fn score_batch(&self, records: &[Record]) -> ModelResult<Vec<f64>> {
        records.iter().map(|r| self.score(r)).collect()
    }

    pub fn detect(&self, record: &Record) -> ModelResult<FraudAssessment> {
        self.ensure_trained()?;
        let x = self.pipeline.transform(record)?;
        let (anomaly, threshold) = self.anomaly(&x)?;
        let fraud_probability = self.squash(anomaly, threshold);

        Ok(FraudAssessment {
            fraud_probability,
            anomaly_score: anomaly,
            is_anomaly: self.detector.predict(&x)? == -1,
            risk_level: RiskLevel::from_probability(fraud_probability),
        })
    }

    /// Decision function and outlier flag per record
    pub fn predict_anomalies(&self, records: &[Record]) -> ModelResult<AnomalyReport> {
        self.ensure_trained()?;
        let matrix = self.pipeline.transform_batch(records)?;

        let mut report = AnomalyReport {
            scores: Vec::with_capacity(matrix.len()),
            is_anomaly: Vec::with_capacity(matrix.len()),
        };
        for x in &matrix {
            let score = self.detector.decision_function(x)?;
            report.scores.push(score);
            report.is_anomaly.push(score < 0.0);
        }
        Ok(report)
    }

    /// Positive-class probability from the supervised classifier
    pub fn fraud_probability(&self, record: &Record) -> ModelResult<f64> {
        if !self.pipeline.is_fitted() || !self.classifier.is_fitted() {
            return Err(ModelError::unfitted(CLASSIFIER_COMPONENT));
        }
        let x = self.pipeline.transform(record)?;
        Ok(self.classifier.predict_proba(&x)?[1])
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write `scaler`, `fraud_detector` and, when trained, `fraud_classifier`
    pub fn save(&self, dir: &Path) -> ModelResult<()> {
        self.ensure_trained()?;

        self.pipeline.save_scaler(dir)?;
        persistence::save_artifact(dir, FRAUD_DETECTOR_ARTIFACT, self.schema(), &self.detector)?;

        if self.classifier.is_fitted() {
            persistence::save_artifact(dir, FRAUD_CLASSIFIER_ARTIFACT, self.schema(), &self.classifier)?;
        } else if persistence::artifact_exists(dir, FRAUD_CLASSIFIER_ARTIFACT) {
            // Stale classifier from an earlier scaler
            fs::remove_file(persistence::artifact_path(dir, FRAUD_CLASSIFIER_ARTIFACT))?;
        }

        log::info!("Fraud model saved to {}", dir.display());
        Ok(())
    }

    /// Replace state with the artifacts in `dir`; `self` is untouched on error
    pub fn load(&mut self, dir: &Path) -> ModelResult<()> {
        let scaler = self.pipeline.load_scaler(dir)?;
        let detector: IsolationForest =
            persistence::load_artifact(dir, FRAUD_DETECTOR_ARTIFACT, self.schema())?;

        let classifier = if persistence::artifact_exists(dir, FRAUD_CLASSIFIER_ARTIFACT) {
            persistence::load_artifact(dir, FRAUD_CLASSIFIER_ARTIFACT, self.schema())?
        } else {
            RandomForestClassifier::new(self.classifier.config().clone())
        };

        self.pipeline.install(scaler);
        self.detector = detector;
        self.classifier = classifier;
        log::info!("Fraud model loaded from {}", dir.display());
        Ok(())
    }
}
