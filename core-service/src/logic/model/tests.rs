use std::sync::Arc;
use std::thread;

use super::suite::{ModelSource, ModelSuite, DELINQUENCY_DIR, FRAUD_DIR, RISK_DIR};
use crate::logic::config::ModelConfig;
use crate::logic::dataset::TrainingData;
use crate::logic::error::ModelError;
use crate::logic::features::{CreditProfile, Record, TransactionRecord};
use tempfile::tempdir;

fn small_config(dir: &std::path::Path) -> ModelConfig {
    let mut config = ModelConfig::default().with_n_estimators(20).with_models_dir(dir);
    config.synthetic_samples = 200;
    config
}

fn probe_transaction() -> Record {
    TransactionRecord { amount: 12_000.0, hour_of_day: 2, day_of_week: 6, merchant_category: 8 }.to_record()
}

fn probe_profile() -> Record {
    CreditProfile {
        income: 45_000.0,
        debt_ratio: 0.55,
        credit_history_length: 3,
        num_credit_lines: 6,
        payment_history_score: 70.0,
    }
    .to_record()
}

#[test]
fn test_untrained_suite_rejects_everything() {
    let dir = tempdir().unwrap();
    let suite = ModelSuite::new(small_config(dir.path()));

    assert_eq!(suite.source(), ModelSource::Untrained);
    assert!(!suite.is_trained());
    assert!(suite.fraud().score(&probe_transaction()).unwrap_err().is_unfitted());
    assert!(suite.risk().predict(&probe_profile()).unwrap_err().is_unfitted());
    assert!(suite.delinquency().predict(&Record::new()).unwrap_err().is_unfitted());
    assert!(suite.save(dir.path()).unwrap_err().is_unfitted());
}

#[test]
fn test_train_all_and_status() {
    let dir = tempdir().unwrap();
    let suite = ModelSuite::new(small_config(dir.path()));
    suite.train_synthetic().unwrap();

    assert!(suite.is_trained());
    assert_eq!(suite.source(), ModelSource::Trained);

    let status = suite.status().unwrap();
    assert!(status.fraud.trained && status.risk.trained && status.delinquency.trained);
    assert!(status.fraud_classifier);
    assert_eq!(status.risk.features.len(), 5);
    // Nothing saved yet
    assert!(status.fraud.artifacts.is_empty());

    suite.save(dir.path()).unwrap();
    let status = suite.status().unwrap();
    assert_eq!(status.fraud.artifacts, vec!["fraud_classifier", "fraud_detector", "scaler"]);
    assert_eq!(status.risk.artifacts, vec!["risk_analyzer", "scaler"]);
    assert_eq!(status.delinquency.artifacts, vec!["delinquency_predictor", "scaler"]);
}

#[test]
fn test_save_load_reproduces_outputs() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());
    let suite = ModelSuite::new(config.clone());
    suite.train_synthetic().unwrap();
    suite.save(dir.path()).unwrap();

    let restored = ModelSuite::load(dir.path(), config).unwrap();
    assert_eq!(restored.source(), ModelSource::Loaded);

    let data = TrainingData::generate(20, 99);
    for tx in &data.transactions {
        assert_eq!(suite.fraud().score(tx).unwrap(), restored.fraud().score(tx).unwrap());
        assert_eq!(
            suite.fraud().fraud_probability(tx).unwrap(),
            restored.fraud().fraud_probability(tx).unwrap()
        );
    }
    for profile in &data.credit_profiles {
        assert_eq!(suite.risk().analyze(profile).unwrap(), restored.risk().analyze(profile).unwrap());
    }
    for contract in &data.contracts {
        assert_eq!(
            suite.delinquency().predict(contract).unwrap(),
            restored.delinquency().predict(contract).unwrap()
        );
    }
    assert_eq!(
        suite.risk().feature_importance().unwrap(),
        restored.risk().feature_importance().unwrap()
    );
}

#[test]
fn test_load_reports_missing_artifact() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());
    let suite = ModelSuite::new(config.clone());
    suite.train_synthetic().unwrap();
    suite.save(dir.path()).unwrap();

    std::fs::remove_file(dir.path().join(RISK_DIR).join("risk_analyzer.json")).unwrap();

    match ModelSuite::load(dir.path(), config) {
        Err(ModelError::MissingArtifact { path }) => assert!(path.ends_with("risk_analyzer.json")),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("load should fail"),
    }
}

#[test]
fn test_load_or_train_trains_then_loads() {
    let dir = tempdir().unwrap();
    let config = small_config(dir.path());

    let first = ModelSuite::load_or_train(dir.path(), config.clone()).unwrap();
    assert_eq!(first.source(), ModelSource::Trained);
    for sub in [FRAUD_DIR, RISK_DIR, DELINQUENCY_DIR] {
        assert!(dir.path().join(sub).join("scaler.json").is_file());
    }

    let second = ModelSuite::load_or_train(dir.path(), config).unwrap();
    assert_eq!(second.source(), ModelSource::Loaded);
    assert_eq!(
        first.fraud().score(&probe_transaction()).unwrap(),
        second.fraud().score(&probe_transaction()).unwrap()
    );
}

#[test]
fn test_concurrent_readers_during_retrain() {
    let dir = tempdir().unwrap();
    let suite = Arc::new(ModelSuite::new(small_config(dir.path())));
    suite.train_synthetic().unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let suite = Arc::clone(&suite);
            thread::spawn(move || {
                for _ in 0..20 {
                    let p = suite.fraud().score(&probe_transaction()).unwrap();
                    assert!(p > 0.0 && p < 1.0);
                    let assessment = suite.risk().analyze(&probe_profile()).unwrap();
                    assert!(assessment.credit_score >= 300.0);
                }
            })
        })
        .collect();

    suite.retrain(7).unwrap();

    for reader in readers {
        reader.join().unwrap();
    }
    assert!(suite.is_trained());
}

#[test]
fn test_retrain_seed_drives_estimators() {
    let dir = tempdir().unwrap();
    let suite = ModelSuite::new(small_config(dir.path()));
    suite.retrain(7).unwrap();

    // Same seed through the config gives the same models
    let other = tempdir().unwrap();
    let reference = ModelSuite::new(small_config(other.path()).with_seed(7));
    reference.train_synthetic().unwrap();

    assert_eq!(
        suite.fraud().score(&probe_transaction()).unwrap(),
        reference.fraud().score(&probe_transaction()).unwrap()
    );
    assert_eq!(
        suite.risk().analyze(&probe_profile()).unwrap(),
        reference.risk().analyze(&probe_profile()).unwrap()
    );
    // The suite's own config keeps its seed
    assert_eq!(suite.config().seed, small_config(dir.path()).seed);
}
