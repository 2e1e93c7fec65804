use std::fs;

use super::artifact::{payload_checksum, Artifact, ARTIFACT_FORMAT_VERSION};
use super::storage::{artifact_path, list_artifacts, load_artifact, save_artifact};
use crate::logic::config::ModelConfig;
use crate::logic::error::ModelError;
use crate::logic::features::{credit_schema, transaction_schema, FeatureSchema, FeatureVector};
use crate::logic::model::{FraudModel, RiskModel};
use crate::logic::scaler::{ScalerState, StandardScaler};
use crate::logic::dataset::TrainingData;
use tempfile::tempdir;

fn fitted_state(schema: &FeatureSchema) -> ScalerState {
    let vectors: Vec<FeatureVector> = (0..10)
        .map(|i| FeatureVector::from_values(schema, (0..schema.len()).map(|j| (i * (j + 1)) as f64).collect()))
        .collect();
    StandardScaler::compute_state(&vectors).unwrap()
}

#[test]
fn test_artifact_round_trip() {
    let dir = tempdir().unwrap();
    let schema = transaction_schema();
    let state = fitted_state(&schema);

    let path = save_artifact(dir.path(), "scaler", &schema, &state).unwrap();
    assert_eq!(path, artifact_path(dir.path(), "scaler"));

    let loaded: ScalerState = load_artifact(dir.path(), "scaler", &schema).unwrap();
    assert_eq!(loaded, state);

    // Envelope carries the schema tag
    let raw: Artifact<ScalerState> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw.format_version, ARTIFACT_FORMAT_VERSION);
    assert_eq!(raw.kind, "standard_scaler");
    assert_eq!(raw.schema_name, "transaction");
    assert_eq!(raw.layout_hash, schema.layout_hash());
    assert_eq!(raw.checksum, payload_checksum(&state).unwrap());
}

#[test]
fn test_save_creates_directory_and_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let schema = credit_schema();

    save_artifact(&nested, "scaler", &schema, &fitted_state(&schema)).unwrap();

    let names: Vec<String> = fs::read_dir(&nested)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["scaler.json"]);
}

#[test]
fn test_missing_artifact() {
    let dir = tempdir().unwrap();
    let err = load_artifact::<ScalerState>(dir.path(), "scaler", &credit_schema()).unwrap_err();
    match err {
        ModelError::MissingArtifact { path } => assert_eq!(path, dir.path().join("scaler.json")),
        other => panic!("Expected MissingArtifact, got {}", other),
    }
}

#[test]
fn test_reject_schema_mismatch() {
    let dir = tempdir().unwrap();
    let schema = transaction_schema();
    save_artifact(dir.path(), "scaler", &schema, &fitted_state(&schema)).unwrap();

    let err = load_artifact::<ScalerState>(dir.path(), "scaler", &credit_schema()).unwrap_err();
    match err {
        ModelError::SchemaMismatch { expected_hash, actual_hash, .. } => {
            assert_eq!(expected_hash, credit_schema().layout_hash());
            assert_eq!(actual_hash, schema.layout_hash());
        }
        other => panic!("Expected SchemaMismatch, got {}", other),
    }
}

#[test]
fn test_reject_wrong_kind() {
    let dir = tempdir().unwrap();
    let config = ModelConfig::default().with_n_estimators(5);
    let data = TrainingData::generate(60, 2);

    let mut risk = RiskModel::new(&config);
    risk.train(&data.credit_profiles, &data.credit_labels).unwrap();
    risk.save(dir.path()).unwrap();

    // A scaler file read back as if it were a forest
    fs::copy(dir.path().join("scaler.json"), dir.path().join("risk_analyzer.json")).unwrap();
    let mut fresh = RiskModel::new(&config);
    let err = fresh.load(dir.path()).unwrap_err();
    assert!(matches!(err, ModelError::Serialization(_) | ModelError::SchemaMismatch { .. }));
    assert!(!fresh.is_trained());
}

#[test]
fn test_reject_tampered_payload() {
    let dir = tempdir().unwrap();
    let schema = transaction_schema();
    let path = save_artifact(dir.path(), "scaler", &schema, &fitted_state(&schema)).unwrap();

    let mut artifact: Artifact<ScalerState> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    artifact.payload.mean[0] += 1.0;
    fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

    let err = load_artifact::<ScalerState>(dir.path(), "scaler", &schema).unwrap_err();
    assert!(matches!(err, ModelError::ChecksumMismatch { artifact } if artifact == "scaler"));
}

#[test]
fn test_list_artifacts() {
    let dir = tempdir().unwrap();
    assert!(list_artifacts(&dir.path().join("missing")).unwrap().is_empty());

    let config = ModelConfig::default().with_n_estimators(5);
    let mut fraud = FraudModel::new(&config);
    fraud.train(&TrainingData::generate(50, 4).transactions).unwrap();
    fraud.save(dir.path()).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(list_artifacts(dir.path()).unwrap(), vec!["fraud_detector", "scaler"]);
}

#[test]
fn test_fraud_round_trip_identical_scores() {
    let dir = tempdir().unwrap();
    let config = ModelConfig::default().with_n_estimators(25);
    let data = TrainingData::generate(150, 8);

    let mut original = FraudModel::new(&config);
    original.train(&data.transactions).unwrap();
    original.save(dir.path()).unwrap();

    let mut restored = FraudModel::new(&config);
    restored.load(dir.path()).unwrap();

    assert!(!restored.has_classifier());
    for tx in &data.transactions[..25] {
        assert_eq!(original.score(tx).unwrap(), restored.score(tx).unwrap());
        assert_eq!(original.detect(tx).unwrap(), restored.detect(tx).unwrap());
    }
}

#[test]
fn test_stale_classifier_removed_on_save() {
    let dir = tempdir().unwrap();
    let config = ModelConfig::default().with_n_estimators(5);
    let data = TrainingData::generate(80, 12);

    let mut model = FraudModel::new(&config);
    model.train(&data.transactions).unwrap();
    model.train_supervised(&data.transactions, &data.fraud_labels).unwrap();
    model.save(dir.path()).unwrap();
    assert!(dir.path().join("fraud_classifier.json").is_file());

    // Retraining the detector drops the classifier, and the file with it
    model.train(&data.transactions).unwrap();
    model.save(dir.path()).unwrap();
    assert!(!dir.path().join("fraud_classifier.json").exists());
}
