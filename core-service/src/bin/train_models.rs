//! Train the model suite on synthetic data and write its artifacts.
//!
//! Usage: `train-models [MODELS_DIR]` (falls back to FINANCE_AI_MODELS_DIR,
//! then the platform data directory). Other knobs come from FINANCE_AI_*.

use anyhow::Context;
use finance_ai_core::constants::{APP_NAME, APP_VERSION};
use finance_ai_core::{ModelConfig, ModelSuite, TrainingData};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ModelConfig::from_env();
    if let Some(dir) = std::env::args().nth(1) {
        config = config.with_models_dir(dir);
    }
    config.validate().context("invalid model configuration")?;

    log::info!("{} v{} - training models", APP_NAME, APP_VERSION);
    log::info!(
        "{} samples per dataset, seed {}, {} estimators, decode policy {:?}",
        config.synthetic_samples,
        config.seed,
        config.risk_forest.n_estimators,
        config.decode_policy
    );

    let models_dir = config.models_dir.clone();
    let data = TrainingData::generate(config.synthetic_samples, config.seed);
    let suite = ModelSuite::new(config);

    suite.train_all(&data).context("training failed")?;
    suite
        .save(&models_dir)
        .with_context(|| format!("failed to write artifacts to {}", models_dir.display()))?;

    let status = suite.status()?;
    for (name, wrapper) in [("fraud", &status.fraud), ("risk", &status.risk), ("delinquency", &status.delinquency)] {
        log::info!(
            "{:<12} schema={} v{} layout={} artifacts={:?}",
            name, wrapper.schema, wrapper.feature_version, wrapper.layout_hash, wrapper.artifacts
        );
    }

    let importance = suite.delinquency().feature_importance()?;
    let mut ranked: Vec<_> = importance.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (feature, weight) in ranked.iter().take(3) {
        log::info!("delinquency driver: {:<20} {:.3}", feature, weight);
    }

    log::info!(
        "Done. {} artifact directories under {}",
        [&status.fraud, &status.risk, &status.delinquency]
            .iter()
            .filter(|w| !w.artifacts.is_empty())
            .count(),
        models_dir.display()
    );
    Ok(())
}
