//! Central Configuration Constants
//!
//! Single source of truth for engine defaults. Every value can be
//! overridden through a `FINANCE_AI_*` environment variable.

use std::path::PathBuf;

use crate::logic::estimators::Contamination;
use crate::logic::features::DecodePolicy;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Finance AI";

/// Seed shared by every estimator unless overridden
pub const DEFAULT_SEED: u64 = 42;

/// Trees / boosting rounds per estimator
pub const DEFAULT_N_ESTIMATORS: usize = 100;

/// Slope of the logistic squashing of fraud anomaly scores
pub const DEFAULT_FRAUD_GAIN: f64 = 10.0;

/// Rows per synthetic training set
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 1000;

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Get models directory from environment or use the platform data dir
pub fn get_models_dir() -> PathBuf {
    std::env::var("FINANCE_AI_MODELS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::logic::persistence::default_models_dir())
}

pub fn get_seed() -> u64 {
    env_parse("FINANCE_AI_SEED").unwrap_or(DEFAULT_SEED)
}

pub fn get_n_estimators() -> usize {
    env_parse("FINANCE_AI_N_ESTIMATORS").unwrap_or(DEFAULT_N_ESTIMATORS)
}

pub fn get_fraud_gain() -> f64 {
    env_parse("FINANCE_AI_FRAUD_GAIN").unwrap_or(DEFAULT_FRAUD_GAIN)
}

pub fn get_synthetic_samples() -> usize {
    env_parse("FINANCE_AI_SYNTHETIC_SAMPLES").unwrap_or(DEFAULT_SYNTHETIC_SAMPLES)
}

/// `lenient` (default) or `strict`
pub fn get_decode_policy() -> DecodePolicy {
    env_parse("FINANCE_AI_DECODE_POLICY").unwrap_or_default()
}

/// `auto` (default) or a fraction in (0, 0.5]
pub fn get_contamination() -> Contamination {
    match std::env::var("FINANCE_AI_CONTAMINATION") {
        Ok(raw) if raw.trim().eq_ignore_ascii_case("auto") => Contamination::Auto,
        Ok(raw) => match raw.trim().parse::<f64>() {
            Ok(fraction) => Contamination::Fixed(fraction),
            Err(_) => {
                log::warn!("Ignoring FINANCE_AI_CONTAMINATION={:?}, using auto", raw);
                Contamination::Auto
            }
        },
        Err(_) => Contamination::Auto,
    }
}
