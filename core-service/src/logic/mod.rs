//! Logic Module - Model pipeline
//!
//! Record → Feature Extractor → Scaler → estimator → domain result.
//!
//! ## Layout
//! - `features/` - Schemas, records and the extractor
//! - `scaler` - Standardization stage
//! - `estimators/` - Isolation forest, CART, random forest, gradient boosting
//! - `model/` - Fraud / risk / delinquency wrappers and the suite
//! - `persistence/` - Checksummed JSON artifacts
//! - `dataset/` - Seeded synthetic training data

pub mod error;
pub mod config;

pub mod features;
pub mod scaler;
pub mod estimators;
pub mod model;
pub mod persistence;
pub mod dataset;
