//! Dataset Module - Training data for the model suite
//!
//! No real data ships with the service; models are trained on seeded
//! synthetic sets so every start-up produces the same artifacts.

pub mod synthetic;


pub use synthetic::{SyntheticGenerator, TrainingData, FRAUD_SHARE};
