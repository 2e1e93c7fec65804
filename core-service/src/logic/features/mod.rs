//! Features Module - Feature Extraction Engine
//!
//! Turns semi-structured records into fixed-layout numeric vectors.
//! Schemas live in `layout.rs`; adding a model input never touches the
//! estimators.

pub mod layout;
pub mod record;
pub mod vector;
pub mod extractor;

#[cfg(test)]
mod tests;

// Re-export common types
pub use layout::{
    FeatureField, FeatureSchema, LayoutInfo, LayoutMismatchError,
    transaction_schema, credit_schema, delinquency_schema,
};
pub use record::{Record, TransactionRecord, CreditProfile, ContractRecord, merchant_category_code};
pub use vector::FeatureVector;
pub use extractor::{FeatureExtractor, DecodePolicy};
