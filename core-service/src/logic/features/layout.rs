//! Feature Layout - Schema definitions for every model input
//!
//! **This file controls the feature schemas**
//!
//! ## Rules:
//! 1. Add a field → increment the schema version
//! 2. Change order → increment the schema version
//! 3. Remove a field → increment the schema version
//!
//! The layout hash is persisted next to every trained artifact, so a model
//! fitted on one layout is rejected when loaded against another.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// SCHEMA VERSIONS
// ============================================================================

pub const TRANSACTION_SCHEMA_VERSION: u8 = 1;
pub const CREDIT_SCHEMA_VERSION: u8 = 1;
pub const DELINQUENCY_SCHEMA_VERSION: u8 = 1;

// ============================================================================
// FIELD LAYOUTS (Authoritative source)
// ============================================================================

/// Transaction fields used by the fraud detector
pub const TRANSACTION_LAYOUT: &[&str] = &[
    "amount",            // 0: Transaction amount
    "hour_of_day",       // 1: 0-23
    "day_of_week",       // 2: 0 = Monday
    "merchant_category", // 3: Merchant category code
];

/// Client credit fields used by the risk analyzer
pub const CREDIT_LAYOUT: &[&str] = &[
    "income",                // 0: Annual income
    "debt_ratio",            // 1: Debt / income
    "credit_history_length", // 2: Years
    "num_credit_lines",      // 3: Open credit lines
    "payment_history_score", // 4: 0-100
];

/// Contract fields used by the delinquency predictor
pub const DELINQUENCY_LAYOUT: &[&str] = &[
    "payment_history",    // 0: Share of on-time payments (0-1)
    "contract_value",     // 1: Contract principal
    "contract_term",      // 2: Months
    "credit_score",       // 3: Bureau score
    "income",             // 4: Monthly income
    "employment_tenure",  // 5: Years at current employer
    "installments_paid",  // 6: Installments already paid
    "credit_utilization", // 7: Revolving utilization (0-1)
];

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// A single schema field: name plus the value used when a record lacks it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureField {
    pub name: String,
    pub default: f64,
}

/// Ordered sequence of fields; the order defines the vector layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    name: String,
    version: u8,
    fields: Vec<FeatureField>,
}

impl FeatureSchema {
    /// Build a schema from (name, default) pairs, in order
    pub fn new<N: Into<String>>(name: N, version: u8, fields: Vec<(&str, f64)>) -> Self {
        Self {
            name: name.into(),
            version,
            fields: fields
                .into_iter()
                .map(|(name, default)| FeatureField { name: name.to_string(), default })
                .collect(),
        }
    }

    /// Build a schema where every field defaults to 0.0
    pub fn with_zero_defaults<N: Into<String>>(name: N, version: u8, layout: &[&str]) -> Self {
        Self::new(name, version, layout.iter().map(|n| (*n, 0.0)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Get field index by name (O(n) but schemas are small)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.name.as_str())
    }

    /// CRC32 over the version byte and NUL-separated field names
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.version]);
        for field in &self.fields {
            hasher.update(field.name.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize()
    }

    /// Validate that incoming data matches this layout
    pub fn validate_layout(&self, version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
        let current = self.layout_hash();
        if version != self.version || hash != current {
            return Err(LayoutMismatchError {
                schema: self.name.clone(),
                expected_version: self.version,
                expected_hash: current,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            name: self.name.clone(),
            version: self.version,
            hash: self.layout_hash(),
            feature_count: self.len(),
            feature_names: self.fields.iter().map(|f| f.name.clone()).collect(),
        }
    }
}

/// Transaction schema (fraud detector input)
pub fn transaction_schema() -> FeatureSchema {
    FeatureSchema::with_zero_defaults("transaction", TRANSACTION_SCHEMA_VERSION, TRANSACTION_LAYOUT)
}

/// Credit profile schema (risk analyzer input)
pub fn credit_schema() -> FeatureSchema {
    FeatureSchema::with_zero_defaults("credit", CREDIT_SCHEMA_VERSION, CREDIT_LAYOUT)
}

/// Contract schema (delinquency predictor input)
pub fn delinquency_schema() -> FeatureSchema {
    FeatureSchema::with_zero_defaults("delinquency", DELINQUENCY_SCHEMA_VERSION, DELINQUENCY_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub name: String,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub schema: String,
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch for '{}': expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.schema,
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schema_lengths() {
        assert_eq!(transaction_schema().len(), 4);
        assert_eq!(credit_schema().len(), 5);
        assert_eq!(delinquency_schema().len(), 8);
    }

    #[test]
    fn test_layout_hash_consistency() {
        let schema = transaction_schema();
        assert_eq!(schema.layout_hash(), schema.layout_hash());
        assert_ne!(schema.layout_hash(), 0);
    }

    #[test]
    fn test_layout_hash_depends_on_order() {
        let a = FeatureSchema::new("s", 1, vec![("x", 0.0), ("y", 0.0)]);
        let b = FeatureSchema::new("s", 1, vec![("y", 0.0), ("x", 0.0)]);
        assert_ne!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn test_layout_hash_depends_on_version() {
        let a = FeatureSchema::with_zero_defaults("s", 1, &["x"]);
        let b = FeatureSchema::with_zero_defaults("s", 2, &["x"]);
        assert_ne!(a.layout_hash(), b.layout_hash());
    }

    #[test]
    fn test_validate_layout() {
        let schema = credit_schema();
        assert!(schema.validate_layout(schema.version(), schema.layout_hash()).is_ok());
        assert!(schema.validate_layout(schema.version() + 1, schema.layout_hash()).is_err());
        assert!(schema.validate_layout(schema.version(), !schema.layout_hash()).is_err());
    }

    #[test]
    fn test_index_lookup() {
        let schema = transaction_schema();
        assert_eq!(schema.index_of("amount"), Some(0));
        assert_eq!(schema.index_of("merchant_category"), Some(3));
        assert_eq!(schema.index_of("nonexistent"), None);
        assert_eq!(schema.field_name(1), Some("hour_of_day"));
        assert_eq!(schema.field_name(10), None);
    }

    #[test]
    fn test_layout_info() {
        let info = delinquency_schema().info();
        assert_eq!(info.feature_count, 8);
        assert_eq!(info.feature_names[0], "payment_history");
    }
}
