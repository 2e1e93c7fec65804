//! Feature Vector - Core data structure for estimator input
//!
//! Every vector carries the layout hash of the schema that produced it, so
//! a vector from one schema can never be silently fed to a model fitted on
//! another.

use serde::{Deserialize, Serialize};

use super::layout::{FeatureSchema, LayoutMismatchError};

/// Fixed-order numeric encoding of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the producing schema layout
    pub layout_hash: u32,
    /// Values in schema order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Create a vector filled with the schema defaults
    pub fn defaults(schema: &FeatureSchema) -> Self {
        Self {
            layout_hash: schema.layout_hash(),
            values: schema.fields().iter().map(|f| f.default).collect(),
        }
    }

    /// Create from raw values tagged with a schema layout
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        Self {
            layout_hash: schema.layout_hash(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.index_of(name).and_then(|i| self.get(i))
    }

    pub fn set_by_name(&mut self, schema: &FeatureSchema, name: &str, value: f64) -> bool {
        match schema.index_of(name) {
            Some(index) if index < self.values.len() => {
                self.values[index] = value;
                true
            }
            _ => false,
        }
    }

    /// Validate that this vector was produced by `schema`
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), LayoutMismatchError> {
        schema.validate_layout(schema.version(), self.layout_hash)?;
        if self.values.len() != schema.len() {
            return Err(LayoutMismatchError {
                schema: schema.name().to_string(),
                expected_version: schema.version(),
                expected_hash: schema.layout_hash(),
                actual_version: schema.version(),
                actual_hash: self.layout_hash,
            });
        }
        Ok(())
    }

    /// Named view for logging/diagnostics
    pub fn to_log_entry(&self, schema: &FeatureSchema) -> serde_json::Value {
        serde_json::json!({
            "schema": schema.name(),
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": schema.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}
