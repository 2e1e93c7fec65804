//! Feature Extractor - Record → FeatureVector
//!
//! Looks up each schema field in the record, coerces it to `f64` and falls
//! back to the declared default when the field is absent. What happens to a
//! present-but-garbage value depends on the `DecodePolicy`.

use serde::{Deserialize, Serialize};

use super::layout::FeatureSchema;
use super::record::{coerce_value, Record};
use super::vector::FeatureVector;
use crate::logic::error::{ModelError, ModelResult};

/// How to treat a field whose value cannot be coerced to a number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Substitute the schema default (missing and malformed alike)
    #[default]
    Lenient,
    /// Missing fields still default; malformed values are rejected
    Strict,
}

impl std::str::FromStr for DecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(DecodePolicy::Lenient),
            "strict" => Ok(DecodePolicy::Strict),
            other => Err(format!("unknown decode policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureExtractor {
    schema: FeatureSchema,
    policy: DecodePolicy,
}

impl FeatureExtractor {
    pub fn new(schema: FeatureSchema) -> Self {
        Self::with_policy(schema, DecodePolicy::default())
    }

    pub fn with_policy(schema: FeatureSchema, policy: DecodePolicy) -> Self {
        Self { schema, policy }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Extract one vector; always `schema.len()` values long
    pub fn extract(&self, record: &Record) -> ModelResult<FeatureVector> {
        let mut values = Vec::with_capacity(self.schema.len());

        for field in self.schema.fields() {
            let value = match record.get(&field.name) {
                None => field.default,
                Some(raw) => match coerce_value(raw) {
                    Some(v) => v,
                    None if raw.is_null() => field.default,
                    None => match self.policy {
                        DecodePolicy::Lenient => {
                            log::debug!(
                                "Field '{}' is not numeric ({}), using default {}",
                                field.name, raw, field.default
                            );
                            field.default
                        }
                        DecodePolicy::Strict => {
                            return Err(ModelError::MalformedRecord {
                                field: field.name.clone(),
                                value: raw.to_string(),
                            });
                        }
                    },
                },
            };
            values.push(value);
        }

        Ok(FeatureVector::from_values(&self.schema, values))
    }

    pub fn extract_batch(&self, records: &[Record]) -> ModelResult<Vec<FeatureVector>> {
        records.iter().map(|r| self.extract(r)).collect()
    }
}
