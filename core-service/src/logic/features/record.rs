//! Records - Model input at the boundary
//!
//! `Record` is the dynamically shaped input (field name → JSON value) the
//! extractor consumes. The typed records below are what callers should build
//! at the edge; they convert into a `Record` with the exact schema field names.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// DYNAMIC RECORD
// ============================================================================

/// Mapping from field name to a (hopefully numeric) value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert
    pub fn with<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn insert<V: Into<Value>>(&mut self, field: &str, value: V) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from an arbitrary JSON value; non-objects yield an empty record
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(&str, f64); N]> for Record {
    fn from(pairs: [(&str, f64); N]) -> Self {
        pairs.into_iter().fold(Record::new(), |r, (k, v)| r.with(k, v))
    }
}

/// Coerce a JSON value to a finite float.
///
/// Numbers pass through, booleans become 1/0, numeric strings are parsed
/// after trimming. Everything else (null, arrays, objects, NaN text) is
/// not coercible.
pub fn coerce_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

// ============================================================================
// MERCHANT CATEGORIES
// ============================================================================

/// Numeric code for a merchant category label (0 = unknown)
pub fn merchant_category_code(category: &str) -> u32 {
    match category.trim().to_lowercase().as_str() {
        "retail" => 1,
        "services" => 2,
        "food" | "restaurant" | "grocery" => 3,
        "travel" => 4,
        "entertainment" => 5,
        "electronics" => 6,
        "gambling" => 7,
        "crypto" => 8,
        "transfer" => 9,
        _ => 0,
    }
}

// ============================================================================
// TYPED RECORDS
// ============================================================================

/// A card transaction as seen by the fraud detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub amount: f64,
    pub hour_of_day: u32,
    pub day_of_week: u32,
    pub merchant_category: u32,
}

impl TransactionRecord {
    /// Derive time features from a timestamp and the category from its label
    pub fn from_parts(amount: f64, timestamp: DateTime<Utc>, category: &str) -> Self {
        Self {
            amount,
            hour_of_day: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            merchant_category: merchant_category_code(category),
        }
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("amount", self.amount)
            .with("hour_of_day", self.hour_of_day)
            .with("day_of_week", self.day_of_week)
            .with("merchant_category", self.merchant_category)
    }
}

/// Client profile as seen by the risk analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub income: f64,
    pub debt_ratio: f64,
    pub credit_history_length: u32,
    pub num_credit_lines: u32,
    pub payment_history_score: f64,
}

impl CreditProfile {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("income", self.income)
            .with("debt_ratio", self.debt_ratio)
            .with("credit_history_length", self.credit_history_length)
            .with("num_credit_lines", self.num_credit_lines)
            .with("payment_history_score", self.payment_history_score)
    }
}

/// Contract as seen by the delinquency predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub payment_history: f64,
    pub contract_value: f64,
    pub contract_term: u32,
    pub credit_score: f64,
    pub income: f64,
    pub employment_tenure: f64,
    pub installments_paid: u32,
    pub credit_utilization: f64,
}

impl ContractRecord {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("payment_history", self.payment_history)
            .with("contract_value", self.contract_value)
            .with("contract_term", self.contract_term)
            .with("credit_score", self.credit_score)
            .with("income", self.income)
            .with("employment_tenure", self.employment_tenure)
            .with("installments_paid", self.installments_paid)
            .with("credit_utilization", self.credit_utilization)
    }
}

impl From<&TransactionRecord> for Record {
    fn from(tx: &TransactionRecord) -> Self {
        tx.to_record()
    }
}

impl From<&CreditProfile> for Record {
    fn from(profile: &CreditProfile) -> Self {
        profile.to_record()
    }
}

impl From<&ContractRecord> for Record {
    fn from(contract: &ContractRecord) -> Self {
        contract.to_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!(3.5)), Some(3.5));
        assert_eq!(coerce_value(&json!(7)), Some(7.0));
        assert_eq!(coerce_value(&json!(true)), Some(1.0));
        assert_eq!(coerce_value(&json!(" 12.25 ")), Some(12.25));
        assert_eq!(coerce_value(&json!("abc")), None);
        assert_eq!(coerce_value(&json!("NaN")), None);
        assert_eq!(coerce_value(&Value::Null), None);
        assert_eq!(coerce_value(&json!([1, 2])), None);
    }

    #[test]
    fn test_transaction_from_parts() {
        // 2024-01-06 is a Saturday
        let ts = Utc.with_ymd_and_hms(2024, 1, 6, 3, 15, 0).unwrap();
        let tx = TransactionRecord::from_parts(9999.0, ts, "Gambling");

        assert_eq!(tx.hour_of_day, 3);
        assert_eq!(tx.day_of_week, 5);
        assert_eq!(tx.merchant_category, 7);

        let record = tx.to_record();
        assert_eq!(record.len(), 4);
        assert_eq!(coerce_value(record.get("amount").unwrap()), Some(9999.0));
    }

    #[test]
    fn test_unknown_category_is_zero() {
        assert_eq!(merchant_category_code("spaceships"), 0);
        assert_eq!(merchant_category_code(" retail "), 1);
    }

    #[test]
    fn test_record_from_json() {
        let record = Record::from_json(json!({"income": 5000, "debt_ratio": "0.3"}));
        assert!(record.contains("income"));
        assert_eq!(record.len(), 2);

        assert!(Record::from_json(json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_record_from_pairs() {
        let record = Record::from([("amount", 50.0), ("hour_of_day", 10.0)]);
        assert_eq!(record.len(), 2);
        assert_eq!(coerce_value(record.get("hour_of_day").unwrap()), Some(10.0));
    }
}
