//! Transaction model

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use finance_ai_core::TransactionRecord;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransactionData {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1, max = 200))]
    pub merchant: String,
    pub timestamp: DateTime<Utc>,
    #[validate(length(min = 1, max = 64))]
    pub category: String,
}

impl TransactionData {
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Model-facing view: hour, weekday and category code
    pub fn to_transaction(&self) -> TransactionRecord {
        TransactionRecord::from_parts(self.amount, self.timestamp, &self.category)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionCreated {
    pub status: &'static str,
    pub message: &'static str,
    pub id: Uuid,
    pub data: TransactionData,
}

impl TransactionCreated {
    pub fn new(data: TransactionData) -> Self {
        Self {
            status: "success",
            message: "Transaction created successfully",
            id: Uuid::new_v4(),
            data,
        }
    }
}
