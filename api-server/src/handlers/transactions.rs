//! Transactions handler

use axum::Json;
use validator::Validate;

use crate::AppResult;
use crate::models::{TransactionCreated, TransactionData};

/// Accept a transaction and echo it back with an id
pub async fn create(Json(req): Json<TransactionData>) -> AppResult<Json<TransactionCreated>> {
    req.validate()?;
    tracing::debug!("Transaction received: {} {:.2} ({})", req.merchant, req.amount, req.category);
    Ok(Json(TransactionCreated::new(req)))
}
