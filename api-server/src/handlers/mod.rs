//! HTTP handlers

pub mod health;
pub mod dashboard;
pub mod analysis;
pub mod transactions;
pub mod models;
