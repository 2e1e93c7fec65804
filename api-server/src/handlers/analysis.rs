//! Fraud, risk and delinquency handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::{AppState, AppResult};
use crate::models::{
    DelinquencyRequest, DelinquencyResponse, FraudDetectionResponse, FraudFactors,
    RiskAnalysisRequest, RiskAnalysisResponse, TransactionData,
};

/// Score a single transaction with the anomaly detector
pub async fn detect_fraud(
    State(state): State<AppState>,
    Json(req): Json<TransactionData>,
) -> AppResult<Json<FraudDetectionResponse>> {
    req.validate()?;
    let record = req.to_transaction().to_record();

    let fraud = state.models.fraud();
    let assessment = fraud.detect(&record)?;
    let classifier = if fraud.has_classifier() {
        Some(fraud.fraud_probability(&record)?)
    } else {
        None
    };
    drop(fraud);

    if assessment.is_anomaly {
        tracing::info!(
            "Anomalous transaction: merchant={} amount={:.2} p={:.3}",
            req.merchant, req.amount, assessment.fraud_probability
        );
    }

    let factors = FraudFactors::from_transaction(&req);
    Ok(Json(FraudDetectionResponse::new(assessment, classifier, factors)))
}

/// Default probability and credit score for a client profile
pub async fn analyze_risk(
    State(state): State<AppState>,
    Json(req): Json<RiskAnalysisRequest>,
) -> AppResult<Json<RiskAnalysisResponse>> {
    req.validate()?;
    let assessment = state.models.risk().analyze(&req.profile().to_record())?;
    Ok(Json(RiskAnalysisResponse::new(assessment, req.factors())))
}

/// Delinquency probability for a contract
pub async fn predict_delinquency(
    State(state): State<AppState>,
    Json(req): Json<DelinquencyRequest>,
) -> AppResult<Json<DelinquencyResponse>> {
    req.validate()?;
    let assessment = state.models.delinquency().analyze(&req.contract().to_record())?;
    Ok(Json(assessment.into()))
}
