//! Risk, fraud and delinquency request/response models

use serde::{Deserialize, Serialize};
use validator::Validate;

use finance_ai_core::{ContractRecord, CreditProfile, FraudAssessment, RiskAssessment, RiskLevel};

use super::TransactionData;

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// RISK
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RiskAnalysisRequest {
    #[validate(range(min = 0.0))]
    pub income: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub debt_ratio: f64,
    pub credit_history_length: u32,
    pub num_credit_lines: u32,
    #[validate(range(min = 0.0, max = 100.0))]
    pub payment_history_score: f64,
}

impl RiskAnalysisRequest {
    pub fn profile(&self) -> CreditProfile {
        CreditProfile {
            income: self.income,
            debt_ratio: self.debt_ratio,
            credit_history_length: self.credit_history_length,
            num_credit_lines: self.num_credit_lines,
            payment_history_score: self.payment_history_score,
        }
    }

    pub fn factors(&self) -> RiskFactors {
        RiskFactors {
            debt_ratio: if self.debt_ratio > 0.4 { "High" } else { "Low" },
            credit_history: if self.credit_history_length > 5 { "Good" } else { "Limited" },
            payment_history: if self.payment_history_score > 90.0 { "Excellent" } else { "Fair" },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactors {
    pub debt_ratio: &'static str,
    pub credit_history: &'static str,
    pub payment_history: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskAnalysisResponse {
    pub risk_score: f64,
    /// Percent
    pub default_probability: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: RiskFactors,
}

impl RiskAnalysisResponse {
    pub fn new(assessment: RiskAssessment, factors: RiskFactors) -> Self {
        Self {
            risk_score: round2(assessment.credit_score),
            default_probability: round2(assessment.default_risk * 100.0),
            risk_level: assessment.risk_level,
            risk_factors: factors,
        }
    }
}

// ============================================================================
// FRAUD
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FraudFactors {
    pub amount: &'static str,
    pub timing: &'static str,
    pub category: &'static str,
}

impl FraudFactors {
    pub fn from_transaction(tx: &TransactionData) -> Self {
        let hour = tx.hour();
        let category = tx.category.to_lowercase();
        Self {
            amount: if tx.amount > 10_000.0 { "Suspicious" } else { "Normal" },
            timing: if (8..=18).contains(&hour) { "Normal" } else { "Suspicious" },
            category: if matches!(category.as_str(), "retail" | "services") { "Normal" } else { "Review" },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FraudDetectionResponse {
    /// Percent
    pub fraud_probability: f64,
    pub risk_level: RiskLevel,
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    /// Supervised classifier output in percent, when one is trained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_probability: Option<f64>,
    pub factors: FraudFactors,
}

impl FraudDetectionResponse {
    pub fn new(assessment: FraudAssessment, classifier: Option<f64>, factors: FraudFactors) -> Self {
        Self {
            fraud_probability: round2(assessment.fraud_probability * 100.0),
            risk_level: assessment.risk_level,
            is_anomaly: assessment.is_anomaly,
            anomaly_score: assessment.anomaly_score,
            classifier_probability: classifier.map(|p| round2(p * 100.0)),
            factors,
        }
    }
}

// ============================================================================
// DELINQUENCY
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DelinquencyRequest {
    #[validate(range(min = 0.0, max = 1.0))]
    pub payment_history: f64,
    #[validate(range(min = 0.0))]
    pub contract_value: f64,
    #[validate(range(min = 1))]
    pub contract_term: u32,
    #[validate(range(min = 300.0, max = 850.0))]
    pub credit_score: f64,
    #[validate(range(min = 0.0))]
    pub income: f64,
    #[validate(range(min = 0.0))]
    pub employment_tenure: f64,
    pub installments_paid: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub credit_utilization: f64,
}

impl DelinquencyRequest {
    pub fn contract(&self) -> ContractRecord {
        ContractRecord {
            payment_history: self.payment_history,
            contract_value: self.contract_value,
            contract_term: self.contract_term,
            credit_score: self.credit_score,
            income: self.income,
            employment_tenure: self.employment_tenure,
            installments_paid: self.installments_paid,
            credit_utilization: self.credit_utilization,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DelinquencyResponse {
    /// Percent
    pub default_probability: f64,
    pub credit_score: f64,
    pub risk_level: RiskLevel,
}

impl From<RiskAssessment> for DelinquencyResponse {
    fn from(assessment: RiskAssessment) -> Self {
        Self {
            default_probability: round2(assessment.default_risk * 100.0),
            credit_score: round2(assessment.credit_score),
            risk_level: assessment.risk_level,
        }
    }
}
