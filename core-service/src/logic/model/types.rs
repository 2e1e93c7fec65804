//! Result types returned by the model wrappers

use serde::{Deserialize, Serialize};

/// Floor of the credit score scale
pub const MIN_CREDIT_SCORE: f64 = 300.0;
/// Score of a zero-risk applicant
pub const MAX_CREDIT_SCORE: f64 = 850.0;
/// Points lost per unit of default probability
pub const CREDIT_SCORE_SLOPE: f64 = 400.0;

/// `max(300, 850 - 400p)`
pub fn credit_score(default_probability: f64) -> f64 {
    (MAX_CREDIT_SCORE - default_probability * CREDIT_SCORE_SLOPE).max(MIN_CREDIT_SCORE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// High above 0.7, Medium above 0.3
    pub fn from_probability(p: f64) -> Self {
        if p > 0.7 {
            RiskLevel::High
        } else if p > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub no_default: f64,
    pub default: f64,
}

impl From<[f64; 2]> for ClassProbabilities {
    fn from(proba: [f64; 2]) -> Self {
        Self { no_default: proba[0], default: proba[1] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub default_risk: f64,
    pub credit_score: f64,
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    pub fn from_probability(default_risk: f64) -> Self {
        Self {
            default_risk,
            credit_score: credit_score(default_risk),
            risk_level: RiskLevel::from_probability(default_risk),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Squashed anomaly score in (0, 1), 0.5 at the contamination threshold
    pub fraud_probability: f64,
    /// Raw isolation score negated: higher = more abnormal
    pub anomaly_score: f64,
    pub is_anomaly: bool,
    pub risk_level: RiskLevel,
}

/// Batch anomaly output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Decision function per row, negative = outlier
    pub scores: Vec<f64>,
    pub is_anomaly: Vec<bool>,
}

impl AnomalyReport {
    pub fn anomaly_count(&self) -> usize {
        self.is_anomaly.iter().filter(|&&a| a).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_score_bounds() {
        assert_eq!(credit_score(0.0), 850.0);
        assert_eq!(credit_score(1.0), 450.0);
        assert_eq!(credit_score(5.0), 300.0);

        let mut last = f64::INFINITY;
        for i in 0..=20 {
            let s = credit_score(i as f64 * 0.1);
            assert!(s <= last);
            assert!(s >= MIN_CREDIT_SCORE);
            last = s;
        }
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_probability(0.71), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.31), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_probability(0.3), RiskLevel::Low);
        assert_eq!(RiskLevel::High.to_string(), "High");
    }
}
