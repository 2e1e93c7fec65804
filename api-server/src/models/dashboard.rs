//! Dashboard models
//!
//! Mock series for the front-end. `DashboardData` is generated once at
//! startup and shared through `AppState`; the sample dashboard is drawn
//! fresh on every request.

use chrono::{DateTime, Duration, Months, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::round2;

pub const HISTORY_DAYS: usize = 31;
pub const HISTORY_BASE: f64 = 3000.0;
pub const HISTORY_FLOOR: f64 = 1000.0;
pub const DASHBOARD_FRAUD_RATE: f64 = 0.015;
pub const DASHBOARD_DELINQUENCY_RATE: f64 = 0.078;

const SAMPLE_DAYS: i64 = 30;
const SAMPLE_MONTHS: u32 = 12;
const SAMPLE_QUARTERS: u32 = 8;
const SAMPLE_BASE: f64 = 100_000.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionHistory {
    pub name: String,
    pub value: f64,
    /// Percent change from the previous point
    pub trend: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub total_transactions: u64,
    pub average_transaction: f64,
    pub fraud_rate: f64,
    pub delinquency_rate: f64,
    pub transaction_history: Vec<TransactionHistory>,
}

impl DashboardData {
    /// 31 days ending at `now`: linear drift from -20% to +20% plus N(0, 0.1)
    /// noise around 3000, floored at 1000
    pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let start = now - Duration::days(HISTORY_DAYS as i64 - 1);
        let mut history: Vec<TransactionHistory> = Vec::with_capacity(HISTORY_DAYS);
        let mut previous: Option<f64> = None;

        for i in 0..HISTORY_DAYS {
            let drift = -0.2 + 0.4 * i as f64 / (HISTORY_DAYS - 1) as f64;
            let noise = normal(rng, 0.0, 0.1);
            let value = (HISTORY_BASE * (1.0 + drift + noise)).trunc().max(HISTORY_FLOOR);

            let trend = match previous {
                Some(prev) if prev != 0.0 => (value - prev) / prev * 100.0,
                _ => 0.0,
            };
            previous = Some(value);

            history.push(TransactionHistory {
                name: (start + Duration::days(i as i64)).format("%d/%m").to_string(),
                value,
                trend: round2(trend),
            });
        }

        let total: f64 = history.iter().map(|h| h.value).sum();
        Self {
            total_transactions: total as u64,
            average_transaction: round2(total / history.len() as f64),
            fraud_rate: DASHBOARD_FRAUD_RATE,
            delinquency_rate: DASHBOARD_DELINQUENCY_RATE,
            transaction_history: history,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_transactions: f64,
    pub average_transaction: f64,
    pub fraud_rate: f64,
    pub default_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SampleDashboard {
    pub transaction_history: Vec<SeriesPoint>,
    pub fraud_metrics: Vec<SeriesPoint>,
    pub default_risk: Vec<SeriesPoint>,
    pub metrics: DashboardMetrics,
}

impl SampleDashboard {
    pub fn generate<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> Self {
        // Daily volume: seasonal wave on a 2%/day growth
        let start = now - Duration::days(SAMPLE_DAYS - 1);
        let transaction_history: Vec<SeriesPoint> = (0..SAMPLE_DAYS)
            .map(|day| {
                let seasonal = 1.0 + 0.1 * (day as f64 * std::f64::consts::PI / 15.0).sin();
                let growth = 1.0 + day as f64 * 0.02;
                let value = round2(SAMPLE_BASE * seasonal * growth);
                SeriesPoint {
                    name: (start + Duration::days(day)).format("%Y-%m-%d").to_string(),
                    value,
                    trend: Some(round2((value / SAMPLE_BASE - 1.0) * 100.0)),
                }
            })
            .collect();

        let fraud_metrics: Vec<SeriesPoint> = (0..SAMPLE_MONTHS)
            .rev()
            .map(|back| SeriesPoint {
                name: months_before(now, back).format("%b/%y").to_string(),
                value: round2(normal(rng, 50.0, 10.0).max(0.0)),
                trend: None,
            })
            .collect();

        let default_risk: Vec<SeriesPoint> = (0..SAMPLE_QUARTERS)
            .rev()
            .map(|back| {
                let date = months_before(now, back * 3);
                SeriesPoint {
                    name: format!("{}/{}", quarter_label(&date), date.format("%y")),
                    value: round2(normal(rng, 15.0, 3.0).clamp(0.0, 100.0)),
                    trend: None,
                }
            })
            .collect();

        let total: f64 = transaction_history.iter().map(|p| p.value).sum();
        let metrics = DashboardMetrics {
            total_transactions: round2(total),
            average_transaction: round2(total / transaction_history.len() as f64),
            fraud_rate: fraud_metrics.last().map(|p| p.value / 1000.0).unwrap_or(0.0),
            default_rate: default_risk.last().map(|p| p.value / 100.0).unwrap_or(0.0),
        };

        Self { transaction_history, fraud_metrics, default_risk, metrics }
    }
}

fn months_before(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

fn quarter_label(date: &DateTime<Utc>) -> String {
    use chrono::Datelike;
    format!("Q{}", (date.month() - 1) / 3 + 1)
}

/// Box-Muller draw from N(mean, sd)
fn normal<R: Rng>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
