//! Seeded synthetic training data
//!
//! Distributions are loose but labels track the risk features, so the
//! trained models rank inputs sensibly.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::logic::features::{ContractRecord, CreditProfile, Record, TransactionRecord};

/// Share of generated transactions that are fraudulent
pub const FRAUD_SHARE: f64 = 0.03;

/// Everything `ModelSuite::train_all` needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingData {
    pub transactions: Vec<Record>,
    pub fraud_labels: Vec<u8>,
    pub credit_profiles: Vec<Record>,
    pub credit_labels: Vec<u8>,
    pub contracts: Vec<Record>,
    pub delinquency_labels: Vec<u8>,
}

impl TrainingData {
    /// `n` rows per dataset, reproducible under `seed`
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut generator = SyntheticGenerator::new(seed);

        let (transactions, fraud_labels) = (0..n)
            .map(|_| {
                let (tx, label) = generator.labeled_transaction();
                (tx.to_record(), label)
            })
            .unzip();

        let (credit_profiles, credit_labels) = (0..n)
            .map(|_| {
                let (profile, label) = generator.credit_profile();
                (profile.to_record(), label)
            })
            .unzip();

        let (contracts, delinquency_labels) = (0..n)
            .map(|_| {
                let (contract, label) = generator.contract();
                (contract.to_record(), label)
            })
            .unzip();

        Self {
            transactions,
            fraud_labels,
            credit_profiles,
            credit_labels,
            contracts,
            delinquency_labels,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

pub struct SyntheticGenerator {
    rng: ChaCha8Rng,
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Everyday purchase: small amount, business hours, low-risk category
    pub fn normal_transaction(&mut self) -> TransactionRecord {
        let amount = (3.9 + 0.8 * self.gaussian()).exp().clamp(1.0, 5000.0);
        TransactionRecord {
            amount: round2(amount),
            hour_of_day: self.rng.gen_range(8..=20),
            day_of_week: self.rng.gen_range(0..7),
            merchant_category: *[1u32, 1, 2, 2, 3, 3, 4, 5, 6]
                .choose(&mut self.rng)
                .unwrap_or(&1),
        }
    }

    /// Large amount, small hours, high-risk category
    pub fn fraudulent_transaction(&mut self) -> TransactionRecord {
        TransactionRecord {
            amount: round2(self.rng.gen_range(2_000.0..20_000.0)),
            hour_of_day: self.rng.gen_range(0..=5),
            day_of_week: self.rng.gen_range(0..7),
            merchant_category: self.rng.gen_range(7..=9),
        }
    }

    pub fn labeled_transaction(&mut self) -> (TransactionRecord, u8) {
        if self.rng.gen_bool(FRAUD_SHARE) {
            (self.fraudulent_transaction(), 1)
        } else {
            (self.normal_transaction(), 0)
        }
    }

    /// Profile plus default label drawn from a logistic risk model
    pub fn credit_profile(&mut self) -> (CreditProfile, u8) {
        let profile = CreditProfile {
            income: round2(self.rng.gen_range(20_000.0..150_000.0)),
            debt_ratio: round2(self.rng.gen_range(0.0..0.8)),
            credit_history_length: self.rng.gen_range(0..=30),
            num_credit_lines: self.rng.gen_range(1..=15),
            payment_history_score: round2(self.rng.gen_range(40.0..100.0)),
        };

        let logit = -1.0 + 6.0 * (profile.debt_ratio - 0.4)
            - 0.08 * (f64::from(profile.credit_history_length) - 5.0)
            - 0.06 * (profile.payment_history_score - 75.0)
            - (profile.income - 60_000.0) / 50_000.0;
        let label = self.bernoulli(logit);
        (profile, label)
    }

    /// Contract plus delinquency label drawn from a logistic risk model
    pub fn contract(&mut self) -> (ContractRecord, u8) {
        let contract_term = *[6u32, 12, 24, 36, 48, 60].choose(&mut self.rng).unwrap_or(&12);
        let contract = ContractRecord {
            payment_history: round2(self.rng.gen_range(0.0..1.0)),
            contract_value: round2(self.rng.gen_range(1_000.0..100_000.0)),
            contract_term,
            credit_score: self.rng.gen_range(300.0_f64..850.0).round(),
            income: round2(self.rng.gen_range(15_000.0..200_000.0)),
            employment_tenure: round2(self.rng.gen_range(0.0..30.0)),
            installments_paid: self.rng.gen_range(0..=contract_term),
            credit_utilization: round2(self.rng.gen_range(0.0..1.0)),
        };

        let paid_share = f64::from(contract.installments_paid) / f64::from(contract.contract_term);
        let logit = -1.5 - 4.0 * (contract.payment_history - 0.5)
            - (contract.credit_score - 575.0) / 90.0
            + 3.0 * (contract.credit_utilization - 0.5)
            + (contract.contract_value / contract.income - 0.5)
            - 0.05 * contract.employment_tenure
            - paid_share;
        let label = self.bernoulli(logit);
        (contract, label)
    }

    /// Standard normal via Box-Muller
    fn gaussian(&mut self) -> f64 {
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    fn bernoulli(&mut self, logit: f64) -> u8 {
        let p = 1.0 / (1.0 + (-logit).exp());
        u8::from(self.rng.gen::<f64>() < p)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
