//! Gradient Boosting - Logistic-loss boosted regression trees
//!
//! Second-order boosting: each round fits a regression tree to the
//! gradients/hessians of the log loss, leaf weights are Newton steps
//! `-G / (H + lambda)` and split gain is the usual structure-score gain.

use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{check_width, normalize, split_threshold, validate_labeled, Classifier};
use crate::logic::error::{ModelError, ModelResult};

const COMPONENT: &str = "gradient boosting";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
    /// Row share drawn per round (1.0 = all rows)
    pub subsample: f64,
    pub seed: u64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 5,
            lambda: 1.0,
            min_child_weight: 1.0,
            subsample: 1.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum BoostNode {
    Leaf { weight: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<BoostNode>,
}

impl RegressionTree {
    fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                BoostNode::Leaf { weight } => return *weight,
                BoostNode::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: BoostingConfig,
    /// Initial log-odds
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl GradientBoostingClassifier {
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            config,
            base_score: 0.0,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw margin (log-odds)
    fn margin(&self, x: &[f64]) -> f64 {
        self.base_score
            + self.config.learning_rate * self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    fn validate_config(&self) -> ModelResult<()> {
        let c = &self.config;
        if c.n_estimators == 0 {
            return Err(ModelError::InvalidParameter("gradient boosting needs n_estimators > 0".to_string()));
        }
        if !(c.learning_rate > 0.0 && c.learning_rate <= 1.0) {
            return Err(ModelError::InvalidParameter(format!("learning_rate must be in (0, 1], got {}", c.learning_rate)));
        }
        if !(c.subsample > 0.0 && c.subsample <= 1.0) {
            return Err(ModelError::InvalidParameter(format!("subsample must be in (0, 1], got {}", c.subsample)));
        }
        if c.lambda < 0.0 || c.min_child_weight < 0.0 {
            return Err(ModelError::InvalidParameter("lambda and min_child_weight must be >= 0".to_string()));
        }
        Ok(())
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new(BoostingConfig::default())
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, data: &[Vec<f64>], labels: &[u8]) -> ModelResult<()> {
        let n_features = validate_labeled(data, labels, COMPONENT)?;
        self.validate_config()?;

        let n = data.len();
        let y: Vec<f64> = labels.iter().map(|&l| f64::from(l)).collect();
        let base_rate = (y.iter().sum::<f64>() / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let base_score = (base_rate / (1.0 - base_rate)).ln();

        let mut margins = vec![base_score; n];
        let mut trees = Vec::with_capacity(self.config.n_estimators);
        let mut gains = vec![0.0; n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let sample_size = ((n as f64 * self.config.subsample).round() as usize).clamp(1, n);

        log::debug!(
            "Fitting gradient boosting: {} rounds, {} rows, depth {}, lr {}",
            self.config.n_estimators, n, self.config.max_depth, self.config.learning_rate
        );

        for _ in 0..self.config.n_estimators {
            let mut grad = Vec::with_capacity(n);
            let mut hess = Vec::with_capacity(n);
            for (m, target) in margins.iter().zip(&y) {
                let p = sigmoid(*m);
                grad.push(p - target);
                hess.push((p * (1.0 - p)).max(1e-16));
            }

            let rows: Vec<usize> = if sample_size < n {
                sample(&mut rng, n, sample_size).into_vec()
            } else {
                (0..n).collect()
            };

            let mut builder = BoostTreeBuilder {
                config: &self.config,
                data,
                grad: &grad,
                hess: &hess,
                n_features,
                nodes: Vec::new(),
                gains: &mut gains,
            };
            builder.grow(rows, 0);
            let tree = RegressionTree { nodes: builder.nodes };

            for (m, row) in margins.iter_mut().zip(data) {
                *m += self.config.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        normalize(&mut gains);

        self.base_score = base_score;
        self.trees = trees;
        self.n_features = n_features;
        self.feature_importances = gains;
        Ok(())
    }

    fn predict_proba(&self, x: &[f64]) -> ModelResult<[f64; 2]> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        check_width(x, self.n_features)?;
        let p = sigmoid(self.margin(x));
        Ok([1.0 - p, p])
    }

    /// Total split gain per feature, normalized
    fn feature_importances(&self) -> ModelResult<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        Ok(self.feature_importances.clone())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

// ============================================================================
// TREE BUILDER
// ============================================================================

struct BoostTreeBuilder<'a> {
    config: &'a BoostingConfig,
    data: &'a [Vec<f64>],
    grad: &'a [f64],
    hess: &'a [f64],
    n_features: usize,
    nodes: Vec<BoostNode>,
    gains: &'a mut Vec<f64>,
}

impl BoostTreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let g: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let h: f64 = rows.iter().map(|&r| self.hess[r]).sum();

        let id = self.nodes.len();
        self.nodes.push(BoostNode::Leaf { weight: -g / (h + self.config.lambda) });

        if depth >= self.config.max_depth || rows.len() < 2 {
            return id;
        }

        let Some((feature, threshold, gain)) = self.best_split(&rows, g, h) else {
            return id;
        };
        self.gains[feature] += gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| self.data[r][feature] <= threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = BoostNode::Split { feature, threshold, left, right };
        id
    }

    fn best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<(usize, f64, f64)> {
        let lambda = self.config.lambda;
        let parent = g * g / (h + lambda);
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted = rows.to_vec();

        for feature in 0..self.n_features {
            sorted.sort_by(|&a, &b| self.data[a][feature].total_cmp(&self.data[b][feature]));

            let (mut gl, mut hl) = (0.0, 0.0);
            for i in 0..sorted.len() - 1 {
                gl += self.grad[sorted[i]];
                hl += self.hess[sorted[i]];

                let current = self.data[sorted[i]][feature];
                let next = self.data[sorted[i + 1]][feature];
                if next <= current {
                    continue;
                }

                let (gr, hr) = (g - gl, h - hl);
                if hl < self.config.min_child_weight || hr < self.config.min_child_weight {
                    continue;
                }

                let gain = 0.5 * (gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent);
                if gain > best.map_or(1e-12, |(_, _, b)| b) {
                    best = Some((feature, split_threshold(current, next), gain));
                }
            }
        }

        best
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
