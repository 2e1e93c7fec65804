//! Isolation Forest - Unsupervised anomaly scoring
//!
//! Random axis-aligned splits isolate outliers in fewer steps than inliers.
//! Score convention: `score_samples(x) = -2^(-E[h(x)] / c(psi))`, so values
//! sit in [-1, 0) and lower means more abnormal.

use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{check_width, validate_matrix, AnomalyDetector};
use crate::logic::error::{ModelError, ModelResult};

const COMPONENT: &str = "isolation forest";
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Expected outlier share in the training data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum Contamination {
    /// Fixed threshold: score 0.5 on the anomaly scale
    #[default]
    Auto,
    /// Threshold at this quantile of the training scores (0, 0.5]
    Fixed(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForestConfig {
    pub n_estimators: usize,
    /// Rows drawn per tree (capped at the dataset size)
    pub max_samples: usize,
    pub contamination: Contamination,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: Contamination::Auto,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum IsolationNode {
    Leaf { size: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// One isolation tree, stored as a flat arena (root at index 0)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    nodes: Vec<IsolationNode>,
}

impl IsolationTree {
    fn build(data: &[Vec<f64>], rows: Vec<usize>, max_depth: usize, rng: &mut ChaCha8Rng) -> Self {
        let mut tree = IsolationTree { nodes: Vec::new() };
        tree.grow(data, rows, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &[Vec<f64>],
        rows: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(IsolationNode::Leaf { size: rows.len() });

        if depth >= max_depth || rows.len() <= 1 {
            return id;
        }

        // Features that still vary inside this node
        let n_features = data[rows[0]].len();
        let candidates: Vec<(usize, f64, f64)> = (0..n_features)
            .filter_map(|f| {
                let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                    (lo.min(data[r][f]), hi.max(data[r][f]))
                });
                (hi > lo).then_some((f, lo, hi))
            })
            .collect();

        if candidates.is_empty() {
            return id;
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        // Convex combination stays finite even when hi - lo overflows
        let u: f64 = rng.gen();
        let threshold = lo * (1.0 - u) + hi * u;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            rows.into_iter().partition(|&r| data[r][feature] < threshold);

        // Draw landed on an edge, nothing to separate
        if left_rows.is_empty() || right_rows.is_empty() {
            let size = left_rows.len() + right_rows.len();
            self.nodes[id] = IsolationNode::Leaf { size };
            return id;
        }

        let left = self.grow(data, left_rows, depth + 1, max_depth, rng);
        let right = self.grow(data, right_rows, depth + 1, max_depth, rng);
        self.nodes[id] = IsolationNode::Split { feature, threshold, left, right };
        id
    }

    fn path_length(&self, x: &[f64]) -> f64 {
        let mut node = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node] {
                IsolationNode::Leaf { size } => return depth + average_path_length(*size),
                IsolationNode::Split { feature, threshold, left, right } => {
                    node = if x[*feature] < *threshold { *left } else { *right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<IsolationTree>,
    /// Rows per tree actually used
    psi: usize,
    n_features: usize,
    offset: f64,
}

impl IsolationForest {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            psi: 0,
            n_features: 0,
            offset: -0.5,
        }
    }

    pub fn config(&self) -> &IsolationForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn raw_score(&self, x: &[f64]) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.psi);
        if norm <= 0.0 {
            // Single-row forest: nothing can be isolated
            return -0.5;
        }
        -(2f64.powf(-mean_path / norm))
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new(IsolationForestConfig::default())
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, data: &[Vec<f64>]) -> ModelResult<()> {
        let n_features = validate_matrix(data, COMPONENT)?;

        if self.config.n_estimators == 0 || self.config.max_samples == 0 {
            return Err(ModelError::InvalidParameter(
                "isolation forest needs n_estimators > 0 and max_samples > 0".to_string(),
            ));
        }
        if let Contamination::Fixed(c) = self.config.contamination {
            if !(c > 0.0 && c <= 0.5) {
                return Err(ModelError::InvalidParameter(format!(
                    "contamination must be in (0, 0.5], got {}",
                    c
                )));
            }
        }

        let n = data.len();
        let psi = self.config.max_samples.min(n);
        let max_depth = (psi.max(2) as f64).log2().ceil() as usize;
        let seed = self.config.seed;

        log::debug!(
            "Fitting isolation forest: {} trees, {} rows, psi={}, max_depth={}",
            self.config.n_estimators, n, psi, max_depth
        );

        let trees: Vec<IsolationTree> = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
                let rows = sample(&mut rng, n, psi).into_vec();
                IsolationTree::build(data, rows, max_depth, &mut rng)
            })
            .collect();

        // Build aside, then swap in
        let mut fitted = IsolationForest {
            config: self.config.clone(),
            trees,
            psi,
            n_features,
            offset: -0.5,
        };

        if let Contamination::Fixed(c) = fitted.config.contamination {
            let mut scores: Vec<f64> = data.iter().map(|row| fitted.raw_score(row)).collect();
            scores.sort_by(|a, b| a.total_cmp(b));
            fitted.offset = percentile(&scores, c * 100.0);
        }

        *self = fitted;
        Ok(())
    }

    fn score_samples(&self, x: &[f64]) -> ModelResult<f64> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        check_width(x, self.n_features)?;
        Ok(self.raw_score(x))
    }

    fn offset(&self) -> ModelResult<f64> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        Ok(self.offset)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

/// Linear-interpolated percentile of sorted values (`q` in [0, 100])
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                vec![(t * 0.37).sin(), (t * 0.11).cos(), ((t * 0.73).sin() * 0.5)]
            })
            .collect()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        let c256 = average_path_length(256);
        assert!(c256 > 10.0 && c256 < 11.0, "c(256) = {}", c256);
    }

    #[test]
    fn test_unfitted_forest_rejects_scoring() {
        let forest = IsolationForest::default();
        assert!(forest.score_samples(&[0.0, 0.0, 0.0]).unwrap_err().is_unfitted());
        assert!(forest.predict(&[0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_outlier_scores_lower_than_inlier() {
        let data = cluster(300);
        let mut forest = IsolationForest::default();
        forest.fit(&data).unwrap();

        let inlier = forest.score_samples(&[0.0, 0.0, 0.0]).unwrap();
        let outlier = forest.score_samples(&[8.0, -9.0, 7.0]).unwrap();

        assert!(outlier < inlier, "outlier {} inlier {}", outlier, inlier);
        assert!((-1.0..0.0).contains(&outlier));
        assert_eq!(forest.predict(&[8.0, -9.0, 7.0]).unwrap(), -1);
    }

    #[test]
    fn test_fit_is_deterministic_under_seed() {
        let data = cluster(120);
        let mut a = IsolationForest::default();
        let mut b = IsolationForest::default();
        a.fit(&data).unwrap();
        b.fit(&data).unwrap();

        for row in data.iter().take(10) {
            assert_eq!(a.score_samples(row).unwrap(), b.score_samples(row).unwrap());
        }
    }

    #[test]
    fn test_fixed_contamination_flags_expected_share() {
        let data = cluster(200);
        let mut forest = IsolationForest::new(IsolationForestConfig {
            contamination: Contamination::Fixed(0.1),
            ..Default::default()
        });
        forest.fit(&data).unwrap();

        let flagged = data.iter().filter(|row| forest.predict(row).unwrap() == -1).count();
        assert!((10..=30).contains(&flagged), "flagged {}", flagged);
    }

    #[test]
    fn test_invalid_contamination() {
        let mut forest = IsolationForest::new(IsolationForestConfig {
            contamination: Contamination::Fixed(0.9),
            ..Default::default()
        });
        assert!(matches!(forest.fit(&cluster(20)), Err(ModelError::InvalidParameter(_))));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn test_constant_data_does_not_panic() {
        let data = vec![vec![1.0, 1.0]; 15];
        let mut forest = IsolationForest::default();
        forest.fit(&data).unwrap();
        let score = forest.score_samples(&[1.0, 1.0]).unwrap();
        assert!(score.is_finite());
    }

    #[test]
    fn test_width_mismatch() {
        let mut forest = IsolationForest::default();
        forest.fit(&cluster(20)).unwrap();
        assert!(matches!(
            forest.score_samples(&[1.0]),
            Err(ModelError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn test_extreme_magnitudes_fit() {
        // hi - lo overflows f64 while both ends stay finite
        let data: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![if i % 2 == 0 { 1.5e308 } else { -1.5e308 }, (i % 3) as f64])
            .collect();
        let mut forest = IsolationForest::default();
        forest.fit(&data).unwrap();

        for row in &data {
            let score = forest.score_samples(row).unwrap();
            assert!(score.is_finite() && score < 0.0, "score {}", score);
        }
    }
}
