//! Decision Tree - CART classifier (gini impurity)

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{check_width, normalize, split_threshold, validate_labeled, Classifier};
use crate::logic::error::{ModelError, ModelResult};

const COMPONENT: &str = "decision tree";

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider per split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for feature sampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    /// Positive-class probability of the training rows that reached it
    Leaf { proba: f64, n_samples: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// Best split candidate for one node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity_decrease: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    config: TreeConfig,
    nodes: Vec<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl DecisionTreeClassifier {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Fit on a subset of rows (bootstrap draws may repeat indices)
    pub fn fit_rows(&mut self, data: &[Vec<f64>], labels: &[u8], rows: &[usize]) -> ModelResult<()> {
        let n_features = validate_labeled(data, labels, COMPONENT)?;
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset { component: COMPONENT });
        }

        let mut builder = TreeBuilder {
            config: &self.config,
            data,
            labels,
            n_features,
            total: rows.len() as f64,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
            rng: ChaCha8Rng::seed_from_u64(self.config.seed),
        };
        builder.grow(rows.to_vec(), 0);

        let TreeBuilder { nodes, mut importances, .. } = builder;
        normalize(&mut importances);

        self.nodes = nodes;
        self.n_features = n_features;
        self.feature_importances = importances;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], id: usize) -> usize {
            match &nodes[id] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, TreeNode::Leaf { .. })).count()
    }

    /// Raw importances (normalized per tree)
    pub(crate) fn importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Positive-class probability without validation (caller checked width)
    pub(crate) fn leaf_proba(&self, x: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { proba, .. } => return *proba,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, data: &[Vec<f64>], labels: &[u8]) -> ModelResult<()> {
        let rows: Vec<usize> = (0..data.len()).collect();
        self.fit_rows(data, labels, &rows)
    }

    fn predict_proba(&self, x: &[f64]) -> ModelResult<[f64; 2]> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        check_width(x, self.n_features)?;
        let p = self.leaf_proba(x);
        Ok([1.0 - p, p])
    }

    fn feature_importances(&self) -> ModelResult<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        Ok(self.feature_importances.clone())
    }

    fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

struct TreeBuilder<'a> {
    config: &'a TreeConfig,
    data: &'a [Vec<f64>],
    labels: &'a [u8],
    n_features: usize,
    /// Row count at the root, for weighting impurity decrease
    total: f64,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
    rng: ChaCha8Rng,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let n = rows.len();
        let positives = rows.iter().filter(|&&r| self.labels[r] == 1).count();
        let proba = if n == 0 { 0.0 } else { positives as f64 / n as f64 };

        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { proba, n_samples: n });

        let impurity = gini(positives as f64, n as f64);
        if depth >= self.config.max_depth
            || n < self.config.min_samples_split.max(2)
            || impurity <= 1e-12
        {
            return id;
        }

        let Some(split) = self.best_split(&rows, positives, impurity) else {
            return id;
        };

        self.importances[split.feature] += split.impurity_decrease * n as f64 / self.total;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.data[r][split.feature] <= split.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    /// Sorted sweep per candidate feature, midpoint thresholds
    fn best_split(&mut self, rows: &[usize], positives: usize, impurity: f64) -> Option<SplitCandidate> {
        let n = rows.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let max_features = self.config.max_features.unwrap_or(self.n_features).clamp(1, self.n_features);

        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut self.rng);
        features.truncate(max_features);

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for feature in features {
            sorted.sort_by(|&a, &b| self.data[a][feature].total_cmp(&self.data[b][feature]));

            let mut left_pos = 0usize;
            for i in 0..n - 1 {
                left_pos += usize::from(self.labels[sorted[i]] == 1);

                let current = self.data[sorted[i]][feature];
                let next = self.data[sorted[i + 1]][feature];
                let n_left = i + 1;
                let n_right = n - n_left;

                if next <= current || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * gini(left_pos as f64, n_left as f64)
                    + n_right as f64 * gini((positives - left_pos) as f64, n_right as f64))
                    / n as f64;
                let decrease = impurity - weighted;

                if decrease > best.as_ref().map_or(1e-12, |b| b.impurity_decrease) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: split_threshold(current, next),
                        impurity_decrease: decrease,
                    });
                }
            }
        }

        best
    }
}

fn gini(positives: f64, n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    let p = positives / n;
    2.0 * p * (1.0 - p)
}
