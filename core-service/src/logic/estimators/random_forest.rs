//! Random Forest - Bagged CART classifiers

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision_tree::{DecisionTreeClassifier, TreeConfig};
use super::{check_width, normalize, validate_labeled, Classifier};
use crate::logic::error::{ModelError, ModelResult};

const COMPONENT: &str = "random forest";

/// Random Forest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Max features per split (sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 12,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    config: ForestConfig,
    trees: Vec<DecisionTreeClassifier>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForestClassifier {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn bootstrap_rows(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(0..n)).collect()
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, data: &[Vec<f64>], labels: &[u8]) -> ModelResult<()> {
        let n_features = validate_labeled(data, labels, COMPONENT)?;
        if self.config.n_estimators == 0 {
            return Err(ModelError::InvalidParameter("random forest needs n_estimators > 0".to_string()));
        }

        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);
        let n = data.len();

        log::debug!(
            "Fitting random forest: {} trees, {} rows, {} features (max_features={})",
            self.config.n_estimators, n, n_features, max_features
        );

        // Build trees in parallel
        let trees: Vec<DecisionTreeClassifier> = (0..self.config.n_estimators)
            .into_par_iter()
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let mut tree = DecisionTreeClassifier::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                });

                let rows = if self.config.bootstrap {
                    Self::bootstrap_rows(n, seed)
                } else {
                    (0..n).collect()
                };

                tree.fit_rows(data, labels, &rows).map(|_| tree)
            })
            .collect::<ModelResult<_>>()?;

        // Aggregate feature importances
        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, imp) in importances.iter_mut().zip(tree.importances()) {
                *total += imp;
            }
        }
        normalize(&mut importances);

        self.trees = trees;
        self.n_features = n_features;
        self.feature_importances = importances;
        Ok(())
    }

    /// Mean of the trees' leaf probabilities
    fn predict_proba(&self, x: &[f64]) -> ModelResult<[f64; 2]> {
        if !self.is_fitted() {
            return Err(ModelError::unfitted(COMPONENT));
        }
        check_width(x, self.n_features)?;

        let p = self.trees.iter().map(|t| t.leaf_proba(x)).sum::<f64>() / self.trees.len() as f64;
        Ok([1.0 - p, p])
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> (Vec<Vec<f64>>, Vec<u8>) {
        let data: Vec<Vec<f64>> = (0..200)
            .map(|i| {
                let x = i as f64 / 20.0;
                vec![x, ((i * 7) % 13) as f64]
            })
            .collect();
        let labels = data.iter().map(|r| u8::from(r[0] > 5.0)).collect();
        (data, labels)
    }

    #[test]
    fn test_random_forest_classification() {
        let (data, labels) = dataset();
        let mut forest = RandomForestClassifier::new(ForestConfig {
            n_estimators: 20,
            ..Default::default()
        });
        forest.fit(&data, &labels).unwrap();

        assert_eq!(forest.n_trees(), 20);
        assert!(forest.predict_proba(&[9.0, 3.0]).unwrap()[1] > 0.8);
        assert!(forest.predict_proba(&[1.0, 3.0]).unwrap()[1] < 0.2);

        let importances = forest.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances[0] > importances[1]);
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (data, labels) = dataset();
        let mut forest = RandomForestClassifier::new(ForestConfig { n_estimators: 10, ..Default::default() });
        forest.fit(&data, &labels).unwrap();

        let [p0, p1] = forest.predict_proba(&[5.0, 1.0]).unwrap();
        assert!((p0 + p1 - 1.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&p1));
    }

    #[test]
    fn test_deterministic_under_seed() {
        let (data, labels) = dataset();
        let mut a = RandomForestClassifier::new(ForestConfig { n_estimators: 8, ..Default::default() });
        let mut b = RandomForestClassifier::new(ForestConfig { n_estimators: 8, ..Default::default() });
        a.fit(&data, &labels).unwrap();
        b.fit(&data, &labels).unwrap();

        for row in data.iter().step_by(17) {
            assert_eq!(a.predict_proba(row).unwrap(), b.predict_proba(row).unwrap());
        }
    }

    #[test]
    fn test_unfitted_forest() {
        let forest = RandomForestClassifier::default();
        assert!(forest.predict_proba(&[1.0, 2.0]).unwrap_err().is_unfitted());
    }

    #[test]
    fn test_label_mismatch() {
        let mut forest = RandomForestClassifier::default();
        let err = forest.fit(&[vec![1.0], vec![2.0]], &[0]).unwrap_err();
        assert!(matches!(err, ModelError::LabelMismatch { rows: 2, labels: 1 }));
    }

    #[test]
    fn test_adjacent_float_split_survives_serde() {
        let a = 1.0 + f64::EPSILON;
        let b = 1.0 + 2.0 * f64::EPSILON;
        let data = vec![vec![a], vec![a], vec![b], vec![b]];
        let config = ForestConfig { n_estimators: 5, bootstrap: false, ..Default::default() };
        let mut forest = RandomForestClassifier::new(config);
        forest.fit(&data, &[0, 0, 1, 1]).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForestClassifier = serde_json::from_str(&json).unwrap();
        for x in [a, b, 2.0] {
            let p = forest.predict_proba(&[x]).unwrap();
            assert!(p.iter().all(|v| v.is_finite()));
            assert_eq!(p, restored.predict_proba(&[x]).unwrap());
        }
        assert_eq!(forest.predict(&[b]).unwrap(), 1);
    }
}
