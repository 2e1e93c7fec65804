//! Estimators Module - Trainable statistical models
//!
//! Two seams, one per model family:
//! - `AnomalyDetector`: unsupervised, produces an outlier score
//! - `Classifier`: supervised, binary class probabilities
//!
//! Every estimator is serde-serializable and deterministic under its seed.

pub mod isolation_forest;
pub mod decision_tree;
pub mod random_forest;
pub mod gradient_boosting;

pub use isolation_forest::{IsolationForest, IsolationForestConfig, Contamination};
pub use decision_tree::{DecisionTreeClassifier, TreeConfig};
pub use random_forest::{RandomForestClassifier, ForestConfig};
pub use gradient_boosting::{GradientBoostingClassifier, BoostingConfig};

use crate::logic::error::{ModelError, ModelResult};

// ============================================================================
// ANOMALY DETECTOR TRAIT
// ============================================================================

pub trait AnomalyDetector {
    /// Fit on unlabeled rows
    fn fit(&mut self, data: &[Vec<f64>]) -> ModelResult<()>;

    /// Raw score, lower = more abnormal
    fn score_samples(&self, x: &[f64]) -> ModelResult<f64>;

    /// Threshold subtracted from `score_samples` by `decision_function`
    fn offset(&self) -> ModelResult<f64>;

    fn is_fitted(&self) -> bool;

    /// Negative = outlier
    fn decision_function(&self, x: &[f64]) -> ModelResult<f64> {
        Ok(self.score_samples(x)? - self.offset()?)
    }

    /// -1 for outliers, 1 for inliers
    fn predict(&self, x: &[f64]) -> ModelResult<i8> {
        Ok(if self.decision_function(x)? < 0.0 { -1 } else { 1 })
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

pub trait Classifier {
    /// Fit on rows with binary labels (0/1)
    fn fit(&mut self, data: &[Vec<f64>], labels: &[u8]) -> ModelResult<()>;

    /// `[P(class 0), P(class 1)]`
    fn predict_proba(&self, x: &[f64]) -> ModelResult<[f64; 2]>;

    /// Normalized per-feature weights (sum to 1 when any split was made)
    fn feature_importances(&self) -> ModelResult<Vec<f64>>;

    fn is_fitted(&self) -> bool;

    fn predict(&self, x: &[f64]) -> ModelResult<u8> {
        Ok(u8::from(self.predict_proba(x)?[1] >= 0.5))
    }
}

// ============================================================================
// SHARED VALIDATION
// ============================================================================

/// Check a training matrix: non-empty, rectangular, finite. Returns width.
pub(crate) fn validate_matrix(data: &[Vec<f64>], component: &'static str) -> ModelResult<usize> {
    let n_features = data
        .first()
        .map(|row| row.len())
        .ok_or(ModelError::EmptyDataset { component })?;

    if n_features == 0 {
        return Err(ModelError::InvalidParameter(format!("{} needs at least one feature", component)));
    }

    for row in data {
        if row.len() != n_features {
            return Err(ModelError::DimensionMismatch { expected: n_features, actual: row.len() });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidParameter(format!(
                "{} training data contains non-finite values",
                component
            )));
        }
    }

    Ok(n_features)
}

/// `validate_matrix` plus label checks
pub(crate) fn validate_labeled(
    data: &[Vec<f64>],
    labels: &[u8],
    component: &'static str,
) -> ModelResult<usize> {
    let n_features = validate_matrix(data, component)?;

    if labels.len() != data.len() {
        return Err(ModelError::LabelMismatch { rows: data.len(), labels: labels.len() });
    }
    if let Some(bad) = labels.iter().find(|&&l| l > 1) {
        return Err(ModelError::InvalidParameter(format!(
            "{} expects binary labels, found {}",
            component, bad
        )));
    }

    Ok(n_features)
}

/// Check an inference row against the fitted width
pub(crate) fn check_width(x: &[f64], expected: usize) -> ModelResult<()> {
    if x.len() != expected {
        return Err(ModelError::DimensionMismatch { expected, actual: x.len() });
    }
    Ok(())
}

/// Midpoint between two sorted, distinct values. Falls back to `current`
/// when the midpoint rounds up to `next` (adjacent floats) so that `<=`
/// still separates the two.
pub(crate) fn split_threshold(current: f64, next: f64) -> f64 {
    let mid = current / 2.0 + next / 2.0;
    if mid.is_finite() && mid < next {
        mid
    } else {
        current
    }
}

/// Scale importances so they sum to 1 (left as-is when all zero)
pub(crate) fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_matrix() {
        assert!(matches!(validate_matrix(&[], "t"), Err(ModelError::EmptyDataset { .. })));
        assert!(matches!(
            validate_matrix(&[vec![1.0, 2.0], vec![1.0]], "t"),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(validate_matrix(&[vec![f64::NAN]], "t").is_err());
        assert_eq!(validate_matrix(&[vec![1.0, 2.0]], "t").unwrap(), 2);
    }

    #[test]
    fn test_validate_labeled() {
        let data = vec![vec![1.0], vec![2.0]];
        assert!(matches!(
            validate_labeled(&data, &[1], "t"),
            Err(ModelError::LabelMismatch { rows: 2, labels: 1 })
        ));
        assert!(validate_labeled(&data, &[0, 2], "t").is_err());
        assert!(validate_labeled(&data, &[0, 1], "t").is_ok());
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![1.0, 3.0];
        normalize(&mut v);
        assert_eq!(v, vec![0.25, 0.75]);

        let mut zeros = vec![0.0, 0.0];
        normalize(&mut zeros);
        assert_eq!(zeros, vec![0.0, 0.0]);
    }

    #[test]
    fn test_split_threshold() {
        assert_eq!(split_threshold(1.0, 3.0), 2.0);
        assert_eq!(split_threshold(-f64::MAX, f64::MAX), 0.0);

        // Adjacent floats: the midpoint may round up to `next`
        let a = 1.0 + f64::EPSILON;
        let b = 1.0 + 2.0 * f64::EPSILON;
        let t = split_threshold(a, b);
        assert!(t >= a && t < b, "threshold {}", t);
    }
}
