//! Priority (weight) derivation from a comparison matrix.
//!
//! Two interchangeable estimators sit behind [`PriorityEstimator`]:
//! - principal eigenvector (power iteration on the positive matrix)
//! - row geometric mean (log space)
//!
//! Both return weights that are non-negative and sum to 1. They agree exactly
//! on consistent matrices and closely, but not bit-for-bit, otherwise.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matrix::ComparisonMatrix;

#[derive(Debug, Error, PartialEq)]
pub enum ComputationError {
    #[error("comparison matrix is empty")]
    EmptyMatrix,
    #[error("row {row} of the comparison matrix has no positive entry")]
    ZeroRow { row: usize },
    #[error("matrix entry ({i}, {j}) is not positive: {value}")]
    NonPositiveEntry { i: usize, j: usize, value: f64 },
    #[error("{stage} produced a non-finite or degenerate result")]
    NonFinite { stage: &'static str },
    #[error("power iteration did not converge after {iterations} iterations (l1 delta {l1_delta})")]
    NotConverged { iterations: usize, l1_delta: f64 },
    #[error("weight vector has {got} entries but the matrix has {expected} rows")]
    LengthMismatch { expected: usize, got: usize },
    #[error("weight for item {index} is not positive: {weight}")]
    NonPositiveWeight { index: usize, weight: f64 },
}

/// Which estimator to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityMethod {
    #[default]
    Eigenvector,
    GeometricMean,
}

impl PriorityMethod {
    pub fn estimate(
        self,
        matrix: &ComparisonMatrix,
        cfg: &PowerIterationConfig,
    ) -> Result<PriorityVector, ComputationError> {
        match self {
            PriorityMethod::Eigenvector => EigenvectorEstimator::new(cfg.clone()).estimate(matrix),
            PriorityMethod::GeometricMean => GeometricMeanEstimator.estimate(matrix),
        }
    }
}

/// Power-iteration settings for the eigenvector estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerIterationConfig {
    /// L1 change between iterates that counts as converged.
    pub tolerance: f64,
    /// Iteration cap; exceeding it is a computation failure.
    pub max_iterations: usize,
}

impl Default for PowerIterationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10_000,
        }
    }
}

/// Normalized weights, one per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityVector {
    pub weights: Vec<f64>,
    pub method: PriorityMethod,
    /// Perron root found by the eigenvector estimator.
    #[serde(default)]
    pub principal_eigenvalue: Option<f64>,
    #[serde(default)]
    pub iterations: Option<usize>,
}

impl PriorityVector {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Item indices from highest to lowest weight; ties keep index order.
    pub fn order(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.weights.len()).collect();
        idx.sort_by(|&a, &b| {
            self.weights[b]
                .total_cmp(&self.weights[a])
                .then_with(|| a.cmp(&b))
        });
        idx
    }

    /// 1-based rank of each item.
    pub fn ranks(&self) -> Vec<usize> {
        let mut ranks = vec![0; self.weights.len()];
        for (pos, idx) in self.order().into_iter().enumerate() {
            ranks[idx] = pos + 1;
        }
        ranks
    }
}

/// A strategy turning a comparison matrix into a priority vector.
pub trait PriorityEstimator {
    fn method(&self) -> PriorityMethod;

    fn estimate(&self, matrix: &ComparisonMatrix) -> Result<PriorityVector, ComputationError>;
}

/// Principal right eigenvector via power iteration.
///
/// A positive matrix has a simple, real, strictly dominant eigenvalue
/// (Perron root), which is also the eigenvalue with the largest real part,
/// so power iteration from the uniform vector converges to it.
#[derive(Debug, Clone, Default)]
pub struct EigenvectorEstimator {
    pub config: PowerIterationConfig,
}

impl EigenvectorEstimator {
    pub fn new(config: PowerIterationConfig) -> Self {
        Self { config }
    }
}

impl PriorityEstimator for EigenvectorEstimator {
    fn method(&self) -> PriorityMethod {
        PriorityMethod::Eigenvector
    }

    fn estimate(&self, matrix: &ComparisonMatrix) -> Result<PriorityVector, ComputationError> {
        validate_positive(matrix)?;
        let m = matrix.as_matrix();
        let n = matrix.n();

        let mut v = DVector::from_element(n, 1.0 / n as f64);
        let mut l1_delta = f64::INFINITY;
        for iter in 1..=self.config.max_iterations {
            let mut next = m * &v;
            // `v` sums to 1, so the mass of `M v` estimates the eigenvalue.
            let lambda: f64 = next.iter().sum();
            if !lambda.is_finite() || lambda <= 0.0 {
                return Err(ComputationError::NonFinite {
                    stage: "power iteration",
                });
            }
            next /= lambda;

            l1_delta = next.iter().zip(v.iter()).map(|(a, b)| (a - b).abs()).sum();
            v = next;
            if l1_delta <= self.config.tolerance {
                debug!(iterations = iter, lambda, "eigenvector converged");
                let weights = normalize(v.iter().map(|x| x.abs()), "eigenvector")?;
                return Ok(PriorityVector {
                    weights,
                    method: PriorityMethod::Eigenvector,
                    principal_eigenvalue: Some(lambda),
                    iterations: Some(iter),
                });
            }
        }

        warn!(
            iterations = self.config.max_iterations,
            l1_delta, "eigenvector power iteration did not converge"
        );
        Err(ComputationError::NotConverged {
            iterations: self.config.max_iterations,
            l1_delta,
        })
    }
}

/// Row geometric means, normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricMeanEstimator;

impl PriorityEstimator for GeometricMeanEstimator {
    fn method(&self) -> PriorityMethod {
        PriorityMethod::GeometricMean
    }

    fn estimate(&self, matrix: &ComparisonMatrix) -> Result<PriorityVector, ComputationError> {
        validate_positive(matrix)?;
        let m = matrix.as_matrix();
        let n = matrix.n();

        let ln_means: Vec<f64> = (0..n)
            .map(|i| m.row(i).iter().map(|x| x.ln()).sum::<f64>() / n as f64)
            .collect();
        let max_ln = ln_means
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, |a, b| a.max(b));
        let weights = normalize(ln_means.iter().map(|s| (s - max_ln).exp()), "geometric mean")?;
        Ok(PriorityVector {
            weights,
            method: PriorityMethod::GeometricMean,
            principal_eigenvalue: None,
            iterations: None,
        })
    }
}

/// Eigenvector priorities with default settings.
pub fn derive_priorities(matrix: &ComparisonMatrix) -> Result<PriorityVector, ComputationError> {
    EigenvectorEstimator::default().estimate(matrix)
}

/// Geometric-mean priorities.
pub fn geometric_mean_priorities(
    matrix: &ComparisonMatrix,
) -> Result<PriorityVector, ComputationError> {
    GeometricMeanEstimator.estimate(matrix)
}

fn validate_positive(matrix: &ComparisonMatrix) -> Result<(), ComputationError> {
    let n = matrix.n();
    if n == 0 {
        return Err(ComputationError::EmptyMatrix);
    }
    for i in 0..n {
        if (0..n).all(|j| matrix.get(i, j) <= 0.0) {
            return Err(ComputationError::ZeroRow { row: i });
        }
    }
    for i in 0..n {
        for j in 0..n {
            let value = matrix.get(i, j);
            if !value.is_finite() || value <= 0.0 {
                return Err(ComputationError::NonPositiveEntry { i, j, value });
            }
        }
    }
    Ok(())
}

fn normalize(
    values: impl Iterator<Item = f64>,
    stage: &'static str,
) -> Result<Vec<f64>, ComputationError> {
    let values: Vec<f64> = values.collect();
    let total: f64 = values.iter().sum();
    if !total.is_finite() || total <= 0.0 || values.iter().any(|v| !v.is_finite()) {
        return Err(ComputationError::NonFinite { stage });
    }
    Ok(values.into_iter().map(|v| v / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consistent(weights: &[f64]) -> ComparisonMatrix {
        let rows: Vec<Vec<f64>> = weights
            .iter()
            .map(|wi| weights.iter().map(|wj| wi / wj).collect())
            .collect();
        ComparisonMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn eigenvector_recovers_consistent_weights() {
        let truth = [0.5, 0.3, 0.2];
        let p = derive_priorities(&consistent(&truth)).unwrap();
        for (w, t) in p.weights.iter().zip(truth) {
            assert!((w - t).abs() < 1e-9);
        }
        let lambda = p.principal_eigenvalue.unwrap();
        assert!((lambda - 3.0).abs() < 1e-9);
    }

    #[test]
    fn both_estimators_agree_on_consistent_matrix() {
        let m = consistent(&[4.0, 2.0, 1.0, 1.0]);
        let ev = derive_priorities(&m).unwrap();
        let gm = geometric_mean_priorities(&m).unwrap();
        assert_eq!(gm.method, PriorityMethod::GeometricMean);
        for (a, b) in ev.weights.iter().zip(&gm.weights) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn methods_are_selectable_through_the_enum() {
        let m = consistent(&[2.0, 1.0]);
        let cfg = PowerIterationConfig::default();
        for method in [PriorityMethod::Eigenvector, PriorityMethod::GeometricMean] {
            let p = method.estimate(&m, &cfg).unwrap();
            assert_eq!(p.method, method);
            assert!((p.weights[0] - 2.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ranks_follow_descending_weight() {
        let p = PriorityVector {
            weights: vec![0.2, 0.5, 0.2, 0.1],
            method: PriorityMethod::Eigenvector,
            principal_eigenvalue: None,
            iterations: None,
        };
        assert_eq!(p.order(), vec![1, 0, 2, 3]);
        assert_eq!(p.ranks(), vec![2, 1, 3, 4]);
    }

    #[test]
    fn zero_row_is_a_computation_failure() {
        let m = ComparisonMatrix::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert_eq!(
            derive_priorities(&m),
            Err(ComputationError::ZeroRow { row: 0 })
        );
        assert_eq!(
            geometric_mean_priorities(&m),
            Err(ComputationError::ZeroRow { row: 0 })
        );
    }

    #[test]
    fn zero_entry_is_a_computation_failure() {
        let m = ComparisonMatrix::from_rows(&[vec![1.0, 0.0], vec![1.0, 1.0]]).unwrap();
        assert!(matches!(
            derive_priorities(&m),
            Err(ComputationError::NonPositiveEntry { i: 0, j: 1, .. })
        ));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let m = ComparisonMatrix::from_rows(&[]).unwrap();
        assert_eq!(derive_priorities(&m), Err(ComputationError::EmptyMatrix));
    }

    #[test]
    fn iteration_cap_is_reported() {
        let m = ComparisonMatrix::from_rows(&[
            vec![1.0, 3.0, 7.0],
            vec![1.0 / 3.0, 1.0, 5.0],
            vec![1.0 / 7.0, 1.0 / 5.0, 1.0],
        ])
        .unwrap();
        let estimator = EigenvectorEstimator::new(PowerIterationConfig {
            tolerance: 0.0,
            max_iterations: 1,
        });
        assert!(matches!(
            estimator.estimate(&m),
            Err(ComputationError::NotConverged { iterations: 1, .. })
        ));
    }
}
