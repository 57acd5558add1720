//! Reciprocal pairwise comparison matrix.

use std::collections::HashSet;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::judgment::PairJudgment;

/// Tolerance used when checking `M[i][j] * M[j][i] == 1`.
pub const RECIPROCITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("at least 2 items are required, got {n}")]
    TooFewItems { n: usize },
    #[error("pair ({i}, {j}) references an item outside 0..{n}")]
    IndexOutOfRange { i: usize, j: usize, n: usize },
    #[error("item {index} cannot be compared with itself")]
    SelfComparison { index: usize },
    #[error("pair ({i}, {j}) was judged more than once")]
    DuplicatePair { i: usize, j: usize },
    #[error("invalid ratio for pair ({i}, {j}): {ratio}")]
    InvalidRatio { i: usize, j: usize, ratio: f64 },
    #[error("matrix is not square: row {row} has {got} entries, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("matrix entry ({i}, {j}) is not a finite non-negative number: {value}")]
    InvalidEntry { i: usize, j: usize, value: f64 },
    #[error("matrix has {got} rows but there are {expected} items")]
    SizeMismatch { expected: usize, got: usize },
}

/// Square matrix of pairwise ratios.
///
/// Matrices produced by [`build_matrix`] are positive and reciprocal.
/// Matrices loaded with [`ComparisonMatrix::from_rows`] are only checked for
/// shape and finite non-negative entries; the estimators reject the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ComparisonMatrix {
    values: DMatrix<f64>,
}

impl ComparisonMatrix {
    /// All-ones matrix: every pair judged equal.
    pub fn neutral(n: usize) -> Self {
        Self {
            values: DMatrix::from_element(n, n, 1.0),
        }
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let n = rows.len();
        let mut values = DMatrix::<f64>::zeros(n, n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(MatrixError::NotSquare {
                    row: i,
                    expected: n,
                    got: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(MatrixError::InvalidEntry { i, j, value });
                }
                values[(i, j)] = value;
            }
        }
        Ok(Self { values })
    }

    pub fn n(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.values.nrows())
            .map(|r| self.values.row(r).iter().copied().collect())
            .collect()
    }

    /// Positive entries, unit diagonal, and `M[i][j] * M[j][i] == 1`.
    pub fn is_positive_reciprocal(&self, tol: f64) -> bool {
        let n = self.n();
        for i in 0..n {
            if (self.values[(i, i)] - 1.0).abs() > tol {
                return false;
            }
            for j in (i + 1)..n {
                let a = self.values[(i, j)];
                let b = self.values[(j, i)];
                if a <= 0.0 || b <= 0.0 || (a * b - 1.0).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    fn set_pair(&mut self, i: usize, j: usize, ratio: f64) {
        self.values[(i, j)] = ratio;
        self.values[(j, i)] = 1.0 / ratio;
    }
}

impl TryFrom<Vec<Vec<f64>>> for ComparisonMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        ComparisonMatrix::from_rows(&rows)
    }
}

impl From<ComparisonMatrix> for Vec<Vec<f64>> {
    fn from(matrix: ComparisonMatrix) -> Self {
        matrix.rows()
    }
}

/// Assemble the reciprocal matrix for `n` items from elicited judgments.
///
/// Unjudged pairs stay at 1. A ratio of exactly 0 is stored as 1 on both
/// sides and reported with a warning; it cannot come out of a scale
/// transform and points at a caller bug.
pub fn build_matrix(n: usize, judgments: &[PairJudgment]) -> Result<ComparisonMatrix, MatrixError> {
    if n < 2 {
        return Err(MatrixError::TooFewItems { n });
    }

    let mut matrix = ComparisonMatrix::neutral(n);
    let mut seen = HashSet::with_capacity(judgments.len());
    for pj in judgments {
        let (i, j) = (pj.i, pj.j);
        if i >= n || j >= n {
            return Err(MatrixError::IndexOutOfRange { i, j, n });
        }
        if i == j {
            return Err(MatrixError::SelfComparison { index: i });
        }
        if !seen.insert((i.min(j), i.max(j))) {
            return Err(MatrixError::DuplicatePair { i, j });
        }
        let ratio = pj.judgment.ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(MatrixError::InvalidRatio { i, j, ratio });
        }
        if ratio == 0.0 {
            warn!(i, j, "zero ratio in judgment; treating pair as equal");
            matrix.set_pair(i, j, 1.0);
            continue;
        }
        matrix.set_pair(i, j, ratio);
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::judged;

    #[test]
    fn builds_known_three_item_matrix() {
        let judgments = vec![
            judged(0, 1, 3.0),
            judged(0, 2, 7.0),
            judged(1, 2, 5.0),
        ];
        let m = build_matrix(3, &judgments).unwrap();
        let expected = [
            [1.0, 3.0, 7.0],
            [1.0 / 3.0, 1.0, 5.0],
            [1.0 / 7.0, 1.0 / 5.0, 1.0],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                assert!((m.get(i, j) - v).abs() < 1e-12);
            }
        }
        assert!(m.is_positive_reciprocal(RECIPROCITY_TOLERANCE));
    }

    #[test]
    fn reversed_pair_orientation_is_respected() {
        let m = build_matrix(2, &[judged(1, 0, 4.0)]).unwrap();
        assert_eq!(m.get(1, 0), 4.0);
        assert_eq!(m.get(0, 1), 0.25);
    }

    #[test]
    fn unjudged_pairs_stay_neutral() {
        let m = build_matrix(3, &[judged(0, 1, 2.0)]).unwrap();
        assert_eq!(m.get(0, 2), 1.0);
        assert_eq!(m.get(2, 1), 1.0);
    }

    #[test]
    fn zero_ratio_is_neutralized() {
        let m = build_matrix(2, &[judged(0, 1, 0.0)]).unwrap();
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn rejects_domain_violations() {
        assert_eq!(build_matrix(1, &[]), Err(MatrixError::TooFewItems { n: 1 }));
        assert!(matches!(
            build_matrix(3, &[judged(0, 3, 2.0)]),
            Err(MatrixError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            build_matrix(3, &[judged(1, 1, 2.0)]),
            Err(MatrixError::SelfComparison { index: 1 })
        ));
        assert!(matches!(
            build_matrix(
                3,
                &[judged(0, 1, 2.0), judged(1, 0, 0.5)]
            ),
            Err(MatrixError::DuplicatePair { .. })
        ));
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                build_matrix(2, &[judged(0, 1, bad)]),
                Err(MatrixError::InvalidRatio { .. })
            ));
        }
    }

    #[test]
    fn from_rows_validates_shape_and_entries() {
        assert!(matches!(
            ComparisonMatrix::from_rows(&[vec![1.0, 2.0], vec![0.5]]),
            Err(MatrixError::NotSquare { row: 1, .. })
        ));
        assert!(matches!(
            ComparisonMatrix::from_rows(&[vec![1.0, f64::NAN], vec![1.0, 1.0]]),
            Err(MatrixError::InvalidEntry { i: 0, j: 1, .. })
        ));
        let m = ComparisonMatrix::from_rows(&[vec![1.0, 2.0], vec![0.5, 1.0]]).unwrap();
        assert_eq!(m.rows(), vec![vec![1.0, 2.0], vec![0.5, 1.0]]);
    }
}
