//! One-shot evaluation of a judgment snapshot: matrix, weights, consistency.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consistency::{check_consistency_labeled, ConsistencyConfig, ConsistencyReport};
use crate::judgment::{ItemSet, PairJudgment};
use crate::matrix::{build_matrix, ComparisonMatrix, MatrixError};
use crate::priority::{ComputationError, PowerIterationConfig, PriorityMethod, PriorityVector};

#[derive(Debug, Error, PartialEq)]
pub enum EvaluateError {
    /// The inputs were rejected before any computation ran.
    #[error("invalid input: {0}")]
    Input(#[from] MatrixError),
    /// Derivation failed numerically; distinct from an inconsistent verdict.
    #[error("computation failed: {0}")]
    Computation(#[from] ComputationError),
}

impl EvaluateError {
    pub fn is_computation_failure(&self) -> bool {
        matches!(self, EvaluateError::Computation(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub method: PriorityMethod,
    pub power_iteration: PowerIterationConfig,
    pub consistency: ConsistencyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub items: ItemSet,
    pub matrix: ComparisonMatrix,
    pub priorities: PriorityVector,
    /// 1-based rank per item.
    pub ranks: Vec<usize>,
    pub consistency: ConsistencyReport,
    /// Pairs without a judgment; they entered the matrix as 1.
    pub missing_pairs: Vec<(usize, usize)>,
}

impl Evaluation {
    /// `(label, weight)` from best to worst.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        self.priorities
            .order()
            .into_iter()
            .filter_map(|idx| Some((self.items.label(idx)?, self.priorities.weights[idx])))
            .collect()
    }

    /// Weight of the item labelled `label`.
    pub fn weight_of(&self, label: &str) -> Option<f64> {
        let idx = self.items.index_of(label)?;
        self.priorities.weights.get(idx).copied()
    }
}

/// Build the matrix, derive priorities and check consistency.
///
/// `judgments` is a snapshot; pairs missing from it count as equal and are
/// listed in [`Evaluation::missing_pairs`] so the caller can decide whether a
/// partial set is acceptable.
pub fn finalize(
    items: &ItemSet,
    judgments: &[PairJudgment],
    cfg: &EvaluationConfig,
) -> Result<Evaluation, EvaluateError> {
    let n = items.len();
    let matrix = build_matrix(n, judgments)?;

    let missing_pairs: Vec<(usize, usize)> = items
        .pairs()
        .into_iter()
        .filter(|&(i, j)| {
            !judgments
                .iter()
                .any(|pj| (pj.i, pj.j) == (i, j) || (pj.j, pj.i) == (i, j))
        })
        .collect();
    if !missing_pairs.is_empty() {
        debug!(
            missing = missing_pairs.len(),
            total = n * (n - 1) / 2,
            "finalizing with unjudged pairs"
        );
    }

    evaluate_matrix(items, matrix, missing_pairs, cfg)
}

/// Evaluate an already assembled matrix for `items`.
pub fn evaluate_matrix(
    items: &ItemSet,
    matrix: ComparisonMatrix,
    missing_pairs: Vec<(usize, usize)>,
    cfg: &EvaluationConfig,
) -> Result<Evaluation, EvaluateError> {
    if items.len() < 2 {
        return Err(MatrixError::TooFewItems { n: items.len() }.into());
    }
    if matrix.n() != items.len() {
        return Err(MatrixError::SizeMismatch {
            expected: items.len(),
            got: matrix.n(),
        }
        .into());
    }

    let priorities = cfg.method.estimate(&matrix, &cfg.power_iteration)?;
    let consistency =
        check_consistency_labeled(&matrix, &priorities, Some(items.labels()), &cfg.consistency)?;
    let ranks = priorities.ranks();
    debug!(
        method = ?priorities.method,
        cr = consistency.cr,
        consistent = consistency.is_consistent,
        "evaluation complete"
    );

    Ok(Evaluation {
        items: items.clone(),
        matrix,
        priorities,
        ranks,
        consistency,
        missing_pairs,
    })
}
