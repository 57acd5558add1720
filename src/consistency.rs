//! Consistency measurement: λmax, CI, CR and advisory hints.

use serde::{Deserialize, Serialize};

use crate::matrix::ComparisonMatrix;
use crate::priority::{ComputationError, PriorityVector};

/// Saaty's Random Index for n = 1..=15.
pub const RANDOM_INDEX: [f64; 15] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

/// Random Index used for matrices larger than the table.
pub const RANDOM_INDEX_FALLBACK: f64 = 1.49;

/// CR at or below this value is considered consistent.
pub const DEFAULT_CR_THRESHOLD: f64 = 0.10;

pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        1..=15 => RANDOM_INDEX[n - 1],
        _ => RANDOM_INDEX_FALLBACK,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// Maximum acceptable consistency ratio.
    pub threshold: f64,
    /// How many of the most deviant pairs to name in recommendations.
    pub max_pair_hints: usize,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CR_THRESHOLD,
            max_pair_hints: 3,
        }
    }
}

/// How far one judged ratio sits from the ratio implied by the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairDeviation {
    pub i: usize,
    pub j: usize,
    pub judged: f64,
    /// `w_i / w_j`.
    pub implied: f64,
    /// `|ln(judged / implied)|`.
    pub log_deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub lambda_max: f64,
    pub ci: f64,
    pub cr: f64,
    pub is_consistent: bool,
    pub threshold: f64,
    pub recommendations: Vec<String>,
    /// Upper-triangle pairs, largest deviation first.
    pub deviations: Vec<PairDeviation>,
}

/// `mean_i((M·w)_i / w_i)`.
pub fn lambda_max(matrix: &ComparisonMatrix, weights: &[f64]) -> Result<f64, ComputationError> {
    let n = matrix.n();
    if n == 0 {
        return Err(ComputationError::EmptyMatrix);
    }
    if weights.len() != n {
        return Err(ComputationError::LengthMismatch {
            expected: n,
            got: weights.len(),
        });
    }
    if let Some((index, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
        return Err(ComputationError::NonPositiveWeight { index, weight });
    }

    let mut total = 0.0;
    for (i, &wi) in weights.iter().enumerate() {
        let row: f64 = (0..n).map(|j| matrix.get(i, j) * weights[j]).sum();
        total += row / wi;
    }
    let lambda = total / n as f64;
    if !lambda.is_finite() {
        return Err(ComputationError::NonFinite {
            stage: "lambda_max",
        });
    }
    Ok(lambda)
}

/// `(λmax - n) / (n - 1)`, or 0 for `n <= 1`.
///
/// λmax >= n holds for positive reciprocal matrices, so negative results are
/// rounding noise and come back as 0.
pub fn consistency_index(lambda_max: f64, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    ((lambda_max - n as f64) / (n as f64 - 1.0)).max(0.0)
}

/// `CI / RI(n)`, or 0 for `n <= 2`.
pub fn consistency_ratio(ci: f64, n: usize) -> f64 {
    if n <= 2 {
        return 0.0;
    }
    let ri = random_index(n);
    if ri > 0.0 {
        ci / ri
    } else {
        0.0
    }
}

/// Per-pair deviation between judgments and fitted weights.
pub fn pair_deviations(matrix: &ComparisonMatrix, weights: &[f64]) -> Vec<PairDeviation> {
    let n = matrix.n().min(weights.len());
    let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let judged = matrix.get(i, j);
            let implied = weights[i] / weights[j];
            let log_deviation = (judged / implied).ln().abs();
            if log_deviation.is_finite() {
                out.push(PairDeviation {
                    i,
                    j,
                    judged,
                    implied,
                    log_deviation,
                });
            }
        }
    }
    out.sort_by(|a, b| {
        b.log_deviation
            .total_cmp(&a.log_deviation)
            .then_with(|| (a.i, a.j).cmp(&(b.i, b.j)))
    });
    out
}

/// Check a matrix against the weights derived from it.
pub fn check_consistency(
    matrix: &ComparisonMatrix,
    priorities: &PriorityVector,
    cfg: &ConsistencyConfig,
) -> Result<ConsistencyReport, ComputationError> {
    check_consistency_labeled(matrix, priorities, None, cfg)
}

/// Like [`check_consistency`], naming items by label in recommendations.
pub fn check_consistency_labeled(
    matrix: &ComparisonMatrix,
    priorities: &PriorityVector,
    labels: Option<&[String]>,
    cfg: &ConsistencyConfig,
) -> Result<ConsistencyReport, ComputationError> {
    let n = matrix.n();
    let lambda = lambda_max(matrix, &priorities.weights)?;
    let ci = consistency_index(lambda, n);
    let cr = consistency_ratio(ci, n);
    let is_consistent = cr <= cfg.threshold;
    let deviations = pair_deviations(matrix, &priorities.weights);

    let name = |idx: usize| -> String {
        labels
            .and_then(|l| l.get(idx))
            .cloned()
            .unwrap_or_else(|| format!("item {idx}"))
    };

    let mut recommendations = Vec::new();
    if is_consistent {
        recommendations.push(format!(
            "Judgments are consistent (CR = {cr:.4} <= {:.2})",
            cfg.threshold
        ));
    } else {
        recommendations.push(format!(
            "Consistency ratio CR = {cr:.4} exceeds the threshold {:.2}",
            cfg.threshold
        ));
        recommendations.push("Review the pairwise judgments".to_string());
        for dev in deviations.iter().take(cfg.max_pair_hints) {
            recommendations.push(format!(
                "Reconsider {} vs {}: judged {:.2}, weights imply {:.2}",
                name(dev.i),
                name(dev.j),
                dev.judged,
                dev.implied
            ));
        }
    }

    Ok(ConsistencyReport {
        lambda_max: lambda,
        ci,
        cr,
        is_consistent,
        threshold: cfg.threshold,
        recommendations,
        deviations,
    })
}
