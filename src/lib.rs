#![forbid(unsafe_code)]

//! # ahp-elicit
//!
//! Pairwise judgment elicitation and the AHP priority kernel.
//!
//! An expert compares two items at a time through a progressive disclosure
//! protocol: pick a side, narrow the magnitude, optionally size a finer
//! strip. Each completed comparison becomes a ratio on one of five scale
//! families plus a reliability recording how far the refinement went.
//! Ratios fill a reciprocal matrix; priority weights come from its principal
//! eigenvector (or row geometric means) and the consistency ratio tells the
//! expert whether the judgments hang together.
//!
//! Everything is synchronous and owned by the caller. Logging goes through
//! `tracing`; install a subscriber to see it.

pub mod consistency;
pub mod elicitation;
pub mod evaluate;
pub mod judgment;
pub mod matrix;
pub mod priority;
pub mod scale;
pub mod survey;

pub use consistency::{
    check_consistency, check_consistency_labeled, random_index, ConsistencyConfig,
    ConsistencyReport, PairDeviation,
};
pub use elicitation::{
    Action, Direction, Display, ElicitationError, ElicitationSession, GradationCount, Level,
    MediumToken, OptionCell, OptionKind, Step, Transition,
};
pub use evaluate::{finalize, EvaluateError, Evaluation, EvaluationConfig};
pub use judgment::{
    list_pairs, ItemError, ItemSet, Judgment, JudgmentError, JudgmentSet, PairJudgment,
    Reliability,
};
pub use matrix::{build_matrix, ComparisonMatrix, MatrixError};
pub use priority::{
    derive_priorities, geometric_mean_priorities, ComputationError, EigenvectorEstimator,
    GeometricMeanEstimator, PowerIterationConfig, PriorityEstimator, PriorityMethod,
    PriorityVector,
};
pub use scale::{unified_grade, ScaleError, ScaleFamily};
pub use survey::{PairPrompt, PairwiseSurvey, Progress, SurveyError, SurveyStep};
