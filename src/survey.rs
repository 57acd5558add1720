//! Pair-by-pair survey: walks every unordered pair once and keeps the latest
//! judgment for each.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::elicitation::{Action, Display, ElicitationError, ElicitationSession, Step};
use crate::evaluate::{finalize, EvaluateError, Evaluation, EvaluationConfig};
use crate::judgment::{ItemSet, Judgment, JudgmentError, JudgmentSet, PairJudgment};
use crate::scale::ScaleFamily;

#[derive(Debug, Error, PartialEq)]
pub enum SurveyError {
    #[error("a survey needs at least 2 items, got {n}")]
    TooFewItems { n: usize },
    #[error("every pair has been visited")]
    Finished,
    #[error("inconsistent survey snapshot: {reason}")]
    InvalidSnapshot { reason: &'static str },
    #[error(transparent)]
    Elicitation(#[from] ElicitationError),
    #[error(transparent)]
    Judgment(#[from] JudgmentError),
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
}

/// The pair currently being asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPrompt {
    /// 1-based position in the survey.
    pub index: usize,
    pub total: usize,
    pub i: usize,
    pub j: usize,
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Pairs already passed, judged or skipped.
    pub visited: usize,
    pub judged: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurveyStep {
    Continuing(Display),
    Recorded {
        pair: (usize, usize),
        judgment: Judgment,
        /// `None` once the last pair has been visited.
        next: Option<PairPrompt>,
    },
}

/// Restored snapshots are checked against the item set before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurveyRecord")]
pub struct PairwiseSurvey {
    items: ItemSet,
    pairs: Vec<(usize, usize)>,
    cursor: usize,
    judgments: JudgmentSet,
    session: ElicitationSession,
}

#[derive(Deserialize)]
struct SurveyRecord {
    items: ItemSet,
    pairs: Vec<(usize, usize)>,
    cursor: usize,
    judgments: JudgmentSet,
    session: ElicitationSession,
}

impl TryFrom<SurveyRecord> for PairwiseSurvey {
    type Error = SurveyError;

    fn try_from(record: SurveyRecord) -> Result<Self, Self::Error> {
        let n = record.items.len();
        if n < 2 {
            return Err(SurveyError::TooFewItems { n });
        }
        if record.pairs != record.items.pairs() {
            return Err(SurveyError::InvalidSnapshot {
                reason: "pair order does not match the item set",
            });
        }
        if record.cursor > record.pairs.len() {
            return Err(SurveyError::InvalidSnapshot {
                reason: "cursor is past the last pair",
            });
        }
        if record.judgments.item_count() != n {
            return Err(SurveyError::InvalidSnapshot {
                reason: "judgments cover a different number of items",
            });
        }
        Ok(Self {
            items: record.items,
            pairs: record.pairs,
            cursor: record.cursor,
            judgments: record.judgments,
            session: record.session,
        })
    }
}

impl PairwiseSurvey {
    /// Survey over every pair of `items`, starting at `(0, 1)`.
    pub fn new(items: ItemSet, scale: ScaleFamily) -> Result<Self, SurveyError> {
        let n = items.len();
        if n < 2 {
            return Err(SurveyError::TooFewItems { n });
        }
        let pairs = items.pairs();
        info!(items = n, pairs = pairs.len(), scale = scale.name(), "survey started");
        Ok(Self {
            items,
            pairs,
            cursor: 0,
            judgments: JudgmentSet::new(n),
            session: ElicitationSession::new(scale),
        })
    }

    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn session(&self) -> &ElicitationSession {
        &self.session
    }

    pub fn display(&self) -> Display {
        self.session.display()
    }

    pub fn set_scale(&mut self, scale: ScaleFamily) -> Display {
        self.session.set_scale(scale)
    }

    pub fn current_pair(&self) -> Option<PairPrompt> {
        self.prompt_at(self.cursor)
    }

    fn prompt_at(&self, cursor: usize) -> Option<PairPrompt> {
        let &(i, j) = self.pairs.get(cursor)?;
        Some(PairPrompt {
            index: cursor + 1,
            total: self.pairs.len(),
            i,
            j,
            first: self.items.label(i)?.to_string(),
            second: self.items.label(j)?.to_string(),
        })
    }

    /// Feed one action to the current pair's session.
    ///
    /// When the session emits a judgment it is recorded for the pair,
    /// replacing any earlier one, and the survey moves on.
    pub fn apply(&mut self, action: Action) -> Result<SurveyStep, SurveyError> {
        let &(i, j) = self.pairs.get(self.cursor).ok_or(SurveyError::Finished)?;
        match self.session.apply(action)? {
            Step::Continuing(display) => Ok(SurveyStep::Continuing(display)),
            Step::Done(judgment) => {
                if self.judgments.record(i, j, judgment)?.is_some() {
                    debug!(i, j, "replaced earlier judgment");
                }
                self.cursor += 1;
                Ok(SurveyStep::Recorded {
                    pair: (i, j),
                    judgment,
                    next: self.current_pair(),
                })
            }
        }
    }

    /// Move past the current pair without judging it; it stays at 1.
    pub fn skip(&mut self) -> Result<Option<PairPrompt>, SurveyError> {
        let &(i, j) = self.pairs.get(self.cursor).ok_or(SurveyError::Finished)?;
        debug!(i, j, "pair skipped");
        self.session.reset();
        self.cursor += 1;
        Ok(self.current_pair())
    }

    /// Return to the previous pair and discard its judgment.
    ///
    /// No-op on the first pair.
    pub fn back(&mut self) -> Option<PairPrompt> {
        self.session.reset();
        if let Some(prev) = self.cursor.checked_sub(1) {
            self.cursor = prev;
            if let Some(&(i, j)) = self.pairs.get(prev) {
                self.judgments.remove(i, j);
            }
        }
        self.current_pair()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            visited: self.cursor,
            judged: self.judgments.len(),
            total: self.pairs.len(),
        }
    }

    /// Whether every pair carries a judgment.
    pub fn is_complete(&self) -> bool {
        self.judgments.is_complete()
    }

    pub fn judgment_set(&self) -> &JudgmentSet {
        &self.judgments
    }

    pub fn judgments(&self) -> Vec<PairJudgment> {
        self.judgments.to_vec()
    }

    pub fn finalize(&self, cfg: &EvaluationConfig) -> Result<Evaluation, SurveyError> {
        Ok(finalize(&self.items, &self.judgments(), cfg)?)
    }
}
