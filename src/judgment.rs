//! Items, elicited judgments, and the per-pair judgment ledger.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scale::ScaleFamily;

/// How refined an elicitation was.
///
/// 0 = not sure, 1 = direction only (transient), 3 = coarse, 8 = medium,
/// 2..=8 = number of fine gradations used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Reliability(u8);

impl Reliability {
    pub const NOT_SURE: Reliability = Reliability(0);
    pub const DIRECTION_ONLY: Reliability = Reliability(1);
    pub const COARSE: Reliability = Reliability(3);
    pub const MEDIUM: Reliability = Reliability(8);

    /// Any level a session can hold, `0..=8`.
    pub fn new(value: u8) -> Result<Self, JudgmentError> {
        if value > Self::MEDIUM.0 {
            return Err(JudgmentError::ReliabilityOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Reliability recorded for a fine selection among `count` gradations.
    pub(crate) fn gradations(count: u8) -> Reliability {
        Reliability(count)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Whether a completed elicitation may carry this reliability.
    pub fn is_terminal(self) -> bool {
        matches!(self.0, 0 | 2..=8)
    }
}

impl TryFrom<u8> for Reliability {
    type Error = JudgmentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Reliability::new(value)
    }
}

impl From<Reliability> for u8 {
    fn from(reliability: Reliability) -> Self {
        reliability.0
    }
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of eliciting one ordered pair `(first, second)`.
///
/// Deserialized judgments go through [`Judgment::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JudgmentRecord")]
pub struct Judgment {
    /// `> 1` first preferred, `< 1` second preferred, `1` indifferent.
    pub ratio: f64,
    pub reliability: Reliability,
    /// `None` exactly when the expert was not sure.
    pub scale: Option<ScaleFamily>,
}

#[derive(Deserialize)]
struct JudgmentRecord {
    ratio: f64,
    reliability: Reliability,
    scale: Option<ScaleFamily>,
}

impl TryFrom<JudgmentRecord> for Judgment {
    type Error = JudgmentError;

    fn try_from(record: JudgmentRecord) -> Result<Self, Self::Error> {
        Judgment::new(record.ratio, record.reliability, record.scale)
    }
}

impl Judgment {
    /// Judgment from an external source, checked like an elicited one.
    ///
    /// The ratio must be finite and positive, the reliability terminal, and
    /// the scale absent exactly for a not-sure judgment (whose ratio is 1).
    pub fn new(
        ratio: f64,
        reliability: Reliability,
        scale: Option<ScaleFamily>,
    ) -> Result<Self, JudgmentError> {
        if !reliability.is_terminal() {
            return Err(JudgmentError::NonTerminalReliability {
                value: reliability.value(),
            });
        }
        let not_sure = reliability == Reliability::NOT_SURE;
        if scale.is_none() != not_sure {
            return Err(JudgmentError::ScaleMismatch {
                reliability: reliability.value(),
            });
        }
        if !ratio.is_finite() || ratio <= 0.0 || (not_sure && ratio != 1.0) {
            return Err(JudgmentError::InvalidRatio { ratio });
        }
        Ok(Self {
            ratio,
            reliability,
            scale,
        })
    }

    /// Ratio 1, reliability 0, no scale.
    pub fn not_sure() -> Self {
        Self {
            ratio: 1.0,
            reliability: Reliability::NOT_SURE,
            scale: None,
        }
    }

    pub fn is_not_sure(&self) -> bool {
        self.reliability == Reliability::NOT_SURE
    }

    /// The same judgment seen from the other item's side.
    pub fn reversed(self) -> Self {
        Self {
            ratio: if self.ratio != 0.0 {
                1.0 / self.ratio
            } else {
                self.ratio
            },
            ..self
        }
    }
}

/// A judgment attached to item indices `(i, j)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairJudgment {
    pub i: usize,
    pub j: usize,
    pub judgment: Judgment,
}

impl PairJudgment {
    pub fn new(i: usize, j: usize, judgment: Judgment) -> Self {
        Self { i, j, judgment }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("item label at index {index} is empty")]
    EmptyLabel { index: usize },
    #[error("duplicate item label: {label}")]
    DuplicateLabel { label: String },
}

/// Ordered set of unique item labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ItemSet {
    labels: Vec<String>,
}

impl ItemSet {
    /// Validate labels: none blank, none repeated.
    pub fn new<I, S>(labels: I) -> Result<Self, ItemError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(labels.len());
        for (index, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(ItemError::EmptyLabel { index });
            }
            if !seen.insert(label.as_str()) {
                return Err(ItemError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of item `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Position of `label`, if present.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn pairs(&self) -> Vec<(usize, usize)> {
        list_pairs(self.labels.len())
    }
}

impl TryFrom<Vec<String>> for ItemSet {
    type Error = ItemError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        ItemSet::new(labels)
    }
}

impl From<ItemSet> for Vec<String> {
    fn from(items: ItemSet) -> Self {
        items.labels
    }
}

/// All unordered index pairs `i < j`, ordered by `i` then `j`.
pub fn list_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            out.push((i, j));
        }
    }
    out
}

#[derive(Debug, Error, PartialEq)]
pub enum JudgmentError {
    #[error("pair ({i}, {j}) references an item outside 0..{n}")]
    IndexOutOfRange { i: usize, j: usize, n: usize },
    #[error("item {index} cannot be compared with itself")]
    SelfComparison { index: usize },
    #[error("pair ({i}, {j}) appears more than once")]
    DuplicatePair { i: usize, j: usize },
    #[error("reliability {value} is outside 0..=8")]
    ReliabilityOutOfRange { value: u8 },
    #[error("reliability {value} cannot end an elicitation")]
    NonTerminalReliability { value: u8 },
    #[error("reliability {reliability} does not match the presence of a scale family")]
    ScaleMismatch { reliability: u8 },
    #[error("invalid judgment ratio {ratio}")]
    InvalidRatio { ratio: f64 },
}

/// One judgment per unordered pair; re-recording a pair replaces it.
///
/// Entries are stored under `(min, max)`; a judgment recorded as `(j, i)` is
/// reversed before storing. Serializes as the item count plus a pair list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JudgmentSetRecord", into = "JudgmentSetRecord")]
pub struct JudgmentSet {
    n: usize,
    entries: BTreeMap<(usize, usize), Judgment>,
}

#[derive(Serialize, Deserialize)]
struct JudgmentSetRecord {
    n: usize,
    judgments: Vec<PairJudgment>,
}

impl TryFrom<JudgmentSetRecord> for JudgmentSet {
    type Error = JudgmentError;

    fn try_from(record: JudgmentSetRecord) -> Result<Self, Self::Error> {
        let mut set = JudgmentSet::new(record.n);
        for pj in record.judgments {
            if set.record(pj.i, pj.j, pj.judgment)?.is_some() {
                return Err(JudgmentError::DuplicatePair { i: pj.i, j: pj.j });
            }
        }
        Ok(set)
    }
}

impl From<JudgmentSet> for JudgmentSetRecord {
    fn from(set: JudgmentSet) -> Self {
        Self {
            judgments: set.to_vec(),
            n: set.n,
        }
    }
}

impl JudgmentSet {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: BTreeMap::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.n
    }

    fn key(&self, i: usize, j: usize) -> Result<(usize, usize), JudgmentError> {
        if i >= self.n || j >= self.n {
            return Err(JudgmentError::IndexOutOfRange { i, j, n: self.n });
        }
        if i == j {
            return Err(JudgmentError::SelfComparison { index: i });
        }
        Ok((i.min(j), i.max(j)))
    }

    /// Record a judgment for `(i, j)`, returning the one it replaced.
    pub fn record(
        &mut self,
        i: usize,
        j: usize,
        judgment: Judgment,
    ) -> Result<Option<Judgment>, JudgmentError> {
        let key = self.key(i, j)?;
        let stored = if i < j { judgment } else { judgment.reversed() };
        Ok(self.entries.insert(key, stored))
    }

    /// Judgment for `(i, j)` oriented as asked.
    pub fn get(&self, i: usize, j: usize) -> Option<Judgment> {
        let key = self.key(i, j).ok()?;
        let stored = *self.entries.get(&key)?;
        Some(if i < j { stored } else { stored.reversed() })
    }

    pub fn remove(&mut self, i: usize, j: usize) -> Option<Judgment> {
        let key = self.key(i, j).ok()?;
        self.entries.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.len() == self.n * self.n.saturating_sub(1) / 2
    }

    pub fn missing_pairs(&self) -> Vec<(usize, usize)> {
        list_pairs(self.n)
            .into_iter()
            .filter(|key| !self.entries.contains_key(key))
            .collect()
    }

    /// Snapshot in pair order, suitable for `build_matrix` / `finalize`.
    pub fn to_vec(&self) -> Vec<PairJudgment> {
        self.entries
            .iter()
            .map(|(&(i, j), &judgment)| PairJudgment { i, j, judgment })
            .collect()
    }
}

/// Medium-reliability Integer-scale judgment for fixtures.
#[cfg(test)]
pub(crate) fn judged(i: usize, j: usize, ratio: f64) -> PairJudgment {
    PairJudgment::new(
        i,
        j,
        Judgment {
            ratio,
            reliability: Reliability::MEDIUM,
            scale: Some(ScaleFamily::Integer),
        },
    )
}
