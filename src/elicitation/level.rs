//! Disclosure levels and the actions that move between them.

use serde::{Deserialize, Serialize};

use crate::scale::{self, ScaleError, MAX_GRADATIONS, MIN_GRADATIONS};

/// Which item of the pair the expert leans towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The first item (`i`) is preferred: the "More" side.
    FirstPreferred,
    /// The second item (`j`) is preferred: the "Less" side. Ratios are inverted.
    SecondPreferred,
}

impl Direction {
    /// Orient a raw ratio `>= 1` so that it reads as `M[i][j]`.
    pub fn orient(self, raw: f64) -> f64 {
        match self {
            Direction::FirstPreferred => raw,
            Direction::SecondPreferred => 1.0 / raw,
        }
    }
}

/// The three medium-level grade strips.
///
/// Together their active positions cover one unified 8-point scale:
/// `Low` holds grades 2,3,4, `Middle` 5,6,7 and `High` 8,9. The remaining
/// digits on each strip are group placeholders standing for a sibling strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediumToken {
    /// "23459": reached from the "weakly" coarse bucket.
    Low,
    /// "25679": reached from the "strongly" coarse bucket.
    Middle,
    /// "2589": reached from the "extremely" coarse bucket.
    High,
}

impl MediumToken {
    /// Strip for the 1-based coarse bucket `p`.
    pub fn from_bucket(bucket: usize) -> Option<MediumToken> {
        match bucket {
            1 => Some(MediumToken::Low),
            2 => Some(MediumToken::Middle),
            3 => Some(MediumToken::High),
            _ => None,
        }
    }

    /// Coarse bucket this strip belongs to.
    pub fn bucket(self) -> usize {
        match self {
            MediumToken::Low => 1,
            MediumToken::Middle => 2,
            MediumToken::High => 3,
        }
    }

    /// Grade digits printed on the strip, in position order.
    pub fn digits(self) -> &'static [u8] {
        match self {
            MediumToken::Low => b"23459",
            MediumToken::Middle => b"25679",
            MediumToken::High => b"2589",
        }
    }

    /// Shift from a strip position to its place on the unified 8-point scale.
    pub fn offset(self) -> usize {
        match self {
            MediumToken::Low => 0,
            MediumToken::Middle => 2,
            MediumToken::High => 4,
        }
    }

    /// Whether `position` holds a grade of this strip rather than a placeholder.
    pub fn is_active(self, position: usize) -> bool {
        match self {
            MediumToken::Low => (1..=3).contains(&position),
            MediumToken::Middle => (2..=4).contains(&position),
            MediumToken::High => (3..=4).contains(&position),
        }
    }

    /// Sibling strip a grouped position jumps to. `None` for active positions.
    pub fn jump_target(self, position: usize) -> Option<MediumToken> {
        if self.is_active(position) {
            return None;
        }
        let digit = *self.digits().get(position.checked_sub(1)?)?;
        match digit {
            b'2' => Some(MediumToken::Low),
            b'5' => Some(MediumToken::Middle),
            b'9' => Some(MediumToken::High),
            _ => None,
        }
    }

    /// Grades summed into a group placeholder's share of the strip.
    pub(crate) fn group_grades(self) -> &'static [f64] {
        match self {
            MediumToken::Low => &[2.0, 3.0, 4.0],
            MediumToken::Middle => &[5.0, 6.0, 7.0],
            MediumToken::High => &[8.0, 9.0],
        }
    }

    /// Working value held while this strip is displayed.
    pub fn coarse_value(self) -> f64 {
        scale::unified_grade(self.bucket(), 3)
    }
}

/// Number of fine gradations, always within `2..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GradationCount(u8);

impl GradationCount {
    pub fn new(count: u8) -> Result<Self, ScaleError> {
        if !(MIN_GRADATIONS..=MAX_GRADATIONS).contains(&count) {
            return Err(ScaleError::GradationCountOutOfRange { count });
        }
        Ok(Self(count))
    }

    /// Number of options on the strip.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Grade digits printed on the fine strip.
    pub fn digits(self) -> &'static [u8] {
        scale::fine_digits(self.0)
    }
}

impl TryFrom<u8> for GradationCount {
    type Error = ScaleError;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        GradationCount::new(count)
    }
}

impl From<GradationCount> for u8 {
    fn from(count: GradationCount) -> Self {
        count.0
    }
}

/// Active disclosure level of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// No direction chosen yet.
    Undecided,
    /// Three buckets: weakly / strongly / extremely.
    Coarse,
    /// Five- or four-digit strip with group placeholders.
    Medium(MediumToken),
    /// User-sized strip of 2..=8 gradations.
    Fine(GradationCount),
}

impl Level {
    /// Grade digits displayed at this level, in position order.
    pub fn digits(self) -> &'static [u8] {
        match self {
            Level::Undecided => b"",
            Level::Coarse => b"259",
            Level::Medium(token) => token.digits(),
            Level::Fine(count) => count.digits(),
        }
    }

    /// Number of displayed options; the base for gradation steps.
    pub fn option_count(self) -> usize {
        self.digits().len()
    }
}

/// One discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Pick (or flip) the preferred side.
    Choose(Direction),
    /// Click the option at this 1-based position of the current display.
    Select(usize),
    /// Give up on this pair.
    NotSure,
    /// One more fine gradation (wheel up).
    IncreaseGradations,
    /// One fewer fine gradation (wheel down).
    DecreaseGradations,
    /// Jump straight to this many fine gradations.
    SetGradations(u8),
}
