//! Ordinal-to-cardinal scale transforms.
//!
//! An expert answers "how much more" on the classic 1..9 verbal scale. The
//! grade is ordinal; the families here turn it into a ratio that can go into a
//! reciprocal comparison matrix. All of them map grade 1 to ratio 1 and are
//! strictly increasing on `[1, 9]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest valid ordinal grade ("Equally").
pub const MIN_GRADE: f64 = 1.0;
/// Highest valid ordinal grade ("Extremely").
pub const MAX_GRADE: f64 = 9.0;

/// Bounds of the virtual scale that option positions are spread over.
const UNIFIED_LOW: f64 = 1.5;
const UNIFIED_HIGH: f64 = 9.5;

/// Verbal labels for grades 1..=9.
pub const GRADE_LABELS: [&str; 9] = [
    "Equally",
    "Weakly or slightly",
    "Moderately",
    "Moderately plus",
    "Strongly",
    "Strongly plus",
    "Very strongly",
    "Very, very strongly",
    "Extremely",
];

/// Smallest and largest number of fine gradations an expert may pick.
pub const MIN_GRADATIONS: u8 = 2;
pub const MAX_GRADATIONS: u8 = 8;

/// Grade digits displayed for each fine gradation count (index = count - 2).
const GRADATION_DIGITS: [&str; 7] = [
    "25", "259", "3579", "23579", "234579", "2345679", "23456789",
];

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("grade {grade} is outside [1, 9]")]
    GradeOutOfRange { grade: f64 },
    #[error("gradation count {count} is outside [2, 8]")]
    GradationCountOutOfRange { count: u8 },
}

/// The five supported grade-to-ratio transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleFamily {
    /// `f(g) = g`.
    #[default]
    Integer,
    /// `f(g) = (0.5 + (g-1)/20) / (0.5 - (g-1)/20)`.
    Balanced,
    /// `f(g) = 9^((g-1)/8)`.
    Power,
    /// `f(g) = 9 / (10 - g)`.
    MaZheng,
    /// `f(g) = exp(atanh((g-1)/14 * sqrt(3)))`.
    DoneganDoddMcMaster,
}

impl ScaleFamily {
    pub const ALL: [ScaleFamily; 5] = [
        ScaleFamily::Integer,
        ScaleFamily::Balanced,
        ScaleFamily::Power,
        ScaleFamily::MaZheng,
        ScaleFamily::DoneganDoddMcMaster,
    ];

    /// Human-readable family name.
    pub fn name(self) -> &'static str {
        match self {
            ScaleFamily::Integer => "Integer",
            ScaleFamily::Balanced => "Balanced",
            ScaleFamily::Power => "Power",
            ScaleFamily::MaZheng => "Ma-Zheng",
            ScaleFamily::DoneganDoddMcMaster => "Donegan-Dodd-McMaster",
        }
    }

    /// Map a grade in `[1, 9]` to a cardinal ratio.
    ///
    /// Grades outside the domain (including NaN) are rejected, never clamped.
    pub fn transform(self, grade: f64) -> Result<f64, ScaleError> {
        if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
            return Err(ScaleError::GradeOutOfRange { grade });
        }
        Ok(self.ratio(grade))
    }

    /// Same as [`transform`](Self::transform) for callers that already hold
    /// a grade inside the domain (option positions always land in `[2, 9]`).
    pub(crate) fn ratio(self, grade: f64) -> f64 {
        let x = grade - 1.0;
        match self {
            ScaleFamily::Integer => grade,
            ScaleFamily::Balanced => (0.5 + x * 0.05) / (0.5 - x * 0.05),
            ScaleFamily::Power => 9f64.powf(x / 8.0),
            ScaleFamily::MaZheng => 9.0 / (9.0 + 1.0 - grade),
            ScaleFamily::DoneganDoddMcMaster => (x / 14.0 * 3f64.sqrt()).atanh().exp(),
        }
    }
}

/// Spread `count` options evenly over the virtual `[1.5, 9.5]` scale and
/// return the grade at 1-based `position`.
///
/// The result always lies in `[1.5 + 4/count, 9.5 - 4/count]`, inside `[1, 9]`.
pub fn unified_grade(position: usize, count: usize) -> f64 {
    UNIFIED_LOW + (position as f64 - 0.5) * (UNIFIED_HIGH - UNIFIED_LOW) / count as f64
}

/// Verbal label for an integer grade, if it is in `1..=9`.
pub fn grade_label(grade: u8) -> Option<&'static str> {
    match grade {
        1..=9 => Some(GRADE_LABELS[usize::from(grade) - 1]),
        _ => None,
    }
}

/// Grade digits shown when the expert asks for `count` fine gradations.
pub fn gradation_digits(count: u8) -> Result<&'static [u8], ScaleError> {
    if !(MIN_GRADATIONS..=MAX_GRADATIONS).contains(&count) {
        return Err(ScaleError::GradationCountOutOfRange { count });
    }
    Ok(fine_digits(count))
}

/// Table lookup for a count already known to be in `2..=8`.
pub(crate) fn fine_digits(count: u8) -> &'static [u8] {
    GRADATION_DIGITS[usize::from(count - MIN_GRADATIONS)].as_bytes()
}

/// Decode one ASCII grade digit.
pub(crate) fn digit_grade(digit: u8) -> u8 {
    digit - b'0'
}
