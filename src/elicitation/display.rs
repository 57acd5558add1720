//! Rendering contract for the presentation layer.
//!
//! A [`Display`] is everything a UI may read to draw the current option
//! strip. It never exposes the transition rules themselves.

use serde::{Deserialize, Serialize};

use crate::judgment::Reliability;
use crate::scale::{self, ScaleFamily};

use super::level::{Direction, Level, MediumToken};

/// What clicking an option does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Moves to a finer level (coarse buckets).
    Advance,
    /// Completes the judgment.
    Final,
    /// Group placeholder: switches to a sibling medium strip.
    Jump(MediumToken),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCell {
    /// 1-based position, as passed to `Action::Select`.
    pub position: usize,
    /// Grade digit printed on the option.
    pub grade: u8,
    pub label: String,
    pub kind: OptionKind,
    /// Ratio of the value selecting this option produces, oriented by the
    /// chosen direction. For `Final` options it is the ratio that gets recorded.
    pub preview_ratio: f64,
    /// Proportional width of the option within the strip (shares sum to 1).
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub level: Level,
    pub direction: Option<Direction>,
    pub scale: ScaleFamily,
    pub working_value: f64,
    pub working_reliability: Reliability,
    /// Ratio the working value would finalize to; `None` before a direction.
    pub preview_ratio: Option<f64>,
    pub options: Vec<OptionCell>,
}

impl Display {
    pub fn option(&self, position: usize) -> Option<&OptionCell> {
        self.options.iter().find(|cell| cell.position == position)
    }

    pub fn gradation_count(&self) -> Option<u8> {
        match self.level {
            Level::Fine(count) => Some(count.get()),
            _ => None,
        }
    }

    pub(crate) fn render(
        level: Level,
        direction: Option<Direction>,
        family: ScaleFamily,
        working_value: f64,
        working_reliability: Reliability,
    ) -> Self {
        let orient = |raw: f64| direction.map_or(raw, |d| d.orient(raw));
        let preview_ratio = direction.map(|d| d.orient(family.ratio(working_value)));

        let digits = level.digits();
        let count = digits.len();
        let mut options = Vec::with_capacity(count);
        let mut weight_sum = 0.0;
        for (idx, &digit) in digits.iter().enumerate() {
            let position = idx + 1;
            let grade = scale::digit_grade(digit);
            // `value` is the working value (or final grade) the click produces.
            let (kind, value, weight) = match level {
                Level::Undecided => continue,
                Level::Coarse => {
                    let value = scale::unified_grade(position, count);
                    (OptionKind::Advance, value, family.ratio(value))
                }
                Level::Medium(token) => match token.jump_target(position) {
                    Some(target) => (
                        OptionKind::Jump(target),
                        target.coarse_value(),
                        target.group_grades().iter().map(|&g| family.ratio(g)).sum::<f64>(),
                    ),
                    None => {
                        let value = scale::unified_grade(position + token.offset(), 8);
                        (OptionKind::Final, value, family.ratio(value))
                    }
                },
                Level::Fine(_) => {
                    let value = scale::unified_grade(position, count);
                    (OptionKind::Final, value, family.ratio(value))
                }
            };
            weight_sum += weight;
            options.push(OptionCell {
                position,
                grade,
                label: scale::grade_label(grade).unwrap_or_default().to_string(),
                kind,
                preview_ratio: orient(family.ratio(value)),
                share: weight,
            });
        }
        if weight_sum > 0.0 {
            for cell in &mut options {
                cell.share /= weight_sum;
            }
        }

        Self {
            level,
            direction,
            scale: family,
            working_value,
            working_reliability,
            preview_ratio,
            options,
        }
    }
}
