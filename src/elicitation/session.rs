//! Per-pair elicitation session and its transition function.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::judgment::{Judgment, Reliability};
use crate::scale::{self, ScaleError, ScaleFamily, MAX_GRADATIONS, MIN_GRADATIONS};

use super::display::Display;
use super::level::{Action, Direction, GradationCount, Level, MediumToken};

/// Working value shown right after a direction or a gradation count is picked.
const MIDPOINT_VALUE: f64 = 5.5;

#[derive(Debug, Error, PartialEq)]
pub enum ElicitationError {
    #[error("a direction must be chosen before {action}")]
    DirectionNotSet { action: &'static str },
    #[error("position {position} is outside 1..={count} at level {level:?}")]
    PositionOutOfRange {
        position: usize,
        count: usize,
        level: Level,
    },
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continuing(Display),
    Done(Judgment),
}

/// Pure transition outcome: the next session, or the emitted judgment.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Continue(ElicitationSession),
    Finish(Judgment),
}

/// State of eliciting one pair. Owned by the caller; reset after each judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitationSession {
    scale: ScaleFamily,
    direction: Option<Direction>,
    level: Level,
    working_value: f64,
    working_reliability: Reliability,
}

impl Default for ElicitationSession {
    fn default() -> Self {
        Self::new(ScaleFamily::default())
    }
}

impl ElicitationSession {
    /// Fresh undecided session on `scale`.
    pub fn new(scale: ScaleFamily) -> Self {
        Self {
            scale,
            direction: None,
            level: Level::Undecided,
            working_value: 1.0,
            working_reliability: Reliability::NOT_SURE,
        }
    }

    /// Scale family used when a judgment is finalized.
    pub fn scale(&self) -> ScaleFamily {
        self.scale
    }

    /// Chosen side, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Current disclosure level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Grade the session currently points at.
    pub fn working_value(&self) -> f64 {
        self.working_value
    }

    /// Reliability reached so far; 1 until a magnitude is picked.
    pub fn working_reliability(&self) -> Reliability {
        self.working_reliability
    }

    /// Everything a UI needs to draw the current level.
    pub fn display(&self) -> Display {
        Display::render(
            self.level,
            self.direction,
            self.scale,
            self.working_value,
            self.working_reliability,
        )
    }

    /// Back to the undecided level, keeping the scale family.
    pub fn reset(&mut self) {
        *self = Self::new(self.scale);
    }

    /// Switch the scale family without losing progress.
    pub fn set_scale(&mut self, scale: ScaleFamily) -> Display {
        self.scale = scale;
        self.display()
    }

    /// Compute the effect of `action` without touching `self`.
    pub fn next(&self, action: Action) -> Result<Transition, ElicitationError> {
        match action {
            Action::NotSure => Ok(Transition::Finish(Judgment::not_sure())),
            Action::Choose(direction) => {
                let mut next = self.clone();
                next.direction = Some(direction);
                if next.level == Level::Undecided {
                    next.level = Level::Coarse;
                    next.working_value = MIDPOINT_VALUE;
                    next.working_reliability = Reliability::DIRECTION_ONLY;
                }
                Ok(Transition::Continue(next))
            }
            Action::Select(position) => self.select(position),
            Action::IncreaseGradations | Action::DecreaseGradations => {
                self.require_direction("changing the gradation count")?;
                let current = self.level.option_count();
                let target = if action == Action::IncreaseGradations {
                    current + 1
                } else {
                    current.saturating_sub(1)
                };
                let bounds = usize::from(MIN_GRADATIONS)..=usize::from(MAX_GRADATIONS);
                match u8::try_from(target) {
                    Ok(count) if bounds.contains(&target) => {
                        Ok(Transition::Continue(self.refine(GradationCount::new(count)?)))
                    }
                    _ => Ok(Transition::Continue(self.clone())),
                }
            }
            Action::SetGradations(count) => {
                self.require_direction("changing the gradation count")?;
                Ok(Transition::Continue(self.refine(GradationCount::new(count)?)))
            }
        }
    }

    /// Advance the session by one user action.
    pub fn apply(&mut self, action: Action) -> Result<Step, ElicitationError> {
        match self.next(action)? {
            Transition::Continue(next) => {
                debug!(?action, from = ?self.level, to = ?next.level, "elicitation step");
                *self = next;
                Ok(Step::Continuing(self.display()))
            }
            Transition::Finish(judgment) => {
                debug!(
                    ?action,
                    ratio = judgment.ratio,
                    reliability = judgment.reliability.value(),
                    "elicitation finished"
                );
                self.reset();
                Ok(Step::Done(judgment))
            }
        }
    }

    /// Abandon the pair: ratio 1, reliability 0, no scale.
    pub fn not_sure(&mut self) -> Judgment {
        self.reset();
        Judgment::not_sure()
    }

    /// Jump to `count` fine gradations. Only valid once a direction is set.
    pub fn change_gradation_count(&mut self, count: u8) -> Result<Display, ElicitationError> {
        self.require_direction("changing the gradation count")?;
        let count = GradationCount::new(count)?;
        *self = self.refine(count);
        Ok(self.display())
    }

    fn require_direction(&self, action: &'static str) -> Result<Direction, ElicitationError> {
        self.direction
            .ok_or(ElicitationError::DirectionNotSet { action })
    }

    fn refine(&self, count: GradationCount) -> ElicitationSession {
        Self {
            level: Level::Fine(count),
            working_value: MIDPOINT_VALUE,
            working_reliability: Reliability::DIRECTION_ONLY,
            ..self.clone()
        }
    }

    fn select(&self, position: usize) -> Result<Transition, ElicitationError> {
        let direction = self.require_direction("selecting an option")?;
        let count = self.level.option_count();
        if !(1..=count).contains(&position) {
            return Err(ElicitationError::PositionOutOfRange {
                position,
                count,
                level: self.level,
            });
        }

        match self.level {
            Level::Undecided => Err(ElicitationError::DirectionNotSet {
                action: "selecting an option",
            }),
            Level::Coarse => {
                let token = MediumToken::from_bucket(position).ok_or(
                    ElicitationError::PositionOutOfRange {
                        position,
                        count,
                        level: self.level,
                    },
                )?;
                Ok(Transition::Continue(Self {
                    level: Level::Medium(token),
                    working_value: scale::unified_grade(position, count),
                    working_reliability: Reliability::COARSE,
                    ..self.clone()
                }))
            }
            Level::Medium(token) => match token.jump_target(position) {
                Some(target) => Ok(Transition::Continue(Self {
                    level: Level::Medium(target),
                    working_value: target.coarse_value(),
                    ..self.clone()
                })),
                None => {
                    let grade = scale::unified_grade(position + token.offset(), 8);
                    self.finish(direction, grade, Reliability::MEDIUM)
                }
            },
            Level::Fine(gradations) => {
                let grade = scale::unified_grade(position, count);
                self.finish(
                    direction,
                    grade,
                    Reliability::gradations(gradations.get()),
                )
            }
        }
    }

    fn finish(
        &self,
        direction: Direction,
        grade: f64,
        reliability: Reliability,
    ) -> Result<Transition, ElicitationError> {
        let raw = self.scale.transform(grade)?;
        Ok(Transition::Finish(Judgment {
            ratio: direction.orient(raw),
            reliability,
            scale: Some(self.scale),
        }))
    }
}
