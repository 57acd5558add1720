//! Progressive disclosure protocol for eliciting one pairwise judgment.
//!
//! The expert first picks a side, then narrows the magnitude through
//! coarse (3 buckets) and medium (8-point unified strip) levels, or sizes a
//! fine strip of 2..=8 gradations directly. The reliability stored with the
//! judgment records how far that refinement went.
//!
//! Levels:
//! - `Undecided`: choose a direction, or give up ("not sure")
//! - `Coarse`: weakly / strongly / extremely
//! - `Medium(token)`: active grades finalize, group placeholders jump sideways
//! - `Fine(count)`: any position finalizes with reliability = count

pub mod display;
pub mod level;
pub mod session;

pub use display::{Display, OptionCell, OptionKind};
pub use level::{Action, Direction, GradationCount, Level, MediumToken};
pub use session::{ElicitationError, ElicitationSession, Step, Transition};
