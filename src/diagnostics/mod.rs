//! Serializable reports returned by the healing entry points.
//!
//! [`HealReport`] bundles the solver summary ([`SolveReport`]) with a timing
//! breakdown of the encode, split, solve and merge stages.

pub mod report;
pub mod timing;

pub use report::{HealReport, SolveOutcome, SolveReport};
pub use timing::{StageTiming, TimingBreakdown};
