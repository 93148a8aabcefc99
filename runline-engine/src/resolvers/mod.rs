//! Special events that augment or precede the baserunning advancer.
//!
//! Each resolver takes a small context by value and a generator, and
//! returns an outcome struct describing what changed. None of them touch
//! inning counters directly; the inning state machine folds the outcomes in.

pub mod misplay;
pub mod sacrifice_fly;
pub mod steal;

pub use misplay::{MisplayContext, MisplayOutcome, resolve_misplay};
pub use sacrifice_fly::{SacrificeFlyContext, SacrificeFlyOutcome, resolve_sacrifice_fly};
pub use steal::{
    StealAttempt, StealContext, StealCounts, StealOutcome, StealProfile, resolve_steal,
};
