//! Error taxonomy for the engine.
//!
//! Validation and configuration problems are raised before any simulation
//! work begins. A [`SimulationError`] means an internal invariant broke
//! mid-batch and aborts the whole batch.

use thiserror::Error;

use crate::bases::Base;

/// Malformed player statistics or an incomplete lineup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{player}: {field} must be between 0 and 1 (got {value:.4})")]
    RateOutOfRange {
        player: String,
        field: &'static str,
        value: f64,
    },
    #[error("{player}: batting average {ba:.3} exceeds on-base percentage {obp:.3}")]
    AverageExceedsOnBase { player: String, ba: f64, obp: f64 },
    #[error("{player}: slugging {slg:.3} is below batting average {ba:.3}")]
    SluggingBelowAverage { player: String, ba: f64, slg: f64 },
    #[error("{player}: strikeout rate {k_pct:.3} exceeds total out probability {total_outs:.3}")]
    StrikeoutRateExceedsOuts {
        player: String,
        k_pct: f64,
        total_outs: f64,
    },
    #[error("{player}: probability vector sums to {total:.9}")]
    ProbabilitySum { player: String, total: f64 },
    #[error("player name cannot be empty")]
    EmptyPlayerName,
    #[error("lineup requires exactly {expected} batters (got {actual})")]
    LineupSize { expected: usize, actual: usize },
    #[error("lineup slot {slot} is empty")]
    EmptyLineupSlot { slot: usize },
    #[error("lineup slot {slot} is out of range")]
    LineupSlotOutOfRange { slot: usize },
    #[error("roster index {index} is out of range for {len} players")]
    RosterIndex { index: usize, len: usize },
    #[error("no player named '{name}' in roster")]
    UnknownPlayer { name: String },
    #[error("lineup cannot record an out: every batter reaches base on every plate appearance")]
    NoOutsPossible,
    #[error("unknown fielding position '{value}'")]
    UnknownPosition { value: String },
}

/// Invalid or mutually inconsistent engine configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("probabilistic baserunning requires a random source")]
    MissingRandomSource,
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} distribution sums to {total:.9}, expected 1")]
    DistributionSum { field: &'static str, total: f64 },
    #[error("ISO thresholds inverted (low {low:.3} >= medium {medium:.3})")]
    IsoThresholds { low: f64, medium: f64 },
    #[error("{field} must be positive")]
    ZeroCount { field: &'static str },
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// Internal invariant violation detected during an iteration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("attempted to place batter #{runner} on occupied {base} (held by #{occupant})")]
    BaseOccupied {
        base: Base,
        runner: usize,
        occupant: usize,
    },
    #[error("outs counter reached {outs} while the inning was still accumulating")]
    OutsOverflow { outs: u8 },
    #[error("batting order index {index} outside lineup")]
    BattingOrder { index: usize },
}

/// Umbrella error returned by batch-level operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("batch cancelled after {completed} of {total} iterations")]
    Cancelled { completed: usize, total: usize },
}
