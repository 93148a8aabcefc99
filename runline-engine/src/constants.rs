//! Centralized tuning constants for the run-production simulation.
//!
//! These are the defaults behind [`crate::config::SimConfig`]. Runs can
//! override any of them through a config overlay; the values here are the
//! league-average baseline the engine falls back to.

// Batch shape --------------------------------------------------------------
pub(crate) const DEFAULT_ITERATIONS: u32 = 10_000;
pub(crate) const DEFAULT_GAMES_PER_SEASON: u32 = 162;
pub(crate) const DEFAULT_MASTER_SEED: u64 = 42;
pub(crate) const DEFAULT_WIN_THRESHOLD_RUNS_PER_GAME: f64 = 4.5;

// Game shape ---------------------------------------------------------------
pub const LINEUP_SIZE: usize = 9;
pub const INNINGS_PER_GAME: u32 = 9;
pub const OUTS_PER_INNING: u8 = 3;

// Plate-appearance decomposition ------------------------------------------
pub(crate) const DEFAULT_K_PCT: f64 = 0.220;

// Hit-type distribution ----------------------------------------------------
pub(crate) const DEFAULT_MIN_HITS_FOR_ACTUAL_DIST: u32 = 100;
pub(crate) const DEFAULT_BAYESIAN_PRIOR_WEIGHT: f64 = 100.0;
pub(crate) const DEFAULT_ISO_LOW: f64 = 0.100;
pub(crate) const DEFAULT_ISO_MEDIUM: f64 = 0.200;
/// ISO span above the medium threshold over which the balanced profile
/// blends fully into the power profile.
pub(crate) const ISO_POWER_BLEND_SPAN: f64 = 0.200;

pub(crate) const SINGLES_HITTER_DIST: [f64; 4] = [0.80, 0.15, 0.02, 0.03];
pub(crate) const BALANCED_HITTER_DIST: [f64; 4] = [0.70, 0.20, 0.02, 0.08];
pub(crate) const POWER_HITTER_DIST: [f64; 4] = [0.60, 0.20, 0.01, 0.19];
pub(crate) const LEAGUE_AVG_HIT_DIST: [f64; 4] = [0.75, 0.18, 0.02, 0.05];

// Baserunning --------------------------------------------------------------
pub(crate) const DEFAULT_SINGLE_FIRST_TO_THIRD: f64 = 0.28;
pub(crate) const DEFAULT_DOUBLE_FIRST_SCORES: f64 = 0.60;
pub(crate) const DEFAULT_DOUBLE_SECOND_SCORES: f64 = 0.98;

// Stolen bases -------------------------------------------------------------
pub(crate) const DEFAULT_LEAGUE_STEAL_ATTEMPT_RATE: f64 = 0.05;
pub(crate) const DEFAULT_LEAGUE_STEAL_SUCCESS_RATE: f64 = 0.75;
/// Pseudo times-on-base backing the league attempt rate.
pub(crate) const DEFAULT_STEAL_ATTEMPT_PRIOR: f64 = 100.0;
/// Pseudo attempts backing the league success rate.
pub(crate) const DEFAULT_STEAL_SUCCESS_PRIOR: f64 = 5.0;
pub(crate) const DEFAULT_STEAL_ATTEMPT_SCALE: f64 = 1.0;

// Balls in play ------------------------------------------------------------
pub(crate) const DEFAULT_FLYOUT_SHARE: f64 = 0.35;
pub(crate) const DEFAULT_MISPLAY_RATE_PER_PA: f64 = 0.015;

// Statistics ---------------------------------------------------------------
/// Two-sided 95% standard normal quantile.
pub const Z_95: f64 = 1.959_963_984_540_054;
pub(crate) const PROBABILITY_TOLERANCE: f64 = 1e-9;
pub(crate) const REPORTED_PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];
