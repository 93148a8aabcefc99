//! Immutable simulation configuration.
//!
//! A [`SimConfig`] is built once (defaults, optionally overlaid by JSON),
//! validated, and then threaded by reference through batch, season, game,
//! inning and plate appearance. Nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

use crate::baserunning::AdvanceMode;
use crate::constants;
use crate::error::ConfigurationError;
use crate::probability::HitTypeDist;

/// What to do when a player's strikeout rate exceeds their out probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrikeoutClampPolicy {
    /// Clamp, attach a warning to the player and log it.
    #[default]
    Warn,
    /// Refuse to build the player.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "SimConfig::default_iterations")]
    pub iterations: u32,
    #[serde(default = "SimConfig::default_games_per_season")]
    pub games_per_season: u32,
    #[serde(default = "SimConfig::default_master_seed")]
    pub master_seed: u64,
    /// League-average scoring rate; a season "wins" when its run total meets
    /// `games_per_season * win_threshold_runs_per_game`.
    #[serde(default = "SimConfig::default_win_threshold")]
    pub win_threshold_runs_per_game: f64,
    /// Strikeout rate used for players with no K% on record.
    #[serde(default = "SimConfig::default_k_pct")]
    pub default_k_pct: f64,
    #[serde(default)]
    pub strikeout_clamp_policy: StrikeoutClampPolicy,
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub baserunning: BaserunningOdds,
    #[serde(default)]
    pub hit_types: HitTypeConfig,
    #[serde(default)]
    pub steals: StealConfig,
    #[serde(default)]
    pub sacrifice_fly: SacrificeFlyConfig,
    #[serde(default)]
    pub misplays: MisplayConfig,
}

impl SimConfig {
    const fn default_iterations() -> u32 {
        constants::DEFAULT_ITERATIONS
    }

    const fn default_games_per_season() -> u32 {
        constants::DEFAULT_GAMES_PER_SEASON
    }

    const fn default_master_seed() -> u64 {
        constants::DEFAULT_MASTER_SEED
    }

    const fn default_win_threshold() -> f64 {
        constants::DEFAULT_WIN_THRESHOLD_RUNS_PER_GAME
    }

    const fn default_k_pct() -> f64 {
        constants::DEFAULT_K_PCT
    }

    /// Parse a JSON overlay on top of the defaults and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the resulting
    /// configuration violates an invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigurationError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Baserunning mode selected by the feature flags.
    #[must_use]
    pub const fn advance_mode(&self) -> AdvanceMode {
        if self.features.probabilistic_baserunning {
            AdvanceMode::Probabilistic
        } else {
            AdvanceMode::Deterministic
        }
    }

    /// Season run total a simulated season must reach to count as a win.
    #[must_use]
    pub fn win_threshold_runs(&self) -> f64 {
        f64::from(self.games_per_season) * self.win_threshold_runs_per_game
    }

    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn with_games_per_season(mut self, games: u32) -> Self {
        self.games_per_season = games;
        self
    }

    #[must_use]
    pub fn with_master_seed(mut self, seed: u64) -> Self {
        self.master_seed = seed;
        self
    }

    /// Check every invariant the simulation relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.iterations == 0 {
            return Err(ConfigurationError::ZeroCount {
                field: "iterations",
            });
        }
        if self.games_per_season == 0 {
            return Err(ConfigurationError::ZeroCount {
                field: "games_per_season",
            });
        }
        ensure_min(
            "win_threshold_runs_per_game",
            self.win_threshold_runs_per_game,
            0.0,
        )?;
        ensure_probability("default_k_pct", self.default_k_pct)?;
        self.baserunning.validate()?;
        self.hit_types.validate()?;
        self.steals.validate()?;
        ensure_probability("sacrifice_fly.flyout_share", self.sacrifice_fly.flyout_share)?;
        ensure_probability("misplays.rate_per_pa", self.misplays.rate_per_pa)?;
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iterations: Self::default_iterations(),
            games_per_season: Self::default_games_per_season(),
            master_seed: Self::default_master_seed(),
            win_threshold_runs_per_game: Self::default_win_threshold(),
            default_k_pct: Self::default_k_pct(),
            strikeout_clamp_policy: StrikeoutClampPolicy::default(),
            features: FeatureFlags::default(),
            baserunning: BaserunningOdds::default(),
            hit_types: HitTypeConfig::default(),
            steals: StealConfig::default(),
            sacrifice_fly: SacrificeFlyConfig::default(),
            misplays: MisplayConfig::default(),
        }
    }
}

/// Enable flags for the optional event layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub stolen_bases: bool,
    pub sacrifice_flies: bool,
    pub probabilistic_baserunning: bool,
    pub misplays: bool,
}

impl FeatureFlags {
    /// Every optional layer off: deterministic advancement, no extra events.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            stolen_bases: false,
            sacrifice_flies: false,
            probabilistic_baserunning: false,
            misplays: false,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            stolen_bases: true,
            sacrifice_flies: true,
            probabilistic_baserunning: true,
            misplays: true,
        }
    }
}

/// Extra-base probabilities layered on the deterministic advancement table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaserunningOdds {
    pub single_first_to_third: f64,
    pub double_first_scores: f64,
    pub double_second_scores: f64,
}

impl BaserunningOdds {
    fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_probability(
            "baserunning.single_first_to_third",
            self.single_first_to_third,
        )?;
        ensure_probability("baserunning.double_first_scores", self.double_first_scores)?;
        ensure_probability(
            "baserunning.double_second_scores",
            self.double_second_scores,
        )
    }
}

impl Default for BaserunningOdds {
    fn default() -> Self {
        Self {
            single_first_to_third: constants::DEFAULT_SINGLE_FIRST_TO_THIRD,
            double_first_scores: constants::DEFAULT_DOUBLE_FIRST_SCORES,
            double_second_scores: constants::DEFAULT_DOUBLE_SECOND_SCORES,
        }
    }
}

/// Hit-type estimation: archetype priors and Bayesian smoothing weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTypeConfig {
    /// Pseudo-sample size given to the league average when smoothing.
    pub prior_weight: f64,
    /// Hit totals at or above this use the player's empirical split as-is.
    pub min_hits_for_actual: u32,
    pub iso_low: f64,
    pub iso_medium: f64,
    /// Blend linearly between neighbouring archetype profiles by ISO.
    pub interpolate_archetypes: bool,
    pub singles_hitter: HitTypeDist,
    pub balanced: HitTypeDist,
    pub power_hitter: HitTypeDist,
    pub league_average: HitTypeDist,
}

impl HitTypeConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_min("hit_types.prior_weight", self.prior_weight, 0.0)?;
        ensure_min("hit_types.iso_low", self.iso_low, 0.0)?;
        if self.iso_low >= self.iso_medium {
            return Err(ConfigurationError::IsoThresholds {
                low: self.iso_low,
                medium: self.iso_medium,
            });
        }
        ensure_distribution("hit_types.singles_hitter", &self.singles_hitter)?;
        ensure_distribution("hit_types.balanced", &self.balanced)?;
        ensure_distribution("hit_types.power_hitter", &self.power_hitter)?;
        ensure_distribution("hit_types.league_average", &self.league_average)
    }
}

impl Default for HitTypeConfig {
    fn default() -> Self {
        Self {
            prior_weight: constants::DEFAULT_BAYESIAN_PRIOR_WEIGHT,
            min_hits_for_actual: constants::DEFAULT_MIN_HITS_FOR_ACTUAL_DIST,
            iso_low: constants::DEFAULT_ISO_LOW,
            iso_medium: constants::DEFAULT_ISO_MEDIUM,
            interpolate_archetypes: true,
            singles_hitter: HitTypeDist::from_array(constants::SINGLES_HITTER_DIST),
            balanced: HitTypeDist::from_array(constants::BALANCED_HITTER_DIST),
            power_hitter: HitTypeDist::from_array(constants::POWER_HITTER_DIST),
            league_average: HitTypeDist::from_array(constants::LEAGUE_AVG_HIT_DIST),
        }
    }
}

/// League baselines and shrinkage strength for stolen-base rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealConfig {
    /// Attempts per time on base for an unknown runner.
    pub league_attempt_rate: f64,
    pub league_success_rate: f64,
    /// Pseudo times-on-base backing `league_attempt_rate`.
    pub attempt_prior_weight: f64,
    /// Pseudo attempts backing `league_success_rate`.
    pub success_prior_weight: f64,
    pub attempt_scale: f64,
}

impl StealConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_probability("steals.league_attempt_rate", self.league_attempt_rate)?;
        ensure_probability("steals.league_success_rate", self.league_success_rate)?;
        ensure_min("steals.attempt_prior_weight", self.attempt_prior_weight, 0.0)?;
        ensure_min("steals.success_prior_weight", self.success_prior_weight, 0.0)?;
        ensure_min("steals.attempt_scale", self.attempt_scale, 0.0)
    }
}

impl Default for StealConfig {
    fn default() -> Self {
        Self {
            league_attempt_rate: constants::DEFAULT_LEAGUE_STEAL_ATTEMPT_RATE,
            league_success_rate: constants::DEFAULT_LEAGUE_STEAL_SUCCESS_RATE,
            attempt_prior_weight: constants::DEFAULT_STEAL_ATTEMPT_PRIOR,
            success_prior_weight: constants::DEFAULT_STEAL_SUCCESS_PRIOR,
            attempt_scale: constants::DEFAULT_STEAL_ATTEMPT_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SacrificeFlyConfig {
    /// Share of balls-in-play outs that are catchable fly balls.
    pub flyout_share: f64,
}

impl Default for SacrificeFlyConfig {
    fn default() -> Self {
        Self {
            flyout_share: constants::DEFAULT_FLYOUT_SHARE,
        }
    }
}

/// Errors, wild pitches and passed balls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MisplayConfig {
    pub rate_per_pa: f64,
}

impl Default for MisplayConfig {
    fn default() -> Self {
        Self {
            rate_per_pa: constants::DEFAULT_MISPLAY_RATE_PER_PA,
        }
    }
}

fn ensure_probability(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::RangeViolation {
            field,
            min: 0.0,
            max: 1.0,
            value,
        })
    }
}

fn ensure_min(field: &'static str, value: f64, min: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ConfigurationError::MinViolation { field, min, value })
    }
}

fn ensure_distribution(field: &'static str, dist: &HitTypeDist) -> Result<(), ConfigurationError> {
    for value in dist.as_array() {
        ensure_probability(field, value)?;
    }
    let total = dist.total();
    if (total - 1.0).abs() > constants::PROBABILITY_TOLERANCE {
        return Err(ConfigurationError::DistributionSum { field, total });
    }
    Ok(())
}
