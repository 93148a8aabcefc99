//! Batting line → probability vectors.
//!
//! Two estimators live here: the slash-line decomposer, which splits a plate
//! appearance into walk / strikeout / in-play out / hit, and the hit-type
//! distributor, which splits a hit into single / double / triple / home run
//! using either empirical counts (Bayesian-smoothed toward the league) or an
//! isolated-power archetype prior.

use serde::{Deserialize, Serialize};

use crate::config::HitTypeConfig;
use crate::constants::{ISO_POWER_BLEND_SPAN, PROBABILITY_TOLERANCE};
use crate::error::ValidationError;
use crate::numbers::u64_to_f64;

/// Plate-appearance outcome probabilities before the hit-type split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaOutcomeProbs {
    pub walk: f64,
    pub strikeout: f64,
    pub in_play_out: f64,
    pub hit: f64,
}

impl PaOutcomeProbs {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.walk + self.strikeout + self.in_play_out + self.hit
    }

    #[must_use]
    pub fn total_outs(&self) -> f64 {
        self.strikeout + self.in_play_out
    }

    /// Weights in sampling order: walk, strikeout, in-play out, hit.
    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.walk, self.strikeout, self.in_play_out, self.hit]
    }
}

/// Distribution of hit types given that a hit occurred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitTypeDist {
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub home_run: f64,
}

impl HitTypeDist {
    #[must_use]
    pub const fn from_array(values: [f64; 4]) -> Self {
        Self {
            single: values[0],
            double: values[1],
            triple: values[2],
            home_run: values[3],
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> [f64; 4] {
        [self.single, self.double, self.triple, self.home_run]
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Linear blend: `weight = 0` yields `self`, `weight = 1` yields `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, weight: f64) -> Self {
        let weight = weight.clamp(0.0, 1.0);
        let a = self.as_array();
        let b = other.as_array();
        Self::from_array(std::array::from_fn(|i| {
            a[i].mul_add(1.0 - weight, b[i] * weight)
        }))
    }

    /// Pseudo-count blend of `self` (the prior) with an empirical split.
    #[must_use]
    pub fn shrink_toward(&self, empirical: &Self, prior_weight: f64, sample: f64) -> Self {
        let denom = prior_weight + sample;
        if denom <= 0.0 {
            return *self;
        }
        let prior = self.as_array();
        let observed = empirical.as_array();
        Self::from_array(std::array::from_fn(|i| {
            prior[i].mul_add(prior_weight, observed[i] * sample) / denom
        }))
    }

    fn is_normalized(&self) -> bool {
        self.as_array().iter().all(|p| *p >= 0.0)
            && (self.total() - 1.0).abs() <= PROBABILITY_TOLERANCE
    }
}

/// Raw per-type hit counts from a player's season line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitCounts {
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    #[serde(alias = "hr")]
    pub home_runs: u32,
}

impl HitCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.singles as u64 + self.doubles as u64 + self.triples as u64 + self.home_runs as u64
    }

    /// Empirical split; `None` when there are no hits.
    #[must_use]
    pub fn distribution(&self) -> Option<HitTypeDist> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let total = u64_to_f64(total);
        Some(HitTypeDist {
            single: f64::from(self.singles) / total,
            double: f64::from(self.doubles) / total,
            triple: f64::from(self.triples) / total,
            home_run: f64::from(self.home_runs) / total,
        })
    }
}

/// Recorded when a strikeout rate had to be clamped to the available outs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeoutClamp {
    pub requested_k_pct: f64,
    pub total_outs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashLineDecomposition {
    pub probs: PaOutcomeProbs,
    /// Set when K% exceeded `1 - OBP`; in-play outs were zeroed for this player.
    pub strikeout_clamp: Option<StrikeoutClamp>,
}

/// Split a plate appearance into walk / strikeout / in-play out / hit.
///
/// `p_walk = OBP - BA`, `p_hit = BA`, `p_total_outs = 1 - OBP`; the outs are
/// split by `k_pct` (or `default_k_pct` when absent). Excess strikeout mass
/// is clamped and reported, never dropped silently.
///
/// # Errors
///
/// Returns [`ValidationError`] when a rate is outside `[0, 1]` or BA > OBP.
pub fn decompose_slash_line(
    player: &str,
    ba: f64,
    obp: f64,
    k_pct: Option<f64>,
    default_k_pct: f64,
) -> Result<SlashLineDecomposition, ValidationError> {
    ensure_rate(player, "ba", ba)?;
    ensure_rate(player, "obp", obp)?;
    let k = k_pct.unwrap_or(default_k_pct);
    ensure_rate(player, "k_pct", k)?;
    if ba > obp {
        return Err(ValidationError::AverageExceedsOnBase {
            player: player.to_string(),
            ba,
            obp,
        });
    }

    let walk = obp - ba;
    let hit = ba;
    let total_outs = 1.0 - obp;
    let (strikeout, in_play_out, strikeout_clamp) = if k > total_outs {
        (
            total_outs,
            0.0,
            Some(StrikeoutClamp {
                requested_k_pct: k,
                total_outs,
            }),
        )
    } else {
        (k, total_outs - k, None)
    };

    Ok(SlashLineDecomposition {
        probs: PaOutcomeProbs {
            walk,
            strikeout,
            in_play_out,
            hit,
        },
        strikeout_clamp,
    })
}

/// Coarse power classification by isolated power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitArchetype {
    SinglesHitter,
    Balanced,
    PowerHitter,
}

impl HitArchetype {
    #[must_use]
    pub fn classify(iso: f64, cfg: &HitTypeConfig) -> Self {
        if iso < cfg.iso_low {
            Self::SinglesHitter
        } else if iso < cfg.iso_medium {
            Self::Balanced
        } else {
            Self::PowerHitter
        }
    }

    #[must_use]
    pub const fn profile(self, cfg: &HitTypeConfig) -> HitTypeDist {
        match self {
            Self::SinglesHitter => cfg.singles_hitter,
            Self::Balanced => cfg.balanced,
            Self::PowerHitter => cfg.power_hitter,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SinglesHitter => "singles hitter",
            Self::Balanced => "balanced",
            Self::PowerHitter => "power hitter",
        }
    }
}

/// How a player's hit-type distribution was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTypeSource {
    /// No counts on record; ISO archetype prior.
    Archetype,
    /// Counts on record but zero hits.
    LeagueAverage,
    /// Counts below the sample threshold, blended with the league.
    Smoothed,
    /// Counts at or above the sample threshold.
    Empirical,
}

impl HitTypeSource {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Archetype => "archetype",
            Self::LeagueAverage => "league average",
            Self::Smoothed => "smoothed",
            Self::Empirical => "empirical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTypeEstimate {
    pub dist: HitTypeDist,
    pub source: HitTypeSource,
}

/// ISO-based prior, optionally interpolated between neighbouring archetypes.
#[must_use]
pub fn archetype_distribution(iso: f64, cfg: &HitTypeConfig) -> HitTypeDist {
    if !cfg.interpolate_archetypes {
        return HitArchetype::classify(iso, cfg).profile(cfg);
    }
    if iso < cfg.iso_low {
        return cfg.singles_hitter;
    }
    if iso < cfg.iso_medium {
        let weight = (iso - cfg.iso_low) / (cfg.iso_medium - cfg.iso_low);
        return cfg.singles_hitter.lerp(&cfg.balanced, weight);
    }
    let weight = ((iso - cfg.iso_medium) / ISO_POWER_BLEND_SPAN).min(1.0);
    cfg.balanced.lerp(&cfg.power_hitter, weight)
}

/// Hit-type distribution for one player.
#[must_use]
pub fn hit_type_distribution(
    iso: f64,
    counts: Option<&HitCounts>,
    cfg: &HitTypeConfig,
) -> HitTypeEstimate {
    let Some(counts) = counts else {
        return HitTypeEstimate {
            dist: archetype_distribution(iso, cfg),
            source: HitTypeSource::Archetype,
        };
    };
    let Some(empirical) = counts.distribution() else {
        return HitTypeEstimate {
            dist: cfg.league_average,
            source: HitTypeSource::LeagueAverage,
        };
    };
    let total = counts.total();
    if total >= u64::from(cfg.min_hits_for_actual) {
        return HitTypeEstimate {
            dist: empirical,
            source: HitTypeSource::Empirical,
        };
    }
    HitTypeEstimate {
        dist: cfg
            .league_average
            .shrink_toward(&empirical, cfg.prior_weight, u64_to_f64(total)),
        source: HitTypeSource::Smoothed,
    }
}

/// Expected total bases per hit under `dist`.
#[must_use]
pub fn expected_bases_per_hit(dist: &HitTypeDist) -> f64 {
    dist.single + 2.0 * dist.double + 3.0 * dist.triple + 4.0 * dist.home_run
}

/// Modelled vs. observed bases per hit (`SLG / BA`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SluggingCheck {
    pub observed_bases_per_hit: f64,
    pub expected_bases_per_hit: f64,
    pub absolute_error: f64,
    pub error_pct: f64,
}

#[must_use]
pub fn compare_to_observed(ba: f64, slg: f64, dist: &HitTypeDist) -> SluggingCheck {
    let observed = if ba > 0.0 { slg / ba } else { 0.0 };
    let expected = expected_bases_per_hit(dist);
    let error = expected - observed;
    let error_pct = if observed > 0.0 {
        error / observed * 100.0
    } else {
        0.0
    };
    SluggingCheck {
        observed_bases_per_hit: observed,
        expected_bases_per_hit: expected,
        absolute_error: error,
        error_pct,
    }
}

/// Check that a hit-type distribution is non-negative and sums to 1.
///
/// # Errors
///
/// Returns [`ValidationError::ProbabilitySum`] otherwise.
pub fn ensure_normalized(player: &str, dist: &HitTypeDist) -> Result<(), ValidationError> {
    if dist.is_normalized() {
        Ok(())
    } else {
        Err(ValidationError::ProbabilitySum {
            player: player.to_string(),
            total: dist.total(),
        })
    }
}

pub(crate) fn ensure_rate(
    player: &str,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::RateOutOfRange {
            player: player.to_string(),
            field,
            value,
        })
    }
}
