//! Player records and their precomputed probability vectors.
//!
//! [`PlayerStats`] is the raw batting line as delivered by a data source.
//! [`Player::from_stats`] validates it once, derives every probability the
//! simulation needs, and freezes the result. Nothing on a [`Player`] changes
//! for the lifetime of a batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{SimConfig, StrikeoutClampPolicy};
use crate::error::ValidationError;
use crate::outcome::OutcomeProbabilities;
use crate::probability::{
    self, HitCounts, HitTypeDist, HitTypeSource, PaOutcomeProbs, SluggingCheck, StrikeoutClamp,
};
use crate::resolvers::steal::{StealCounts, StealProfile};

/// Raw batting line for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub ba: f64,
    pub obp: f64,
    pub slg: f64,
    /// Isolated power; derived as `slg - ba` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<f64>,
    #[serde(default)]
    pub pa: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits: Option<HitCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steals: Option<StealCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionInput>,
}

impl PlayerStats {
    /// Minimal line with no optional data.
    #[must_use]
    pub fn new(name: impl Into<String>, ba: f64, obp: f64, slg: f64) -> Self {
        Self {
            name: name.into(),
            ba,
            obp,
            slg,
            iso: None,
            pa: 0,
            k_pct: None,
            hits: None,
            steals: None,
            position: None,
        }
    }

    #[must_use]
    pub const fn with_pa(mut self, pa: u32) -> Self {
        self.pa = pa;
        self
    }

    #[must_use]
    pub const fn with_k_pct(mut self, k_pct: f64) -> Self {
        self.k_pct = Some(k_pct);
        self
    }

    #[must_use]
    pub const fn with_hits(mut self, hits: HitCounts) -> Self {
        self.hits = Some(hits);
        self
    }

    #[must_use]
    pub const fn with_steals(mut self, stolen_bases: u32, caught_stealing: u32) -> Self {
        self.steals = Some(StealCounts {
            stolen_bases,
            caught_stealing,
        });
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: FieldingPosition) -> Self {
        self.position = Some(PositionInput::Abbrev(position.abbrev().to_string()));
        self
    }

    #[must_use]
    pub fn iso(&self) -> f64 {
        self.iso.unwrap_or(self.slg - self.ba)
    }

    #[must_use]
    pub fn ops(&self) -> f64 {
        self.obp + self.slg
    }
}

/// Recoverable data problems found while building a player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerWarning {
    StrikeoutClamp(StrikeoutClamp),
}

impl fmt::Display for PlayerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrikeoutClamp(clamp) => write!(
                f,
                "strikeout rate {:.3} exceeds total outs {:.3}; clamped, in-play outs removed",
                clamp.requested_k_pct, clamp.total_outs
            ),
        }
    }
}

/// Immutable, validated player with every probability precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    stats: PlayerStats,
    position: Option<FieldingPosition>,
    pa_probs: PaOutcomeProbs,
    hit_types: HitTypeDist,
    hit_type_source: HitTypeSource,
    outcomes: OutcomeProbabilities,
    steal: StealProfile,
    warnings: Vec<PlayerWarning>,
}

impl Player {
    /// Validate a batting line and derive its probability vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty name, out-of-range rates,
    /// BA > OBP, SLG < BA, an unknown position, or (under the `reject`
    /// clamp policy) a strikeout rate larger than the available outs.
    pub fn from_stats(stats: PlayerStats, cfg: &SimConfig) -> Result<Self, ValidationError> {
        let name = stats.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyPlayerName);
        }
        if stats.slg.is_finite() && stats.ba.is_finite() && stats.slg < stats.ba {
            return Err(ValidationError::SluggingBelowAverage {
                player: name.to_string(),
                ba: stats.ba,
                slg: stats.slg,
            });
        }
        if !stats.slg.is_finite() || !(0.0..=4.0).contains(&stats.slg) {
            return Err(ValidationError::RateOutOfRange {
                player: name.to_string(),
                field: "slg",
                value: stats.slg,
            });
        }

        let decomposition =
            probability::decompose_slash_line(&name, stats.ba, stats.obp, stats.k_pct, cfg.default_k_pct)?;
        let mut warnings = Vec::new();
        if let Some(clamp) = decomposition.strikeout_clamp {
            match cfg.strikeout_clamp_policy {
                StrikeoutClampPolicy::Reject => {
                    return Err(ValidationError::StrikeoutRateExceedsOuts {
                        player: name.to_string(),
                        k_pct: clamp.requested_k_pct,
                        total_outs: clamp.total_outs,
                    });
                }
                StrikeoutClampPolicy::Warn => {
                    let warning = PlayerWarning::StrikeoutClamp(clamp);
                    log::warn!("{name}: {warning}");
                    warnings.push(warning);
                }
            }
        }

        let estimate =
            probability::hit_type_distribution(stats.iso(), stats.hits.as_ref(), &cfg.hit_types);
        probability::ensure_normalized(&name, &estimate.dist)?;

        let outcomes = OutcomeProbabilities::combine(&decomposition.probs, &estimate.dist);
        let total = outcomes.total();
        if (total - 1.0).abs() > crate::constants::PROBABILITY_TOLERANCE {
            return Err(ValidationError::ProbabilitySum {
                player: name.to_string(),
                total,
            });
        }

        let position = stats
            .position
            .as_ref()
            .map(PositionInput::resolve)
            .transpose()?;
        let steal = StealProfile::estimate(&stats, &cfg.steals);

        let mut stats = stats;
        stats.name = name;
        Ok(Self {
            stats,
            position,
            pa_probs: decomposition.probs,
            hit_types: estimate.dist,
            hit_type_source: estimate.source,
            outcomes,
            steal,
            warnings,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.stats.name
    }

    #[must_use]
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub const fn position(&self) -> Option<FieldingPosition> {
        self.position
    }

    #[must_use]
    pub const fn pa_probs(&self) -> &PaOutcomeProbs {
        &self.pa_probs
    }

    #[must_use]
    pub const fn hit_types(&self) -> &HitTypeDist {
        &self.hit_types
    }

    #[must_use]
    pub const fn hit_type_source(&self) -> HitTypeSource {
        self.hit_type_source
    }

    /// Seven-way outcome vector (hit share split by hit type).
    #[must_use]
    pub const fn outcomes(&self) -> &OutcomeProbabilities {
        &self.outcomes
    }

    #[must_use]
    pub const fn steal(&self) -> &StealProfile {
        &self.steal
    }

    #[must_use]
    pub fn warnings(&self) -> &[PlayerWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn slugging_check(&self) -> SluggingCheck {
        probability::compare_to_observed(self.stats.ba, self.stats.slg, &self.hit_types)
    }
}

/// Position as it appears in roster files: an abbreviation or a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionInput {
    Code(u8),
    Abbrev(String),
}

impl PositionInput {
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownPosition`] for unrecognised input.
    pub fn resolve(&self) -> Result<FieldingPosition, ValidationError> {
        match self {
            Self::Code(code) => {
                FieldingPosition::from_code(*code).ok_or_else(|| ValidationError::UnknownPosition {
                    value: code.to_string(),
                })
            }
            Self::Abbrev(text) => text.parse(),
        }
    }
}

/// Defensive position. Carried for display only; nothing in the simulation
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldingPosition {
    #[serde(rename = "P")]
    Pitcher,
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionGroup {
    Pitcher,
    Catcher,
    Infield,
    Outfield,
    Hitter,
}

impl FieldingPosition {
    pub const ALL: [Self; 10] = [
        Self::Pitcher,
        Self::Catcher,
        Self::FirstBase,
        Self::SecondBase,
        Self::ThirdBase,
        Self::Shortstop,
        Self::LeftField,
        Self::CenterField,
        Self::RightField,
        Self::DesignatedHitter,
    ];

    /// Scorekeeping number (1-10, DH = 10).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pitcher => 1,
            Self::Catcher => 2,
            Self::FirstBase => 3,
            Self::SecondBase => 4,
            Self::ThirdBase => 5,
            Self::Shortstop => 6,
            Self::LeftField => 7,
            Self::CenterField => 8,
            Self::RightField => 9,
            Self::DesignatedHitter => 10,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|pos| pos.code() == code)
    }

    #[must_use]
    pub const fn abbrev(self) -> &'static str {
        match self {
            Self::Pitcher => "P",
            Self::Catcher => "C",
            Self::FirstBase => "1B",
            Self::SecondBase => "2B",
            Self::ThirdBase => "3B",
            Self::Shortstop => "SS",
            Self::LeftField => "LF",
            Self::CenterField => "CF",
            Self::RightField => "RF",
            Self::DesignatedHitter => "DH",
        }
    }

    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Pitcher => "Pitcher",
            Self::Catcher => "Catcher",
            Self::FirstBase => "First Baseman",
            Self::SecondBase => "Second Baseman",
            Self::ThirdBase => "Third Baseman",
            Self::Shortstop => "Shortstop",
            Self::LeftField => "Left Fielder",
            Self::CenterField => "Center Fielder",
            Self::RightField => "Right Fielder",
            Self::DesignatedHitter => "Designated Hitter",
        }
    }

    #[must_use]
    pub const fn group(self) -> PositionGroup {
        match self {
            Self::Pitcher => PositionGroup::Pitcher,
            Self::Catcher => PositionGroup::Catcher,
            Self::FirstBase | Self::SecondBase | Self::ThirdBase | Self::Shortstop => {
                PositionGroup::Infield
            }
            Self::LeftField | Self::CenterField | Self::RightField => PositionGroup::Outfield,
            Self::DesignatedHitter => PositionGroup::Hitter,
        }
    }
}

impl fmt::Display for FieldingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl FromStr for FieldingPosition {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim().to_ascii_uppercase();
        // Two-way players are listed with the pitchers.
        if token == "TWP" {
            return Ok(Self::Pitcher);
        }
        if let Some(pos) = Self::ALL.into_iter().find(|pos| pos.abbrev() == token) {
            return Ok(pos);
        }
        token
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| ValidationError::UnknownPosition {
                value: value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn builds_player_with_normalized_vectors() {
        let player = Player::from_stats(
            PlayerStats::new("Ada", 0.280, 0.350, 0.450).with_k_pct(0.18),
            &cfg(),
        )
        .unwrap();
        assert!((player.pa_probs().total() - 1.0).abs() < 1e-9);
        assert!((player.hit_types().total() - 1.0).abs() < 1e-9);
        assert!((player.outcomes().total() - 1.0).abs() < 1e-9);
        assert_eq!(player.hit_type_source(), HitTypeSource::Archetype);
        assert!(player.warnings().is_empty());
    }

    #[test]
    fn trims_names_and_rejects_blank() {
        let player = Player::from_stats(PlayerStats::new("  Bo  ", 0.25, 0.3, 0.4), &cfg()).unwrap();
        assert_eq!(player.name(), "Bo");
        assert_eq!(player.stats().name, "Bo");
        assert_eq!(
            Player::from_stats(PlayerStats::new("   ", 0.25, 0.3, 0.4), &cfg()),
            Err(ValidationError::EmptyPlayerName)
        );
    }

    #[test]
    fn rejects_slugging_below_average() {
        assert!(matches!(
            Player::from_stats(PlayerStats::new("X", 0.300, 0.350, 0.250), &cfg()),
            Err(ValidationError::SluggingBelowAverage { .. })
        ));
    }

    #[test]
    fn clamp_policy_controls_strikeout_overflow() {
        let stats = PlayerStats::new("K", 0.300, 0.800, 0.500).with_k_pct(0.40);
        let player = Player::from_stats(stats.clone(), &cfg()).unwrap();
        assert_eq!(player.warnings().len(), 1);
        assert!(player.pa_probs().in_play_out.abs() < f64::EPSILON);

        let strict = SimConfig {
            strikeout_clamp_policy: StrikeoutClampPolicy::Reject,
            ..SimConfig::default()
        };
        assert!(matches!(
            Player::from_stats(stats, &strict),
            Err(ValidationError::StrikeoutRateExceedsOuts { .. })
        ));
    }

    #[test]
    fn positions_parse_from_codes_and_abbreviations() {
        assert_eq!("ss".parse::<FieldingPosition>().unwrap(), FieldingPosition::Shortstop);
        assert_eq!("6".parse::<FieldingPosition>().unwrap(), FieldingPosition::Shortstop);
        assert_eq!("TWP".parse::<FieldingPosition>().unwrap(), FieldingPosition::Pitcher);
        assert_eq!(FieldingPosition::from_code(10), Some(FieldingPosition::DesignatedHitter));
        assert_eq!(FieldingPosition::from_code(11), None);
        assert!(matches!(
            "XX".parse::<FieldingPosition>(),
            Err(ValidationError::UnknownPosition { .. })
        ));
        assert_eq!(FieldingPosition::Shortstop.group(), PositionGroup::Infield);
        assert_eq!(FieldingPosition::CenterField.to_string(), "CF");
    }

    #[test]
    fn roster_json_positions_accept_both_forms() {
        let stats: PlayerStats = serde_json::from_str(
            r#"{ "name": "Cy", "ba": 0.25, "obp": 0.31, "slg": 0.40, "position": 8 }"#,
        )
        .unwrap();
        let player = Player::from_stats(stats, &cfg()).unwrap();
        assert_eq!(player.position(), Some(FieldingPosition::CenterField));

        let stats: PlayerStats = serde_json::from_str(
            r#"{ "name": "Di", "ba": 0.25, "obp": 0.31, "slg": 0.40, "position": "3b" }"#,
        )
        .unwrap();
        let player = Player::from_stats(stats, &cfg()).unwrap();
        assert_eq!(player.position(), Some(FieldingPosition::ThirdBase));
    }

    #[test]
    fn iso_defaults_to_slugging_minus_average() {
        let stats = PlayerStats::new("Ed", 0.250, 0.320, 0.430);
        assert!((stats.iso() - 0.180).abs() < 1e-12);
        assert!((stats.ops() - 0.750).abs() < 1e-12);
    }
}
