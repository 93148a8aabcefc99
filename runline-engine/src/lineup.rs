//! Rosters and nine-man batting orders.
//!
//! A [`Roster`] holds any number of validated players. A [`Lineup`] is an
//! ordered selection of exactly nine of them, checked complete and able to
//! record outs before a batch may start.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::{LINEUP_SIZE, PROBABILITY_TOLERANCE};
use crate::error::{ConfigurationError, SimulationError, ValidationError};
use crate::player::{Player, PlayerStats};
use crate::resolvers::steal::StealProfile;

/// Statistic used to rank a roster into a batting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineupStat {
    Ops,
    Obp,
    Slg,
    Ba,
    Iso,
}

impl LineupStat {
    #[must_use]
    pub fn value(self, stats: &PlayerStats) -> f64 {
        match self {
            Self::Ops => stats.ops(),
            Self::Obp => stats.obp,
            Self::Slg => stats.slg,
            Self::Ba => stats.ba,
            Self::Iso => stats.iso(),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ops => "ops",
            Self::Obp => "obp",
            Self::Slg => "slg",
            Self::Ba => "ba",
            Self::Iso => "iso",
        }
    }
}

impl fmt::Display for LineupStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LineupStat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ops" => Ok(Self::Ops),
            "obp" => Ok(Self::Obp),
            "slg" => Ok(Self::Slg),
            "ba" | "avg" => Ok(Self::Ba),
            "iso" => Ok(Self::Iso),
            other => Err(ConfigurationError::Parse(format!(
                "unknown lineup statistic '{other}' (expected ops, obp, slg, ba or iso)"
            ))),
        }
    }
}

/// Exactly nine players in batting order.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineup {
    players: Vec<Arc<Player>>,
    steal_profiles: Vec<StealProfile>,
}

impl Lineup {
    /// # Errors
    ///
    /// Returns [`ValidationError::LineupSize`] unless exactly nine players
    /// are given, and [`ValidationError::NoOutsPossible`] when no batter can
    /// ever make an out (a half-inning could never end).
    pub fn new(players: Vec<Arc<Player>>) -> Result<Self, ValidationError> {
        if players.len() != LINEUP_SIZE {
            return Err(ValidationError::LineupSize {
                expected: LINEUP_SIZE,
                actual: players.len(),
            });
        }
        if players
            .iter()
            .all(|player| player.pa_probs().total_outs() <= PROBABILITY_TOLERANCE)
        {
            return Err(ValidationError::NoOutsPossible);
        }
        let steal_profiles = players.iter().map(|player| *player.steal()).collect();
        Ok(Self {
            players,
            steal_profiles,
        })
    }

    #[must_use]
    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    /// Player batting in `slot` (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::BattingOrder`] for a slot past the ninth.
    pub fn batter(&self, slot: usize) -> Result<&Player, SimulationError> {
        self.players
            .get(slot)
            .map(|player| player.as_ref())
            .ok_or(SimulationError::BattingOrder { index: slot })
    }

    /// Steal tendencies indexed by lineup slot.
    #[must_use]
    pub fn steal_profiles(&self) -> &[StealProfile] {
        &self.steal_profiles
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|player| player.name().to_string())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Slot-by-slot lineup assembly.
#[derive(Debug, Clone, Default)]
pub struct LineupBuilder {
    slots: [Option<Arc<Player>>; LINEUP_SIZE],
}

impl LineupBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::LineupSlotOutOfRange`] for a slot past the
    /// ninth.
    pub fn set(&mut self, slot: usize, player: Arc<Player>) -> Result<&mut Self, ValidationError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(ValidationError::LineupSlotOutOfRange { slot })?;
        *entry = Some(player);
        Ok(self)
    }

    pub fn clear(&mut self, slot: usize) -> Option<Arc<Player>> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    #[must_use]
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLineupSlot`] naming the first gap, or
    /// any error from [`Lineup::new`].
    pub fn build(&self) -> Result<Lineup, ValidationError> {
        let players = self
            .slots
            .iter()
            .enumerate()
            .map(|(slot, player)| {
                player
                    .clone()
                    .ok_or(ValidationError::EmptyLineupSlot { slot })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Lineup::new(players)
    }
}

/// Unvalidated roster as stored on disk: a bare array of stat lines or an
/// object with an optional `team` and a `players` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RosterData {
    Players(Vec<PlayerStats>),
    Team {
        #[serde(default)]
        team: Option<String>,
        players: Vec<PlayerStats>,
    },
}

impl RosterData {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|err| ConfigurationError::Parse(format!("roster: {err}")))
    }

    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Vec<PlayerStats>) {
        match self {
            Self::Players(players) => (None, players),
            Self::Team { team, players } => (team, players),
        }
    }
}

/// How to pick nine batters out of a roster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineupSelection {
    /// First nine in roster order.
    #[default]
    RosterOrder,
    /// Roster indices in batting order.
    Indices(Vec<usize>),
    Names(Vec<String>),
    ByStat(LineupStat),
    TopByPlateAppearances,
}

/// Validated pool of players available to a lineup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    team: Option<String>,
    players: Vec<Arc<Player>>,
}

impl Roster {
    /// Build every player, failing on the first invalid line.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised by [`Player::from_stats`].
    pub fn from_stats(stats: Vec<PlayerStats>, cfg: &SimConfig) -> Result<Self, ValidationError> {
        let players = stats
            .into_iter()
            .map(|line| Player::from_stats(line, cfg).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            team: None,
            players,
        })
    }

    /// Parse a roster from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] wrapped in
    /// [`crate::EngineError`] for malformed JSON, or the first player
    /// validation failure.
    pub fn from_json(json: &str, cfg: &SimConfig) -> Result<Self, crate::EngineError> {
        let data = RosterData::from_json(json)?;
        Ok(Self::from_data(data, cfg)?)
    }

    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised by [`Player::from_stats`].
    pub fn from_data(data: RosterData, cfg: &SimConfig) -> Result<Self, ValidationError> {
        let (team, stats) = data.into_parts();
        let mut roster = Self::from_stats(stats, cfg)?;
        roster.team = team;
        Ok(roster)
    }

    /// Build the lineup a [`LineupSelection`] describes.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the selected strategy.
    pub fn select(&self, selection: &LineupSelection) -> Result<Lineup, ValidationError> {
        match selection {
            LineupSelection::RosterOrder => self.default_lineup(),
            LineupSelection::Indices(order) => self.lineup_by_order(order),
            LineupSelection::Names(names) => self.lineup_by_names(names),
            LineupSelection::ByStat(stat) => self.lineup_by_stat(*stat),
            LineupSelection::TopByPlateAppearances => self.top_by_plate_appearances(),
        }
    }

    #[must_use]
    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    #[must_use]
    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<Player>> {
        let needle = name.trim();
        self.players
            .iter()
            .find(|player| player.name().eq_ignore_ascii_case(needle))
    }

    /// The first nine players in roster order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LineupSize`] with fewer than nine players.
    pub fn default_lineup(&self) -> Result<Lineup, ValidationError> {
        Lineup::new(self.players.iter().take(LINEUP_SIZE).cloned().collect())
    }

    /// Lineup from roster indices in batting order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RosterIndex`] for an out-of-range index or
    /// any error from [`Lineup::new`].
    pub fn lineup_by_order(&self, order: &[usize]) -> Result<Lineup, ValidationError> {
        let players = order
            .iter()
            .map(|&index| {
                self.players
                    .get(index)
                    .cloned()
                    .ok_or(ValidationError::RosterIndex {
                        index,
                        len: self.players.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Lineup::new(players)
    }

    /// Lineup from player names in batting order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownPlayer`] for a name not on the
    /// roster or any error from [`Lineup::new`].
    pub fn lineup_by_names<S: AsRef<str>>(&self, names: &[S]) -> Result<Lineup, ValidationError> {
        let players = names
            .iter()
            .map(|name| {
                self.find(name.as_ref())
                    .cloned()
                    .ok_or_else(|| ValidationError::UnknownPlayer {
                        name: name.as_ref().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Lineup::new(players)
    }

    /// Top nine by `stat`, best first. Ties keep roster order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LineupSize`] with fewer than nine players.
    pub fn lineup_by_stat(&self, stat: LineupStat) -> Result<Lineup, ValidationError> {
        self.ranked_lineup(|player| stat.value(player.stats()))
    }

    /// The nine regulars with the most plate appearances, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LineupSize`] with fewer than nine players.
    pub fn top_by_plate_appearances(&self) -> Result<Lineup, ValidationError> {
        self.ranked_lineup(|player| f64::from(player.stats().pa))
    }

    fn ranked_lineup<F>(&self, key: F) -> Result<Lineup, ValidationError>
    where
        F: Fn(&Player) -> f64,
    {
        let mut ranked: Vec<(f64, &Arc<Player>)> = self
            .players
            .iter()
            .map(|player| (key(player.as_ref()), player))
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        Lineup::new(
            ranked
                .into_iter()
                .take(LINEUP_SIZE)
                .map(|(_, player)| Arc::clone(player))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(i: usize) -> PlayerStats {
        let step = f64::from(u32::try_from(i).unwrap()) * 0.005;
        PlayerStats::new(format!("P{i}"), 0.230 + step, 0.300 + step, 0.380 + 2.0 * step)
            .with_pa(400 + u32::try_from(i).unwrap() * 10)
    }

    fn roster(n: usize) -> Roster {
        Roster::from_stats((0..n).map(stats).collect(), &SimConfig::default()).unwrap()
    }

    #[test]
    fn lineup_requires_nine() {
        let roster = roster(8);
        assert_eq!(
            roster.default_lineup(),
            Err(ValidationError::LineupSize {
                expected: 9,
                actual: 8
            })
        );
    }

    #[test]
    fn builder_reports_first_gap() {
        let roster = roster(9);
        let mut builder = LineupBuilder::new();
        for slot in 0..9 {
            if slot != 4 {
                builder.set(slot, roster.players()[slot].clone()).unwrap();
            }
        }
        assert_eq!(builder.filled(), 8);
        assert_eq!(
            builder.build(),
            Err(ValidationError::EmptyLineupSlot { slot: 4 })
        );
        assert!(matches!(
            builder.set(9, roster.players()[0].clone()),
            Err(ValidationError::LineupSlotOutOfRange { slot: 9 })
        ));
        builder.set(4, roster.players()[4].clone()).unwrap();
        assert_eq!(builder.build().unwrap().len(), 9);
    }

    #[test]
    fn order_and_names_select_players() {
        let roster = roster(12);
        let lineup = roster
            .lineup_by_order(&[11, 10, 9, 8, 7, 6, 5, 4, 3])
            .unwrap();
        assert_eq!(lineup.batter(0).unwrap().name(), "P11");
        assert!(matches!(
            roster.lineup_by_order(&[0, 1, 2, 3, 4, 5, 6, 7, 40]),
            Err(ValidationError::RosterIndex { index: 40, len: 12 })
        ));

        let names = ["p1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P0"];
        let lineup = roster.lineup_by_names(&names).unwrap();
        assert_eq!(lineup.names()[0], "P1");
        assert_eq!(lineup.names()[8], "P0");
        assert!(matches!(
            roster.lineup_by_names(&["Nobody"; 9]),
            Err(ValidationError::UnknownPlayer { .. })
        ));
    }

    #[test]
    fn ranked_lineups_sort_descending() {
        let roster = roster(11);
        let by_ops = roster.lineup_by_stat(LineupStat::Ops).unwrap();
        assert_eq!(by_ops.batter(0).unwrap().name(), "P10");
        assert_eq!(by_ops.batter(8).unwrap().name(), "P2");
        let by_pa = roster.top_by_plate_appearances().unwrap();
        assert_eq!(by_pa.batter(0).unwrap().name(), "P10");
        assert!(by_pa.batter(9).is_err());
    }

    #[test]
    fn parses_roster_json_in_both_shapes() {
        let cfg = SimConfig::default();
        let players: Vec<PlayerStats> = (0..9).map(stats).collect();
        let bare = serde_json::to_string(&players).unwrap();
        assert_eq!(Roster::from_json(&bare, &cfg).unwrap().len(), 9);

        let wrapped = format!(r#"{{ "team": "TOR", "players": {bare} }}"#);
        let roster = Roster::from_json(&wrapped, &cfg).unwrap();
        assert_eq!(roster.team(), Some("TOR"));
        assert!(Roster::from_json("[{]", &cfg).is_err());
    }

    #[test]
    fn lineup_that_cannot_make_outs_is_rejected() {
        let cfg = SimConfig::default();
        let perfect = Arc::new(
            Player::from_stats(PlayerStats::new("Perfect", 1.0, 1.0, 4.0), &cfg).unwrap(),
        );
        assert_eq!(
            Lineup::new(vec![perfect; 9]),
            Err(ValidationError::NoOutsPossible)
        );
    }

    #[test]
    fn selection_dispatches_to_each_strategy() {
        let roster = roster(10);
        assert_eq!(
            roster.select(&LineupSelection::default()).unwrap().names()[0],
            "P0"
        );
        let reversed = LineupSelection::Indices((1..10).rev().collect());
        assert_eq!(roster.select(&reversed).unwrap().names()[0], "P9");
        let by_slg = LineupSelection::ByStat(LineupStat::Slg);
        assert_eq!(roster.select(&by_slg).unwrap().names()[0], "P9");
        let names = LineupSelection::Names((1..10).map(|i| format!("P{i}")).collect());
        assert_eq!(roster.select(&names).unwrap().names()[8], "P9");
    }

    #[test]
    fn parses_lineup_stat_tokens() {
        assert_eq!("OPS".parse::<LineupStat>().unwrap(), LineupStat::Ops);
        assert_eq!("avg".parse::<LineupStat>().unwrap(), LineupStat::Ba);
        assert!("war".parse::<LineupStat>().is_err());
    }
}
