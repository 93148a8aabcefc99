//! Half-inning state machine.
//!
//! An [`InningState`] is created fresh for every half-inning and stepped one
//! plate appearance at a time until three outs. Each step runs, in order:
//! the steal check, the misplay roll, the outcome draw, then either the
//! sacrifice-fly check (in-play outs) or the baserunning advancer.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::bases::{BasesState, RunnerId};
use crate::baserunning::{self, AdvanceContext};
use crate::boxscore::BoxScore;
use crate::config::SimConfig;
use crate::constants::{LINEUP_SIZE, OUTS_PER_INNING};
use crate::error::{EngineError, SimulationError};
use crate::lineup::Lineup;
use crate::outcome::{PaOutcome, sample_outcome};
use crate::resolvers::{
    MisplayContext, SacrificeFlyContext, StealAttempt, StealContext, resolve_misplay,
    resolve_sacrifice_fly, resolve_steal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningPhase {
    /// Fewer than three outs.
    Accumulating,
    /// Three outs; no further steps allowed.
    Terminal,
}

/// Read-only inputs shared by every step of every half-inning.
#[derive(Debug, Clone, Copy)]
pub struct InningContext<'a> {
    pub lineup: &'a Lineup,
    pub cfg: &'a SimConfig,
}

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateAppearanceRecord {
    pub steal: Option<StealAttempt>,
    pub misplay: bool,
    /// `None` when a caught stealing ended the inning before the pitch.
    pub batter: Option<usize>,
    pub outcome: Option<PaOutcome>,
    pub sacrifice_fly: bool,
    pub runs: u32,
    pub outs_after: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InningState {
    outs: u8,
    bases: BasesState,
    batter_index: usize,
    box_score: BoxScore,
}

impl InningState {
    /// Empty bases, no outs, `leadoff` due up.
    #[must_use]
    pub fn new(leadoff: usize) -> Self {
        Self {
            outs: 0,
            bases: BasesState::empty(),
            batter_index: leadoff % LINEUP_SIZE,
            box_score: BoxScore::default(),
        }
    }

    /// Start from an arbitrary mid-inning situation.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::OutsOverflow`] when `outs` is already
    /// terminal.
    pub fn with_situation(
        leadoff: usize,
        outs: u8,
        bases: BasesState,
    ) -> Result<Self, SimulationError> {
        if outs >= OUTS_PER_INNING {
            return Err(SimulationError::OutsOverflow { outs });
        }
        Ok(Self {
            outs,
            bases,
            ..Self::new(leadoff)
        })
    }

    #[must_use]
    pub const fn phase(&self) -> InningPhase {
        if self.outs >= OUTS_PER_INNING {
            InningPhase::Terminal
        } else {
            InningPhase::Accumulating
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.phase(), InningPhase::Terminal)
    }

    #[must_use]
    pub const fn outs(&self) -> u8 {
        self.outs
    }

    #[must_use]
    pub const fn bases(&self) -> &BasesState {
        &self.bases
    }

    #[must_use]
    pub const fn batter_index(&self) -> usize {
        self.batter_index
    }

    #[must_use]
    pub const fn box_score(&self) -> &BoxScore {
        &self.box_score
    }

    fn record_outs(&mut self, outs: u8) -> Result<(), SimulationError> {
        let total = self.outs.saturating_add(outs);
        if total > OUTS_PER_INNING {
            return Err(SimulationError::OutsOverflow { outs: total });
        }
        self.outs = total;
        Ok(())
    }

    fn credit(&mut self, scorers: &[RunnerId]) -> u32 {
        for runner in scorers {
            self.box_score.score(*runner);
        }
        u32::try_from(scorers.len()).unwrap_or(u32::MAX)
    }

    /// Play one plate appearance (plus any steal or misplay before it).
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::OutsOverflow`] when stepping a terminal
    /// inning, and propagates any resolver or advancer failure.
    pub fn step<R: RngCore + ?Sized>(
        &mut self,
        ctx: InningContext<'_>,
        rng: &mut R,
    ) -> Result<PlateAppearanceRecord, EngineError> {
        if self.is_terminal() {
            return Err(SimulationError::OutsOverflow { outs: self.outs }.into());
        }
        let features = ctx.cfg.features;
        let mut record = PlateAppearanceRecord {
            steal: None,
            misplay: false,
            batter: None,
            outcome: None,
            sacrifice_fly: false,
            runs: 0,
            outs_after: self.outs,
        };

        if features.stolen_bases {
            let steal = resolve_steal(
                StealContext {
                    bases: self.bases,
                    outs: self.outs,
                    profiles: ctx.lineup.steal_profiles(),
                },
                rng,
            )?;
            if let Some(attempt) = steal.attempt {
                self.box_score.steal_attempts += 1;
                if attempt.success {
                    self.box_score.stolen_bases += 1;
                } else {
                    self.box_score.caught_stealing += 1;
                }
            }
            self.bases = steal.bases;
            self.record_outs(steal.outs_added())?;
            record.steal = steal.attempt;
            if self.is_terminal() {
                record.outs_after = self.outs;
                return Ok(self.finish(record));
            }
        }

        if features.misplays {
            let misplay = resolve_misplay(
                MisplayContext {
                    bases: self.bases,
                    rate_per_pa: ctx.cfg.misplays.rate_per_pa,
                },
                rng,
            )?;
            if misplay.occurred {
                self.box_score.misplays += 1;
                record.misplay = true;
                record.runs += self.credit(&misplay.scorers);
            }
            self.bases = misplay.bases;
        }

        let slot = self.batter_index;
        let batter = ctx.lineup.batter(slot)?;
        let outcome = sample_outcome(batter.pa_probs(), batter.hit_types(), rng);
        self.box_score.plate_appearances += 1;
        record.batter = Some(slot);
        record.outcome = Some(outcome);

        if outcome.is_out() {
            if outcome == PaOutcome::Strikeout {
                self.box_score.strikeouts += 1;
            }
            if features.sacrifice_flies {
                let fly = resolve_sacrifice_fly(
                    SacrificeFlyContext {
                        bases: self.bases,
                        outcome,
                        outs: self.outs,
                        flyout_share: ctx.cfg.sacrifice_fly.flyout_share,
                    },
                    rng,
                );
                if let Some(scorer) = fly.scorer {
                    self.box_score.sacrifice_flies += 1;
                    record.sacrifice_fly = true;
                    record.runs += self.credit(&[scorer]);
                }
                self.bases = fly.bases;
            }
            self.record_outs(1)?;
        } else {
            if outcome.is_hit() {
                self.box_score.hits += 1;
            } else {
                self.box_score.walks += 1;
            }
            let advance = baserunning::advance(
                AdvanceContext {
                    bases: self.bases,
                    outcome,
                    batter: slot,
                    outs: self.outs,
                    mode: ctx.cfg.advance_mode(),
                    odds: &ctx.cfg.baserunning,
                },
                Some(&mut *rng),
            )?;
            self.bases = advance.bases;
            record.runs += self.credit(&advance.scorers);
        }

        self.batter_index = (slot + 1) % LINEUP_SIZE;
        record.outs_after = self.outs;
        Ok(self.finish(record))
    }

    fn finish(&mut self, record: PlateAppearanceRecord) -> PlateAppearanceRecord {
        if self.is_terminal() {
            self.box_score.left_on_base =
                u32::try_from(self.bases.runner_count()).unwrap_or(u32::MAX);
        }
        record
    }

    /// Consume a finished inning.
    #[must_use]
    pub fn into_summary(self) -> HalfInningSummary {
        HalfInningSummary {
            box_score: self.box_score,
            next_batter: self.batter_index,
        }
    }
}

/// Totals for one completed half-inning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfInningSummary {
    pub box_score: BoxScore,
    /// Lineup slot due up to lead off the next inning.
    pub next_batter: usize,
}

/// Play a half-inning to three outs.
///
/// Terminates with probability one: [`Lineup::new`] rejects any order in
/// which no batter can make an out.
///
/// # Errors
///
/// Propagates any step failure.
pub fn simulate_half_inning<R: RngCore + ?Sized>(
    ctx: InningContext<'_>,
    leadoff: usize,
    rng: &mut R,
) -> Result<HalfInningSummary, EngineError> {
    let mut state = InningState::new(leadoff);
    while !state.is_terminal() {
        state.step(ctx, rng)?;
    }
    Ok(state.into_summary())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bases::Base;
    use crate::config::FeatureFlags;
    use crate::player::{Player, PlayerStats};
    use crate::rng::SimRng;

    fn lineup_of(stats: PlayerStats, cfg: &SimConfig) -> Lineup {
        let player = Arc::new(Player::from_stats(stats, cfg).unwrap());
        Lineup::new(vec![player; LINEUP_SIZE]).unwrap()
    }

    fn in_play_out_hitter() -> PlayerStats {
        PlayerStats::new("Grounder", 0.0, 0.0, 0.0).with_k_pct(0.0)
    }

    #[test]
    fn sacrifice_fly_blocked_with_two_outs() {
        let mut cfg = SimConfig::default();
        cfg.features = FeatureFlags {
            sacrifice_flies: true,
            ..FeatureFlags::minimal()
        };
        cfg.sacrifice_fly.flyout_share = 1.0;
        let lineup = lineup_of(in_play_out_hitter(), &cfg);
        let bases = BasesState::from_runners([None, None, Some(5)]).unwrap();
        let mut state = InningState::with_situation(0, 2, bases).unwrap();
        let mut rng = SimRng::from_seed(1);
        let record = state
            .step(InningContext { lineup: &lineup, cfg: &cfg }, &mut rng)
            .unwrap();
        assert_eq!(record.outcome, Some(PaOutcome::InPlayOut));
        assert!(!record.sacrifice_fly);
        assert_eq!(record.runs, 0);
        assert_eq!(state.outs(), 3);
        assert!(state.is_terminal());
        assert_eq!(state.box_score().left_on_base, 1);
    }

    #[test]
    fn sacrifice_fly_scores_with_one_out() {
        let mut cfg = SimConfig::default();
        cfg.features = FeatureFlags {
            sacrifice_flies: true,
            ..FeatureFlags::minimal()
        };
        cfg.sacrifice_fly.flyout_share = 1.0;
        let lineup = lineup_of(in_play_out_hitter(), &cfg);
        let bases = BasesState::from_runners([Some(1), None, Some(5)]).unwrap();
        let mut state = InningState::with_situation(0, 1, bases).unwrap();
        let mut rng = SimRng::from_seed(1);
        let record = state
            .step(InningContext { lineup: &lineup, cfg: &cfg }, &mut rng)
            .unwrap();
        assert!(record.sacrifice_fly);
        assert_eq!(record.runs, 1);
        assert_eq!(state.outs(), 2);
        assert!(!state.bases().is_occupied(Base::Third));
        assert_eq!(state.box_score().runs_by_slot[5], 1);
    }

    #[test]
    fn caught_stealing_records_an_out_before_the_pitch() {
        let mut cfg = SimConfig::default();
        cfg.features = FeatureFlags {
            stolen_bases: true,
            ..FeatureFlags::minimal()
        };
        cfg.steals.league_attempt_rate = 1.0;
        cfg.steals.league_success_rate = 0.0;
        let lineup = lineup_of(in_play_out_hitter(), &cfg);
        let bases = BasesState::from_runners([Some(2), None, None]).unwrap();
        let mut state = InningState::with_situation(3, 1, bases).unwrap();
        let mut rng = SimRng::from_seed(2);
        let record = state
            .step(InningContext { lineup: &lineup, cfg: &cfg }, &mut rng)
            .unwrap();
        assert!(record.steal.is_some_and(|attempt| !attempt.success));
        assert_eq!(record.batter, Some(3));
        assert_eq!(record.outs_after, 3);
        assert_eq!(state.box_score().caught_stealing, 1);
        assert_eq!(state.box_score().left_on_base, 0);
        assert_eq!(state.batter_index(), 4);
    }

    #[test]
    fn terminal_state_refuses_to_step() {
        let cfg = SimConfig::default();
        let lineup = lineup_of(in_play_out_hitter(), &cfg);
        let mut rng = SimRng::from_seed(3);
        let ctx = InningContext { lineup: &lineup, cfg: &cfg };
        let summary = simulate_half_inning(ctx, 7, &mut rng).unwrap();
        assert_eq!(summary.box_score.plate_appearances, 3);
        assert_eq!(summary.next_batter, 1);
        assert_eq!(summary.box_score.runs, 0);

        let mut state = InningState::with_situation(0, 2, BasesState::empty()).unwrap();
        state.step(ctx, &mut rng).unwrap();
        assert!(state.step(ctx, &mut rng).is_err());
        assert!(InningState::with_situation(0, 3, BasesState::empty()).is_err());
    }

    #[test]
    fn misplay_scores_runner_without_moving_batter() {
        let mut cfg = SimConfig::default();
        cfg.features = FeatureFlags {
            misplays: true,
            ..FeatureFlags::minimal()
        };
        cfg.misplays.rate_per_pa = 1.0;
        let lineup = lineup_of(
            PlayerStats::new("K", 0.0, 0.0, 0.0).with_k_pct(1.0),
            &cfg,
        );
        let bases = BasesState::from_runners([None, None, Some(4)]).unwrap();
        let mut state = InningState::with_situation(0, 0, bases).unwrap();
        let mut rng = SimRng::from_seed(5);
        let record = state
            .step(InningContext { lineup: &lineup, cfg: &cfg }, &mut rng)
            .unwrap();
        assert!(record.misplay);
        assert_eq!(record.outcome, Some(PaOutcome::Strikeout));
        assert_eq!(record.runs, 1);
        assert!(state.bases().is_empty());
        assert_eq!(state.box_score().strikeouts, 1);
    }

    #[test]
    fn outs_never_decrease_and_end_at_three() {
        let cfg = SimConfig::default();
        let lineup = lineup_of(
            PlayerStats::new("Avg", 0.260, 0.330, 0.420)
                .with_pa(600)
                .with_steals(15, 5),
            &cfg,
        );
        let mut rng = SimRng::from_seed(77);
        let ctx = InningContext { lineup: &lineup, cfg: &cfg };
        for leadoff in 0..200 {
            let mut state = InningState::new(leadoff);
            let mut previous = 0;
            let mut steps = 0;
            while !state.is_terminal() {
                let record = state.step(ctx, &mut rng).unwrap();
                assert!(record.outs_after >= previous);
                previous = record.outs_after;
                steps += 1;
                assert!(steps < 200);
            }
            assert_eq!(state.outs(), 3);
        }
    }
}
