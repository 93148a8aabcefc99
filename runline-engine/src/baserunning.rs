//! Runner advancement on the result of a plate appearance.
//!
//! [`advance`] is a pure transition: it takes a bases state by value and
//! returns the new state and the runners who scored. Deterministic mode uses
//! a fixed table. Probabilistic mode keeps the same skeleton and layers three
//! Bernoulli trials on top (first-to-third on a single, first scores on a
//! double, second scores on a double).

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::bases::{Base, BasesState, RunnerId, Scorers};
use crate::config::BaserunningOdds;
use crate::constants::OUTS_PER_INNING;
use crate::error::{ConfigurationError, EngineError, SimulationError};
use crate::outcome::PaOutcome;
use crate::rng::bernoulli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    Deterministic,
    Probabilistic,
}

/// Result of one advancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub bases: BasesState,
    pub scorers: Scorers,
}

impl Advance {
    #[must_use]
    pub fn runs(&self) -> u32 {
        u32::try_from(self.scorers.len()).unwrap_or(u32::MAX)
    }
}

/// Inputs for one advancement.
#[derive(Debug, Clone, Copy)]
pub struct AdvanceContext<'a> {
    pub bases: BasesState,
    pub outcome: PaOutcome,
    pub batter: RunnerId,
    pub outs: u8,
    pub mode: AdvanceMode,
    pub odds: &'a BaserunningOdds,
}

/// Apply `ctx.outcome` to the bases.
///
/// Outs leave the runners where they are; the caller records the out (and
/// any sacrifice fly) before calling this.
///
/// # Errors
///
/// [`ConfigurationError::MissingRandomSource`] when probabilistic mode is
/// requested without a generator, and [`SimulationError`] if `outs` is
/// already terminal or a base write would overwrite a runner.
pub fn advance<R: RngCore + ?Sized>(
    ctx: AdvanceContext<'_>,
    rng: Option<&mut R>,
) -> Result<Advance, EngineError> {
    if ctx.outs >= OUTS_PER_INNING {
        return Err(SimulationError::OutsOverflow { outs: ctx.outs }.into());
    }
    let mut rng = match (ctx.mode, rng) {
        (AdvanceMode::Probabilistic, None) => {
            return Err(ConfigurationError::MissingRandomSource.into());
        }
        (AdvanceMode::Probabilistic, Some(rng)) => Some(rng),
        (AdvanceMode::Deterministic, _) => None,
    };

    let mut bases = ctx.bases;
    let mut scorers = Scorers::new();
    match ctx.outcome {
        PaOutcome::Strikeout | PaOutcome::InPlayOut => {}
        PaOutcome::Walk => bases.force_into(Base::First, ctx.batter, &mut scorers)?,
        PaOutcome::Single => {
            score_from(&mut bases, Base::Third, &mut scorers);
            move_runner(&mut bases, Base::Second, Base::Third)?;
            if let Some(runner) = bases.vacate(Base::First) {
                let aggressive =
                    roll(rng.as_deref_mut(), ctx.odds.single_first_to_third, false);
                let target = if aggressive { Base::Third } else { Base::Second };
                bases.settle_behind(target, runner)?;
            }
            bases.force_into(Base::First, ctx.batter, &mut scorers)?;
        }
        PaOutcome::Double => {
            score_from(&mut bases, Base::Third, &mut scorers);
            if let Some(runner) = bases.vacate(Base::Second) {
                if roll(rng.as_deref_mut(), ctx.odds.double_second_scores, true) {
                    scorers.push(runner);
                } else {
                    bases.place(Base::Third, runner)?;
                }
            }
            if let Some(runner) = bases.vacate(Base::First) {
                if roll(rng.as_deref_mut(), ctx.odds.double_first_scores, false) {
                    scorers.push(runner);
                } else {
                    // A runner from second who held at third is forced home.
                    bases.force_into(Base::Third, runner, &mut scorers)?;
                }
            }
            bases.force_into(Base::Second, ctx.batter, &mut scorers)?;
        }
        PaOutcome::Triple => {
            bases.clear_scoring(&mut scorers);
            bases.place(Base::Third, ctx.batter)?;
        }
        PaOutcome::HomeRun => {
            bases.clear_scoring(&mut scorers);
            scorers.push(ctx.batter);
        }
    }
    Ok(Advance { bases, scorers })
}

/// Deterministic mode answers from the fixed table without drawing.
/// Probabilistic mode draws exactly once.
fn roll<R: RngCore + ?Sized>(rng: Option<&mut R>, p: f64, deterministic: bool) -> bool {
    rng.map_or(deterministic, |rng| bernoulli(rng, p))
}

fn score_from(bases: &mut BasesState, base: Base, scorers: &mut Scorers) {
    if let Some(runner) = bases.vacate(base) {
        scorers.push(runner);
    }
}

fn move_runner(bases: &mut BasesState, from: Base, to: Base) -> Result<(), SimulationError> {
    match bases.vacate(from) {
        Some(runner) => bases.place(to, runner),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    const BATTER: RunnerId = 8;

    fn det(bases: BasesState, outcome: PaOutcome) -> Advance {
        let odds = BaserunningOdds::default();
        advance::<SimRng>(
            AdvanceContext {
                bases,
                outcome,
                batter: BATTER,
                outs: 0,
                mode: AdvanceMode::Deterministic,
                odds: &odds,
            },
            None,
        )
        .unwrap()
    }

    fn state(runners: [Option<RunnerId>; 3]) -> BasesState {
        BasesState::from_runners(runners).unwrap()
    }

    #[test]
    fn single_moves_runner_from_first_to_second() {
        let out = det(state([Some(0), None, None]), PaOutcome::Single);
        assert_eq!(out.bases, state([Some(BATTER), Some(0), None]));
        assert_eq!(out.runs(), 0);
    }

    #[test]
    fn single_advances_everyone_one_base() {
        let out = det(state([Some(0), Some(1), Some(2)]), PaOutcome::Single);
        assert_eq!(out.bases, state([Some(BATTER), Some(0), Some(1)]));
        assert_eq!(out.scorers.as_slice(), &[2]);
    }

    #[test]
    fn walk_only_forces() {
        let out = det(state([None, Some(1), Some(2)]), PaOutcome::Walk);
        assert_eq!(out.bases, state([Some(BATTER), Some(1), Some(2)]));
        assert_eq!(out.runs(), 0);

        let out = det(state([Some(0), None, Some(2)]), PaOutcome::Walk);
        assert_eq!(out.bases, state([Some(BATTER), Some(0), Some(2)]));

        let out = det(state([Some(0), Some(1), Some(2)]), PaOutcome::Walk);
        assert_eq!(out.bases, state([Some(BATTER), Some(0), Some(1)]));
        assert_eq!(out.scorers.as_slice(), &[2]);
    }

    #[test]
    fn double_scores_second_and_sends_first_to_third() {
        let out = det(state([Some(0), Some(1), Some(2)]), PaOutcome::Double);
        assert_eq!(out.bases, state([None, Some(BATTER), Some(0)]));
        assert_eq!(out.scorers.as_slice(), &[2, 1]);
    }

    #[test]
    fn triple_and_home_run_clear_the_bases() {
        let out = det(state([Some(0), Some(1), None]), PaOutcome::Triple);
        assert_eq!(out.bases, state([None, None, Some(BATTER)]));
        assert_eq!(out.runs(), 2);

        let out = det(state([Some(0), Some(1), Some(2)]), PaOutcome::HomeRun);
        assert!(out.bases.is_empty());
        assert_eq!(out.runs(), 4);
    }

    #[test]
    fn outs_leave_runners_in_place() {
        let bases = state([Some(0), None, Some(2)]);
        assert_eq!(det(bases, PaOutcome::Strikeout).bases, bases);
        assert_eq!(det(bases, PaOutcome::InPlayOut).runs(), 0);
    }

    #[test]
    fn probabilistic_mode_requires_rng() {
        let odds = BaserunningOdds::default();
        let err = advance::<SimRng>(
            AdvanceContext {
                bases: BasesState::empty(),
                outcome: PaOutcome::Single,
                batter: 0,
                outs: 0,
                mode: AdvanceMode::Probabilistic,
                odds: &odds,
            },
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Configuration(ConfigurationError::MissingRandomSource)
        );
    }

    #[test]
    fn terminal_outs_are_rejected() {
        let odds = BaserunningOdds::default();
        let err = advance::<SimRng>(
            AdvanceContext {
                bases: BasesState::empty(),
                outcome: PaOutcome::Walk,
                batter: 0,
                outs: 3,
                mode: AdvanceMode::Deterministic,
                odds: &odds,
            },
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Simulation(SimulationError::OutsOverflow { outs: 3 })
        );
    }

    #[test]
    fn held_runner_is_forced_home_by_trailing_runner() {
        let odds = BaserunningOdds {
            single_first_to_third: 0.0,
            double_first_scores: 0.0,
            double_second_scores: 0.0,
        };
        let mut rng = SimRng::from_seed(11);
        let out = advance(
            AdvanceContext {
                bases: state([Some(0), Some(1), None]),
                outcome: PaOutcome::Double,
                batter: BATTER,
                outs: 1,
                mode: AdvanceMode::Probabilistic,
                odds: &odds,
            },
            Some(&mut rng),
        )
        .unwrap();
        assert_eq!(out.bases, state([None, Some(BATTER), Some(0)]));
        assert_eq!(out.scorers.as_slice(), &[1]);
        assert_eq!(rng.draws(), 2);
    }

    #[test]
    fn aggressive_single_settles_behind_occupied_third() {
        let odds = BaserunningOdds {
            single_first_to_third: 1.0,
            ..BaserunningOdds::default()
        };
        let mut rng = SimRng::from_seed(3);
        let out = advance(
            AdvanceContext {
                bases: state([Some(0), Some(1), None]),
                outcome: PaOutcome::Single,
                batter: BATTER,
                outs: 0,
                mode: AdvanceMode::Probabilistic,
                odds: &odds,
            },
            Some(&mut rng),
        )
        .unwrap();
        assert_eq!(out.bases, state([Some(BATTER), Some(0), Some(1)]));

        let out = advance(
            AdvanceContext {
                bases: state([Some(0), None, None]),
                outcome: PaOutcome::Single,
                batter: BATTER,
                outs: 0,
                mode: AdvanceMode::Probabilistic,
                odds: &odds,
            },
            Some(&mut rng),
        )
        .unwrap();
        assert_eq!(out.bases, state([Some(BATTER), None, Some(0)]));
    }
}
