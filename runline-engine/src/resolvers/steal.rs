use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::bases::{Base, BasesState, RunnerId};
use crate::config::StealConfig;
use crate::error::SimulationError;
use crate::numbers::u64_to_f64;
use crate::player::PlayerStats;
use crate::rng::bernoulli;

/// Stolen bases and times caught stealing over a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StealCounts {
    #[serde(alias = "sb")]
    pub stolen_bases: u32,
    #[serde(alias = "cs")]
    pub caught_stealing: u32,
}

impl StealCounts {
    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.stolen_bases as u64 + self.caught_stealing as u64
    }
}

/// Per-runner steal tendencies, regressed toward the league.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StealProfile {
    /// Probability of an attempt per steal opportunity.
    pub attempt_rate: f64,
    /// Probability an attempt succeeds.
    pub success_rate: f64,
}

impl StealProfile {
    #[must_use]
    pub const fn league(cfg: &StealConfig) -> Self {
        Self {
            attempt_rate: cfg.league_attempt_rate,
            success_rate: cfg.league_success_rate,
        }
    }

    /// Beta-style pseudo-count estimate from a season line.
    ///
    /// Attempts are measured against times on base (`OBP * PA`). A player
    /// with no steal data or no attempts gets the league rates.
    #[must_use]
    pub fn estimate(stats: &PlayerStats, cfg: &StealConfig) -> Self {
        let Some(counts) = stats.steals.filter(|counts| counts.attempts() > 0) else {
            return Self::league(cfg).scaled(cfg.attempt_scale);
        };
        let attempts = u64_to_f64(counts.attempts());
        let times_on_base = (stats.obp * f64::from(stats.pa)).max(0.0);

        let attempt_rate = shrink(
            cfg.league_attempt_rate,
            cfg.attempt_prior_weight,
            attempts,
            times_on_base,
        );
        let success_rate = shrink(
            cfg.league_success_rate,
            cfg.success_prior_weight,
            f64::from(counts.stolen_bases),
            attempts,
        );
        Self {
            attempt_rate,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
        .scaled(cfg.attempt_scale)
    }

    fn scaled(mut self, scale: f64) -> Self {
        self.attempt_rate = (self.attempt_rate * scale).clamp(0.0, 1.0);
        self
    }
}

/// `(prior * weight + successes) / (weight + trials)`, or the prior when
/// there is nothing to weigh.
fn shrink(prior: f64, weight: f64, successes: f64, trials: f64) -> f64 {
    let denom = weight + trials;
    if denom > 0.0 {
        prior.mul_add(weight, successes) / denom
    } else {
        prior
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StealContext<'a> {
    pub bases: BasesState,
    pub outs: u8,
    /// Indexed by lineup slot.
    pub profiles: &'a [StealProfile],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealAttempt {
    pub runner: RunnerId,
    pub from: Base,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StealOutcome {
    pub bases: BasesState,
    pub attempt: Option<StealAttempt>,
}

impl StealOutcome {
    #[must_use]
    pub const fn outs_added(&self) -> u8 {
        match self.attempt {
            Some(StealAttempt { success: false, .. }) => 1,
            _ => 0,
        }
    }
}

/// At most one steal attempt before a plate appearance.
///
/// Never with two outs. A runner on second with third open is considered
/// first; otherwise a runner on first with second open.
///
/// # Errors
///
/// Returns [`SimulationError`] if the slot index is outside the profile
/// table or a base write would overwrite a runner.
pub fn resolve_steal<R: RngCore + ?Sized>(
    ctx: StealContext<'_>,
    rng: &mut R,
) -> Result<StealOutcome, SimulationError> {
    let unchanged = StealOutcome {
        bases: ctx.bases,
        attempt: None,
    };
    if ctx.outs >= 2 {
        return Ok(unchanged);
    }
    let Some((from, runner)) = candidate(&ctx.bases) else {
        return Ok(unchanged);
    };
    let profile = ctx
        .profiles
        .get(runner)
        .ok_or(SimulationError::BattingOrder { index: runner })?;
    if !bernoulli(rng, profile.attempt_rate) {
        return Ok(unchanged);
    }

    let success = bernoulli(rng, profile.success_rate);
    let mut bases = ctx.bases;
    bases.vacate(from);
    if success {
        if let Some(target) = from.next() {
            bases.place(target, runner)?;
        }
    }
    Ok(StealOutcome {
        bases,
        attempt: Some(StealAttempt {
            runner,
            from,
            success,
        }),
    })
}

fn candidate(bases: &BasesState) -> Option<(Base, RunnerId)> {
    if let Some(runner) = bases.runner_on(Base::Second) {
        if !bases.is_occupied(Base::Third) {
            return Some((Base::Second, runner));
        }
    }
    match bases.runner_on(Base::First) {
        Some(runner) if !bases.is_occupied(Base::Second) => Some((Base::First, runner)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    fn cfg() -> StealConfig {
        StealConfig::default()
    }

    #[test]
    fn no_attempt_history_uses_league_rates() {
        let stats = PlayerStats::new("Slow", 0.25, 0.30, 0.35)
            .with_pa(600)
            .with_steals(0, 0);
        let profile = StealProfile::estimate(&stats, &cfg());
        assert_eq!(profile, StealProfile::league(&cfg()));

        let missing = StealProfile::estimate(&PlayerStats::new("Unknown", 0.25, 0.30, 0.35), &cfg());
        assert_eq!(missing, StealProfile::league(&cfg()));
    }

    #[test]
    fn zero_plate_appearances_do_not_divide_by_zero() {
        let stats = PlayerStats::new("Callup", 0.25, 0.30, 0.35).with_steals(1, 0);
        let profile = StealProfile::estimate(&stats, &cfg());
        assert!(profile.attempt_rate.is_finite());
        // (0.05 * 100 + 1) / 100
        assert!((profile.attempt_rate - 0.06).abs() < 1e-12);
        // (0.75 * 5 + 1) / 6
        assert!((profile.success_rate - 4.75 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn large_samples_approach_observed_rates() {
        let stats = PlayerStats::new("Burner", 0.26, 0.33, 0.38)
            .with_pa(600)
            .with_steals(40, 5);
        let profile = StealProfile::estimate(&stats, &cfg());
        // 198 times on base: (5 + 45) / 298
        assert!((profile.attempt_rate - 50.0 / 298.0).abs() < 1e-9);
        assert!((profile.success_rate - (3.75 + 40.0) / 50.0).abs() < 1e-9);
    }

    #[test]
    fn attempt_scale_multiplies_and_clamps() {
        let scaled = StealConfig {
            attempt_scale: 100.0,
            ..cfg()
        };
        let profile = StealProfile::estimate(&PlayerStats::new("X", 0.25, 0.3, 0.4), &scaled);
        assert!((profile.attempt_rate - 1.0).abs() < f64::EPSILON);
    }

    fn always() -> [StealProfile; 9] {
        [StealProfile {
            attempt_rate: 1.0,
            success_rate: 1.0,
        }; 9]
    }

    #[test]
    fn two_outs_disable_steals() {
        let profiles = always();
        let bases = BasesState::from_runners([Some(0), None, None]).unwrap();
        let mut rng = SimRng::from_seed(1);
        let out = resolve_steal(
            StealContext {
                bases,
                outs: 2,
                profiles: &profiles,
            },
            &mut rng,
        )
        .unwrap();
        assert!(out.attempt.is_none());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn second_base_runner_goes_first() {
        let profiles = always();
        let bases = BasesState::from_runners([Some(0), Some(1), None]).unwrap();
        let mut rng = SimRng::from_seed(1);
        let out = resolve_steal(
            StealContext {
                bases,
                outs: 0,
                profiles: &profiles,
            },
            &mut rng,
        )
        .unwrap();
        let attempt = out.attempt.unwrap();
        assert_eq!(attempt.from, Base::Second);
        assert!(attempt.success);
        assert_eq!(out.bases, BasesState::from_runners([Some(0), None, Some(1)]).unwrap());
        assert_eq!(out.outs_added(), 0);
    }

    #[test]
    fn blocked_runners_stay_put() {
        let profiles = always();
        let bases = BasesState::from_runners([Some(0), Some(1), Some(2)]).unwrap();
        let mut rng = SimRng::from_seed(1);
        let out = resolve_steal(
            StealContext {
                bases,
                outs: 0,
                profiles: &profiles,
            },
            &mut rng,
        )
        .unwrap();
        assert!(out.attempt.is_none());
        assert_eq!(out.bases, bases);
    }

    #[test]
    fn caught_stealing_removes_runner_and_adds_out() {
        let profiles = [StealProfile {
            attempt_rate: 1.0,
            success_rate: 0.0,
        }; 9];
        let bases = BasesState::from_runners([Some(4), None, None]).unwrap();
        let mut rng = SimRng::from_seed(9);
        let out = resolve_steal(
            StealContext {
                bases,
                outs: 1,
                profiles: &profiles,
            },
            &mut rng,
        )
        .unwrap();
        assert!(out.bases.is_empty());
        assert_eq!(out.outs_added(), 1);
        assert_eq!(rng.draws(), 2);
    }
}
