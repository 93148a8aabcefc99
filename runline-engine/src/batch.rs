//! Monte-Carlo batch orchestration.
//!
//! A batch runs `iterations` independent seasons. Iteration `i` owns a
//! generator derived from `(master_seed, i)`, so the sequential and the
//! parallel paths produce identical results in identical order.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::{LINEUP_SIZE, Z_95};
use crate::error::{ConfigurationError, EngineError};
use crate::inning::InningContext;
use crate::lineup::Lineup;
use crate::numbers::count_to_f64;
use crate::rng::SimRng;
use crate::season::{SeasonResult, simulate_season};
use crate::stats::{ConfidenceInterval, CounterSummary, DistributionSummary, wilson_interval};

/// Progress callback: `(completed_iterations, total_iterations)`.
pub type ProgressCallback<'a> = &'a (dyn Fn(usize, usize) + Sync);

/// Execution knobs that do not change results.
#[derive(Clone, Copy, Default)]
pub struct BatchOptions<'a> {
    /// Fan iterations out over the rayon pool.
    pub parallel: bool,
    /// Checked between iterations; once set the batch stops with
    /// [`EngineError::Cancelled`].
    pub cancel: Option<&'a AtomicBool>,
    pub progress: Option<ProgressCallback<'a>>,
}

impl fmt::Debug for BatchOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchOptions")
            .field("parallel", &self.parallel)
            .field("cancel", &self.cancel.map(|flag| flag.load(Ordering::Relaxed)))
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> BatchOptions<'a> {
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, progress: ProgressCallback<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Per-season means and spreads of the secondary box-score counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterBreakdown {
    pub hits: CounterSummary,
    pub walks: CounterSummary,
    pub strikeouts: CounterSummary,
    pub stolen_bases: CounterSummary,
    pub caught_stealing: CounterSummary,
    pub sacrifice_flies: CounterSummary,
    pub misplays: CounterSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub master_seed: u64,
    pub iterations: usize,
    pub games_per_season: u32,
    /// Season run totals in iteration order.
    pub season_runs: Vec<u32>,
    pub summary: DistributionSummary,
    /// Season total a run is compared against for the win estimate.
    pub win_threshold_runs: f64,
    pub win_probability: f64,
    pub win_probability_ci_95: ConfidenceInterval,
    pub runs_per_game: CounterSummary,
    pub lob_per_game: f64,
    pub counters: CounterBreakdown,
    /// Mean season runs scored by each lineup slot.
    pub runs_by_slot: [f64; LINEUP_SIZE],
    pub total_rng_draws: u64,
    /// Recoverable data issues noticed while building the lineup.
    pub player_warnings: Vec<String>,
}

impl BatchResult {
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.summary.mean
    }

    /// Season runs as floats, in iteration order.
    #[must_use]
    pub fn season_runs_f64(&self) -> Vec<f64> {
        self.season_runs.iter().copied().map(f64::from).collect()
    }
}

struct IterationOutcome {
    season: SeasonResult,
    draws: u64,
}

/// Run a full batch.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] for an invalid config before any
/// season is played, [`EngineError::Cancelled`] when the cancel flag is
/// raised, and the first [`EngineError::Simulation`] any iteration hits.
pub fn run_batch(
    lineup: &Lineup,
    cfg: &SimConfig,
    options: BatchOptions<'_>,
) -> Result<BatchResult, EngineError> {
    cfg.validate()?;
    let total = usize::try_from(cfg.iterations).unwrap_or(usize::MAX);
    log::info!(
        "batch start: {total} seasons x {} games, master seed {}, {}",
        cfg.games_per_season,
        cfg.master_seed,
        if options.parallel { "parallel" } else { "sequential" }
    );

    let ctx = InningContext { lineup, cfg };
    let completed = AtomicUsize::new(0);
    let run_one = |index: usize| -> Result<IterationOutcome, EngineError> {
        if options.cancelled() {
            return Err(EngineError::Cancelled {
                completed: completed.load(Ordering::SeqCst),
                total,
            });
        }
        let mut rng =
            SimRng::for_iteration(cfg.master_seed, u64::try_from(index).unwrap_or(u64::MAX));
        let season = simulate_season(ctx, cfg.games_per_season, &mut rng)?;
        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("iteration {index}: {} runs ({done}/{total})", season.runs());
        if let Some(progress) = options.progress {
            progress(done, total);
        }
        Ok(IterationOutcome {
            season,
            draws: rng.draws(),
        })
    };

    let outcomes: Vec<IterationOutcome> = if options.parallel {
        (0..total).into_par_iter().map(run_one).collect::<Result<_, _>>()?
    } else {
        (0..total).map(run_one).collect::<Result<_, _>>()?
    };

    let result = aggregate(lineup, cfg, &outcomes)?;
    log::info!(
        "batch done: mean {:.1} runs, win probability {:.3}",
        result.summary.mean,
        result.win_probability
    );
    Ok(result)
}

fn aggregate(
    lineup: &Lineup,
    cfg: &SimConfig,
    outcomes: &[IterationOutcome],
) -> Result<BatchResult, ConfigurationError> {
    let seasons: Vec<&SeasonResult> = outcomes.iter().map(|outcome| &outcome.season).collect();
    let season_runs: Vec<u32> = seasons.iter().map(|season| season.runs()).collect();
    let runs_f64: Vec<f64> = season_runs.iter().copied().map(f64::from).collect();
    let summary = DistributionSummary::from_values(&runs_f64).ok_or(
        ConfigurationError::ZeroCount {
            field: "iterations",
        },
    )?;

    let threshold = cfg.win_threshold_runs();
    let wins = runs_f64.iter().filter(|runs| **runs >= threshold).count();
    let trials = outcomes.len();
    let win_probability = count_to_f64(wins) / count_to_f64(trials);

    let game_runs: Vec<f64> = seasons
        .iter()
        .flat_map(|season| season.game_runs.iter().copied().map(f64::from))
        .collect();
    let lob: Vec<f64> = seasons.iter().map(|season| season.lob_per_game()).collect();
    let counter = |pick: fn(&SeasonResult) -> u32| {
        let values: Vec<f64> = seasons.iter().map(|season| f64::from(pick(season))).collect();
        CounterSummary::from_values(&values)
    };

    let mut runs_by_slot = [0.0; LINEUP_SIZE];
    for season in &seasons {
        for (slot, runs) in runs_by_slot.iter_mut().zip(season.totals.runs_by_slot) {
            *slot += f64::from(runs);
        }
    }
    for slot in &mut runs_by_slot {
        *slot /= count_to_f64(trials);
    }

    let player_warnings = lineup
        .players()
        .iter()
        .flat_map(|player| {
            player
                .warnings()
                .iter()
                .map(move |warning| format!("{}: {warning}", player.name()))
        })
        .collect();

    Ok(BatchResult {
        master_seed: cfg.master_seed,
        iterations: trials,
        games_per_season: cfg.games_per_season,
        summary,
        win_threshold_runs: threshold,
        win_probability,
        win_probability_ci_95: wilson_interval(
            u64::try_from(wins).unwrap_or(u64::MAX),
            u64::try_from(trials).unwrap_or(u64::MAX),
            Z_95,
        ),
        runs_per_game: CounterSummary::from_values(&game_runs),
        lob_per_game: CounterSummary::from_values(&lob).mean,
        counters: CounterBreakdown {
            hits: counter(|season| season.totals.hits),
            walks: counter(|season| season.totals.walks),
            strikeouts: counter(|season| season.totals.strikeouts),
            stolen_bases: counter(|season| season.totals.stolen_bases),
            caught_stealing: counter(|season| season.totals.caught_stealing),
            sacrifice_flies: counter(|season| season.totals.sacrifice_flies),
            misplays: counter(|season| season.totals.misplays),
        },
        runs_by_slot,
        total_rng_draws: outcomes.iter().map(|outcome| outcome.draws).sum(),
        player_warnings,
        season_runs,
    })
}
