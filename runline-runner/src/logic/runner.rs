use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;
use runline_engine::{
    BatchOptions, BatchResult, Calibration, ConfigurationError, EngineError, Lineup, RosterData,
    RosterSource, SimConfig, calibrate, run_batch,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while reading roster and configuration files.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigurationError,
    },
}

/// Roster (and optional config overlay) backed by JSON files on disk.
#[derive(Debug, Clone)]
pub struct FileRosterSource {
    roster: PathBuf,
    config: Option<PathBuf>,
}

impl FileRosterSource {
    #[must_use]
    pub const fn new(roster: PathBuf, config: Option<PathBuf>) -> Self {
        Self { roster, config }
    }

    fn read(path: &Path) -> Result<String, SourceError> {
        fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RosterSource for FileRosterSource {
    type Error = SourceError;

    fn load_roster(&self) -> Result<RosterData, Self::Error> {
        let text = Self::read(&self.roster)?;
        RosterData::from_json(&text).map_err(|source| SourceError::Parse {
            path: self.roster.clone(),
            source,
        })
    }

    fn load_config(&self) -> Result<Option<SimConfig>, Self::Error> {
        let Some(path) = &self.config else {
            return Ok(None);
        };
        let text = Self::read(path)?;
        SimConfig::from_json(&text)
            .map(Some)
            .map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })
    }
}

/// Everything one invocation needs besides the lineup.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub config: SimConfig,
    pub seeds: Vec<u64>,
    pub parallel: bool,
    pub actual_runs: Option<f64>,
    /// Wall-clock budget per seed.
    pub time_budget: Option<Duration>,
    pub show_progress: bool,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct SeedRun {
    pub seed: u64,
    pub elapsed_ms: u64,
    pub result: BatchResult,
    pub calibration: Option<Calibration>,
}

/// Run one batch per seed, in order.
pub fn run_seeds(plan: &RunPlan, lineup: &Lineup) -> Result<Vec<SeedRun>> {
    plan.seeds
        .iter()
        .map(|&seed| run_seed(plan, lineup, seed))
        .collect()
}

fn run_seed(plan: &RunPlan, lineup: &Lineup, seed: u64) -> Result<SeedRun> {
    let cfg = plan.config.clone().with_master_seed(seed);
    println!(
        "{} seed {} ({} seasons x {} games)",
        "▶".bright_green(),
        seed.to_string().bold(),
        cfg.iterations,
        cfg.games_per_season
    );

    let cancel = AtomicBool::new(false);
    let last_decile = AtomicUsize::new(0);
    let progress = |done: usize, total: usize| {
        let decile = done * 10 / total.max(1);
        if decile > last_decile.fetch_max(decile, Ordering::Relaxed) {
            eprintln!("   {}% ({done}/{total})", decile * 10);
        }
    };
    let mut options = BatchOptions::default()
        .parallel(plan.parallel)
        .with_cancel(&cancel);
    if plan.show_progress {
        options = options.with_progress(&progress);
    }

    let start = Instant::now();
    let result = with_time_budget(plan.time_budget, &cancel, || run_batch(lineup, &cfg, options));
    let elapsed = start.elapsed();
    let result = match result {
        Ok(result) => result,
        Err(EngineError::Cancelled { completed, total }) => {
            anyhow::bail!(
                "seed {seed}: time budget exhausted after {completed} of {total} seasons"
            );
        }
        Err(err) => return Err(err).with_context(|| format!("seed {seed}: batch failed")),
    };

    let calibration = plan
        .actual_runs
        .map(|actual_runs| calibrate(&result, actual_runs));
    Ok(SeedRun {
        seed,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        result,
        calibration,
    })
}

/// Run `work` while a watchdog raises `cancel` once `budget` elapses.
fn with_time_budget<T>(
    budget: Option<Duration>,
    cancel: &AtomicBool,
    work: impl FnOnce() -> T,
) -> T {
    let Some(budget) = budget else {
        return work();
    };
    let (done_tx, done_rx) = mpsc::channel::<()>();
    std::thread::scope(|scope| {
        scope.spawn(move || {
            if done_rx.recv_timeout(budget) == Err(mpsc::RecvTimeoutError::Timeout) {
                log::warn!("time budget of {budget:?} reached, cancelling batch");
                cancel.store(true, Ordering::Relaxed);
            }
        });
        let output = work();
        drop(done_tx);
        output
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use runline_engine::{LineupSelection, SimulationEngine};

    fn fixture_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "runline-runner-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn sample_roster() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_roster.json")
    }

    #[test]
    fn file_source_reads_roster_and_optional_config() {
        let dir = fixture_dir("source");
        let config_path = dir.join("config.json");
        fs::write(&config_path, r#"{ "iterations": 12, "games_per_season": 4 }"#).unwrap();

        let engine = SimulationEngine::new(FileRosterSource::new(
            sample_roster(),
            Some(config_path),
        ));
        let cfg = engine.config().unwrap();
        assert_eq!(cfg.iterations, 12);
        assert_eq!(cfg.games_per_season, 4);
        let roster = engine.roster(&cfg).unwrap();
        assert!(roster.len() >= 9);

        let no_config = FileRosterSource::new(sample_roster(), None);
        assert!(no_config.load_config().unwrap().is_none());
    }

    #[test]
    fn missing_and_malformed_files_are_reported() {
        let dir = fixture_dir("errors");
        let missing = FileRosterSource::new(dir.join("absent.json"), None);
        assert!(matches!(missing.load_roster(), Err(SourceError::Io { .. })));

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let malformed = FileRosterSource::new(broken, None);
        assert!(matches!(
            malformed.load_roster(),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn runs_each_seed_and_calibrates() {
        let engine = SimulationEngine::new(FileRosterSource::new(sample_roster(), None));
        let config = SimConfig::default()
            .with_iterations(10)
            .with_games_per_season(5);
        let roster = engine.roster(&config).unwrap();
        let lineup = roster.select(&LineupSelection::RosterOrder).unwrap();
        let plan = RunPlan {
            config,
            seeds: vec![1, 2],
            parallel: false,
            actual_runs: Some(25.0),
            time_budget: Some(Duration::from_secs(600)),
            show_progress: false,
        };
        let runs = run_seeds(&plan, &lineup).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].result.master_seed, 1);
        assert!(runs.iter().all(|run| run.calibration.is_some()));
    }

    #[test]
    fn zero_budget_cancels_a_long_batch() {
        let cancel = AtomicBool::new(false);
        let observed = with_time_budget(Some(Duration::ZERO), &cancel, || {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !cancel.load(Ordering::Relaxed) && Instant::now() < deadline {
                std::thread::yield_now();
            }
            cancel.load(Ordering::Relaxed)
        });
        assert!(observed);
    }
}
