//! Runline Engine
//!
//! Monte-Carlo season run-production simulation. Turns per-player slash
//! lines into plate-appearance probabilities, plays nine-inning games for a
//! fixed lineup, and summarizes the distribution of season run totals over
//! many seeded iterations. No I/O: callers supply players and configuration.

pub mod baserunning;
pub mod bases;
pub mod batch;
pub mod boxscore;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod inning;
pub mod lineup;
pub mod numbers;
pub mod outcome;
pub mod player;
pub mod probability;
pub mod resolvers;
pub mod rng;
pub mod season;
pub mod stats;

// Re-export commonly used types
pub use baserunning::{Advance, AdvanceContext, AdvanceMode, advance};
pub use bases::{Base, BasesState, RunnerId, Slot};
pub use batch::{BatchOptions, BatchResult, CounterBreakdown, ProgressCallback, run_batch};
pub use boxscore::BoxScore;
pub use calibration::{AccuracyGrade, Calibration, CalibrationVerdict, calibrate};
pub use config::{
    BaserunningOdds, FeatureFlags, HitTypeConfig, MisplayConfig, SacrificeFlyConfig, SimConfig,
    StealConfig, StrikeoutClampPolicy,
};
pub use error::{ConfigurationError, EngineError, SimulationError, ValidationError};
pub use game::{GameResult, simulate_game};
pub use inning::{HalfInningSummary, InningContext, InningState, simulate_half_inning};
pub use lineup::{Lineup, LineupBuilder, LineupSelection, LineupStat, Roster, RosterData};
pub use outcome::{OutcomeProbabilities, PaOutcome, sample_outcome};
pub use player::{FieldingPosition, Player, PlayerStats, PlayerWarning, PositionGroup};
pub use probability::{
    HitArchetype, HitCounts, HitTypeDist, HitTypeSource, PaOutcomeProbs, SluggingCheck,
    decompose_slash_line, hit_type_distribution,
};
pub use resolvers::{StealCounts, StealProfile};
pub use rng::{CountingRng, SimRng, derive_iteration_seed};
pub use season::{SeasonResult, simulate_season};
pub use stats::{ConfidenceInterval, CounterSummary, DistributionSummary};

/// Trait for abstracting roster and configuration loading.
/// File-, network- or fixture-backed implementations should provide this.
pub trait RosterSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the unvalidated roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be read or parsed.
    fn load_roster(&self) -> Result<RosterData, Self::Error>;

    /// Load a configuration overlay; `None` means engine defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration exists but cannot be read.
    fn load_config(&self) -> Result<Option<SimConfig>, Self::Error>;
}

/// Main entry point tying a roster source to batch runs
pub struct SimulationEngine<S>
where
    S: RosterSource,
{
    source: S,
}

impl<S> SimulationEngine<S>
where
    S: RosterSource,
{
    /// Create a new engine over the provided roster source
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The source's configuration, or defaults when it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or the configuration is invalid.
    pub fn config(&self) -> anyhow::Result<SimConfig> {
        let cfg = self.source.load_config()?.unwrap_or_default();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate every player under `cfg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or any player is invalid.
    pub fn roster(&self, cfg: &SimConfig) -> anyhow::Result<Roster> {
        let data = self.source.load_roster()?;
        Ok(Roster::from_data(data, cfg)?)
    }

    /// Load the roster, pick a lineup and run one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, lineup selection or the batch fails.
    pub fn simulate(
        &self,
        cfg: &SimConfig,
        selection: &LineupSelection,
        options: BatchOptions<'_>,
    ) -> anyhow::Result<BatchResult> {
        let roster = self.roster(cfg)?;
        let lineup = roster.select(selection)?;
        Ok(run_batch(&lineup, cfg, options)?)
    }
}
