mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::{parse_index_list, split_csv};
use logic::{FileRosterSource, RunPlan, RunReport, SeedRun, resolve_seed_inputs, run_seeds};
use runline_engine::{
    LineupSelection, LineupStat, SimConfig, SimulationEngine, StrikeoutClampPolicy,
};

#[derive(Debug, Parser)]
#[command(name = "runline-runner", version)]
#[command(about = "Monte-Carlo season run projection for a nine-man lineup")]
struct Args {
    /// Roster JSON: an array of player lines or {"team": ..., "players": [...]}
    #[arg(long)]
    roster: PathBuf,

    /// Configuration overlay JSON; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Batting order as comma-separated roster indices (0-based)
    #[arg(long, conflicts_with_all = ["names", "order_by"])]
    order: Option<String>,

    /// Batting order as comma-separated player names
    #[arg(long, conflicts_with = "order_by")]
    names: Option<String>,

    /// Rank the roster by a statistic (ops, obp, slg, ba, iso, pa)
    #[arg(long)]
    order_by: Option<String>,

    /// Seasons to simulate per seed
    #[arg(long)]
    iterations: Option<u32>,

    /// Games per season
    #[arg(long)]
    games: Option<u32>,

    /// Master seeds (comma-separated, decimal or 0x-hex)
    #[arg(long)]
    seeds: Option<String>,

    /// Spread iterations over all cores
    #[arg(long)]
    parallel: bool,

    /// Disable stolen-base attempts
    #[arg(long)]
    no_steals: bool,

    /// Disable sacrifice flies
    #[arg(long)]
    no_sac_flies: bool,

    /// Use the fixed advancement table only
    #[arg(long)]
    no_probabilistic: bool,

    /// Disable errors and wild pitches
    #[arg(long)]
    no_misplays: bool,

    /// Reject players whose strikeout rate exceeds their out rate
    #[arg(long)]
    strict_strikeouts: bool,

    /// Real season run total to calibrate against
    #[arg(long)]
    actual_runs: Option<f64>,

    /// Wall-clock budget per seed; the batch is cancelled when it runs out
    #[arg(long)]
    time_budget_secs: Option<u64>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    announce_banner();

    let start_time = Instant::now();
    let engine = SimulationEngine::new(FileRosterSource::new(
        args.roster.clone(),
        args.config.clone(),
    ));
    let config = apply_overrides(&args, engine.config()?)?;
    let roster = engine
        .roster(&config)
        .with_context(|| format!("failed to load roster {}", args.roster.display()))?;
    let selection = lineup_selection(&args)?;
    let lineup = roster.select(&selection)?;
    println!(
        "{} {} players on roster, lineup: {}",
        "📋".bright_blue(),
        roster.len(),
        lineup.names().join(", ")
    );

    let seed_tokens = args.seeds.as_deref().map(split_csv).unwrap_or_default();
    let plan = RunPlan {
        seeds: resolve_seed_inputs(&seed_tokens, config.master_seed)?,
        config,
        parallel: args.parallel,
        actual_runs: args.actual_runs,
        time_budget: args.time_budget_secs.map(Duration::from_secs),
        show_progress: args.verbose,
    };
    let runs = run_seeds(&plan, &lineup)?;

    let report = RunReport::new(roster.team(), &lineup, &plan.config, &runs);
    write_reports(&args, &report, &runs, start_time)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "⚾ Runline Season Simulator".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

/// Fold CLI switches into the loaded configuration and re-validate.
fn apply_overrides(args: &Args, mut config: SimConfig) -> Result<SimConfig> {
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(games) = args.games {
        config.games_per_season = games;
    }
    if args.no_steals {
        config.features.stolen_bases = false;
    }
    if args.no_sac_flies {
        config.features.sacrifice_flies = false;
    }
    if args.no_probabilistic {
        config.features.probabilistic_baserunning = false;
    }
    if args.no_misplays {
        config.features.misplays = false;
    }
    if args.strict_strikeouts {
        config.strikeout_clamp_policy = StrikeoutClampPolicy::Reject;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn lineup_selection(args: &Args) -> Result<LineupSelection> {
    if let Some(order) = &args.order {
        return Ok(LineupSelection::Indices(parse_index_list(order)?));
    }
    if let Some(names) = &args.names {
        return Ok(LineupSelection::Names(split_csv(names)));
    }
    let Some(stat) = args.order_by.as_deref() else {
        return Ok(LineupSelection::RosterOrder);
    };
    if stat.eq_ignore_ascii_case("pa") {
        return Ok(LineupSelection::TopByPlateAppearances);
    }
    let stat: LineupStat = stat.parse()?;
    Ok(LineupSelection::ByStat(stat))
}

fn write_reports(
    args: &Args,
    report: &RunReport<'_>,
    runs: &[SeedRun],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, report)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, report)?,
        "csv" => logic::reports::generate_csv_report(&mut output_target, runs)?,
        _ => logic::reports::generate_console_report(
            &mut output_target,
            report,
            start_time.elapsed(),
        )?,
    }

    output_target.flush_inner()?;
    if let Some(path) = &args.output {
        println!("{} report written to {}", "💾".green(), path.display());
    }
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
