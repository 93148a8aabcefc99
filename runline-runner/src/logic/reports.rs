use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use runline_engine::{HitTypeSource, Lineup, SimConfig};
use serde::Serialize;

use super::SeedRun;

/// One batting-order row as shown in reports.
#[derive(Debug, Clone, Serialize)]
pub struct LineupEntry {
    pub slot: usize,
    pub name: String,
    pub position: Option<String>,
    pub ba: f64,
    pub obp: f64,
    pub slg: f64,
    pub hit_type_source: HitTypeSource,
    /// Modelled bases per hit minus `SLG / BA`, in percent.
    pub slugging_error_pct: f64,
    pub warnings: Vec<String>,
}

impl LineupEntry {
    #[must_use]
    pub fn from_lineup(lineup: &Lineup) -> Vec<Self> {
        lineup
            .players()
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let stats = player.stats();
                Self {
                    slot: index + 1,
                    name: player.name().to_string(),
                    position: player.position().map(|position| position.abbrev().to_string()),
                    ba: stats.ba,
                    obp: stats.obp,
                    slg: stats.slg,
                    hit_type_source: player.hit_type_source(),
                    slugging_error_pct: player.slugging_check().error_pct,
                    warnings: player
                        .warnings()
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub team: Option<&'a str>,
    pub generated_at: String,
    pub lineup: Vec<LineupEntry>,
    pub config: &'a SimConfig,
    pub runs: &'a [SeedRun],
}

impl<'a> RunReport<'a> {
    #[must_use]
    pub fn new(
        team: Option<&'a str>,
        lineup: &Lineup,
        config: &'a SimConfig,
        runs: &'a [SeedRun],
    ) -> Self {
        Self {
            team,
            generated_at: Utc::now().to_rfc3339(),
            lineup: LineupEntry::from_lineup(lineup),
            config,
            runs,
        }
    }

    fn title(&self) -> String {
        self.team.map_or_else(
            || "Season Run Projection".to_string(),
            |team| format!("{team} Season Run Projection"),
        )
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    report: &RunReport<'_>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", format!("📊 {}", report.title()).bright_cyan().bold())?;
    writeln!(writer, "{}", "==============================".cyan())?;

    writeln!(writer, "{}", "Lineup".bold())?;
    for entry in &report.lineup {
        let position = entry.position.as_deref().unwrap_or("--");
        writeln!(
            writer,
            "  {}. {:<22} {:>3}  {:.3}/{:.3}/{:.3}  [{}]",
            entry.slot,
            entry.name,
            position,
            entry.ba,
            entry.obp,
            entry.slg,
            entry.hit_type_source.label()
        )?;
        for warning in &entry.warnings {
            writeln!(writer, "     ⚠️  {}", warning.yellow())?;
        }
    }
    writeln!(writer)?;

    for run in report.runs {
        let result = &run.result;
        let summary = &result.summary;
        writeln!(
            writer,
            "{} {} ({} seasons x {} games, {} ms)",
            "🎲 Seed".bright_yellow().bold(),
            run.seed.to_string().bold(),
            result.iterations,
            result.games_per_season,
            run.elapsed_ms
        )?;
        writeln!(
            writer,
            "   Runs/season: mean {:.1}  median {:.1}  std {:.1}  range {:.0}-{:.0}",
            summary.mean, summary.median, summary.std_dev, summary.min, summary.max
        )?;
        writeln!(
            writer,
            "   95% CI on mean: {:.1} - {:.1}   central 95%: {:.1} - {:.1}",
            summary.mean_ci_95.lower,
            summary.mean_ci_95.upper,
            summary.central_95.lower,
            summary.central_95.upper
        )?;
        let percentiles: Vec<String> = summary
            .percentiles
            .iter()
            .map(|point| format!("p{:.0}={:.1}", point.percentile, point.value))
            .collect();
        writeln!(writer, "   Percentiles: {}", percentiles.join("  "))?;
        writeln!(
            writer,
            "   Runs/game: {:.2} (std {:.2})   LOB/game: {:.2}",
            result.runs_per_game.mean, result.runs_per_game.std_dev, result.lob_per_game
        )?;
        writeln!(
            writer,
            "   Win probability (>= {:.0} runs): {} [{:.1}% - {:.1}%]",
            result.win_threshold_runs,
            format!("{:.1}%", result.win_probability * 100.0).green(),
            result.win_probability_ci_95.lower * 100.0,
            result.win_probability_ci_95.upper * 100.0
        )?;
        let counters = &result.counters;
        writeln!(
            writer,
            "   Per season: H {:.0}  BB {:.0}  K {:.0}  SB {:.0}  CS {:.0}  SF {:.0}  E/WP {:.0}",
            counters.hits.mean,
            counters.walks.mean,
            counters.strikeouts.mean,
            counters.stolen_bases.mean,
            counters.caught_stealing.mean,
            counters.sacrifice_flies.mean,
            counters.misplays.mean
        )?;
        let slots: Vec<String> = result
            .runs_by_slot
            .iter()
            .enumerate()
            .map(|(slot, runs)| format!("{}:{runs:.0}", slot + 1))
            .collect();
        writeln!(writer, "   Runs scored by slot: {}", slots.join(" "))?;
        if let Some(calibration) = &run.calibration {
            let verdict = calibration.verdict.to_string();
            writeln!(
                writer,
                "   Calibration vs {:.0}: error {:+.1} ({:+.1}%), percentile {:.1}, grade {}, {}",
                calibration.actual_runs,
                calibration.error,
                calibration.error_pct,
                calibration.actual_percentile,
                calibration.grade,
                if calibration.within_band {
                    verdict.green()
                } else {
                    verdict.red()
                }
            )?;
        }
        writeln!(writer, "   RNG draws: {}", result.total_rng_draws)?;
        writeln!(writer)?;
    }

    writeln!(writer, "Total time: {total_duration:?}")?;
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(writer: &mut W, report: &RunReport<'_>) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    report: &RunReport<'_>,
) -> Result<()> {
    writeln!(writer, "# {}\n", report.title())?;
    writeln!(writer, "_Generated {}_\n", report.generated_at)?;

    writeln!(writer, "## Lineup\n")?;
    writeln!(writer, "| # | Player | Pos | BA | OBP | SLG | Hit types |")?;
    writeln!(writer, "|---|--------|-----|----|-----|-----|-----------|")?;
    for entry in &report.lineup {
        writeln!(
            writer,
            "| {} | {} | {} | {:.3} | {:.3} | {:.3} | {} |",
            entry.slot,
            entry.name,
            entry.position.as_deref().unwrap_or("-"),
            entry.ba,
            entry.obp,
            entry.slg,
            entry.hit_type_source.label()
        )?;
    }
    writeln!(writer)?;

    writeln!(writer, "## Results\n")?;
    writeln!(
        writer,
        "| Seed | Mean | Median | Std | 95% CI | Win % | LOB/G |"
    )?;
    writeln!(
        writer,
        "|------|------|--------|-----|--------|-------|-------|"
    )?;
    for run in report.runs {
        let result = &run.result;
        let summary = &result.summary;
        writeln!(
            writer,
            "| {} | {:.1} | {:.1} | {:.1} | {:.1} - {:.1} | {:.1} | {:.2} |",
            run.seed,
            summary.mean,
            summary.median,
            summary.std_dev,
            summary.mean_ci_95.lower,
            summary.mean_ci_95.upper,
            result.win_probability * 100.0,
            result.lob_per_game
        )?;
    }

    let calibrated: Vec<&SeedRun> = report
        .runs
        .iter()
        .filter(|run| run.calibration.is_some())
        .collect();
    if !calibrated.is_empty() {
        writeln!(writer, "\n## Calibration\n")?;
        for run in calibrated {
            if let Some(calibration) = &run.calibration {
                writeln!(
                    writer,
                    "- **Seed {}**: actual {:.0}, error {:+.1} ({:+.1}%), grade {}, {}",
                    run.seed,
                    calibration.actual_runs,
                    calibration.error,
                    calibration.error_pct,
                    calibration.grade,
                    calibration.verdict
                )?;
            }
        }
    }
    Ok(())
}

/// One row per simulated season, for charting.
pub fn generate_csv_report<W: Write + ?Sized>(writer: &mut W, runs: &[SeedRun]) -> Result<()> {
    writeln!(writer, "seed,iteration,runs,runs_per_game")?;
    for run in runs {
        let games = f64::from(run.result.games_per_season.max(1));
        for (iteration, runs) in run.result.season_runs.iter().enumerate() {
            writeln!(
                writer,
                "{},{iteration},{runs},{:.3}",
                run.seed,
                f64::from(*runs) / games
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use runline_engine::constants::LINEUP_SIZE;
    use runline_engine::{BatchOptions, Player, PlayerStats, calibrate, run_batch};

    fn fixture() -> (Lineup, SimConfig, Vec<SeedRun>) {
        let cfg = SimConfig::default()
            .with_iterations(6)
            .with_games_per_season(3);
        let player = Arc::new(
            Player::from_stats(PlayerStats::new("Fixture", 0.270, 0.340, 0.440), &cfg).unwrap(),
        );
        let lineup = Lineup::new(vec![player; LINEUP_SIZE]).unwrap();
        let result = run_batch(&lineup, &cfg, BatchOptions::default()).unwrap();
        let calibration = Some(calibrate(&result, 14.0));
        let runs = vec![SeedRun {
            seed: 42,
            elapsed_ms: 1,
            result,
            calibration,
        }];
        (lineup, cfg, runs)
    }

    #[test]
    fn csv_has_one_row_per_season() {
        let (_, _, runs) = fixture();
        let mut out = Vec::new();
        generate_csv_report(&mut out, &runs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1 + 6);
        assert!(text.starts_with("seed,iteration,runs,runs_per_game"));
        assert!(text.lines().nth(1).unwrap().starts_with("42,0,"));
    }

    #[test]
    fn json_and_markdown_name_the_key_figures() {
        let (lineup, cfg, runs) = fixture();
        let report = RunReport::new(Some("Fixtures"), &lineup, &cfg, &runs);

        let mut json = Vec::new();
        generate_json_report(&mut json, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["team"], "Fixtures");
        assert_eq!(value["lineup"].as_array().unwrap().len(), 9);
        assert_eq!(value["runs"][0]["seed"], 42);
        assert!(value["runs"][0]["result"]["summary"]["mean"].is_number());
        assert!(value["runs"][0]["calibration"]["grade"].is_string());

        let mut markdown = Vec::new();
        generate_markdown_report(&mut markdown, &report).unwrap();
        let text = String::from_utf8(markdown).unwrap();
        assert!(text.starts_with("# Fixtures Season Run Projection"));
        assert!(text.contains("## Calibration"));
    }

    #[test]
    fn console_report_lists_every_seed() {
        let (lineup, cfg, runs) = fixture();
        let report = RunReport::new(None, &lineup, &cfg, &runs);
        let mut out = Vec::new();
        generate_console_report(&mut out, &report, Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Season Run Projection"));
        assert!(text.contains("Win probability"));
        assert!(text.contains("Calibration vs 14"));
    }
}
