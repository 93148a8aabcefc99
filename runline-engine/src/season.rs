use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::boxscore::BoxScore;
use crate::error::EngineError;
use crate::game::simulate_game;
use crate::inning::InningContext;

/// Totals for one simulated season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub games: u32,
    pub totals: BoxScore,
    /// Runs in each game, in the order played.
    pub game_runs: Vec<u32>,
}

impl SeasonResult {
    #[must_use]
    pub const fn runs(&self) -> u32 {
        self.totals.runs
    }

    /// Left on base per game.
    #[must_use]
    pub fn lob_per_game(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        f64::from(self.totals.left_on_base) / f64::from(self.games)
    }
}

/// Play `games` games back to back.
///
/// The leadoff slot starts at zero for every season and then carries over
/// from game to game.
///
/// # Errors
///
/// Propagates the first [`EngineError`] raised by any game.
pub fn simulate_season<R: RngCore + ?Sized>(
    ctx: InningContext<'_>,
    games: u32,
    rng: &mut R,
) -> Result<SeasonResult, EngineError> {
    let mut totals = BoxScore::default();
    let mut game_runs = Vec::with_capacity(usize::try_from(games).unwrap_or_default());
    let mut leadoff = 0;
    for _ in 0..games {
        let game = simulate_game(ctx, leadoff, rng)?;
        totals.absorb(&game.box_score);
        game_runs.push(game.runs());
        leadoff = game.next_batter;
    }
    Ok(SeasonResult {
        games,
        totals,
        game_runs,
    })
}
