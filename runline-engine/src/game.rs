use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::boxscore::BoxScore;
use crate::constants::{INNINGS_PER_GAME, LINEUP_SIZE};
use crate::error::EngineError;
use crate::inning::{InningContext, simulate_half_inning};

/// One nine-inning offensive game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub box_score: BoxScore,
    /// Lineup slot due up after the last out of the ninth.
    pub next_batter: usize,
}

impl GameResult {
    #[must_use]
    pub const fn runs(&self) -> u32 {
        self.box_score.runs
    }
}

/// Play nine half-innings. The batting order carries across innings: the
/// batter after the one who made the last out leads off the next frame.
///
/// # Errors
///
/// Propagates any [`EngineError`] from the half-inning loop.
pub fn simulate_game<R: RngCore + ?Sized>(
    ctx: InningContext<'_>,
    leadoff: usize,
    rng: &mut R,
) -> Result<GameResult, EngineError> {
    let mut box_score = BoxScore::default();
    let mut batter = leadoff % LINEUP_SIZE;
    for inning in 1..=INNINGS_PER_GAME {
        let half = simulate_half_inning(ctx, batter, rng)?;
        log::trace!(
            "inning {inning}: {} runs, next batter slot {}",
            half.box_score.runs,
            half.next_batter
        );
        box_score.absorb(&half.box_score);
        batter = half.next_batter;
    }
    Ok(GameResult {
        box_score,
        next_batter: batter,
    })
}
