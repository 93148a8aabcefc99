use rand::RngCore;

use crate::bases::{Base, BasesState, RunnerId};
use crate::outcome::PaOutcome;
use crate::rng::bernoulli;

#[derive(Debug, Clone, Copy)]
pub struct SacrificeFlyContext {
    pub bases: BasesState,
    pub outcome: PaOutcome,
    /// Outs before the batter's out is recorded.
    pub outs: u8,
    pub flyout_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SacrificeFlyOutcome {
    pub bases: BasesState,
    /// The runner who tagged up from third and scored.
    pub scorer: Option<RunnerId>,
}

/// Runner on third tags and scores on a caught fly ball.
///
/// Only an in-play out with fewer than two outs and a runner on third can
/// qualify; a strikeout never does. The generator is untouched otherwise.
pub fn resolve_sacrifice_fly<R: RngCore + ?Sized>(
    ctx: SacrificeFlyContext,
    rng: &mut R,
) -> SacrificeFlyOutcome {
    let unchanged = SacrificeFlyOutcome {
        bases: ctx.bases,
        scorer: None,
    };
    if ctx.outcome != PaOutcome::InPlayOut || ctx.outs >= 2 {
        return unchanged;
    }
    if !ctx.bases.is_occupied(Base::Third) || !bernoulli(rng, ctx.flyout_share) {
        return unchanged;
    }
    let mut bases = ctx.bases;
    let scorer = bases.vacate(Base::Third);
    SacrificeFlyOutcome { bases, scorer }
}
