use rand::RngCore;

use crate::bases::{BasesState, Scorers};
use crate::error::SimulationError;
use crate::rng::bernoulli;

/// Error, wild pitch or passed ball during a plate appearance.
#[derive(Debug, Clone, Copy)]
pub struct MisplayContext {
    pub bases: BasesState,
    pub rate_per_pa: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisplayOutcome {
    pub bases: BasesState,
    pub occurred: bool,
    pub scorers: Scorers,
}

/// Roll for a misplay. Draws once per call regardless of the bases; when it
/// fires every runner moves up one base and the batter stays at the plate.
///
/// # Errors
///
/// Propagates [`SimulationError`] from the base shift.
pub fn resolve_misplay<R: RngCore + ?Sized>(
    ctx: MisplayContext,
    rng: &mut R,
) -> Result<MisplayOutcome, SimulationError> {
    let mut bases = ctx.bases;
    let mut scorers = Scorers::new();
    let occurred = bernoulli(rng, ctx.rate_per_pa);
    if occurred {
        bases.shift_all(&mut scorers)?;
    }
    Ok(MisplayOutcome {
        bases,
        occurred,
        scorers,
    })
}
