use serde::{Deserialize, Serialize};

use crate::bases::RunnerId;
use crate::constants::LINEUP_SIZE;

/// Offensive counters shared by half-innings, games and seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxScore {
    pub runs: u32,
    pub hits: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub plate_appearances: u32,
    pub left_on_base: u32,
    pub steal_attempts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub sacrifice_flies: u32,
    pub misplays: u32,
    /// Runs scored by the player in each lineup slot.
    pub runs_by_slot: [u32; LINEUP_SIZE],
}

impl BoxScore {
    /// Credit one run to the runner who crossed the plate.
    pub fn score(&mut self, runner: RunnerId) {
        self.runs = self.runs.saturating_add(1);
        if let Some(slot) = self.runs_by_slot.get_mut(runner) {
            *slot = slot.saturating_add(1);
        }
    }

    pub fn absorb(&mut self, other: &Self) {
        self.runs = self.runs.saturating_add(other.runs);
        self.hits = self.hits.saturating_add(other.hits);
        self.walks = self.walks.saturating_add(other.walks);
        self.strikeouts = self.strikeouts.saturating_add(other.strikeouts);
        self.plate_appearances = self
            .plate_appearances
            .saturating_add(other.plate_appearances);
        self.left_on_base = self.left_on_base.saturating_add(other.left_on_base);
        self.steal_attempts = self.steal_attempts.saturating_add(other.steal_attempts);
        self.stolen_bases = self.stolen_bases.saturating_add(other.stolen_bases);
        self.caught_stealing = self.caught_stealing.saturating_add(other.caught_stealing);
        self.sacrifice_flies = self.sacrifice_flies.saturating_add(other.sacrifice_flies);
        self.misplays = self.misplays.saturating_add(other.misplays);
        for (mine, theirs) in self.runs_by_slot.iter_mut().zip(other.runs_by_slot) {
            *mine = mine.saturating_add(theirs);
        }
    }
}
