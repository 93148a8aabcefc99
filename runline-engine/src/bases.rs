//! Base occupancy.
//!
//! Runners are identified by their lineup slot. Every write goes through
//! [`BasesState::place`], which refuses to overwrite an occupied base; the
//! movement helpers relocate or score an occupant before reusing its base.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::SimulationError;

/// Lineup slot (0-based) of the player standing on a base.
pub type RunnerId = usize;

/// Runners who crossed the plate during one transition.
pub type Scorers = SmallVec<[RunnerId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Self; 3] = [Self::First, Self::Second, Self::Third];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    /// Next base toward home; `None` from third.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => Some(Self::Third),
            Self::Third => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::First => None,
            Self::Second => Some(Self::First),
            Self::Third => Some(Self::Second),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first base",
            Self::Second => "second base",
            Self::Third => "third base",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Empty,
    Runner(RunnerId),
}

impl Slot {
    #[must_use]
    pub const fn runner(self) -> Option<RunnerId> {
        match self {
            Self::Empty => None,
            Self::Runner(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BasesState {
    slots: [Slot; 3],
}

impl BasesState {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            slots: [Slot::Empty; 3],
        }
    }

    /// Build a state from optional occupants of first, second and third.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::BaseOccupied`] if one runner is listed on
    /// two bases.
    pub fn from_runners(runners: [Option<RunnerId>; 3]) -> Result<Self, SimulationError> {
        let mut state = Self::empty();
        for (base, runner) in Base::ALL.into_iter().zip(runners) {
            if let Some(runner) = runner {
                if let Some(existing) = state.base_of(runner) {
                    return Err(SimulationError::BaseOccupied {
                        base: existing,
                        runner,
                        occupant: runner,
                    });
                }
                state.place(base, runner)?;
            }
        }
        Ok(state)
    }

    #[must_use]
    pub const fn slot(&self, base: Base) -> Slot {
        self.slots[base.index()]
    }

    #[must_use]
    pub const fn runner_on(&self, base: Base) -> Option<RunnerId> {
        self.slots[base.index()].runner()
    }

    #[must_use]
    pub const fn is_occupied(&self, base: Base) -> bool {
        matches!(self.slots[base.index()], Slot::Runner(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| *slot == Slot::Empty)
    }

    #[must_use]
    pub fn runner_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.runner().is_some()).count()
    }

    #[must_use]
    pub fn base_of(&self, runner: RunnerId) -> Option<Base> {
        Base::ALL
            .into_iter()
            .find(|base| self.runner_on(*base) == Some(runner))
    }

    /// Put `runner` on an empty base.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::BaseOccupied`] if the base already holds a
    /// runner.
    pub fn place(&mut self, base: Base, runner: RunnerId) -> Result<(), SimulationError> {
        match self.slots[base.index()] {
            Slot::Empty => {
                self.slots[base.index()] = Slot::Runner(runner);
                Ok(())
            }
            Slot::Runner(occupant) => Err(SimulationError::BaseOccupied {
                base,
                runner,
                occupant,
            }),
        }
    }

    /// Remove and return whoever stands on `base`.
    pub fn vacate(&mut self, base: Base) -> Option<RunnerId> {
        let runner = self.slots[base.index()].runner();
        self.slots[base.index()] = Slot::Empty;
        runner
    }

    /// Put `runner` on `base`, pushing any occupant forward first. An occupant
    /// pushed off third scores.
    ///
    /// # Errors
    ///
    /// Propagates [`SimulationError::BaseOccupied`]; unreachable unless the
    /// state was already corrupt.
    pub fn force_into(
        &mut self,
        base: Base,
        runner: RunnerId,
        scorers: &mut Scorers,
    ) -> Result<(), SimulationError> {
        if let Some(occupant) = self.vacate(base) {
            match base.next() {
                Some(next) => self.force_into(next, occupant, scorers)?,
                None => scorers.push(occupant),
            }
        }
        self.place(base, runner)
    }

    /// Advance `runner` toward `target`, stopping on the nearest empty base
    /// at or behind it without passing an occupant. Returns where the runner
    /// ended up.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::BaseOccupied`] if no base at or behind
    /// `target` is free.
    pub fn settle_behind(
        &mut self,
        target: Base,
        runner: RunnerId,
    ) -> Result<Base, SimulationError> {
        let mut base = target;
        loop {
            if !self.is_occupied(base) {
                self.place(base, runner)?;
                return Ok(base);
            }
            match base.previous() {
                Some(previous) => base = previous,
                None => {
                    return Err(SimulationError::BaseOccupied {
                        base,
                        runner,
                        occupant: self.runner_on(base).unwrap_or(runner),
                    });
                }
            }
        }
    }

    /// Every runner moves up one base; the runner on third scores.
    ///
    /// # Errors
    ///
    /// Propagates [`SimulationError::BaseOccupied`].
    pub fn shift_all(&mut self, scorers: &mut Scorers) -> Result<(), SimulationError> {
        for base in Base::ALL.into_iter().rev() {
            if let Some(runner) = self.vacate(base) {
                match base.next() {
                    Some(next) => self.place(next, runner)?,
                    None => scorers.push(runner),
                }
            }
        }
        Ok(())
    }

    /// Score every runner and clear the bases.
    pub fn clear_scoring(&mut self, scorers: &mut Scorers) {
        for base in Base::ALL.into_iter().rev() {
            if let Some(runner) = self.vacate(base) {
                scorers.push(runner);
            }
        }
    }
}

impl fmt::Display for BasesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |base: Base, label: char| if self.is_occupied(base) { label } else { '-' };
        write!(
            f,
            "{}{}{}",
            mark(Base::First, '1'),
            mark(Base::Second, '2'),
            mark(Base::Third, '3')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_refuses_overwrite() {
        let mut bases = BasesState::empty();
        bases.place(Base::First, 3).unwrap();
        assert_eq!(
            bases.place(Base::First, 4),
            Err(SimulationError::BaseOccupied {
                base: Base::First,
                runner: 4,
                occupant: 3,
            })
        );
        assert_eq!(bases.runner_on(Base::First), Some(3));
    }

    #[test]
    fn force_into_chains_and_scores_from_third() {
        let mut bases = BasesState::from_runners([Some(0), Some(1), Some(2)]).unwrap();
        let mut scorers = Scorers::new();
        bases.force_into(Base::First, 3, &mut scorers).unwrap();
        assert_eq!(scorers.as_slice(), &[2]);
        assert_eq!(bases.runner_on(Base::First), Some(3));
        assert_eq!(bases.runner_on(Base::Second), Some(0));
        assert_eq!(bases.runner_on(Base::Third), Some(1));
    }

    #[test]
    fn force_into_stops_at_first_gap() {
        let mut bases = BasesState::from_runners([Some(0), None, Some(2)]).unwrap();
        let mut scorers = Scorers::new();
        bases.force_into(Base::First, 5, &mut scorers).unwrap();
        assert!(scorers.is_empty());
        assert_eq!(bases.to_string(), "123");
        assert_eq!(bases.runner_on(Base::Third), Some(2));
    }

    #[test]
    fn settle_behind_never_jumps_an_occupant() {
        let mut bases = BasesState::from_runners([None, None, Some(7)]).unwrap();
        let landed = bases.settle_behind(Base::Third, 1).unwrap();
        assert_eq!(landed, Base::Second);
        let mut full = BasesState::from_runners([Some(0), Some(1), Some(2)]).unwrap();
        assert!(full.settle_behind(Base::Third, 4).is_err());
    }

    #[test]
    fn shift_all_advances_everyone_one_base() {
        let mut bases = BasesState::from_runners([Some(0), Some(1), Some(2)]).unwrap();
        let mut scorers = Scorers::new();
        bases.shift_all(&mut scorers).unwrap();
        assert_eq!(scorers.as_slice(), &[2]);
        assert_eq!(bases.to_string(), "-23");
        assert_eq!(bases.runner_on(Base::Third), Some(1));
        assert_eq!(bases.runner_on(Base::Second), Some(0));
    }

    #[test]
    fn duplicate_runner_is_rejected() {
        assert!(BasesState::from_runners([Some(1), Some(1), None]).is_err());
    }

    #[test]
    fn display_and_counts() {
        let bases = BasesState::from_runners([Some(0), None, Some(4)]).unwrap();
        assert_eq!(bases.to_string(), "1-3");
        assert_eq!(bases.runner_count(), 2);
        assert_eq!(bases.base_of(4), Some(Base::Third));
        assert!(BasesState::empty().is_empty());
    }
}
