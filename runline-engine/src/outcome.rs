//! Plate-appearance outcomes and the seeded outcome sampler.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::probability::{HitTypeDist, PaOutcomeProbs};
use crate::rng::unit_draw;

/// Every way a plate appearance can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaOutcome {
    Walk,
    Strikeout,
    InPlayOut,
    Single,
    Double,
    Triple,
    HomeRun,
}

impl PaOutcome {
    pub const ALL: [Self; 7] = [
        Self::Walk,
        Self::Strikeout,
        Self::InPlayOut,
        Self::Single,
        Self::Double,
        Self::Triple,
        Self::HomeRun,
    ];

    #[must_use]
    pub const fn is_hit(self) -> bool {
        matches!(
            self,
            Self::Single | Self::Double | Self::Triple | Self::HomeRun
        )
    }

    #[must_use]
    pub const fn is_out(self) -> bool {
        matches!(self, Self::Strikeout | Self::InPlayOut)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Strikeout => "strikeout",
            Self::InPlayOut => "in-play out",
            Self::Single => "single",
            Self::Double => "double",
            Self::Triple => "triple",
            Self::HomeRun => "home run",
        }
    }
}

impl fmt::Display for PaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Full seven-way outcome vector, in [`PaOutcome::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub walk: f64,
    pub strikeout: f64,
    pub in_play_out: f64,
    pub single: f64,
    pub double: f64,
    pub triple: f64,
    pub home_run: f64,
}

impl OutcomeProbabilities {
    /// Spread the hit share across hit types.
    #[must_use]
    pub fn combine(pa: &PaOutcomeProbs, hits: &HitTypeDist) -> Self {
        Self {
            walk: pa.walk,
            strikeout: pa.strikeout,
            in_play_out: pa.in_play_out,
            single: pa.hit * hits.single,
            double: pa.hit * hits.double,
            triple: pa.hit * hits.triple,
            home_run: pa.hit * hits.home_run,
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> [f64; 7] {
        [
            self.walk,
            self.strikeout,
            self.in_play_out,
            self.single,
            self.double,
            self.triple,
            self.home_run,
        ]
    }

    #[must_use]
    pub fn get(&self, outcome: PaOutcome) -> f64 {
        match outcome {
            PaOutcome::Walk => self.walk,
            PaOutcome::Strikeout => self.strikeout,
            PaOutcome::InPlayOut => self.in_play_out,
            PaOutcome::Single => self.single,
            PaOutcome::Double => self.double,
            PaOutcome::Triple => self.triple,
            PaOutcome::HomeRun => self.home_run,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

const PA_ORDER: [PaOutcome; 3] = [PaOutcome::Walk, PaOutcome::Strikeout, PaOutcome::InPlayOut];
const HIT_ORDER: [PaOutcome; 4] = [
    PaOutcome::Single,
    PaOutcome::Double,
    PaOutcome::Triple,
    PaOutcome::HomeRun,
];

/// Draw one plate-appearance outcome.
///
/// The first variate walks the cumulative walk / strikeout / in-play out /
/// hit vector; a hit consumes a second, independent variate for its type.
pub fn sample_outcome<R: RngCore + ?Sized>(
    pa: &PaOutcomeProbs,
    hits: &HitTypeDist,
    rng: &mut R,
) -> PaOutcome {
    let first = unit_draw(rng);
    match pick_index(first, &pa.as_array()) {
        index @ 0..=2 => PA_ORDER[index],
        _ => {
            let second = unit_draw(rng);
            HIT_ORDER[pick_index(second, &hits.as_array())]
        }
    }
}

/// Index of the cumulative bucket containing `draw`. Rounding slack past the
/// last boundary lands on the last bucket with positive weight.
fn pick_index(draw: f64, weights: &[f64]) -> usize {
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return index;
        }
    }
    weights
        .iter()
        .rposition(|weight| *weight > 0.0)
        .unwrap_or(weights.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    fn probs() -> (PaOutcomeProbs, HitTypeDist) {
        (
            PaOutcomeProbs {
                walk: 0.1,
                strikeout: 0.2,
                in_play_out: 0.4,
                hit: 0.3,
            },
            HitTypeDist::from_array([0.7, 0.2, 0.02, 0.08]),
        )
    }

    #[test]
    fn same_seed_same_sequence() {
        let (pa, hits) = probs();
        let mut a = SimRng::from_seed(99);
        let mut b = SimRng::from_seed(99);
        let left: Vec<PaOutcome> = (0..500).map(|_| sample_outcome(&pa, &hits, &mut a)).collect();
        let right: Vec<PaOutcome> = (0..500).map(|_| sample_outcome(&pa, &hits, &mut b)).collect();
        assert_eq!(left, right);
        assert_eq!(a.draws(), b.draws());
    }

    #[test]
    fn hits_consume_a_second_draw() {
        let pa = PaOutcomeProbs {
            walk: 0.0,
            strikeout: 0.0,
            in_play_out: 0.0,
            hit: 1.0,
        };
        let hits = HitTypeDist::from_array([0.0, 0.0, 0.0, 1.0]);
        let mut rng = SimRng::from_seed(5);
        assert_eq!(sample_outcome(&pa, &hits, &mut rng), PaOutcome::HomeRun);
        assert_eq!(rng.draws(), 2);

        let outs = PaOutcomeProbs {
            walk: 0.0,
            strikeout: 1.0,
            in_play_out: 0.0,
            hit: 0.0,
        };
        let mut rng = SimRng::from_seed(5);
        assert_eq!(sample_outcome(&outs, &hits, &mut rng), PaOutcome::Strikeout);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn pick_index_respects_boundaries_and_slack() {
        let weights = [0.25, 0.25, 0.5, 0.0];
        assert_eq!(pick_index(0.0, &weights), 0);
        assert_eq!(pick_index(0.25, &weights), 1);
        assert_eq!(pick_index(0.74, &weights), 2);
        assert_eq!(pick_index(1.5, &weights), 2);
    }

    #[test]
    fn combined_vector_sums_to_one() {
        let (pa, hits) = probs();
        let combined = OutcomeProbabilities::combine(&pa, &hits);
        assert!((combined.total() - 1.0).abs() < 1e-9);
        assert!((combined.get(PaOutcome::Single) - 0.21).abs() < 1e-12);
    }

    #[test]
    fn empirical_frequencies_track_probabilities() {
        let (pa, hits) = probs();
        let mut rng = SimRng::from_seed(2024);
        let n = 20_000;
        let walks = (0..n)
            .filter(|_| sample_outcome(&pa, &hits, &mut rng) == PaOutcome::Walk)
            .count();
        let rate = crate::numbers::count_to_f64(walks) / f64::from(n);
        assert!((rate - 0.1).abs() < 0.015, "walk rate {rate}");
    }
}
