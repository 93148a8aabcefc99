//! Summary statistics over per-season samples.

use serde::{Deserialize, Serialize};

use crate::constants::{REPORTED_PERCENTILES, Z_95};
use crate::numbers::{count_to_f64, floor_f64_to_usize, u64_to_f64};

/// Welford accumulator; numerically stable for long batches.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let count = u64_to_f64(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Population variance (divides by `n`).
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.m2 / u64_to_f64(self.count)
        } else {
            0.0
        }
    }

    /// Sample variance (divides by `n - 1`).
    #[must_use]
    pub fn sample_variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / u64_to_f64(self.count - 1)
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    #[must_use]
    pub fn sample_std_dev(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::default();
        for value in iter {
            stats.add(value);
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePoint {
    pub percentile: f64,
    pub value: f64,
}

/// Linear-interpolated percentile of an ascending slice. `pct` is on the
/// 0-100 scale and clamped into it. Returns 0 for an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.0;
    };
    let rank = pct.clamp(0.0, 100.0) / 100.0 * count_to_f64(last);
    let lower = floor_f64_to_usize(rank).min(last);
    let upper = (lower + 1).min(last);
    let weight = rank - count_to_f64(lower);
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Share of `sorted` at or below `value`, on the 0-100 scale.
#[must_use]
pub fn percentile_rank(sorted: &[f64], value: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let at_or_below = sorted.partition_point(|sample| *sample <= value);
    count_to_f64(at_or_below) / count_to_f64(sorted.len()) * 100.0
}

/// Wilson score interval for a binomial proportion. Stays inside `[0, 1]`
/// even at zero or full success counts.
#[must_use]
pub fn wilson_interval(successes: u64, trials: u64, z: f64) -> ConfidenceInterval {
    if trials == 0 {
        return ConfidenceInterval {
            lower: 0.0,
            upper: 1.0,
        };
    }
    let n = u64_to_f64(trials);
    let p = u64_to_f64(successes.min(trials)) / n;
    let z2 = z * z;
    let denominator = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denominator;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    ConfidenceInterval {
        lower: (centre - margin).max(0.0),
        upper: (centre + margin).min(1.0),
    }
}

/// Descriptive statistics for the season run distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Vec<PercentilePoint>,
    /// 95% confidence interval on the mean, using the sample standard error.
    pub mean_ci_95: ConfidenceInterval,
    /// 2.5th to 97.5th percentile of the samples.
    pub central_95: ConfidenceInterval,
}

impl DistributionSummary {
    /// `None` for an empty sample.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let running: RunningStats = values.iter().copied().collect();
        let mean = running.mean();
        let standard_error = running.sample_std_dev() / count_to_f64(values.len()).sqrt();
        let percentiles = REPORTED_PERCENTILES
            .iter()
            .map(|&pct| PercentilePoint {
                percentile: pct,
                value: percentile(&sorted, pct),
            })
            .collect();
        Some(Self {
            count: values.len(),
            mean,
            median: percentile(&sorted, 50.0),
            std_dev: running.std_dev(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            percentiles,
            mean_ci_95: ConfidenceInterval {
                lower: mean - Z_95 * standard_error,
                upper: mean + Z_95 * standard_error,
            },
            central_95: ConfidenceInterval {
                lower: percentile(&sorted, 2.5),
                upper: percentile(&sorted, 97.5),
            },
        })
    }

    /// Value at a reported percentile, if it was computed.
    #[must_use]
    pub fn at(&self, pct: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|point| (point.percentile - pct).abs() < f64::EPSILON)
            .map(|point| point.value)
    }
}

/// Compact mean/std/median triple for secondary counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CounterSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
}

impl CounterSummary {
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let running: RunningStats = values.iter().copied().collect();
        Self {
            mean: running.mean(),
            std_dev: running.std_dev(),
            median: percentile(&sorted, 50.0),
        }
    }
}
