//! Comparison of a simulated batch against a team's real season total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::batch::BatchResult;
use crate::stats::{ConfidenceInterval, percentile_rank};

/// Accuracy bucket by absolute percentage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl AccuracyGrade {
    #[must_use]
    pub fn from_error_pct(error_pct: f64) -> Self {
        let error = error_pct.abs();
        if error < 5.0 {
            Self::Excellent
        } else if error < 10.0 {
            Self::Good
        } else if error < 15.0 {
            Self::Acceptable
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for AccuracyGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationVerdict {
    /// The actual total sits inside the central 95% band.
    WellCalibrated,
    /// The model scores more than the team really did.
    OverPrediction,
    UnderPrediction,
}

impl fmt::Display for CalibrationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WellCalibrated => "well calibrated",
            Self::OverPrediction => "over-prediction",
            Self::UnderPrediction => "under-prediction",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub actual_runs: f64,
    pub simulated_mean: f64,
    /// Simulated mean minus actual.
    pub error: f64,
    pub abs_error: f64,
    pub error_pct: f64,
    pub band_95: ConfidenceInterval,
    pub within_band: bool,
    /// Percentile of the actual total within the simulated seasons.
    pub actual_percentile: f64,
    pub grade: AccuracyGrade,
    pub verdict: CalibrationVerdict,
}

#[must_use]
pub fn calibrate(batch: &BatchResult, actual_runs: f64) -> Calibration {
    let mean = batch.summary.mean;
    let error = mean - actual_runs;
    let error_pct = if actual_runs.abs() > f64::EPSILON {
        error / actual_runs * 100.0
    } else {
        0.0
    };
    let band = batch.summary.central_95;
    let within_band = band.contains(actual_runs);
    let mut sorted = batch.season_runs_f64();
    sorted.sort_by(f64::total_cmp);

    let verdict = if within_band {
        CalibrationVerdict::WellCalibrated
    } else if error > 0.0 {
        CalibrationVerdict::OverPrediction
    } else {
        CalibrationVerdict::UnderPrediction
    };
    Calibration {
        actual_runs,
        simulated_mean: mean,
        error,
        abs_error: error.abs(),
        error_pct,
        band_95: band,
        within_band,
        actual_percentile: percentile_rank(&sorted, actual_runs),
        grade: AccuracyGrade::from_error_pct(error_pct),
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_follow_absolute_error() {
        assert_eq!(AccuracyGrade::from_error_pct(-4.9), AccuracyGrade::Excellent);
        assert_eq!(AccuracyGrade::from_error_pct(5.0), AccuracyGrade::Good);
        assert_eq!(AccuracyGrade::from_error_pct(14.99), AccuracyGrade::Acceptable);
        assert_eq!(AccuracyGrade::from_error_pct(-15.0), AccuracyGrade::Poor);
        assert_eq!(AccuracyGrade::Good.to_string(), "good");
    }
}
