//! Estimator results.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::stats::mean_and_variance;

/// Whether an estimate met its stopping target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// The event target was reached, or the computation is exact.
    Converged,
    /// A trial, time or sample budget ran out first. The estimate is kept
    /// but may rest on few or no events.
    BudgetExhausted,
}

/// One stratum of a stratified estimate: a point of the S-curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratumSummary {
    /// Number of effective faults.
    pub weight: usize,
    /// Exact probability of this weight.
    pub mass: f64,
    /// Trials drawn in the stratum.
    pub trials: u64,
    /// Logical errors among them.
    pub events: u64,
    /// Conditional logical error rate `events / trials`.
    pub rate: f64,
}

/// Result of one estimator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorResult {
    /// Estimation method.
    pub method: String,
    /// Logical error rate estimate.
    pub ler: f64,
    /// Trials drawn, or patterns enumerated for exact methods.
    pub trials: u64,
    /// Trials (or patterns) ending in a logical error.
    pub logical_errors: u64,
    /// Standard error of `ler`.
    pub std_error: f64,
    /// Lower end of the 95% interval.
    pub ci_low: f64,
    /// Upper end of the 95% interval.
    pub ci_high: f64,
    /// Whether the stopping target was met.
    pub confidence: Confidence,
    /// Probability mass left out of the computation.
    pub truncation_bound: Option<f64>,
    /// Per-stratum breakdown, stratified estimates only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strata: Vec<StratumSummary>,
    /// Wall-clock time.
    pub elapsed: Duration,
}

impl EstimatorResult {
    /// The 95% interval as `(low, high)`.
    pub fn interval(&self) -> (f64, f64) {
        (self.ci_low, self.ci_high)
    }

    /// Width of the 95% interval.
    pub fn interval_width(&self) -> f64 {
        self.ci_high - self.ci_low
    }

    /// Whether the stopping target was met.
    pub fn is_converged(&self) -> bool {
        self.confidence == Confidence::Converged
    }
}

/// Results of repeated independent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedEstimate {
    /// Every run, in order.
    pub runs: Vec<EstimatorResult>,
    /// Mean LER across runs.
    pub mean: f64,
    /// Sample variance of the LER across runs.
    pub variance: f64,
    /// Sample standard deviation of the LER across runs.
    pub std_dev: f64,
}

impl RepeatedEstimate {
    /// Summarize `runs`.
    pub fn from_runs(runs: Vec<EstimatorResult>) -> Self {
        let lers: Vec<f64> = runs.iter().map(|r| r.ler).collect();
        let (mean, variance) = mean_and_variance(&lers);
        Self {
            runs,
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// `BudgetExhausted` if any run exhausted its budget.
    pub fn confidence(&self) -> Confidence {
        if self.runs.iter().all(EstimatorResult::is_converged) {
            Confidence::Converged
        } else {
            Confidence::BudgetExhausted
        }
    }

    /// Trials over all runs.
    pub fn total_trials(&self) -> u64 {
        self.runs.iter().map(|r| r.trials).sum()
    }

    /// The first run.
    pub fn first(&self) -> Option<&EstimatorResult> {
        self.runs.first()
    }
}
