//! Stratified "S-curve" estimation.
//!
//! Trials are partitioned by the number `w` of noise sites whose drawn
//! error has a non-trivial effect. The probability `pi_w` of each stratum is
//! computed exactly, so only the conditional failure rate `f_w` has to be
//! sampled:
//!
//! ```text
//! LER = sum_w pi_w * f_w
//! ```
//!
//! Rare-event regimes put almost all of the failure probability in a few
//! low-weight strata, which can be sampled directly at rates far above the
//! LER itself.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use scaler_compile::NoiseModel;
use scaler_ir::Circuit;
use scaler_sim::ConditionalSampler;

use crate::config::StratifiedConfig;
use crate::error::{LerError, LerResult};
use crate::experiment::Experiment;
use crate::result::{Confidence, EstimatorResult, RepeatedEstimate, StratumSummary};
use crate::stats::{Z_95, block_seed, normal_interval};

/// Share of the total variance below which a stratum stops receiving
/// trials.
const NEGLIGIBLE_SHARE: f64 = 1e-3;

#[derive(Debug, Clone)]
struct Stratum {
    weight: usize,
    mass: f64,
    trials: u64,
    events: u64,
    settled: bool,
}

impl Stratum {
    fn rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.events as f64 / self.trials as f64
        }
    }

    /// Failure rate with a Jeffreys pseudo-count, never exactly 0 or 1.
    fn smoothed_rate(&self) -> f64 {
        (self.events as f64 + 0.5) / (self.trials as f64 + 1.0)
    }

    /// Contribution to the estimator variance, used for ranking.
    fn priority(&self) -> f64 {
        let f = self.smoothed_rate();
        self.mass * self.mass * f * (1.0 - f) / (self.trials.max(1)) as f64
    }

    /// Contribution to the reported variance.
    fn variance(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        let f = self.rate();
        self.mass * self.mass * f * (1.0 - f) / self.trials as f64
    }

    fn summary(&self) -> StratumSummary {
        StratumSummary {
            weight: self.weight,
            mass: self.mass,
            trials: self.trials,
            events: self.events,
            rate: self.rate(),
        }
    }
}

/// Stratified estimator.
#[derive(Debug, Clone, Default)]
pub struct StratifiedEstimator {
    config: StratifiedConfig,
}

impl StratifiedEstimator {
    /// Create an estimator.
    pub fn new(config: StratifiedConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &StratifiedConfig {
        &self.config
    }

    /// Estimate the LER of `circuit` under `noise`.
    #[instrument(skip_all, fields(circuit = circuit.name()))]
    pub fn estimate(&self, circuit: &Circuit, noise: &NoiseModel) -> LerResult<RepeatedEstimate> {
        self.config.validate()?;
        let experiment = Experiment::prepare(circuit, noise, self.config.decoder_weight)?;
        self.estimate_experiment(&experiment)
    }

    /// Estimate on a prepared experiment.
    pub fn estimate_experiment(&self, experiment: &Experiment) -> LerResult<RepeatedEstimate> {
        self.config.validate()?;
        if let Some(site) = experiment.dem().degenerate_site() {
            return Err(LerError::DegenerateNoise { site });
        }
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let runs = (0..self.config.repeat)
            .map(|run| self.run(experiment, seed, u64::from(run)))
            .collect();
        Ok(RepeatedEstimate::from_runs(runs))
    }

    fn run(&self, experiment: &Experiment, seed: u64, run: u64) -> EstimatorResult {
        let config = &self.config;
        let start = Instant::now();
        let dem = experiment.dem();
        let max_weight = config.num_subspace.min(dem.active_sites().len());
        let sampler = ConditionalSampler::new(dem, max_weight);
        let distribution = sampler.weight_distribution();

        let mut strata: Vec<Stratum> = (1..=max_weight)
            .map(|weight| Stratum {
                weight,
                mass: distribution.probability(weight),
                trials: 0,
                events: 0,
                settled: false,
            })
            .collect();
        let mut budget = config.sample_budget;
        let mut step = 0u64;

        // Initial pass.
        let allocation: Vec<(usize, u64)> = strata
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let n = config.sample_gap.min(budget);
                budget -= n;
                (i, n)
            })
            .collect();
        sample_step(experiment, &sampler, &mut strata, &allocation, seed, run, step);
        let correctable = config.correctable_weight();
        for s in &mut strata {
            if s.weight <= correctable && s.events == 0 {
                s.settled = true;
            }
        }

        // Refinement.
        while budget > 0 {
            step += 1;
            self.settle(&mut strata);
            let mut open: Vec<usize> = (0..strata.len()).filter(|&i| !strata[i].settled).collect();
            if open.is_empty() {
                break;
            }
            open.sort_by(|&a, &b| strata[b].priority().total_cmp(&strata[a].priority()));
            open.truncate(config.k_range);

            let exponent = config.beta / (1.0 + config.beta);
            let scores: Vec<f64> = open
                .iter()
                .map(|&i| {
                    let s = &strata[i];
                    let f = s.smoothed_rate();
                    (s.mass * (f * (1.0 - f)).sqrt()).powf(exponent)
                })
                .collect();
            let top = scores.iter().copied().fold(0.0, f64::max);

            let mut allocation = Vec::with_capacity(open.len());
            for (&i, &score) in open.iter().zip(&scores) {
                let share = if top > 0.0 { score / top } else { 1.0 };
                let n = ((config.max_sample_gap as f64 * share).ceil() as u64)
                    .clamp(1, config.max_sample_gap)
                    .min(config.max_subspace_sample.saturating_sub(strata[i].trials))
                    .min(budget);
                if n > 0 {
                    budget -= n;
                    allocation.push((i, n));
                }
            }
            if allocation.is_empty() {
                break;
            }
            sample_step(experiment, &sampler, &mut strata, &allocation, seed, run, step);
            debug!(run, step, budget, strata = allocation.len(), "Stratified step");
        }

        let ler: f64 = strata.iter().map(|s| s.mass * s.rate()).sum();
        let std_error = strata.iter().map(Stratum::variance).sum::<f64>().sqrt();
        // Strata never sampled are as uncertain as the truncated tail.
        let unsampled: f64 = strata.iter().filter(|s| s.trials == 0).map(|s| s.mass).sum();
        let tail = distribution.tail();
        let (ci_low, ci_high) = normal_interval(ler, std_error, Z_95);
        let ci_high = (ci_high + tail + unsampled).min(1.0);

        let trials = strata.iter().map(|s| s.trials).sum();
        let logical_errors = strata.iter().map(|s| s.events).sum();
        let confidence = if strata.iter().any(|s| s.events >= config.min_logical_events) {
            Confidence::Converged
        } else {
            warn!(run, trials, budget, "Sampling stopped before any stratum converged");
            Confidence::BudgetExhausted
        };
        info!(run, ler, std_error, trials, logical_errors, tail, "Stratified run finished");

        EstimatorResult {
            method: "stratified".into(),
            ler,
            trials,
            logical_errors,
            std_error,
            ci_low,
            ci_high,
            confidence,
            truncation_bound: Some(tail),
            strata: strata.iter().map(Stratum::summary).collect(),
            elapsed: start.elapsed(),
        }
    }

    /// Settle open strata. The negligible-share test only compares open
    /// strata with each other.
    fn settle(&self, strata: &mut [Stratum]) {
        let config = &self.config;
        let total: f64 = strata
            .iter()
            .filter(|s| !s.settled)
            .map(Stratum::priority)
            .sum();
        for s in strata.iter_mut().filter(|s| !s.settled) {
            s.settled = s.events >= config.min_logical_events
                || s.trials >= config.max_subspace_sample
                || s.priority() < NEGLIGIBLE_SHARE * total;
        }
    }
}

/// Draw `allocation[j].1` trials in stratum `allocation[j].0`, strata in
/// parallel, and add the counts.
fn sample_step(
    experiment: &Experiment,
    sampler: &ConditionalSampler<'_>,
    strata: &mut [Stratum],
    allocation: &[(usize, u64)],
    seed: u64,
    run: u64,
    step: u64,
) {
    let counts: Vec<(usize, u64, u64)> = allocation
        .par_iter()
        .map(|&(i, n)| {
            let weight = strata[i].weight;
            let block = (step << 16) | weight as u64;
            let mut rng = SmallRng::seed_from_u64(block_seed(seed, run, block));
            let mut record = sampler.scratch();
            let mut events = 0u64;
            let mut drawn = 0u64;
            for _ in 0..n {
                if !sampler.sample(&mut rng, weight, &mut record) {
                    break;
                }
                drawn += 1;
                if experiment.is_logical_error(&record) {
                    events += 1;
                }
            }
            (i, drawn, events)
        })
        .collect();
    for (i, drawn, events) in counts {
        strata[i].trials += drawn;
        strata[i].events += events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaler_ir::{NoiseChannel, QubitId};

    /// Three bit-flip sites on a majority-voted qubit.
    fn majority(p: f64) -> Circuit {
        let mut c = Circuit::with_size("majority", 3);
        for q in 0..3 {
            c.noise(NoiseChannel::BitFlip { p }, [QubitId(q)]).unwrap();
        }
        let m: Vec<_> = (0..3).map(|q| c.measure_record(QubitId(q)).unwrap()).collect();
        c.add_detector([m[0], m[1]]).unwrap();
        c.add_detector([m[1], m[2]]).unwrap();
        c.add_observable([m[0]]).unwrap();
        c
    }

    #[test]
    fn test_majority_vote_exact_strata() {
        // Weight 1 is always corrected, weights 2 and 3 always fail.
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = StratifiedEstimator::new(StratifiedConfig {
            sample_budget: 2_000,
            k_range: 3,
            num_subspace: 3,
            min_logical_events: 10,
            sample_gap: 100,
            max_sample_gap: 200,
            max_subspace_sample: 500,
            seed: Some(3),
            ..Default::default()
        });
        let p: f64 = 0.1;
        let result = estimator.estimate(&majority(p), &noise).unwrap();
        let run = result.first().unwrap();
        let strata = &run.strata;
        assert_eq!(strata.len(), 3);
        assert_eq!(strata[0].events, 0);
        assert_eq!(strata[1].rate, 1.0);
        assert_eq!(strata[2].rate, 1.0);

        let exact = 3.0 * p * p * (1.0 - p) + p * p * p;
        assert!((run.ler - exact).abs() < 1e-12);
        assert_eq!(run.truncation_bound, Some(0.0));
        assert!(run.is_converged());
    }

    #[test]
    fn test_budget_exhausted() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = StratifiedEstimator::new(StratifiedConfig {
            sample_budget: 150,
            min_logical_events: 1_000,
            sample_gap: 100,
            seed: Some(1),
            ..Default::default()
        });
        let result = estimator.estimate(&majority(0.01), &noise).unwrap();
        let run = result.first().unwrap();
        assert_eq!(run.confidence, Confidence::BudgetExhausted);
        assert_eq!(run.trials, 150);
        // The third stratum got no trials; its mass widens the interval.
        assert_eq!(run.strata[2].trials, 0);
        assert!(run.ci_high >= run.strata[2].mass);
    }

    #[test]
    fn test_settled_strata_do_not_crowd_out_open_ones() {
        let stratum = |weight, mass, trials, events, settled| Stratum {
            weight,
            mass,
            trials,
            events,
            settled,
        };
        // A heavy correctable stratum with no events next to a light one
        // that fails often.
        let mut strata = vec![
            stratum(1, 0.1, 100, 0, true),
            stratum(3, 1e-4, 100, 2, false),
            stratum(6, 1e-12, 100, 50, false),
        ];
        assert!(strata[1].priority() < NEGLIGIBLE_SHARE * strata[0].priority());

        StratifiedEstimator::default().settle(&mut strata);
        assert!(!strata[1].settled);
        assert!(strata[2].settled);
    }

    #[test]
    fn test_degenerate_noise_rejected() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = StratifiedEstimator::new(StratifiedConfig::default());
        assert!(matches!(
            estimator.estimate(&majority(1.0), &noise),
            Err(LerError::DegenerateNoise { site: 0 })
        ));
    }
}
