//! Direct Monte Carlo estimation.
//!
//! Trials are drawn in fixed-size blocks, each seeded from
//! `(seed, run, block)`. Blocks of a round run in parallel and their counts
//! are summed at the round boundary, where the stopping rules are checked.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument};

use scaler_compile::NoiseModel;
use scaler_ir::Circuit;
use scaler_sim::FaultSampler;

use crate::config::MonteCarloConfig;
use crate::error::LerResult;
use crate::experiment::Experiment;
use crate::result::{Confidence, EstimatorResult, RepeatedEstimate};
use crate::stats::{Z_95, block_seed, wilson_interval};

/// Most blocks in one round.
const MAX_ROUND_BLOCKS: u64 = 64;

/// Monte Carlo estimator.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloEstimator {
    config: MonteCarloConfig,
}

impl MonteCarloEstimator {
    /// Create an estimator.
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &MonteCarloConfig {
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
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let runs = (0..self.config.repeat)
            .map(|run| self.run(experiment, seed, u64::from(run)))
            .collect();
        Ok(RepeatedEstimate::from_runs(runs))
    }

    fn run(&self, experiment: &Experiment, seed: u64, run: u64) -> EstimatorResult {
        let config = &self.config;
        let start = Instant::now();
        let sampler = FaultSampler::new(experiment.dem());
        let baseline = experiment.is_logical_error(&sampler.scratch());

        let mut trials = 0u64;
        let mut errors = 0u64;
        let mut next_block = 0u64;
        let mut round_blocks = 1u64;

        let confidence = loop {
            if errors >= config.min_logical_events {
                break Confidence::Converged;
            }
            if trials >= config.max_trials {
                break Confidence::BudgetExhausted;
            }
            if config
                .time_budget_secs
                .is_some_and(|limit| start.elapsed().as_secs_f64() >= limit)
            {
                break Confidence::BudgetExhausted;
            }

            let remaining = (config.max_trials - trials).div_ceil(config.batch_size);
            let blocks = round_blocks.min(remaining);
            let first = next_block;
            let (round_trials, round_errors) = (first..first + blocks)
                .into_par_iter()
                .map(|block| {
                    let size = config
                        .batch_size
                        .min(config.max_trials - block * config.batch_size);
                    let block_errors =
                        run_block(experiment, &sampler, baseline, block_seed(seed, run, block), size);
                    (size, block_errors)
                })
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

            trials += round_trials;
            errors += round_errors;
            next_block += blocks;
            debug!(run, trials, errors, blocks, "Monte Carlo round");

            round_blocks = if errors == 0 {
                (round_blocks * 2).min(MAX_ROUND_BLOCKS)
            } else {
                let rate = errors as f64 / trials as f64;
                let needed = config.min_logical_events.saturating_sub(errors) as f64 / rate;
                let blocks = (needed / config.batch_size as f64).ceil() as u64;
                blocks.clamp(1, MAX_ROUND_BLOCKS)
            };
        };

        let ler = if trials > 0 {
            errors as f64 / trials as f64
        } else {
            0.0
        };
        let std_error = if trials > 0 {
            (ler * (1.0 - ler) / trials as f64).sqrt()
        } else {
            0.0
        };
        let (ci_low, ci_high) = wilson_interval(errors, trials, Z_95);
        info!(
            run,
            ler,
            trials,
            errors,
            converged = confidence == Confidence::Converged,
            "Monte Carlo run finished"
        );

        EstimatorResult {
            method: "monte_carlo".into(),
            ler,
            trials,
            logical_errors: errors,
            std_error,
            ci_low,
            ci_high,
            confidence,
            truncation_bound: None,
            strata: Vec::new(),
            elapsed: start.elapsed(),
        }
    }
}

/// Logical errors in one block of `size` trials.
fn run_block(
    experiment: &Experiment,
    sampler: &FaultSampler<'_>,
    baseline: bool,
    seed: u64,
    size: u64,
) -> u64 {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut scratch = sampler.scratch();
    let mut errors = 0u64;
    let visited = sampler.sample_block(&mut rng, size, &mut scratch, |record| {
        if experiment.is_logical_error(record) {
            errors += 1;
        }
    });
    // Trials without faults all share the empty record.
    if baseline {
        errors += size - visited;
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaler_ir::{NoiseChannel, QubitId};

    /// One data qubit read twice with no check: every flip is a logical
    /// error the decoder cannot see.
    fn unprotected(p: f64) -> Circuit {
        let mut c = Circuit::with_size("bare", 1);
        c.noise(NoiseChannel::BitFlip { p }, [QubitId(0)]).unwrap();
        let m = c.measure_record(QubitId(0)).unwrap();
        c.add_observable([m]).unwrap();
        c
    }

    #[test]
    fn test_unprotected_rate() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = MonteCarloEstimator::new(MonteCarloConfig {
            min_logical_events: 2_000,
            seed: Some(5),
            ..Default::default()
        });
        let result = estimator.estimate(&unprotected(0.1), &noise).unwrap();
        let run = result.first().unwrap();
        assert!(run.is_converged());
        assert!(run.logical_errors >= 2_000);
        assert!((run.ler - 0.1).abs() < 5.0 * run.std_error, "ler = {}", run.ler);
        assert!(run.ci_low < 0.1 && 0.1 < run.ci_high);
    }

    #[test]
    fn test_zero_events_exhaust_budget() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = MonteCarloEstimator::new(MonteCarloConfig {
            batch_size: 1_000,
            max_trials: 5_000,
            seed: Some(1),
            ..Default::default()
        });
        let result = estimator.estimate(&unprotected(0.0), &noise).unwrap();
        let run = result.first().unwrap();
        assert_eq!(run.confidence, Confidence::BudgetExhausted);
        assert_eq!(run.trials, 5_000);
        assert_eq!(run.ler, 0.0);
        assert!(run.ci_high > 0.0);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let config = MonteCarloConfig {
            min_logical_events: 50,
            batch_size: 100,
            repeat: 2,
            seed: Some(77),
            ..Default::default()
        };
        let a = MonteCarloEstimator::new(config.clone())
            .estimate(&unprotected(0.05), &noise)
            .unwrap();
        let b = MonteCarloEstimator::new(config)
            .estimate(&unprotected(0.05), &noise)
            .unwrap();
        for (x, y) in a.runs.iter().zip(&b.runs) {
            assert_eq!(x.trials, y.trials);
            assert_eq!(x.logical_errors, y.logical_errors);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let estimator = MonteCarloEstimator::new(MonteCarloConfig {
            repeat: 0,
            ..Default::default()
        });
        assert!(matches!(
            estimator.estimate(&unprotected(0.1), &noise),
            Err(crate::LerError::Config(_))
        ));
    }
}
