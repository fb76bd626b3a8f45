//! Estimator behaviour on compiled repetition codes.

use scaler_compile::{lower, Compiler, NoiseModel, Scheme, StabilizerCode};
use scaler_ir::Circuit;
use scaler_sim::cumulative_pattern_count;
use scaler_ler::{
    Confidence, Experiment, LerError, MonteCarloConfig, MonteCarloEstimator, StratifiedConfig,
    StratifiedEstimator, SymbolicConfig, SymbolicEstimator,
};

/// `ZZI`, `IZZ`, logical `ZZZ`, standard extraction.
fn repetition(n: usize, rounds: u32) -> Circuit {
    let code = StabilizerCode::repetition(n).unwrap();
    let program = Compiler::new(Scheme::Standard)
        .with_rounds(rounds)
        .compile(&code)
        .unwrap();
    lower(&program).unwrap().into_circuit()
}

#[test]
fn test_monte_carlo_three_qubit_scenario() {
    let p = 0.001;
    let noise = NoiseModel::new(p, false, false).unwrap();
    let estimator = MonteCarloEstimator::new(MonteCarloConfig {
        min_logical_events: 100,
        repeat: 3,
        seed: Some(2024),
        ..Default::default()
    });
    let estimate = estimator.estimate(&repetition(3, 2), &noise).unwrap();

    assert_eq!(estimate.runs.len(), 3);
    assert_eq!(estimate.confidence(), Confidence::Converged);
    for run in &estimate.runs {
        assert!(run.ler > 0.0 && run.ler < p, "ler = {}", run.ler);
        assert!(run.logical_errors >= 100);
    }
    assert!(estimate.mean > 0.0 && estimate.mean < p);
    assert!(estimate.variance > 0.0);
    let first = &estimate.runs[0];
    assert!(
        estimate.runs[1..]
            .iter()
            .any(|r| r.trials != first.trials || r.logical_errors != first.logical_errors)
    );
}

#[test]
fn test_monte_carlo_interval_shrinks_with_events() {
    let noise = NoiseModel::new(0.01, false, false).unwrap();
    let circuit = repetition(3, 2);
    let experiment = Experiment::prepare(&circuit, &noise, None).unwrap();
    let width = |events: u64| {
        MonteCarloEstimator::new(MonteCarloConfig {
            min_logical_events: events,
            seed: Some(8),
            ..Default::default()
        })
        .estimate_experiment(&experiment)
        .unwrap()
        .runs[0]
            .interval_width()
    };
    assert!(width(400) < width(25));
}

#[test]
fn test_symbolic_agrees_with_monte_carlo() {
    let noise = NoiseModel::new(0.001, false, false).unwrap();
    let circuit = repetition(3, 2);
    let experiment = Experiment::prepare(&circuit, &noise, None).unwrap();

    let exact = SymbolicEstimator::new(SymbolicConfig::default())
        .estimate_experiment(&experiment)
        .unwrap();
    assert!(exact.truncation_bound.unwrap() < 1e-6);

    let sampled = MonteCarloEstimator::new(MonteCarloConfig {
        min_logical_events: 100,
        seed: Some(99),
        ..Default::default()
    })
    .estimate_experiment(&experiment)
    .unwrap();
    let run = &sampled.runs[0];
    assert!(run.is_converged());
    assert!(
        (run.ler - exact.ler).abs() < 4.0 * run.std_error,
        "monte carlo {} vs symbolic {}",
        run.ler,
        exact.ler
    );
}

#[test]
fn test_symbolic_independent_of_decoder_table() {
    let noise = NoiseModel::new(0.001, false, false).unwrap();
    let circuit = repetition(3, 2);
    let symbolic = SymbolicEstimator::new(SymbolicConfig {
        max_weight: Some(3),
        ..Default::default()
    });
    let results: Vec<_> = [Some(1), Some(2), None]
        .into_iter()
        .map(|weight| {
            let experiment = Experiment::prepare(&circuit, &noise, weight).unwrap();
            symbolic.estimate_experiment(&experiment).unwrap()
        })
        .collect();
    for result in &results[1..] {
        assert_eq!(result.ler, results[0].ler);
        assert_eq!(result.logical_errors, results[0].logical_errors);
        assert_eq!(result.truncation_bound, results[0].truncation_bound);
    }
    assert!(results[0].ler > 0.0 && results[0].ler < 1e-5);
}

#[test]
fn test_stratified_refines_rare_event_strata() {
    let noise = NoiseModel::new(0.001, false, false).unwrap();
    let circuit = repetition(5, 2);
    let config = StratifiedConfig {
        sample_budget: 300_000,
        max_subspace_sample: 200_000,
        code_distance: Some(5),
        seed: Some(4),
        ..Default::default()
    };
    let initial_pass = config.num_subspace as u64 * config.sample_gap;
    let result = StratifiedEstimator::new(config.clone())
        .estimate(&circuit, &noise)
        .unwrap();
    let run = &result.runs[0];

    assert!(run.trials > initial_pass, "only {} trials", run.trials);
    assert!(run.trials <= config.sample_budget);
    let w3 = &run.strata[2];
    assert_eq!(w3.weight, 3);
    assert!(w3.events >= config.min_logical_events, "w=3: {w3:?}");
    assert_eq!(run.confidence, Confidence::Converged);
}

#[test]
fn test_stratified_needs_fewer_trials_than_monte_carlo() {
    // Both estimators stop at 100 logical events, which puts the relative
    // interval width near 0.4.
    let target = 0.6;
    let noise = NoiseModel::new(0.001, false, false).unwrap();
    let circuit = repetition(3, 2);
    let experiment = Experiment::prepare(&circuit, &noise, None).unwrap();

    let monte_carlo = MonteCarloEstimator::new(MonteCarloConfig {
        min_logical_events: 100,
        seed: Some(4),
        ..Default::default()
    })
    .estimate_experiment(&experiment)
    .unwrap();
    let mc_run = &monte_carlo.runs[0];
    assert!(mc_run.is_converged());
    assert!(mc_run.interval_width() / mc_run.ler < target);

    let stratified = StratifiedEstimator::new(StratifiedConfig {
        sample_budget: 1_000_000,
        max_sample_gap: 20_000,
        max_subspace_sample: 500_000,
        seed: Some(4),
        ..Default::default()
    })
    .estimate_experiment(&experiment)
    .unwrap();
    let strat_run = &stratified.runs[0];
    assert!(strat_run.is_converged());
    assert!(
        strat_run.interval_width() / strat_run.ler < target,
        "stratified {:?} around {}",
        strat_run.interval(),
        strat_run.ler
    );

    assert!(
        strat_run.trials * 10 < mc_run.trials,
        "stratified {} trials vs monte carlo {}",
        strat_run.trials,
        mc_run.trials
    );
}

#[test]
fn test_stratified_s_curve_shape() {
    let noise = NoiseModel::new(0.01, false, false).unwrap();
    let result = StratifiedEstimator::new(StratifiedConfig {
        sample_budget: 20_000,
        seed: Some(6),
        ..Default::default()
    })
    .estimate(&repetition(3, 2), &noise)
    .unwrap();
    let run = &result.runs[0];
    assert_eq!(run.strata.len(), 6);
    assert_eq!(run.strata[0].weight, 1);
    // A single fault is always corrected at distance 3.
    assert_eq!(run.strata[0].events, 0);
    let total_mass: f64 = run.strata.iter().map(|s| s.mass).sum();
    assert!(total_mass < 1.0);
    assert!(run.ler > 0.0);
}

#[test]
fn test_config_validated_before_sampling() {
    let noise = NoiseModel::new(0.01, false, false).unwrap();
    let estimator = StratifiedEstimator::new(StratifiedConfig {
        sample_gap: 500,
        max_sample_gap: 100,
        ..Default::default()
    });
    match estimator.estimate(&repetition(3, 1), &noise) {
        Err(LerError::Config(err)) => assert_eq!(err.field, "max_sample_gap"),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[test]
fn test_symbolic_weight_budget() {
    let noise = NoiseModel::new(0.001, false, false).unwrap();
    let circuit = repetition(3, 2);
    let experiment = Experiment::prepare(&circuit, &noise, None).unwrap();
    let count = cumulative_pattern_count(experiment.dem(), 4) as u64;

    let result = SymbolicEstimator::new(SymbolicConfig {
        max_weight: Some(4),
        max_patterns: count - 1,
        ..Default::default()
    })
    .estimate_experiment(&experiment);
    assert!(matches!(result, Err(LerError::Intractable { .. })));

    let result = SymbolicEstimator::new(SymbolicConfig {
        max_weight: Some(4),
        max_patterns: count,
        ..Default::default()
    })
    .estimate_experiment(&experiment)
    .unwrap();
    assert_eq!(result.trials, count);
    assert!(result.ler > 0.0 && result.ler < 1e-5);
}
