//! End-to-end checks of the error model and samplers on compiled codes.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use scaler_compile::{lower, Compiler, NoiseModel, Scheme, StabilizerCode};
use scaler_ir::Circuit;
use scaler_sim::{
    ConditionalSampler, DetectorErrorModel, FaultSampler, FrameSimulator, NoiseRealization,
    SimulationBackend, WeightDistribution,
};

fn noisy_repetition(n: usize, rounds: u32, p: f64) -> Circuit {
    let code = StabilizerCode::repetition(n).unwrap();
    let program = Compiler::new(Scheme::Standard)
        .with_rounds(rounds)
        .compile(&code)
        .unwrap();
    let lowered = lower(&program).unwrap();
    NoiseModel::new(p, true, true)
        .unwrap()
        .rewrite(lowered.circuit())
        .unwrap()
}

fn random_realization(sim: &FrameSimulator, rng: &mut SmallRng, density: f64) -> NoiseRealization {
    let mut realization = NoiseRealization::new();
    for site in sim.noise_sites() {
        if rng.r#gen::<f64>() < density {
            realization.push(site.index, rng.gen_range(0..site.terms.len()));
        }
    }
    realization
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn error_model_matches_frame_propagation(seed in any::<u64>(), density in 0.0f64..0.3) {
        let circuit = noisy_repetition(3, 2, 0.01);
        let sim = FrameSimulator::new(&circuit).unwrap();
        let dem = DetectorErrorModel::from_backend(&sim).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let realization = random_realization(&sim, &mut rng, density);
        prop_assert_eq!(dem.record_of(&realization).unwrap(), sim.simulate(&realization).unwrap());
    }
}

#[test]
fn test_error_model_shape() {
    let circuit = noisy_repetition(3, 2, 0.001);
    let sim = FrameSimulator::new(&circuit).unwrap();
    let dem = DetectorErrorModel::from_backend(&sim).unwrap();
    assert_eq!(dem.num_detectors(), 6);
    assert_eq!(dem.num_observables(), 1);
    assert_eq!(dem.num_sites(), sim.noise_sites().len());
    assert!(dem.degenerate_site().is_none());
    for site in dem.sites() {
        let total = site.no_effect() + site.rate();
        assert!((total - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_fault_sampler_nontrivial_frequency() {
    let circuit = noisy_repetition(3, 2, 0.01);
    let sim = FrameSimulator::new(&circuit).unwrap();
    let dem = DetectorErrorModel::from_backend(&sim).unwrap();
    let sampler = FaultSampler::new(&dem);

    // Probability that at least one active site fires.
    let any_fault = 1.0
        - dem
            .active_sites()
            .iter()
            .map(|&s| dem.site(s).no_effect())
            .product::<f64>();

    let mut rng = SmallRng::seed_from_u64(42);
    let mut scratch = sampler.scratch();
    let trials = 200_000u64;
    let visited = sampler.sample_block(&mut rng, trials, &mut scratch, |_| {});
    let freq = visited as f64 / trials as f64;
    let sigma = (any_fault * (1.0 - any_fault) / trials as f64).sqrt();
    assert!(
        (freq - any_fault).abs() < 5.0 * sigma,
        "freq = {freq}, expected = {any_fault}"
    );
}

#[test]
fn test_weight_distribution_sums_to_one() {
    let circuit = noisy_repetition(5, 2, 0.01);
    let sim = FrameSimulator::new(&circuit).unwrap();
    let dem = DetectorErrorModel::from_backend(&sim).unwrap();
    let conditional = ConditionalSampler::new(&dem, 4);
    let dist = conditional.weight_distribution();
    let total: f64 = dist.pmf().iter().sum::<f64>() + dist.tail();
    assert!((total - 1.0).abs() < 1e-12);
    assert_eq!(dist, WeightDistribution::new(&conditional.rates(), 4));
}

#[test]
fn test_conditional_sampler_hits_requested_weight() {
    let circuit = noisy_repetition(3, 1, 0.01);
    let sim = FrameSimulator::new(&circuit).unwrap();
    let dem = DetectorErrorModel::from_backend(&sim).unwrap();
    let conditional = ConditionalSampler::new(&dem, 3);
    let mut rng = SmallRng::seed_from_u64(3);
    let mut record = conditional.scratch();
    for weight in 0..=3 {
        for _ in 0..100 {
            assert!(conditional.sample(&mut rng, weight, &mut record));
        }
    }
    assert!(conditional.sample(&mut rng, 0, &mut record));
    assert!(record.is_trivial());
    assert!(!conditional.sample(&mut rng, 4, &mut record));
    assert!(record.is_trivial());
}

#[test]
fn test_conditional_weight_one_matches_rates() {
    // With one effective fault, site i is chosen with probability
    // proportional to rate_i / no_effect_i.
    let circuit = noisy_repetition(3, 1, 0.05);
    let sim = FrameSimulator::new(&circuit).unwrap();
    let dem = DetectorErrorModel::from_backend(&sim).unwrap();
    let conditional = ConditionalSampler::new(&dem, 1);

    let odds: Vec<f64> = dem
        .active_sites()
        .iter()
        .map(|&s| dem.site(s).rate() / dem.site(s).no_effect())
        .collect();
    let norm: f64 = odds.iter().sum();
    let expected: f64 = dem
        .active_sites()
        .iter()
        .zip(&odds)
        .map(|(&s, &o)| {
            let site = dem.site(s);
            let flips: f64 = site
                .classes
                .iter()
                .filter(|c| c.effect.observables & 1 == 1)
                .map(|c| c.probability)
                .sum();
            o / norm * flips / site.rate()
        })
        .sum();

    let mut rng = SmallRng::seed_from_u64(11);
    let mut record = conditional.scratch();
    let n = 100_000;
    let hits = (0..n)
        .filter(|_| {
            conditional.sample(&mut rng, 1, &mut record);
            record.observables & 1 == 1
        })
        .count();
    let freq = hits as f64 / n as f64;
    let sigma = (expected * (1.0 - expected) / n as f64).sqrt();
    assert!(
        (freq - expected).abs() < 5.0 * sigma,
        "freq = {freq}, expected = {expected}"
    );
}
