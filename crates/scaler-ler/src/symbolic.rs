//! Exact enumeration of low-weight fault patterns.
//!
//! Every pattern of at most `W` effective faults is enumerated with its
//! exact probability. Patterns with equal detector and observable flips
//! differ by a stabilizer, so their masses are summed into one class. Within
//! a syndrome, the class holding the least-weight (then most likely) pattern
//! is taken as the correction; every other class of that syndrome is a
//! logical error. Whatever mass lies above `W` bounds the error of the
//! result.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{debug, info, instrument};

use scaler_compile::NoiseModel;
use scaler_ir::Circuit;
use scaler_sim::{
    DetectorErrorModel, Pattern, SampleRecord, Syndrome, auto_weight, cumulative_pattern_count,
    enumerate_from,
};

use crate::config::SymbolicConfig;
use crate::error::{LerError, LerResult};
use crate::experiment::{Experiment, error_model};
use crate::result::{Confidence, EstimatorResult};

/// Total mass of one `(syndrome, logical effect)` class and its best
/// pattern.
#[derive(Debug, Clone, Copy)]
struct ClassMass {
    probability: f64,
    patterns: u64,
    weight: usize,
    likelihood: f64,
}

impl ClassMass {
    fn of(pattern: &Pattern<'_>) -> Self {
        Self {
            probability: pattern.probability,
            patterns: 1,
            weight: pattern.weight(),
            likelihood: pattern.likelihood,
        }
    }

    /// Fewer faults first, then the more likely.
    fn ranks_before(&self, other: &ClassMass) -> bool {
        if self.weight != other.weight {
            return self.weight < other.weight;
        }
        self.likelihood > other.likelihood
    }

    fn absorb(&mut self, other: ClassMass) {
        if other.ranks_before(self) {
            self.weight = other.weight;
            self.likelihood = other.likelihood;
        }
        self.probability += other.probability;
        self.patterns += other.patterns;
    }
}

type ClassMap = FxHashMap<SampleRecord, ClassMass>;

fn insert(classes: &mut ClassMap, record: &SampleRecord, mass: ClassMass) {
    match classes.get_mut(record) {
        Some(entry) => entry.absorb(mass),
        None => {
            classes.insert(record.clone(), mass);
        }
    }
}

fn merge(mut a: ClassMap, b: ClassMap) -> ClassMap {
    if a.len() < b.len() {
        return merge(b, a);
    }
    for (record, mass) in b {
        match a.get_mut(&record) {
            Some(entry) => entry.absorb(mass),
            None => {
                a.insert(record, mass);
            }
        }
    }
    a
}

/// Observable flips of the correcting class of each syndrome.
fn corrections(classes: &ClassMap) -> FxHashMap<&Syndrome, (ClassMass, u64)> {
    let mut best: FxHashMap<&Syndrome, (ClassMass, u64)> = FxHashMap::default();
    for (record, mass) in classes {
        let candidate = (*mass, record.observables);
        match best.get_mut(&record.detectors) {
            Some(current) => {
                let wins = candidate.0.ranks_before(&current.0)
                    || (!current.0.ranks_before(&candidate.0) && candidate.1 < current.1);
                if wins {
                    *current = candidate;
                }
            }
            None => {
                best.insert(&record.detectors, candidate);
            }
        }
    }
    best
}

/// Symbolic estimator.
#[derive(Debug, Clone, Default)]
pub struct SymbolicEstimator {
    config: SymbolicConfig,
}

impl SymbolicEstimator {
    /// Create an estimator.
    pub fn new(config: SymbolicConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &SymbolicConfig {
        &self.config
    }

    /// Compute the LER of `circuit` under `noise` up to the truncation
    /// bound.
    #[instrument(skip_all, fields(circuit = circuit.name()))]
    pub fn estimate(&self, circuit: &Circuit, noise: &NoiseModel) -> LerResult<EstimatorResult> {
        self.config.validate()?;
        if circuit.num_qubits() > self.config.max_qubits {
            return Err(LerError::Intractable {
                reason: format!(
                    "circuit has {} qubits, the limit is {}",
                    circuit.num_qubits(),
                    self.config.max_qubits
                ),
            });
        }
        let dem = error_model(circuit, noise)?;
        self.estimate_dem(&dem)
    }

    /// Compute on a prepared experiment. Only its error model is used.
    pub fn estimate_experiment(&self, experiment: &Experiment) -> LerResult<EstimatorResult> {
        self.estimate_dem(experiment.dem())
    }

    /// Compute on a detector error model.
    pub fn estimate_dem(&self, dem: &DetectorErrorModel) -> LerResult<EstimatorResult> {
        self.config.validate()?;
        let start = Instant::now();
        let weight = self.weight(dem)?;
        let active = dem.active_sites().len();

        let mut classes: ClassMap = (0..active)
            .into_par_iter()
            .map(|first| {
                let mut local = ClassMap::default();
                enumerate_from(dem, first, weight, |pattern| {
                    insert(&mut local, pattern.record, ClassMass::of(pattern));
                });
                local
            })
            .reduce(ClassMap::default, merge);

        let empty: f64 = dem
            .active_sites()
            .iter()
            .map(|&s| dem.site(s).no_effect())
            .product();
        let fault_free = ClassMass {
            probability: empty,
            patterns: 1,
            weight: 0,
            likelihood: 1.0,
        };
        insert(&mut classes, &dem.empty_record(), fault_free);

        let best = corrections(&classes);
        let mut enumerated = 0.0;
        let mut patterns = 0u64;
        let mut ler = 0.0;
        let mut failing = 0u64;
        for (record, mass) in &classes {
            enumerated += mass.probability;
            patterns += mass.patterns;
            let corrected = best
                .get(&record.detectors)
                .is_some_and(|&(_, observables)| observables == record.observables);
            if !corrected {
                ler += mass.probability;
                failing += mass.patterns;
            }
        }
        let truncation_bound = (1.0 - enumerated).max(0.0);
        debug!(
            weight,
            classes = classes.len(),
            syndromes = best.len(),
            patterns,
            "Enumerated fault patterns"
        );
        info!(ler, truncation_bound, weight, "Symbolic estimate finished");

        Ok(EstimatorResult {
            method: "symbolic".into(),
            ler,
            trials: patterns,
            logical_errors: failing,
            std_error: 0.0,
            ci_low: ler,
            ci_high: (ler + truncation_bound).min(1.0),
            confidence: Confidence::Converged,
            truncation_bound: Some(truncation_bound),
            strata: Vec::new(),
            elapsed: start.elapsed(),
        })
    }

    /// Enumeration weight: the configured one if its pattern count fits,
    /// otherwise the largest weight that does.
    fn weight(&self, dem: &DetectorErrorModel) -> LerResult<usize> {
        let budget = u128::from(self.config.max_patterns);
        match self.config.max_weight {
            Some(w) => {
                let count = cumulative_pattern_count(dem, w);
                if count > budget {
                    return Err(LerError::Intractable {
                        reason: format!(
                            "{count} patterns up to weight {w}, the limit is {budget}"
                        ),
                    });
                }
                Ok(w)
            }
            None => {
                let w = auto_weight(dem, budget);
                if w == 0 && !dem.active_sites().is_empty() {
                    return Err(LerError::Intractable {
                        reason: format!("no fault weight fits in {budget} patterns"),
                    });
                }
                Ok(w)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaler_ir::{NoiseChannel, QubitId};

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
    fn test_majority_vote_exact() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let p: f64 = 0.05;
        let result = SymbolicEstimator::default()
            .estimate(&majority(p), &noise)
            .unwrap();
        let exact = 3.0 * p * p * (1.0 - p) + p * p * p;
        assert!((result.ler - exact).abs() < 1e-15);
        assert!(result.truncation_bound.unwrap() < 1e-15);
        assert_eq!(result.trials, 8);
        assert_eq!(result.logical_errors, 4);
    }

    #[test]
    fn test_truncated_weight() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let p: f64 = 0.05;
        let result = SymbolicEstimator::new(SymbolicConfig {
            max_weight: Some(2),
            ..Default::default()
        })
        .estimate(&majority(p), &noise)
        .unwrap();
        // Only the weight-3 pattern is left out.
        assert!((result.truncation_bound.unwrap() - p * p * p).abs() < 1e-15);
        assert!((result.ler - 3.0 * p * p * (1.0 - p)).abs() < 1e-15);
        assert_eq!(result.ci_high, result.ler + result.truncation_bound.unwrap());
    }

    #[test]
    fn test_intractable() {
        let noise = NoiseModel::new(0.0, false, false).unwrap();
        let narrow = SymbolicEstimator::new(SymbolicConfig {
            max_qubits: 2,
            ..Default::default()
        });
        assert!(matches!(
            narrow.estimate(&majority(0.1), &noise),
            Err(LerError::Intractable { .. })
        ));

        let small = SymbolicEstimator::new(SymbolicConfig {
            max_patterns: 3,
            max_weight: Some(2),
            ..Default::default()
        });
        assert!(matches!(
            small.estimate(&majority(0.1), &noise),
            Err(LerError::Intractable { .. })
        ));
    }
}
