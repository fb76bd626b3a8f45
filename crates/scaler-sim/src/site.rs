//! Noise sites and fault realizations.

use scaler_ir::{ErrorTerm, QubitId};

/// One noise channel instance in a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSite {
    /// Site index, dense in program order.
    pub index: usize,
    /// Position of the channel among the circuit's operations.
    pub op_index: usize,
    /// Qubits the channel acts on.
    pub qubits: Vec<QubitId>,
    /// Possible errors with their probabilities.
    pub terms: Vec<ErrorTerm>,
}

impl NoiseSite {
    /// Probability that some error occurs at this site.
    pub fn probability(&self) -> f64 {
        self.terms.iter().map(|t| t.probability).sum()
    }
}

/// A fault: error term `term` fired at site `site`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fault {
    /// Site index.
    pub site: usize,
    /// Term index within the site.
    pub term: usize,
}

/// The faults drawn for one trial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseRealization {
    faults: Vec<Fault>,
}

impl NoiseRealization {
    /// An empty realization.
    pub fn new() -> Self {
        Self::default()
    }

    /// A realization with a single fault.
    pub fn single(site: usize, term: usize) -> Self {
        Self {
            faults: vec![Fault { site, term }],
        }
    }

    /// Add a fault.
    pub fn push(&mut self, site: usize, term: usize) {
        self.faults.push(Fault { site, term });
    }

    /// Remove every fault.
    pub fn clear(&mut self) {
        self.faults.clear();
    }

    /// The faults in insertion order.
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    /// Number of faults.
    pub fn len(&self) -> usize {
        self.faults.len()
    }

    /// Whether no fault fired.
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }
}

impl FromIterator<Fault> for NoiseRealization {
    fn from_iter<I: IntoIterator<Item = Fault>>(iter: I) -> Self {
        Self {
            faults: iter.into_iter().collect(),
        }
    }
}
