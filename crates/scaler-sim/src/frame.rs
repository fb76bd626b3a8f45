//! Pauli-frame simulation of Clifford circuits.
//!
//! The frame is the net Pauli error on every qubit, tracked as symplectic
//! `(x, z)` bits and conjugated through each gate. A measurement reports a
//! flip when the frame has an X component on the measured qubit. Because
//! only flips are tracked, every detector and observable of the noiseless
//! circuit reads zero.

use tracing::debug;

use scaler_ir::{Circuit, ClbitId, CliffordGate, InstructionKind};

use crate::backend::SimulationBackend;
use crate::error::{SimError, SimResult};
use crate::site::{Fault, NoiseRealization, NoiseSite};
use crate::syndrome::{SampleRecord, Syndrome};

/// Largest number of observables in a flip mask.
pub const MAX_OBSERVABLES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameOp {
    H(usize),
    /// S and S-dagger act identically on the frame.
    S(usize),
    /// SX and SX-dagger act identically on the frame.
    SqrtX(usize),
    Cx(usize, usize),
    Cy(usize, usize),
    Cz(usize, usize),
    Swap(usize, usize),
    Measure { qubit: usize, record: usize },
    Reset(usize),
    Noise(usize),
}

/// A circuit compiled for frame propagation.
#[derive(Debug, Clone)]
pub struct FrameSimulator {
    ops: Vec<FrameOp>,
    sites: Vec<NoiseSite>,
    num_qubits: usize,
    num_records: usize,
    detectors: Vec<Vec<usize>>,
    observables: Vec<Vec<usize>>,
}

impl FrameSimulator {
    /// Compile `circuit` into a flat op list in topological order.
    pub fn new(circuit: &Circuit) -> SimResult<Self> {
        if circuit.num_observables() > MAX_OBSERVABLES {
            return Err(SimError::TooManyObservables {
                count: circuit.num_observables(),
                max: MAX_OBSERVABLES,
            });
        }

        let mut ops = Vec::with_capacity(circuit.num_ops());
        let mut sites = Vec::new();
        for (op_index, inst) in circuit.operations().enumerate() {
            let q = |i: usize| inst.qubits[i].index();
            match &inst.kind {
                InstructionKind::Gate(gate) => match gate {
                    CliffordGate::I | CliffordGate::X | CliffordGate::Y | CliffordGate::Z => {}
                    CliffordGate::H => ops.push(FrameOp::H(q(0))),
                    CliffordGate::S | CliffordGate::Sdg => ops.push(FrameOp::S(q(0))),
                    CliffordGate::SX | CliffordGate::SXdg => ops.push(FrameOp::SqrtX(q(0))),
                    CliffordGate::CX => ops.push(FrameOp::Cx(q(0), q(1))),
                    CliffordGate::CY => ops.push(FrameOp::Cy(q(0), q(1))),
                    CliffordGate::CZ => ops.push(FrameOp::Cz(q(0), q(1))),
                    CliffordGate::Swap => ops.push(FrameOp::Swap(q(0), q(1))),
                },
                InstructionKind::Measure => {
                    for (qubit, clbit) in inst.qubits.iter().zip(&inst.clbits) {
                        ops.push(FrameOp::Measure {
                            qubit: qubit.index(),
                            record: clbit.index(),
                        });
                    }
                }
                InstructionKind::Reset => {
                    ops.extend(inst.qubits.iter().map(|qubit| FrameOp::Reset(qubit.index())));
                }
                InstructionKind::Barrier => {}
                InstructionKind::Noise(channel) => {
                    let index = sites.len();
                    sites.push(NoiseSite {
                        index,
                        op_index,
                        qubits: inst.qubits.clone(),
                        terms: channel.terms(),
                    });
                    ops.push(FrameOp::Noise(index));
                }
            }
        }

        let support = |records: &[ClbitId]| -> Vec<usize> { records.iter().map(|c| c.index()).collect() };
        let detectors: Vec<Vec<usize>> =
            circuit.detectors().iter().map(|d| support(&d.records)).collect();
        let observables = circuit
            .observables()
            .iter()
            .map(|o| support(&o.records))
            .collect();

        debug!(
            ops = ops.len(),
            sites = sites.len(),
            detectors = circuit.num_detectors(),
            "Compiled frame simulator"
        );
        Ok(Self {
            ops,
            sites,
            num_qubits: circuit.num_qubits(),
            num_records: circuit.num_clbits(),
            detectors,
            observables,
        })
    }

    fn ordered_faults(&self, realization: &NoiseRealization) -> SimResult<Vec<Fault>> {
        let mut faults = realization.faults().to_vec();
        if !faults.is_sorted_by_key(|f| f.site) {
            faults.sort_by_key(|f| f.site);
        }
        for f in &faults {
            let valid = self
                .sites
                .get(f.site)
                .is_some_and(|site| f.term < site.terms.len());
            if !valid {
                return Err(SimError::InvalidFault {
                    site: f.site,
                    term: f.term,
                });
            }
        }
        Ok(faults)
    }
}

impl SimulationBackend for FrameSimulator {
    fn name(&self) -> &str {
        "frame"
    }

    fn num_detectors(&self) -> usize {
        self.detectors.len()
    }

    fn num_observables(&self) -> usize {
        self.observables.len()
    }

    fn noise_sites(&self) -> &[NoiseSite] {
        &self.sites
    }

    fn simulate(&self, realization: &NoiseRealization) -> SimResult<SampleRecord> {
        let faults = self.ordered_faults(realization)?;
        let mut x = vec![false; self.num_qubits];
        let mut z = vec![false; self.num_qubits];
        let mut records = vec![false; self.num_records];
        let mut cursor = 0;

        for op in &self.ops {
            match *op {
                FrameOp::H(q) => std::mem::swap(&mut x[q], &mut z[q]),
                FrameOp::S(q) => z[q] ^= x[q],
                FrameOp::SqrtX(q) => x[q] ^= z[q],
                FrameOp::Cx(c, t) => {
                    x[t] ^= x[c];
                    z[c] ^= z[t];
                }
                FrameOp::Cy(c, t) => {
                    z[c] ^= x[t] ^ z[t];
                    x[t] ^= x[c];
                    z[t] ^= x[c];
                }
                FrameOp::Cz(a, b) => {
                    z[a] ^= x[b];
                    z[b] ^= x[a];
                }
                FrameOp::Swap(a, b) => {
                    x.swap(a, b);
                    z.swap(a, b);
                }
                FrameOp::Measure { qubit, record } => {
                    records[record] = x[qubit];
                    z[qubit] = false;
                }
                FrameOp::Reset(q) => {
                    x[q] = false;
                    z[q] = false;
                }
                FrameOp::Noise(site) => {
                    while cursor < faults.len() && faults[cursor].site == site {
                        let s = &self.sites[site];
                        let term = &s.terms[faults[cursor].term];
                        for (qubit, pauli) in s.qubits.iter().zip(&term.paulis) {
                            x[qubit.index()] ^= pauli.x();
                            z[qubit.index()] ^= pauli.z();
                        }
                        cursor += 1;
                    }
                }
            }
        }

        let parity = |support: &[usize]| support.iter().fold(false, |acc, &r| acc ^ records[r]);
        let mut detectors = Syndrome::zeros(self.detectors.len());
        for (i, support) in self.detectors.iter().enumerate() {
            if parity(support) {
                detectors.flip(i);
            }
        }
        let observables = self
            .observables
            .iter()
            .enumerate()
            .filter(|(_, support)| parity(support))
            .fold(0u64, |mask, (i, _)| mask | (1 << i));

        Ok(SampleRecord {
            detectors,
            observables,
        })
    }
}
