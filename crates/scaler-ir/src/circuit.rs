//! High-level circuit builder API.

use std::collections::BTreeMap;

use crate::annotation::{Detector, DetectorId, Observable, ObservableId, parity_support};
use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::CliffordGate;
use crate::instruction::Instruction;
use crate::noise::NoiseChannel;
use crate::qubit::{ClbitId, Qubit, QubitId};

/// A Clifford circuit with detector and observable annotations.
///
/// Operations live in a [`CircuitDag`]. Every measurement writes a fresh
/// record ([`ClbitId`]); detectors and observables are parities over
/// records and are kept in the order they were added, so their positions
/// are stable indices for simulators and decoders.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    /// Qubit `i` has id `i`.
    qubits: Vec<Qubit>,
    /// Records are numbered `0..num_records` in allocation order.
    num_records: u32,
    dag: CircuitDag,
    detectors: Vec<Detector>,
    observables: Vec<Observable>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            num_records: 0,
            dag: CircuitDag::new(),
            detectors: vec![],
            observables: vec![],
        }
    }

    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        circuit
    }

    /// Create an operation-free circuit with the same qubits and record
    /// slots as `self`.
    pub fn empty_like(&self) -> Self {
        let mut circuit = Self::new(self.name.clone());
        for qubit in &self.qubits {
            circuit.dag.add_qubit(qubit.id);
        }
        for index in 0..self.num_records {
            circuit.dag.add_clbit(ClbitId(index));
        }
        circuit.qubits = self.qubits.clone();
        circuit.num_records = self.num_records;
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_qubit();
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = self.next_qubit();
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        ids
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_qubit(&self) -> QubitId {
        QubitId(self.qubits.len() as u32)
    }

    /// Allocate a measurement record slot.
    ///
    /// The slot stays unwritten until a measurement targets it.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_records);
        self.num_records += 1;
        self.dag.add_clbit(id);
        id
    }

    /// Append an instruction.
    ///
    /// Noise instructions have their probabilities validated.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        if let Some(channel) = instruction.as_noise() {
            channel.validate()?;
        }
        self.dag.apply(instruction)?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::Sdg, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::SX, qubit))
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(CliffordGate::SXdg, qubit))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(CliffordGate::CX, control, target))
    }

    /// Apply controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(CliffordGate::CY, control, target))
    }

    /// Apply controlled-Z gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(CliffordGate::CZ, q1, q2))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(CliffordGate::Swap, q1, q2))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Measure a qubit in the Z basis into an existing record slot.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure a qubit in the Z basis into a freshly allocated record.
    pub fn measure_record(&mut self, qubit: QubitId) -> IrResult<ClbitId> {
        let clbit = self.add_clbit();
        self.measure(qubit, clbit)?;
        Ok(clbit)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.apply(Instruction::barrier(qubits))
    }

    /// Apply a noise channel.
    pub fn noise(
        &mut self,
        channel: NoiseChannel,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::noise(channel, qubits))
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Add a detector over the parity of `records`.
    ///
    /// Records listed an even number of times cancel.
    pub fn add_detector(
        &mut self,
        records: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<DetectorId> {
        let records = self.checked_support(records, "detector")?;
        let id = DetectorId(u32::try_from(self.detectors.len()).expect("detector count overflow"));
        self.detectors.push(Detector { id, records });
        Ok(id)
    }

    /// Add a logical observable over the parity of `records`.
    pub fn add_observable(
        &mut self,
        records: impl IntoIterator<Item = ClbitId>,
    ) -> IrResult<ObservableId> {
        let records = self.checked_support(records, "observable")?;
        let id =
            ObservableId(u32::try_from(self.observables.len()).expect("observable count overflow"));
        self.observables.push(Observable { id, records });
        Ok(id)
    }

    fn checked_support(
        &self,
        records: impl IntoIterator<Item = ClbitId>,
        op: &str,
    ) -> IrResult<Vec<ClbitId>> {
        let records = parity_support(records);
        for &clbit in &records {
            if clbit.0 >= self.num_records {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    op: Some(op.to_string()),
                });
            }
        }
        Ok(records)
    }

    /// Rebuild the circuit operation by operation.
    ///
    /// `f` receives each operation in topological order and pushes its
    /// replacement (zero or more instructions) into the output buffer.
    /// Qubits, record slots, detectors and observables are carried over
    /// unchanged. `self` is not modified.
    pub fn rewrite_with<F>(&self, mut f: F) -> IrResult<Circuit>
    where
        F: FnMut(&Instruction, &mut Vec<Instruction>),
    {
        let mut out = self.empty_like();
        let mut buffer = Vec::new();
        for (_, inst) in self.dag.topological_ops() {
            buffer.clear();
            f(inst, &mut buffer);
            for replacement in buffer.drain(..) {
                out.apply(replacement)?;
            }
        }
        out.detectors = self.detectors.clone();
        out.observables = self.observables.clone();
        Ok(out)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of measurement records.
    pub fn num_clbits(&self) -> usize {
        self.num_records as usize
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Number of noise channels in the circuit.
    pub fn num_noise_locations(&self) -> usize {
        self.dag.num_noise_locations()
    }

    /// Get the number of detectors.
    pub fn num_detectors(&self) -> usize {
        self.detectors.len()
    }

    /// Get the number of observables.
    pub fn num_observables(&self) -> usize {
        self.observables.len()
    }

    /// Detector definitions in index order.
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// Observable definitions in index order.
    pub fn observables(&self) -> &[Observable] {
        &self.observables
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Iterate over operations in topological order.
    pub fn operations(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    /// Count operations by name.
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.operations() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Render the circuit in the Stim text format.
    pub fn to_stim(&self) -> IrResult<String> {
        crate::text::emit(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
    }

    #[test]
    fn test_registers() {
        let mut circuit = Circuit::new("test");
        let data = circuit.add_qreg("data", 3);
        let anc = circuit.add_qreg("anc", 2);
        assert_eq!(data, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(anc, vec![QubitId(3), QubitId(4)]);
        assert_eq!(circuit.qubits()[4].to_string(), "anc[1]");
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit
            .reset(QubitId(1))
            .unwrap()
            .h(QubitId(1))
            .unwrap()
            .cz(QubitId(1), QubitId(0))
            .unwrap()
            .h(QubitId(1))
            .unwrap();
        let m = circuit.measure_record(QubitId(1)).unwrap();

        assert_eq!(m, ClbitId(0));
        assert_eq!(circuit.num_ops(), 5);
        assert_eq!(circuit.depth(), 5);
    }

    #[test]
    fn test_detectors_and_observables() {
        let mut circuit = Circuit::with_size("test", 1);
        let a = circuit.measure_record(QubitId(0)).unwrap();
        let b = circuit.measure_record(QubitId(0)).unwrap();

        let d = circuit.add_detector([b, a]).unwrap();
        let o = circuit.add_observable([b]).unwrap();
        assert_eq!(d, DetectorId(0));
        assert_eq!(o, ObservableId(0));
        assert_eq!(circuit.detectors()[0].records, vec![a, b]);

        let err = circuit.add_detector([ClbitId(5)]);
        assert!(matches!(err, Err(IrError::ClbitNotFound { .. })));
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let mut circuit = Circuit::with_size("test", 1);
        let result = circuit.noise(NoiseChannel::BitFlip { p: -0.1 }, [QubitId(0)]);
        assert!(matches!(result, Err(IrError::InvalidProbability { .. })));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_rewrite_with_leaves_input_untouched() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let m = circuit.measure_record(QubitId(1)).unwrap();
        circuit.add_detector([m]).unwrap();

        let noisy = circuit
            .rewrite_with(|inst, out| {
                out.push(inst.clone());
                if inst.gate_kind().is_some() {
                    out.push(Instruction::noise(
                        NoiseChannel::BitFlip { p: 0.1 },
                        [inst.qubits[0]],
                    ));
                }
            })
            .unwrap();

        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(noisy.num_ops(), 5);
        assert_eq!(noisy.num_detectors(), 1);
        assert_eq!(noisy.count_ops().get("bit_flip"), Some(&2));
    }
}
