//! Operations with their operands.

use serde::{Deserialize, Serialize};

use crate::gate::CliffordGate;
use crate::noise::NoiseChannel;
use crate::qubit::{ClbitId, QubitId};

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A Clifford gate.
    Gate(CliffordGate),
    /// Z-basis measurement writing one record.
    Measure,
    /// Reset to |0⟩.
    Reset,
    /// Scheduling boundary; emitted as `TICK`.
    Barrier,
    /// A Pauli noise channel. Takes no time step.
    Noise(NoiseChannel),
}

/// An operation applied to qubits, writing zero or more records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
    /// Records written, one per measured qubit.
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    fn on(kind: InstructionKind, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// A gate on arbitrary operands; arity is checked when applied.
    pub fn gate(gate: CliffordGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on(InstructionKind::Gate(gate), qubits)
    }

    pub fn single_qubit_gate(gate: CliffordGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// A two-qubit gate; for controlled gates `q1` is the control.
    pub fn two_qubit_gate(gate: CliffordGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Measure `qubit` into `clbit`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    pub fn reset(qubit: QubitId) -> Self {
        Self::on(InstructionKind::Reset, [qubit])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on(InstructionKind::Barrier, qubits)
    }

    /// A noise channel on `qubits`, in the channel's operand order.
    pub fn noise(channel: NoiseChannel, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self::on(InstructionKind::Noise(channel), qubits)
    }

    #[inline]
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    #[inline]
    pub fn is_noise(&self) -> bool {
        matches!(self.kind, InstructionKind::Noise(_))
    }

    /// The gate, if this is a gate.
    pub fn gate_kind(&self) -> Option<CliffordGate> {
        match self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// The channel, if this is a noise instruction.
    pub fn as_noise(&self) -> Option<&NoiseChannel> {
        match &self.kind {
            InstructionKind::Noise(c) => Some(c),
            _ => None,
        }
    }

    /// Required operand count; `None` for barriers, which take any number.
    pub fn expected_arity(&self) -> Option<u32> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g.num_qubits()),
            InstructionKind::Noise(c) => Some(c.num_qubits()),
            InstructionKind::Measure | InstructionKind::Reset => Some(1),
            InstructionKind::Barrier => None,
        }
    }

    /// Lowercase name, e.g. `cx`, `measure` or `depolarize2`.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Noise(c) => c.name(),
        }
    }
}
