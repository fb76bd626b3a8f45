//! Clifford gate set.

use serde::{Deserialize, Serialize};

/// Clifford gates understood by the circuit IR and the frame simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CliffordGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
}

impl CliffordGate {
    /// Get the lowercase gate name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            CliffordGate::I => "id",
            CliffordGate::X => "x",
            CliffordGate::Y => "y",
            CliffordGate::Z => "z",
            CliffordGate::H => "h",
            CliffordGate::S => "s",
            CliffordGate::Sdg => "sdg",
            CliffordGate::SX => "sx",
            CliffordGate::SXdg => "sxdg",
            CliffordGate::CX => "cx",
            CliffordGate::CY => "cy",
            CliffordGate::CZ => "cz",
            CliffordGate::Swap => "swap",
        }
    }

    /// Get the gate's mnemonic in the Stim circuit format.
    #[inline]
    pub fn stim_name(&self) -> &'static str {
        match self {
            CliffordGate::I => "I",
            CliffordGate::X => "X",
            CliffordGate::Y => "Y",
            CliffordGate::Z => "Z",
            CliffordGate::H => "H",
            CliffordGate::S => "S",
            CliffordGate::Sdg => "S_DAG",
            CliffordGate::SX => "SQRT_X",
            CliffordGate::SXdg => "SQRT_X_DAG",
            CliffordGate::CX => "CX",
            CliffordGate::CY => "CY",
            CliffordGate::CZ => "CZ",
            CliffordGate::Swap => "SWAP",
        }
    }

    /// Number of qubits the gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            CliffordGate::I
            | CliffordGate::X
            | CliffordGate::Y
            | CliffordGate::Z
            | CliffordGate::H
            | CliffordGate::S
            | CliffordGate::Sdg
            | CliffordGate::SX
            | CliffordGate::SXdg => 1,

            CliffordGate::CX | CliffordGate::CY | CliffordGate::CZ | CliffordGate::Swap => 2,
        }
    }

    /// Whether the gate is a Pauli (and therefore leaves a Pauli frame unchanged).
    #[inline]
    pub fn is_pauli(&self) -> bool {
        matches!(
            self,
            CliffordGate::I | CliffordGate::X | CliffordGate::Y | CliffordGate::Z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_names() {
        assert_eq!(CliffordGate::H.name(), "h");
        assert_eq!(CliffordGate::Sdg.stim_name(), "S_DAG");
        assert_eq!(CliffordGate::Swap.stim_name(), "SWAP");
    }

    #[test]
    fn test_gate_arity() {
        assert_eq!(CliffordGate::SX.num_qubits(), 1);
        assert_eq!(CliffordGate::CY.num_qubits(), 2);
        assert!(CliffordGate::Y.is_pauli());
        assert!(!CliffordGate::H.is_pauli());
    }
}
