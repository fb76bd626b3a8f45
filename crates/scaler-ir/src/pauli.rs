//! Single-qubit Pauli operators in symplectic form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-qubit Pauli operator, phases ignored.
///
/// The symplectic bits are `I = (0, 0)`, `X = (1, 0)`, `Z = (0, 1)` and
/// `Y = (1, 1)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PauliOp {
    /// Identity.
    #[default]
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl PauliOp {
    /// All four operators in `I, X, Y, Z` order.
    pub const ALL: [PauliOp; 4] = [PauliOp::I, PauliOp::X, PauliOp::Y, PauliOp::Z];

    /// The three non-identity operators.
    pub const NON_IDENTITY: [PauliOp; 3] = [PauliOp::X, PauliOp::Y, PauliOp::Z];

    /// Build an operator from its symplectic bits.
    #[inline]
    pub fn from_bits(x: bool, z: bool) -> Self {
        match (x, z) {
            (false, false) => PauliOp::I,
            (true, false) => PauliOp::X,
            (true, true) => PauliOp::Y,
            (false, true) => PauliOp::Z,
        }
    }

    /// The X bit.
    #[inline]
    pub fn x(self) -> bool {
        matches!(self, PauliOp::X | PauliOp::Y)
    }

    /// The Z bit.
    #[inline]
    pub fn z(self) -> bool {
        matches!(self, PauliOp::Z | PauliOp::Y)
    }

    /// Whether this is the identity.
    #[inline]
    pub fn is_identity(self) -> bool {
        self == PauliOp::I
    }

    /// Parse one of `I`, `X`, `Y`, `Z`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PauliOp::I),
            'X' => Some(PauliOp::X),
            'Y' => Some(PauliOp::Y),
            'Z' => Some(PauliOp::Z),
            _ => None,
        }
    }

    /// The letter of this operator.
    pub fn as_char(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }

    /// Whether two single-qubit operators commute.
    #[inline]
    pub fn commutes_with(self, other: PauliOp) -> bool {
        self.is_identity() || other.is_identity() || self == other
    }

    /// Product of two operators, dropping the phase.
    #[inline]
    pub fn compose(self, other: PauliOp) -> PauliOp {
        PauliOp::from_bits(self.x() ^ other.x(), self.z() ^ other.z())
    }
}

impl fmt::Display for PauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_round_trip() {
        for op in PauliOp::ALL {
            assert_eq!(PauliOp::from_bits(op.x(), op.z()), op);
            assert_eq!(PauliOp::from_char(op.as_char()), Some(op));
        }
        assert_eq!(PauliOp::from_char('x'), None);
    }

    #[test]
    fn test_single_qubit_commutation() {
        assert!(PauliOp::X.commutes_with(PauliOp::X));
        assert!(PauliOp::I.commutes_with(PauliOp::Y));
        assert!(!PauliOp::X.commutes_with(PauliOp::Z));
        assert!(!PauliOp::Y.commutes_with(PauliOp::Z));
    }

    #[test]
    fn test_compose() {
        assert_eq!(PauliOp::X.compose(PauliOp::Z), PauliOp::Y);
        assert_eq!(PauliOp::Y.compose(PauliOp::Y), PauliOp::I);
        assert_eq!(PauliOp::I.compose(PauliOp::Z), PauliOp::Z);
    }
}
