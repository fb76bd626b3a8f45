//! Pauli noise channels.
//!
//! Every channel here is a Pauli channel: with some probability it applies a
//! Pauli product to its qubits. That is the only kind of noise a Pauli frame
//! can track, and it covers the gate, measurement and reset errors used for
//! logical error rate estimation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::pauli::PauliOp;

/// A Pauli noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NoiseChannel {
    /// Single-qubit depolarizing: X, Y or Z, each with probability `p / 3`.
    Depolarize1 {
        /// Total error probability.
        p: f64,
    },

    /// Two-qubit depolarizing: each of the 15 non-identity Pauli pairs with
    /// probability `p / 15`.
    Depolarize2 {
        /// Total error probability.
        p: f64,
    },

    /// Applies X with probability `p`.
    BitFlip {
        /// Flip probability.
        p: f64,
    },

    /// Applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability.
        p: f64,
    },

    /// Independent single-qubit Pauli channel.
    PauliChannel1 {
        /// Probability of X.
        px: f64,
        /// Probability of Y.
        py: f64,
        /// Probability of Z.
        pz: f64,
    },
}

/// One outcome of a noise channel: the Pauli applied to each of the
/// channel's qubits and its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorTerm {
    /// One Pauli per channel qubit, in operand order.
    pub paulis: Vec<PauliOp>,
    /// Probability of this outcome.
    pub probability: f64,
}

impl NoiseChannel {
    /// Get a human-readable name for this channel.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseChannel::Depolarize1 { .. } => "depolarize1",
            NoiseChannel::Depolarize2 { .. } => "depolarize2",
            NoiseChannel::BitFlip { .. } => "bit_flip",
            NoiseChannel::PhaseFlip { .. } => "phase_flip",
            NoiseChannel::PauliChannel1 { .. } => "pauli_channel_1",
        }
    }

    /// Number of qubits the channel acts on.
    pub fn num_qubits(&self) -> u32 {
        match self {
            NoiseChannel::Depolarize2 { .. } => 2,
            _ => 1,
        }
    }

    /// Probability that the channel applies a non-identity Pauli.
    pub fn probability(&self) -> f64 {
        match *self {
            NoiseChannel::Depolarize1 { p }
            | NoiseChannel::Depolarize2 { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::PhaseFlip { p } => p,
            NoiseChannel::PauliChannel1 { px, py, pz } => px + py + pz,
        }
    }

    /// Check that every probability lies in `[0, 1]` and the total does too.
    pub fn validate(&self) -> IrResult<()> {
        let mut parts = match *self {
            NoiseChannel::Depolarize1 { p }
            | NoiseChannel::Depolarize2 { p }
            | NoiseChannel::BitFlip { p }
            | NoiseChannel::PhaseFlip { p } => vec![p],
            NoiseChannel::PauliChannel1 { px, py, pz } => vec![px, py, pz],
        };
        parts.push(self.probability());
        for p in parts {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(IrError::InvalidProbability {
                    channel: self.name().to_string(),
                    p,
                });
            }
        }
        Ok(())
    }

    /// The non-identity outcomes of this channel with their probabilities.
    ///
    /// Terms with zero probability are omitted.
    pub fn terms(&self) -> Vec<ErrorTerm> {
        let single = |op: PauliOp, probability: f64| ErrorTerm {
            paulis: vec![op],
            probability,
        };
        let terms: Vec<ErrorTerm> = match *self {
            NoiseChannel::Depolarize1 { p } => PauliOp::NON_IDENTITY
                .iter()
                .map(|&op| single(op, p / 3.0))
                .collect(),
            NoiseChannel::Depolarize2 { p } => PauliOp::ALL
                .iter()
                .flat_map(|&a| PauliOp::ALL.iter().map(move |&b| (a, b)))
                .filter(|&(a, b)| !(a.is_identity() && b.is_identity()))
                .map(|(a, b)| ErrorTerm {
                    paulis: vec![a, b],
                    probability: p / 15.0,
                })
                .collect(),
            NoiseChannel::BitFlip { p } => vec![single(PauliOp::X, p)],
            NoiseChannel::PhaseFlip { p } => vec![single(PauliOp::Z, p)],
            NoiseChannel::PauliChannel1 { px, py, pz } => vec![
                single(PauliOp::X, px),
                single(PauliOp::Y, py),
                single(PauliOp::Z, pz),
            ],
        };
        terms
            .into_iter()
            .filter(|t| t.probability > 0.0)
            .collect()
    }
}

impl fmt::Display for NoiseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseChannel::PauliChannel1 { px, py, pz } => write!(
                f,
                "pauli_channel_1(px={px:.4}, py={py:.4}, pz={pz:.4})"
            ),
            other => write!(f, "{}(p={:.4})", other.name(), other.probability()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(NoiseChannel::Depolarize1 { p: 0.01 }.name(), "depolarize1");
        assert_eq!(NoiseChannel::BitFlip { p: 0.01 }.num_qubits(), 1);
        assert_eq!(NoiseChannel::Depolarize2 { p: 0.01 }.num_qubits(), 2);
    }

    #[test]
    fn test_channel_display() {
        let c = NoiseChannel::Depolarize1 { p: 0.03 };
        assert_eq!(format!("{c}"), "depolarize1(p=0.0300)");
    }

    #[test]
    fn test_depolarize2_terms() {
        let terms = NoiseChannel::Depolarize2 { p: 0.015 }.terms();
        assert_eq!(terms.len(), 15);
        let total: f64 = terms.iter().map(|t| t.probability).sum();
        assert!((total - 0.015).abs() < 1e-15);
        assert!(terms.iter().all(|t| t.paulis.len() == 2));
    }

    #[test]
    fn test_zero_probability_terms_dropped() {
        let c = NoiseChannel::PauliChannel1 {
            px: 0.1,
            py: 0.0,
            pz: 0.2,
        };
        let ops: Vec<_> = c.terms().iter().map(|t| t.paulis[0]).collect();
        assert_eq!(ops, vec![PauliOp::X, PauliOp::Z]);
        assert!(NoiseChannel::BitFlip { p: 0.0 }.terms().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        assert!(NoiseChannel::BitFlip { p: 1.5 }.validate().is_err());
        assert!(NoiseChannel::Depolarize1 { p: f64::NAN }.validate().is_err());
        let c = NoiseChannel::PauliChannel1 {
            px: 0.5,
            py: 0.4,
            pz: 0.3,
        };
        assert!(matches!(
            c.validate(),
            Err(IrError::InvalidProbability { .. })
        ));
        assert!(NoiseChannel::Depolarize2 { p: 1.0 }.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let c = NoiseChannel::Depolarize2 { p: 0.001 };
        let json = serde_json::to_string(&c).unwrap();
        let back: NoiseChannel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
