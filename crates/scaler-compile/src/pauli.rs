//! Multi-qubit Pauli strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use scaler_ir::PauliOp;

use crate::error::{ValidationError, ValidationResult};

/// A tensor product of single-qubit Paulis, phases ignored.
///
/// Serialized as its text form, e.g. `"XZZXI"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PauliString {
    ops: Vec<PauliOp>,
}

impl PauliString {
    /// The identity on `n` qubits.
    pub fn identity(n: usize) -> Self {
        Self {
            ops: vec![PauliOp::I; n],
        }
    }

    /// Build a string from single-qubit operators.
    pub fn from_ops(ops: Vec<PauliOp>) -> Self {
        Self { ops }
    }

    /// Parse a string over `{I, X, Y, Z}`.
    pub fn parse(s: &str) -> ValidationResult<Self> {
        let ops = s
            .chars()
            .enumerate()
            .map(|(position, ch)| {
                PauliOp::from_char(ch).ok_or_else(|| ValidationError::InvalidCharacter {
                    string: s.to_string(),
                    ch,
                    position,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;
        Ok(Self { ops })
    }

    /// Parse and require exactly `n` qubits.
    pub fn parse_with_len(s: &str, n: usize) -> ValidationResult<Self> {
        let pauli = Self::parse(s)?;
        if pauli.len() != n {
            return Err(ValidationError::LengthMismatch {
                string: s.to_string(),
                expected: n,
                got: pauli.len(),
            });
        }
        Ok(pauli)
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the string acts on zero qubits.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The operator on qubit `index` (identity past the end).
    pub fn get(&self, index: usize) -> PauliOp {
        self.ops.get(index).copied().unwrap_or_default()
    }

    /// All single-qubit operators.
    pub fn ops(&self) -> &[PauliOp] {
        &self.ops
    }

    /// Number of non-identity positions.
    pub fn weight(&self) -> usize {
        self.ops.iter().filter(|p| !p.is_identity()).count()
    }

    /// Non-identity positions with their operators, in qubit order.
    pub fn support(&self) -> impl Iterator<Item = (usize, PauliOp)> + '_ {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_identity())
            .map(|(q, &p)| (q, p))
    }

    /// Whether two strings commute.
    ///
    /// They commute iff the number of positions holding distinct
    /// non-identity operators is even. Strings of different lengths are
    /// compared over the common prefix with identity padding.
    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let anticommuting = self
            .ops
            .iter()
            .zip(&other.ops)
            .filter(|&(&a, &b)| !a.commutes_with(b))
            .count();
        anticommuting % 2 == 0
    }
}

/// Commutation test on raw text.
///
/// Both strings must parse and have equal length.
pub fn commute(a: &str, b: &str) -> ValidationResult<bool> {
    let lhs = PauliString::parse(a)?;
    let rhs = PauliString::parse_with_len(b, lhs.len())?;
    Ok(lhs.commutes_with(&rhs))
}

impl FromStr for PauliString {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PauliString {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PauliString> for String {
    fn from(p: PauliString) -> Self {
        p.to_string()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{}", op.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let p = PauliString::parse("XIZY").unwrap();
        assert_eq!(p.len(), 4);
        assert_eq!(p.weight(), 3);
        assert_eq!(p.get(3), PauliOp::Y);
        assert_eq!(p.to_string(), "XIZY");
        let support: Vec<_> = p.support().collect();
        assert_eq!(
            support,
            vec![(0, PauliOp::X), (2, PauliOp::Z), (3, PauliOp::Y)]
        );
    }

    #[test]
    fn test_parse_rejects_bad_character() {
        let err = PauliString::parse("XQZ").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidCharacter {
                string: "XQZ".into(),
                ch: 'Q',
                position: 1,
            }
        );
    }

    #[test]
    fn test_commute_table() {
        assert!(!commute("IXYZ", "IYZX").unwrap());
        assert!(!commute("XZZI", "ZXXI").unwrap());
        assert!(commute("IIII", "ZZZZ").unwrap());
        assert!(commute("XIZY", "YZXI").unwrap());
        assert!(commute("XX", "ZZ").unwrap());
        assert!(!commute("XI", "ZI").unwrap());
    }

    #[test]
    fn test_commute_length_mismatch() {
        assert!(matches!(
            commute("XX", "XXX"),
            Err(ValidationError::LengthMismatch {
                expected: 2,
                got: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_serde_as_text() {
        let p = PauliString::parse("ZZI").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"ZZI\"");
        let back: PauliString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<PauliString>("\"ZA\"").is_err());
    }
}
