//! Stabilizer code model.
//!
//! A [`StabilizerCode`] holds `[[n, k, d]]` parameters, a list of commuting
//! stabilizer generators and optional logical X/Z operators per logical
//! qubit. [`CodeDefinition`] is its serialized form, read by the CLI from
//! YAML or JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{ValidationError, ValidationResult};
use crate::pauli::PauliString;
use crate::scheme::Scheme;

/// Which logical operator of a logical qubit.
///
/// Also selects the readout basis when compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogicalBasis {
    /// Logical X.
    #[serde(alias = "x")]
    X,
    /// Logical Z.
    #[default]
    #[serde(alias = "z")]
    Z,
}

impl fmt::Display for LogicalBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalBasis::X => write!(f, "X"),
            LogicalBasis::Z => write!(f, "Z"),
        }
    }
}

/// Logical X and Z operators of one logical qubit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalOperators {
    /// Logical X, if set.
    pub x: Option<PauliString>,
    /// Logical Z, if set.
    pub z: Option<PauliString>,
}

impl LogicalOperators {
    /// The operator for `basis`, if set.
    pub fn get(&self, basis: LogicalBasis) -> Option<&PauliString> {
        match basis {
            LogicalBasis::X => self.x.as_ref(),
            LogicalBasis::Z => self.z.as_ref(),
        }
    }

    fn slot(&mut self, basis: LogicalBasis) -> &mut Option<PauliString> {
        match basis {
            LogicalBasis::X => &mut self.x,
            LogicalBasis::Z => &mut self.z,
        }
    }
}

/// An `[[n, k, d]]` stabilizer code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizerCode {
    n: usize,
    k: usize,
    d: usize,
    stabilizers: Vec<PauliString>,
    logicals: Vec<LogicalOperators>,
}

impl StabilizerCode {
    /// Create a code with no generators.
    ///
    /// Requires `n >= 1`, `k <= n` and `d >= 1`.
    pub fn new(n: usize, k: usize, d: usize) -> ValidationResult<Self> {
        if n == 0 {
            return Err(ValidationError::InvalidParameters(
                "n must be at least 1".into(),
            ));
        }
        if k > n {
            return Err(ValidationError::InvalidParameters(format!(
                "k = {k} exceeds n = {n}"
            )));
        }
        if d == 0 {
            return Err(ValidationError::InvalidParameters(
                "d must be at least 1".into(),
            ));
        }
        Ok(Self {
            n,
            k,
            d,
            stabilizers: Vec::new(),
            logicals: vec![LogicalOperators::default(); k],
        })
    }

    /// The distance-`n` bit-flip repetition code.
    ///
    /// Generators are `Z_i Z_{i+1}`, logical Z is `Z^n`. Logical X is
    /// `X^n` when `n` is odd.
    pub fn repetition(n: usize) -> ValidationResult<Self> {
        let mut code = Self::new(n, 1, n)?;
        for i in 0..n.saturating_sub(1) {
            let text: String = (0..n)
                .map(|q| if q == i || q == i + 1 { 'Z' } else { 'I' })
                .collect();
            code.add_stabilizer(&text)?;
        }
        code.set_logical_z(0, &"Z".repeat(n))?;
        if n % 2 == 1 {
            code.set_logical_x(0, &"X".repeat(n))?;
        }
        Ok(code)
    }

    /// Append a stabilizer generator of length `n`.
    ///
    /// Commutation is checked by [`StabilizerCode::validate`].
    pub fn add_stabilizer(&mut self, text: &str) -> ValidationResult<()> {
        let pauli = PauliString::parse_with_len(text, self.n)?;
        self.stabilizers.push(pauli);
        Ok(())
    }

    /// Set a logical operator of logical qubit `index`.
    pub fn set_logical_operator(
        &mut self,
        index: usize,
        basis: LogicalBasis,
        text: &str,
    ) -> ValidationResult<()> {
        let pauli = PauliString::parse_with_len(text, self.n)?;
        let k = self.k;
        let logical = self
            .logicals
            .get_mut(index)
            .ok_or(ValidationError::LogicalIndexOutOfRange { index, k })?;
        *logical.slot(basis) = Some(pauli);
        Ok(())
    }

    /// Set logical Z of logical qubit `index`.
    pub fn set_logical_z(&mut self, index: usize, text: &str) -> ValidationResult<()> {
        self.set_logical_operator(index, LogicalBasis::Z, text)
    }

    /// Set logical X of logical qubit `index`.
    pub fn set_logical_x(&mut self, index: usize, text: &str) -> ValidationResult<()> {
        self.set_logical_operator(index, LogicalBasis::X, text)
    }

    /// Check the commutation structure.
    ///
    /// Generators must commute pairwise; every logical operator must commute
    /// with every generator; X_i and Z_i must anticommute; operators of
    /// different logical qubits must commute.
    pub fn validate(&self) -> ValidationResult<()> {
        for (i, a) in self.stabilizers.iter().enumerate() {
            for (j, b) in self.stabilizers.iter().enumerate().skip(i + 1) {
                if !a.commutes_with(b) {
                    return Err(ValidationError::NonCommutingStabilizers {
                        first: i,
                        first_str: a.to_string(),
                        second: j,
                        second_str: b.to_string(),
                    });
                }
            }
        }

        let operators: Vec<(usize, LogicalBasis, &PauliString)> = self
            .logicals
            .iter()
            .enumerate()
            .flat_map(|(index, ops)| {
                [LogicalBasis::X, LogicalBasis::Z]
                    .into_iter()
                    .filter_map(move |basis| ops.get(basis).map(|p| (index, basis, p)))
            })
            .collect();

        for &(index, basis, op) in &operators {
            if let Some(stabilizer) = self.stabilizers.iter().position(|s| !s.commutes_with(op)) {
                return Err(ValidationError::LogicalAnticommutesWithStabilizer {
                    index,
                    basis,
                    stabilizer,
                });
            }
        }

        for (a, &(ia, ba, pa)) in operators.iter().enumerate() {
            for &(ib, bb, pb) in operators.iter().skip(a + 1) {
                let commutes = pa.commutes_with(pb);
                if ia == ib && ba != bb && commutes {
                    return Err(ValidationError::LogicalPairCommutes { index: ia });
                }
                if ia != ib && !commutes {
                    return Err(ValidationError::LogicalsAnticommute {
                        first: ia,
                        first_basis: ba,
                        second: ib,
                        second_basis: bb,
                    });
                }
            }
        }

        debug!(
            n = self.n,
            k = self.k,
            d = self.d,
            stabilizers = self.stabilizers.len(),
            "Validated stabilizer code"
        );
        Ok(())
    }

    /// Number of physical qubits.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of logical qubits.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Code distance.
    pub fn d(&self) -> usize {
        self.d
    }

    /// Stabilizer generators in insertion order.
    pub fn stabilizers(&self) -> &[PauliString] {
        &self.stabilizers
    }

    /// Logical operators of logical qubit `index`.
    pub fn logical(&self, index: usize) -> Option<&LogicalOperators> {
        self.logicals.get(index)
    }

    /// Logical operators of all logical qubits.
    pub fn logicals(&self) -> &[LogicalOperators] {
        &self.logicals
    }
}

fn default_name() -> String {
    "code".to_string()
}

fn default_rounds() -> u32 {
    1
}

/// Serialized code description.
///
/// ```yaml
/// name: rep3
/// n: 3
/// k: 1
/// d: 3
/// stabilizers: [ZZI, IZZ]
/// logical_z: [ZZZ]
/// scheme: standard
/// rounds: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDefinition {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Physical qubits.
    pub n: usize,
    /// Logical qubits.
    pub k: usize,
    /// Distance.
    pub d: usize,
    /// Stabilizer generators.
    pub stabilizers: Vec<String>,
    /// Logical Z operators, one per logical qubit.
    #[serde(default)]
    pub logical_z: Vec<String>,
    /// Logical X operators, one per logical qubit.
    #[serde(default)]
    pub logical_x: Vec<String>,
    /// Syndrome extraction scheme.
    #[serde(default)]
    pub scheme: Scheme,
    /// Syndrome extraction rounds.
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

impl CodeDefinition {
    /// Build and validate the code.
    pub fn build(&self) -> ValidationResult<StabilizerCode> {
        let mut code = StabilizerCode::new(self.n, self.k, self.d)?;
        for s in &self.stabilizers {
            code.add_stabilizer(s)?;
        }
        for (index, s) in self.logical_z.iter().enumerate() {
            code.set_logical_z(index, s)?;
        }
        for (index, s) in self.logical_x.iter().enumerate() {
            code.set_logical_x(index, s)?;
        }
        code.validate()?;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steane() -> StabilizerCode {
        let mut code = StabilizerCode::new(7, 1, 3).unwrap();
        for s in [
            "IIIXXXX", "IXXIIXX", "XIXIXIX", "IIIZZZZ", "IZZIIZZ", "ZIZIZIZ",
        ] {
            code.add_stabilizer(s).unwrap();
        }
        code.set_logical_z(0, "ZZZZZZZ").unwrap();
        code.set_logical_x(0, "XXXXXXX").unwrap();
        code
    }

    #[test]
    fn test_steane_validates() {
        let code = steane();
        code.validate().unwrap();
        assert_eq!(code.stabilizers().len(), 6);
        assert_eq!(code.d(), 3);
    }

    #[test]
    fn test_repetition_code() {
        let code = StabilizerCode::repetition(3).unwrap();
        code.validate().unwrap();
        assert_eq!(code.stabilizers()[0].to_string(), "ZZI");
        assert_eq!(code.stabilizers()[1].to_string(), "IZZ");
        assert_eq!(
            code.logical(0).unwrap().z.as_ref().unwrap().to_string(),
            "ZZZ"
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(StabilizerCode::new(0, 0, 1).is_err());
        assert!(StabilizerCode::new(3, 4, 1).is_err());
        assert!(StabilizerCode::new(3, 1, 0).is_err());
    }

    #[test]
    fn test_noncommuting_stabilizers_rejected() {
        let mut code = StabilizerCode::new(2, 0, 1).unwrap();
        code.add_stabilizer("XI").unwrap();
        code.add_stabilizer("ZI").unwrap();
        assert!(matches!(
            code.validate(),
            Err(ValidationError::NonCommutingStabilizers {
                first: 0,
                second: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let mut code = StabilizerCode::new(3, 1, 1).unwrap();
        assert!(matches!(
            code.add_stabilizer("ZZ"),
            Err(ValidationError::LengthMismatch { .. })
        ));
        assert!(matches!(
            code.set_logical_z(1, "ZZZ"),
            Err(ValidationError::LogicalIndexOutOfRange { index: 1, k: 1 })
        ));
    }

    #[test]
    fn test_logical_checks() {
        let mut code = StabilizerCode::new(3, 1, 3).unwrap();
        code.add_stabilizer("ZZI").unwrap();
        code.set_logical_x(0, "XII").unwrap();
        assert!(matches!(
            code.validate(),
            Err(ValidationError::LogicalAnticommutesWithStabilizer { .. })
        ));

        let mut code = StabilizerCode::new(2, 1, 1).unwrap();
        code.set_logical_z(0, "ZZ").unwrap();
        code.set_logical_x(0, "XX").unwrap();
        assert_eq!(
            code.validate(),
            Err(ValidationError::LogicalPairCommutes { index: 0 })
        );
    }

    #[test]
    fn test_definition_from_yaml() {
        let yaml = "name: rep3\nn: 3\nk: 1\nd: 3\nstabilizers: [ZZI, IZZ]\nlogical_z: [ZZZ]\nrounds: 2\n";
        let def: CodeDefinition = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(def.scheme, Scheme::Standard);
        assert_eq!(def.rounds, 2);
        let code = def.build().unwrap();
        assert_eq!(code, {
            let mut c = StabilizerCode::repetition(3).unwrap();
            c.logicals[0].x = None;
            c
        });
    }
}
