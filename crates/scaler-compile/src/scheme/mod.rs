//! Syndrome extraction schemes.
//!
//! Each [`Scheme`] maps to a [`SchemeStrategy`] that decides how a single
//! stabilizer generator is measured in the IR.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::code::StabilizerCode;
use crate::error::{CompileError, CompileResult};
use crate::pauli::PauliString;
use crate::program::{IrId, IrProgram};

mod flag;
mod knill;
mod shor;
mod standard;

pub use flag::FlagStrategy;
pub use knill::KnillStrategy;
pub use shor::ShorStrategy;
pub use standard::StandardStrategy;

/// A syndrome extraction scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scheme {
    /// One ancilla per generator.
    #[default]
    #[serde(alias = "standard", alias = "STANDARD")]
    Standard,
    /// Cat-state ancilla blocks.
    #[serde(alias = "shor", alias = "SHOR")]
    Shor,
    /// Teleportation-based extraction.
    #[serde(alias = "knill", alias = "KNILL")]
    Knill,
    /// Flag-qubit extraction.
    #[serde(alias = "flag", alias = "FLAG")]
    Flag,
}

static STANDARD: StandardStrategy = StandardStrategy;
static SHOR: ShorStrategy = ShorStrategy;
static KNILL: KnillStrategy = KnillStrategy;
static FLAG: FlagStrategy = FlagStrategy;

impl Scheme {
    /// All schemes.
    pub const ALL: [Scheme; 4] = [Scheme::Standard, Scheme::Shor, Scheme::Knill, Scheme::Flag];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Scheme::Standard => "Standard",
            Scheme::Shor => "Shor",
            Scheme::Knill => "Knill",
            Scheme::Flag => "Flag",
        }
    }

    /// The strategy implementing this scheme.
    pub fn strategy(self) -> &'static dyn SchemeStrategy {
        match self {
            Scheme::Standard => &STANDARD,
            Scheme::Shor => &SHOR,
            Scheme::Knill => &KNILL,
            Scheme::Flag => &FLAG,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CompileError::UnknownScheme(s.to_string()))
    }
}

/// IR destinations produced by measuring one generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizerReadout {
    /// The measured eigenvalue.
    pub value: IrId,
    /// Extra outcomes that are zero without faults, such as flags.
    pub checks: Vec<IrId>,
}

impl StabilizerReadout {
    /// A readout with no extra checks.
    pub fn plain(value: IrId) -> Self {
        Self {
            value,
            checks: Vec::new(),
        }
    }
}

/// How a scheme measures stabilizer generators.
pub trait SchemeStrategy: Send + Sync {
    /// Strategy name.
    fn name(&self) -> &str;

    /// Reject codes this strategy cannot compile.
    fn supports(&self, _code: &StabilizerCode) -> CompileResult<()> {
        Ok(())
    }

    /// Emit the IR measuring `stabilizer` once.
    fn measure_stabilizer(
        &self,
        program: &mut IrProgram,
        stabilizer: &PauliString,
    ) -> CompileResult<StabilizerReadout>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parse_case_insensitive() {
        assert_eq!("standard".parse::<Scheme>().unwrap(), Scheme::Standard);
        assert_eq!("SHOR".parse::<Scheme>().unwrap(), Scheme::Shor);
        assert_eq!("Flag".parse::<Scheme>().unwrap(), Scheme::Flag);
        assert!(matches!(
            "steane".parse::<Scheme>(),
            Err(CompileError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_strategy_names() {
        for scheme in Scheme::ALL {
            assert_eq!(scheme.strategy().name(), scheme.name());
        }
    }
}
