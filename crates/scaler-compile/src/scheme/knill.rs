use crate::code::StabilizerCode;
use crate::error::{CompileError, CompileResult};
use crate::pauli::PauliString;
use crate::program::IrProgram;

use super::{Scheme, SchemeStrategy, StabilizerReadout};

/// Teleportation-based extraction.
///
/// Needs encoded Bell-pair preparation, which the IR cannot express yet,
/// so every code is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnillStrategy;

impl SchemeStrategy for KnillStrategy {
    fn name(&self) -> &str {
        "Knill"
    }

    fn supports(&self, _code: &StabilizerCode) -> CompileResult<()> {
        Err(CompileError::UnsupportedScheme(Scheme::Knill))
    }

    fn measure_stabilizer(
        &self,
        _program: &mut IrProgram,
        _stabilizer: &PauliString,
    ) -> CompileResult<StabilizerReadout> {
        Err(CompileError::UnsupportedScheme(Scheme::Knill))
    }
}
