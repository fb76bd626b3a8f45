use crate::error::CompileResult;
use crate::pauli::PauliString;
use crate::program::{Gadget, IrProgram};

use super::{SchemeStrategy, StabilizerReadout};

/// Shor-style extraction through a cat state with one ancilla per
/// support qubit, so a single ancilla fault touches at most one data qubit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShorStrategy;

impl SchemeStrategy for ShorStrategy {
    fn name(&self) -> &str {
        "Shor"
    }

    fn measure_stabilizer(
        &self,
        program: &mut IrProgram,
        stabilizer: &PauliString,
    ) -> CompileResult<StabilizerReadout> {
        let value = program.push_prop(stabilizer.clone(), Gadget::Cat)?;
        Ok(StabilizerReadout::plain(value))
    }
}
