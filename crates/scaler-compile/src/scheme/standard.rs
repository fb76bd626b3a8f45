use crate::error::CompileResult;
use crate::pauli::PauliString;
use crate::program::{Gadget, IrProgram};

use super::{SchemeStrategy, StabilizerReadout};

/// One ancilla per generator measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStrategy;

impl SchemeStrategy for StandardStrategy {
    fn name(&self) -> &str {
        "Standard"
    }

    fn measure_stabilizer(
        &self,
        program: &mut IrProgram,
        stabilizer: &PauliString,
    ) -> CompileResult<StabilizerReadout> {
        let value = program.push_prop(stabilizer.clone(), Gadget::Ancilla)?;
        Ok(StabilizerReadout::plain(value))
    }
}
