use crate::error::CompileResult;
use crate::pauli::PauliString;
use crate::program::{Gadget, IrProgram};

use super::{SchemeStrategy, StabilizerReadout};

/// Generators of weight three or more get a flag qubit; a hook error on
/// a lighter generator is equivalent to a single data error, so those use
/// a plain ancilla.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagStrategy;

impl FlagStrategy {
    /// Smallest generator weight that receives a flag.
    pub const MIN_FLAGGED_WEIGHT: usize = 3;
}

impl SchemeStrategy for FlagStrategy {
    fn name(&self) -> &str {
        "Flag"
    }

    fn measure_stabilizer(
        &self,
        program: &mut IrProgram,
        stabilizer: &PauliString,
    ) -> CompileResult<StabilizerReadout> {
        if stabilizer.weight() < Self::MIN_FLAGGED_WEIGHT {
            let value = program.push_prop(stabilizer.clone(), Gadget::Ancilla)?;
            return Ok(StabilizerReadout::plain(value));
        }
        let value = program.push_prop(stabilizer.clone(), Gadget::Flagged)?;
        let flag = program.push_flag(value)?;
        Ok(StabilizerReadout {
            value,
            checks: vec![flag],
        })
    }
}
