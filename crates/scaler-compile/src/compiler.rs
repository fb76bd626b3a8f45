//! Stabilizer code to IR compilation.
//!
//! The generated program prepares the data qubits in the readout basis,
//! runs `rounds` syndrome extraction rounds and finishes with a
//! transversal readout:
//!
//! - round 0 emits a detector for each generator that is deterministic on
//!   the initial product state;
//! - later rounds compare each generator with its previous value;
//! - the final readout re-checks every compatible generator and yields one
//!   observable per logical qubit.

use tracing::{debug, info, instrument};

use scaler_ir::PauliOp;

use crate::code::{LogicalBasis, StabilizerCode};
use crate::error::{CompileError, CompileResult};
use crate::pauli::PauliString;
use crate::program::{Gadget, IrId, IrProgram};
use crate::scheme::Scheme;

/// Configurable compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    scheme: Scheme,
    rounds: u32,
    readout: LogicalBasis,
}

impl Compiler {
    /// A compiler for `scheme` with one round and Z readout.
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            rounds: 1,
            readout: LogicalBasis::Z,
        }
    }

    /// Set the number of syndrome extraction rounds.
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the logical readout basis.
    #[must_use]
    pub fn with_readout(mut self, readout: LogicalBasis) -> Self {
        self.readout = readout;
        self
    }

    /// The scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The number of rounds.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The readout basis.
    pub fn readout(&self) -> LogicalBasis {
        self.readout
    }

    /// Compile `code` into an IR program.
    #[instrument(skip(self, code), fields(scheme = %self.scheme, rounds = self.rounds))]
    pub fn compile(&self, code: &StabilizerCode) -> CompileResult<IrProgram> {
        if self.rounds == 0 {
            return Err(CompileError::InvalidRounds(self.rounds));
        }
        code.validate()?;
        let strategy = self.scheme.strategy();
        strategy.supports(code)?;

        let (bases, logicals) = readout_bases(code, self.readout)?;
        let mut program = IrProgram::new(code.n());
        let mut previous: Vec<Option<IrId>> = vec![None; code.stabilizers().len()];

        for round in 0..self.rounds {
            debug!(round, "Emitting syndrome round");
            for (i, stabilizer) in code.stabilizers().iter().enumerate() {
                let readout = strategy.measure_stabilizer(&mut program, stabilizer)?;
                match previous[i] {
                    Some(prev) => {
                        program.push_detector(&[readout.value, prev])?;
                    }
                    None if is_deterministic(stabilizer, &bases) => {
                        program.push_detector(&[readout.value])?;
                    }
                    None => {}
                }
                for &check in &readout.checks {
                    program.push_detector(&[check])?;
                }
                previous[i] = Some(readout.value);
            }
        }

        for (i, stabilizer) in code.stabilizers().iter().enumerate() {
            if !is_deterministic(stabilizer, &bases) {
                continue;
            }
            let value = program.push_prop(stabilizer.clone(), Gadget::Transversal)?;
            match previous[i] {
                Some(prev) => program.push_detector(&[value, prev])?,
                None => program.push_detector(&[value])?,
            };
        }

        for logical in logicals {
            let value = program.push_prop(logical.clone(), Gadget::Transversal)?;
            program.push_observable(&[value])?;
        }

        info!(
            instructions = program.len(),
            detectors = program.num_detectors(),
            observables = program.num_observables(),
            "Compiled stabilizer code"
        );
        Ok(program)
    }
}

/// Compile `code` with `scheme` for `rounds` rounds, reading out in Z.
pub fn compile(code: &StabilizerCode, scheme: Scheme, rounds: u32) -> CompileResult<IrProgram> {
    Compiler::new(scheme).with_rounds(rounds).compile(code)
}

/// Per-qubit readout bases and the logical operators being read.
///
/// Qubits outside every logical operator's support default to the
/// readout basis itself.
fn readout_bases(
    code: &StabilizerCode,
    basis: LogicalBasis,
) -> CompileResult<(Vec<PauliOp>, Vec<&PauliString>)> {
    let default = match basis {
        LogicalBasis::X => PauliOp::X,
        LogicalBasis::Z => PauliOp::Z,
    };
    let mut bases: Vec<Option<PauliOp>> = vec![None; code.n()];
    let mut logicals = Vec::with_capacity(code.k());
    for index in 0..code.k() {
        let op = code
            .logical(index)
            .and_then(|l| l.get(basis))
            .ok_or(CompileError::MissingLogical { index, basis })?;
        for (qubit, pauli) in op.support() {
            match bases[qubit] {
                None => bases[qubit] = Some(pauli),
                Some(existing) if existing == pauli => {}
                Some(existing) => {
                    return Err(CompileError::IncompatibleReadout {
                        qubit,
                        first: existing,
                        second: pauli,
                    });
                }
            }
        }
        logicals.push(op);
    }
    let bases = bases.into_iter().map(|b| b.unwrap_or(default)).collect();
    Ok((bases, logicals))
}

fn is_deterministic(stabilizer: &PauliString, bases: &[PauliOp]) -> bool {
    stabilizer.support().all(|(q, p)| bases[q] == p)
}
