//! The QEC intermediate representation.
//!
//! A program is a flat list of single-assignment instructions over three
//! destination namespaces: propagation results (`c#`), detectors (`d#`)
//! and observables (`o#`). Arguments always refer to earlier `c#`
//! destinations.
//!
//! ```text
//! c0 = Prop ZZI
//! d0 = Parity c0
//! c2 = Prop ZZI
//! d1 = Parity c2 c0
//! c4 = Prop[transversal] ZZZ
//! o0 = Parity c4
//! ```

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CompileError, CompileResult};
use crate::pauli::PauliString;

/// Destination namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IrKind {
    /// Propagation or flag result, printed `c#`.
    Prop,
    /// Detector, printed `d#`.
    Detector,
    /// Observable, printed `o#`.
    Observable,
}

impl IrKind {
    fn prefix(self) -> char {
        match self {
            IrKind::Prop => 'c',
            IrKind::Detector => 'd',
            IrKind::Observable => 'o',
        }
    }
}

/// A destination identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IrId {
    /// Namespace.
    pub kind: IrKind,
    /// Index within the namespace.
    pub index: u32,
}

impl IrId {
    /// A `c#` destination.
    pub const fn prop(index: u32) -> Self {
        Self {
            kind: IrKind::Prop,
            index,
        }
    }

    /// A `d#` destination.
    pub const fn detector(index: u32) -> Self {
        Self {
            kind: IrKind::Detector,
            index,
        }
    }

    /// A `o#` destination.
    pub const fn observable(index: u32) -> Self {
        Self {
            kind: IrKind::Observable,
            index,
        }
    }
}

impl fmt::Display for IrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.index)
    }
}

/// How a Pauli propagation is realized in hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gadget {
    /// One ancilla, controlled Paulis, X-basis readout.
    #[default]
    Ancilla,
    /// Cat-state ancilla block, one ancilla per support qubit.
    Cat,
    /// One ancilla plus a flag qubit catching hook errors.
    Flagged,
    /// Direct single-qubit readout of the data qubits.
    Transversal,
}

impl fmt::Display for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gadget::Ancilla => "ancilla",
            Gadget::Cat => "cat",
            Gadget::Flagged => "flagged",
            Gadget::Transversal => "transversal",
        };
        f.write_str(name)
    }
}

/// Classical control flow kinds.
///
/// Representable in the IR; the circuit builder has no lowering rule for
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Conditional execution.
    IfThen,
    /// Loop while a condition holds.
    While,
    /// Repeat until a condition holds.
    RepeatUntil,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlKind::IfThen => "IfThen",
            ControlKind::While => "While",
            ControlKind::RepeatUntil => "RepeatUntil",
        };
        f.write_str(name)
    }
}

/// One IR instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrInstruction {
    /// Measure a Pauli string on the data qubits.
    Prop {
        /// Result destination.
        dest: IrId,
        /// Measured operator.
        pauli: PauliString,
        /// Realization.
        gadget: Gadget,
    },
    /// The flag outcome of a flagged propagation.
    Flag {
        /// Result destination.
        dest: IrId,
        /// Flagged propagations.
        args: Vec<IrId>,
    },
    /// Parity check expected to be deterministic without noise.
    Detector {
        /// Detector destination.
        dest: IrId,
        /// Parity arguments.
        args: Vec<IrId>,
    },
    /// Logical observable parity.
    Observable {
        /// Observable destination.
        dest: IrId,
        /// Parity arguments.
        args: Vec<IrId>,
    },
    /// Classical control flow.
    Control {
        /// Result destination.
        dest: IrId,
        /// Control kind.
        kind: ControlKind,
        /// Condition arguments.
        args: Vec<IrId>,
    },
}

impl IrInstruction {
    /// The destination written.
    pub fn dest(&self) -> IrId {
        match self {
            IrInstruction::Prop { dest, .. }
            | IrInstruction::Flag { dest, .. }
            | IrInstruction::Detector { dest, .. }
            | IrInstruction::Observable { dest, .. }
            | IrInstruction::Control { dest, .. } => *dest,
        }
    }

    /// Arguments read.
    pub fn args(&self) -> &[IrId] {
        match self {
            IrInstruction::Prop { .. } => &[],
            IrInstruction::Flag { args, .. }
            | IrInstruction::Detector { args, .. }
            | IrInstruction::Observable { args, .. }
            | IrInstruction::Control { args, .. } => args,
        }
    }

    /// Instruction name.
    pub fn name(&self) -> &'static str {
        match self {
            IrInstruction::Prop { .. } => "prop",
            IrInstruction::Flag { .. } => "flag",
            IrInstruction::Detector { .. } => "detector",
            IrInstruction::Observable { .. } => "observable",
            IrInstruction::Control { .. } => "control",
        }
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = ", self.dest())?;
        match self {
            IrInstruction::Prop { pauli, gadget, .. } => match gadget {
                Gadget::Ancilla => write!(f, "Prop {pauli}")?,
                other => write!(f, "Prop[{other}] {pauli}")?,
            },
            IrInstruction::Flag { .. } => f.write_str("Flag")?,
            IrInstruction::Detector { .. } | IrInstruction::Observable { .. } => {
                f.write_str("Parity")?
            }
            IrInstruction::Control { kind, .. } => write!(f, "{kind}")?,
        }
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// An IR program over a fixed number of data qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrProgram {
    num_qubits: usize,
    instructions: Vec<IrInstruction>,
    num_props: u32,
    num_detectors: u32,
    num_observables: u32,
}

impl IrProgram {
    /// Create an empty program over `num_qubits` data qubits.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            instructions: Vec::new(),
            num_props: 0,
            num_detectors: 0,
            num_observables: 0,
        }
    }

    /// Append a propagation and return its `c#` destination.
    pub fn push_prop(&mut self, pauli: PauliString, gadget: Gadget) -> CompileResult<IrId> {
        let dest = IrId::prop(self.num_props);
        if pauli.len() != self.num_qubits {
            return Err(CompileError::WidthMismatch {
                dest,
                expected: self.num_qubits,
                got: pauli.len(),
            });
        }
        self.num_props += 1;
        self.instructions.push(IrInstruction::Prop {
            dest,
            pauli,
            gadget,
        });
        Ok(dest)
    }

    /// Append the flag outcome of a flagged propagation.
    pub fn push_flag(&mut self, of: IrId) -> CompileResult<IrId> {
        let dest = IrId::prop(self.num_props);
        self.check_args(dest, &[of])?;
        self.num_props += 1;
        self.instructions.push(IrInstruction::Flag {
            dest,
            args: vec![of],
        });
        Ok(dest)
    }

    /// Append a detector over the parity of `args`.
    pub fn push_detector(&mut self, args: &[IrId]) -> CompileResult<IrId> {
        let dest = IrId::detector(self.num_detectors);
        self.check_parity(dest, args)?;
        self.num_detectors += 1;
        self.instructions.push(IrInstruction::Detector {
            dest,
            args: args.to_vec(),
        });
        Ok(dest)
    }

    /// Append a logical observable over the parity of `args`.
    pub fn push_observable(&mut self, args: &[IrId]) -> CompileResult<IrId> {
        let dest = IrId::observable(self.num_observables);
        self.check_parity(dest, args)?;
        self.num_observables += 1;
        self.instructions.push(IrInstruction::Observable {
            dest,
            args: args.to_vec(),
        });
        Ok(dest)
    }

    /// Append a control-flow instruction.
    pub fn push_control(&mut self, kind: ControlKind, args: &[IrId]) -> CompileResult<IrId> {
        let dest = IrId::prop(self.num_props);
        self.check_args(dest, args)?;
        self.num_props += 1;
        self.instructions.push(IrInstruction::Control {
            dest,
            kind,
            args: args.to_vec(),
        });
        Ok(dest)
    }

    /// Append an instruction as-is.
    ///
    /// Nothing is checked; run [`IrProgram::verify`] afterwards. Counters
    /// advance past the destination so later `push_*` calls stay unique.
    pub fn push_raw(&mut self, instruction: IrInstruction) {
        let dest = instruction.dest();
        let counter = match dest.kind {
            IrKind::Prop => &mut self.num_props,
            IrKind::Detector => &mut self.num_detectors,
            IrKind::Observable => &mut self.num_observables,
        };
        *counter = (*counter).max(dest.index.saturating_add(1));
        self.instructions.push(instruction);
    }

    fn check_parity(&self, dest: IrId, args: &[IrId]) -> CompileResult<()> {
        if args.is_empty() {
            return Err(CompileError::EmptyParity { dest });
        }
        self.check_args(dest, args)
    }

    fn check_args(&self, dest: IrId, args: &[IrId]) -> CompileResult<()> {
        for &arg in args {
            if arg.kind != IrKind::Prop || arg.index >= self.num_props {
                return Err(CompileError::InvalidArgument { dest, arg });
            }
        }
        Ok(())
    }

    /// Check single assignment and that arguments precede their uses.
    pub fn verify(&self) -> CompileResult<()> {
        let mut defined: FxHashSet<IrId> = FxHashSet::default();
        for inst in &self.instructions {
            let dest = inst.dest();
            for &arg in inst.args() {
                if arg.kind != IrKind::Prop || !defined.contains(&arg) {
                    return Err(CompileError::InvalidArgument { dest, arg });
                }
            }
            if let IrInstruction::Prop { pauli, .. } = inst {
                if pauli.len() != self.num_qubits {
                    return Err(CompileError::WidthMismatch {
                        dest,
                        expected: self.num_qubits,
                        got: pauli.len(),
                    });
                }
            }
            let expected_kind = match inst {
                IrInstruction::Detector { .. } => IrKind::Detector,
                IrInstruction::Observable { .. } => IrKind::Observable,
                _ => IrKind::Prop,
            };
            if dest.kind != expected_kind {
                return Err(CompileError::InvalidArgument { dest, arg: dest });
            }
            if !defined.insert(dest) {
                return Err(CompileError::DuplicateDestination { dest });
            }
        }
        Ok(())
    }

    /// Number of data qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// All instructions in program order.
    pub fn instructions(&self) -> &[IrInstruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program is empty.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of `c#` destinations.
    pub fn num_props(&self) -> u32 {
        self.num_props
    }

    /// Number of detectors.
    pub fn num_detectors(&self) -> u32 {
        self.num_detectors
    }

    /// Number of observables.
    pub fn num_observables(&self) -> u32 {
        self.num_observables
    }
}

impl fmt::Display for IrProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in &self.instructions {
            writeln!(f, "{inst}")?;
        }
        Ok(())
    }
}
