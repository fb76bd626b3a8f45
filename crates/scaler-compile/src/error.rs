//! Error types for code validation, compilation, lowering and noise
//! injection.

use scaler_ir::{IrError, PauliOp};
use thiserror::Error;

use crate::code::LogicalBasis;
use crate::program::IrId;
use crate::scheme::Scheme;

/// A malformed stabilizer code description.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Code parameters are inconsistent.
    #[error("Invalid code parameters: {0}")]
    InvalidParameters(String),

    /// A character outside `{I, X, Y, Z}`.
    #[error("Invalid Pauli character {ch:?} at position {position} in '{string}'")]
    InvalidCharacter {
        /// The offending string.
        string: String,
        /// The offending character.
        ch: char,
        /// Position of the character.
        position: usize,
    },

    /// A Pauli string of the wrong length.
    #[error("Pauli string '{string}' has length {got}, expected {expected}")]
    LengthMismatch {
        /// The offending string.
        string: String,
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Logical qubit index outside `0..k`.
    #[error("Logical qubit index {index} out of range (k = {k})")]
    LogicalIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of logical qubits.
        k: usize,
    },

    /// Two stabilizer generators anticommute.
    #[error("Stabilizers #{first} ({first_str}) and #{second} ({second_str}) anticommute")]
    NonCommutingStabilizers {
        /// Index of the first generator.
        first: usize,
        /// Text of the first generator.
        first_str: String,
        /// Index of the second generator.
        second: usize,
        /// Text of the second generator.
        second_str: String,
    },

    /// A logical operator anticommutes with a stabilizer generator.
    #[error("Logical {basis}{index} anticommutes with stabilizer #{stabilizer}")]
    LogicalAnticommutesWithStabilizer {
        /// Logical qubit index.
        index: usize,
        /// Which logical operator.
        basis: LogicalBasis,
        /// Index of the stabilizer generator.
        stabilizer: usize,
    },

    /// The X and Z operators of one logical qubit commute.
    #[error("Logical X{index} and Z{index} commute; they must anticommute")]
    LogicalPairCommutes {
        /// Logical qubit index.
        index: usize,
    },

    /// Operators of two different logical qubits anticommute.
    #[error("Logical {first_basis}{first} anticommutes with logical {second_basis}{second}")]
    LogicalsAnticommute {
        /// First logical qubit index.
        first: usize,
        /// First operator basis.
        first_basis: LogicalBasis,
        /// Second logical qubit index.
        second: usize,
        /// Second operator basis.
        second_basis: LogicalBasis,
    },
}

/// Result type for code validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised while compiling a code into IR.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The code failed validation.
    #[error("Code validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Fewer than one syndrome extraction round requested.
    #[error("Round count must be at least 1, got {0}")]
    InvalidRounds(u32),

    /// A scheme name that does not parse.
    #[error("Unknown scheme '{0}' (expected Standard, Shor, Knill or Flag)")]
    UnknownScheme(String),

    /// A known scheme without a compiler strategy.
    #[error("Scheme '{0}' has no compiler strategy")]
    UnsupportedScheme(Scheme),

    /// A logical qubit lacks an operator in the readout basis.
    #[error("Logical qubit {index} has no {basis} operator for readout")]
    MissingLogical {
        /// Logical qubit index.
        index: usize,
        /// Readout basis.
        basis: LogicalBasis,
    },

    /// Two logical operators need different readout bases on one qubit.
    #[error("Data qubit {qubit} must be read out in both {first} and {second}")]
    IncompatibleReadout {
        /// Data qubit index.
        qubit: usize,
        /// Basis required first.
        first: PauliOp,
        /// Conflicting basis.
        second: PauliOp,
    },

    /// An IR argument that is not an earlier propagation result.
    #[error("{dest}: argument {arg} is not an earlier propagation result")]
    InvalidArgument {
        /// Instruction being built.
        dest: IrId,
        /// Offending argument.
        arg: IrId,
    },

    /// A parity instruction without arguments.
    #[error("{dest}: parity over an empty argument list")]
    EmptyParity {
        /// Instruction being built.
        dest: IrId,
    },

    /// A Pauli string whose width differs from the program's data qubits.
    #[error("{dest}: Pauli string acts on {got} qubits, program has {expected}")]
    WidthMismatch {
        /// Instruction being built.
        dest: IrId,
        /// Program width.
        expected: usize,
        /// String width.
        got: usize,
    },

    /// A destination defined twice.
    #[error("{dest} is defined more than once")]
    DuplicateDestination {
        /// The repeated destination.
        dest: IrId,
    },
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while lowering IR into a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoweringError {
    /// An argument that was never defined before use.
    #[error("{dest}: argument {arg} is not defined")]
    UndefinedDestination {
        /// Instruction being lowered.
        dest: IrId,
        /// Missing argument.
        arg: IrId,
    },

    /// An instruction kind the builder cannot lower.
    #[error("{dest}: '{kind}' has no lowering rule")]
    NoLoweringRule {
        /// Instruction being lowered.
        dest: IrId,
        /// Instruction kind.
        kind: String,
    },

    /// A `Flag` whose argument was not measured with a flag qubit.
    #[error("{dest}: {arg} was not measured with a flag qubit")]
    NotFlagged {
        /// Instruction being lowered.
        dest: IrId,
        /// The unflagged propagation.
        arg: IrId,
    },

    /// An ancilla measurement after the data qubits were read out.
    #[error("{dest}: data qubits were already measured out")]
    DataConsumed {
        /// Instruction being lowered.
        dest: IrId,
    },

    /// Transversal readouts disagree on a data qubit's basis.
    #[error("{dest}: reads data qubit {qubit} in {pauli}, but it is read out in {basis}")]
    IncompatibleBasis {
        /// Instruction being lowered.
        dest: IrId,
        /// Data qubit index.
        qubit: usize,
        /// Basis this instruction needs.
        pauli: PauliOp,
        /// Basis already assigned.
        basis: PauliOp,
    },

    /// A Pauli string whose width differs from the data register.
    #[error("{dest}: Pauli string acts on {got} qubits, circuit has {expected} data qubits")]
    WidthMismatch {
        /// Instruction being lowered.
        dest: IrId,
        /// Data register width.
        expected: usize,
        /// String width.
        got: usize,
    },

    /// A register wider than a circuit can index.
    #[error("Register '{register}' needs {size} qubits, more than a circuit can index")]
    RegisterTooLarge {
        /// Register name.
        register: String,
        /// Requested width.
        size: usize,
    },

    /// Circuit construction failed.
    #[error("Circuit construction failed: {0}")]
    Ir(#[from] IrError),
}

/// Result type for lowering.
pub type LowerResult<T> = Result<T, LoweringError>;

/// Errors raised by the noise model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NoiseError {
    /// A rate outside `[0, 1]`.
    #[error("Invalid {name} rate {value}: must be within [0, 1]")]
    InvalidRate {
        /// Which rate.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Building the noisy circuit failed.
    #[error("Noise injection failed: {0}")]
    Ir(#[from] IrError),
}
