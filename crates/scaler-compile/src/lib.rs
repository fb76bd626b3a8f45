//! Stabilizer codes to noisy Clifford circuits.
//!
//! The pipeline has three stages:
//!
//! 1. [`Compiler`] turns a validated [`StabilizerCode`] into an
//!    [`IrProgram`] using a syndrome extraction [`Scheme`];
//! 2. [`CircuitBuilder`] lowers the program into a [`scaler_ir::Circuit`]
//!    with detector and observable annotations;
//! 3. [`NoiseModel::rewrite`] attaches circuit-level noise.
//!
//! # Example
//!
//! ```
//! use scaler_compile::{lower, Compiler, NoiseModel, Scheme, StabilizerCode};
//!
//! let code = StabilizerCode::repetition(3).unwrap();
//! let program = Compiler::new(Scheme::Standard).with_rounds(2).compile(&code).unwrap();
//! let lowered = lower(&program).unwrap();
//! let noisy = NoiseModel::new(0.001, false, false)
//!     .unwrap()
//!     .rewrite(lowered.circuit())
//!     .unwrap();
//!
//! assert_eq!(noisy.num_detectors(), 6);
//! assert_eq!(noisy.num_ops(), 46);
//! ```

pub mod code;
pub mod compiler;
pub mod error;
pub mod lower;
pub mod noise;
pub mod pauli;
pub mod program;
pub mod scheme;

pub use code::{CodeDefinition, LogicalBasis, LogicalOperators, StabilizerCode};
pub use compiler::{compile, Compiler};
pub use error::{
    CompileError, CompileResult, LowerResult, LoweringError, NoiseError, ValidationError,
    ValidationResult,
};
pub use lower::{lower, CircuitBuilder, CircuitPosition, LoweredCircuit};
pub use noise::{NoiseModel, SingleQubitChannel};
pub use pauli::{commute, PauliString};
pub use program::{ControlKind, Gadget, IrId, IrInstruction, IrKind, IrProgram};
pub use scheme::{Scheme, SchemeStrategy, StabilizerReadout};
