//! Error types for simulation.

use scaler_ir::IrError;
use thiserror::Error;

/// Errors raised by backends, error models and samplers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A fault naming a site or error term that does not exist.
    #[error("Invalid fault: site {site}, term {term}")]
    InvalidFault {
        /// Site index.
        site: usize,
        /// Term index.
        term: usize,
    },

    /// More observables than fit in the 64-bit flip mask.
    #[error("Circuit has {count} observables, at most {max} are supported")]
    TooManyObservables {
        /// Observables in the circuit.
        count: usize,
        /// Supported maximum.
        max: usize,
    },

    /// An instruction the backend cannot execute.
    #[error("Unsupported instruction '{name}' in frame simulation")]
    UnsupportedInstruction {
        /// Instruction name.
        name: String,
    },

    /// Circuit IR error.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
