//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_op_context(.op))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// Measurement record not found in circuit.
    #[error("Measurement record {clbit} not found in circuit{}", format_op_context(.op))]
    ClbitNotFound {
        /// The record that was not found.
        clbit: ClbitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// A detector or observable refers to a record no measurement writes.
    #[error("Measurement record {clbit} is never written by a measurement")]
    UnmeasuredRecord {
        /// The record that is never measured.
        clbit: ClbitId,
    },

    /// A measurement targets a record an earlier measurement wrote.
    #[error("Measurement record {clbit} is written more than once")]
    RecordRewritten {
        /// The record written twice.
        clbit: ClbitId,
    },

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),

    /// Operation requires a different number of qubits.
    #[error("Operation '{op}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the operation.
        op: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_op_context(.op))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional operation name for context.
        op: Option<String>,
    },

    /// Noise channel probability outside `[0, 1]`.
    #[error("Invalid probability {p} for noise channel '{channel}'")]
    InvalidProbability {
        /// Channel name.
        channel: String,
        /// The offending probability (or probability sum).
        p: f64,
    },
}

#[allow(clippy::ref_option)]
fn format_op_context(op: &Option<String>) -> String {
    match op {
        Some(name) => format!(" (op: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
