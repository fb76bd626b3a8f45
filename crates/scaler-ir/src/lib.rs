//! ScaLER Circuit Intermediate Representation
//!
//! This crate holds the physical layer of the ScaLER stack: Clifford
//! circuits over indexed qubits, Pauli noise channels, and the detector and
//! observable annotations that turn measurement records into syndrome bits
//! and logical outcomes.
//!
//! # Core Components
//!
//! - **Qubits and records**: [`QubitId`], [`ClbitId`] (one record per
//!   measurement)
//! - **Operations**: [`CliffordGate`], [`NoiseChannel`], [`Instruction`]
//! - **DAG**: [`CircuitDag`], a petgraph wire graph that keeps operations in
//!   program order
//! - **Circuit**: [`Circuit`], the builder API plus [`Detector`] and
//!   [`Observable`] definitions
//! - **Text**: [`text::emit`] renders Stim-compatible circuit text
//!
//! # Example: one ZZ parity check
//!
//! ```rust
//! use scaler_ir::Circuit;
//!
//! let mut circuit = Circuit::new("zz_check");
//! let data = circuit.add_qreg("data", 2);
//! let anc = circuit.add_qreg("anc", 1)[0];
//!
//! circuit.reset(anc).unwrap().h(anc).unwrap();
//! circuit.cz(anc, data[0]).unwrap().cz(anc, data[1]).unwrap();
//! circuit.h(anc).unwrap();
//! let m = circuit.measure_record(anc).unwrap();
//! circuit.add_detector([m]).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.num_detectors(), 1);
//! assert!(circuit.to_stim().unwrap().contains("DETECTOR rec[-1]"));
//! ```

pub mod annotation;
pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod noise;
pub mod pauli;
pub mod qubit;
pub mod text;

pub use annotation::{Detector, DetectorId, Observable, ObservableId};
pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::CliffordGate;
pub use instruction::{Instruction, InstructionKind};
pub use noise::{ErrorTerm, NoiseChannel};
pub use pauli::PauliOp;
pub use qubit::{ClbitId, Qubit, QubitId};
