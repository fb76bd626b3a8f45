//! Lowering IR programs into Clifford circuits.
//!
//! Data qubits live in register `data`, ancillas in register `anc`
//! (both renamable). Ancillas are allocated once per `(Pauli string, gadget)` pair, then reset
//! and reused on every later round. Each `c#` destination maps to the
//! measurement records it reads; each `d#`/`o#` to a circuit annotation.

use rustc_hash::FxHashMap;
use tracing::debug;

use scaler_ir::{Circuit, ClbitId, DetectorId, ObservableId, PauliOp, QubitId};

use crate::error::{LowerResult, LoweringError};
use crate::pauli::PauliString;
use crate::program::{Gadget, IrId, IrInstruction, IrProgram};

/// Where an IR destination ended up in the circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitPosition {
    /// Measurement records whose parity is the value.
    Records(Vec<ClbitId>),
    /// A detector annotation.
    Detector(DetectorId),
    /// An observable annotation.
    Observable(ObservableId),
}

/// A lowered circuit together with the IR-to-circuit mapping.
#[derive(Debug, Clone)]
pub struct LoweredCircuit {
    circuit: Circuit,
    positions: FxHashMap<IrId, CircuitPosition>,
    data: Vec<QubitId>,
}

impl LoweredCircuit {
    /// The circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Take the circuit.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Position of an IR destination.
    pub fn position(&self, id: IrId) -> Option<&CircuitPosition> {
        self.positions.get(&id)
    }

    /// Data qubits in code order.
    pub fn data_qubits(&self) -> &[QubitId] {
        &self.data
    }
}

/// Builds circuits from IR programs.
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    name: String,
    data_register: String,
    ancilla_register: String,
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new("qec")
    }
}

impl CircuitBuilder {
    /// A builder naming its circuits `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_register: "data".into(),
            ancilla_register: "anc".into(),
        }
    }

    /// Rename the data and ancilla registers.
    #[must_use]
    pub fn with_registers(mut self, data: impl Into<String>, ancilla: impl Into<String>) -> Self {
        self.data_register = data.into();
        self.ancilla_register = ancilla.into();
        self
    }

    /// Lower `program` into a circuit.
    pub fn lower(&self, program: &IrProgram) -> LowerResult<LoweredCircuit> {
        let bases = readout_bases(program)?;
        let mut circuit = Circuit::new(self.name.clone());
        let width = register_width(&self.data_register, program.num_qubits())?;
        let data = circuit.add_qreg(self.data_register.clone(), width);

        for (&q, &basis) in data.iter().zip(&bases) {
            circuit.reset(q)?;
            match basis {
                PauliOp::X => {
                    circuit.h(q)?;
                }
                PauliOp::Y => {
                    circuit.h(q)?.s(q)?;
                }
                PauliOp::I | PauliOp::Z => {}
            }
        }

        let mut state = LoweringState {
            circuit,
            ancilla_register: &self.ancilla_register,
            data,
            bases,
            ancillas: FxHashMap::default(),
            records: FxHashMap::default(),
            flags: FxHashMap::default(),
            data_records: None,
            positions: FxHashMap::default(),
        };
        for inst in program.instructions() {
            state.lower(inst)?;
        }

        debug!(
            qubits = state.circuit.num_qubits(),
            records = state.circuit.num_clbits(),
            ops = state.circuit.num_ops(),
            detectors = state.circuit.num_detectors(),
            "Lowered IR program"
        );
        Ok(LoweredCircuit {
            circuit: state.circuit,
            positions: state.positions,
            data: state.data,
        })
    }
}

/// Lower `program` with the default builder.
pub fn lower(program: &IrProgram) -> LowerResult<LoweredCircuit> {
    CircuitBuilder::default().lower(program)
}

/// Per-data-qubit readout basis, fixed by the transversal propagations.
fn readout_bases(program: &IrProgram) -> LowerResult<Vec<PauliOp>> {
    let mut bases: Vec<Option<PauliOp>> = vec![None; program.num_qubits()];
    for inst in program.instructions() {
        let IrInstruction::Prop {
            dest,
            pauli,
            gadget: Gadget::Transversal,
        } = inst
        else {
            continue;
        };
        check_width(*dest, pauli, program.num_qubits())?;
        for (qubit, op) in pauli.support() {
            match bases[qubit] {
                None => bases[qubit] = Some(op),
                Some(basis) if basis == op => {}
                Some(basis) => {
                    return Err(LoweringError::IncompatibleBasis {
                        dest: *dest,
                        qubit,
                        pauli: op,
                        basis,
                    });
                }
            }
        }
    }
    Ok(bases.into_iter().map(|b| b.unwrap_or(PauliOp::Z)).collect())
}

fn check_width(dest: IrId, pauli: &PauliString, expected: usize) -> LowerResult<()> {
    if pauli.len() != expected {
        return Err(LoweringError::WidthMismatch {
            dest,
            expected,
            got: pauli.len(),
        });
    }
    Ok(())
}

fn register_width(register: &str, size: usize) -> LowerResult<u32> {
    u32::try_from(size).map_err(|_| LoweringError::RegisterTooLarge {
        register: register.to_string(),
        size,
    })
}

struct LoweringState<'b> {
    circuit: Circuit,
    ancilla_register: &'b str,
    data: Vec<QubitId>,
    bases: Vec<PauliOp>,
    ancillas: FxHashMap<(PauliString, Gadget), Vec<QubitId>>,
    records: FxHashMap<IrId, Vec<ClbitId>>,
    flags: FxHashMap<IrId, Vec<ClbitId>>,
    data_records: Option<Vec<ClbitId>>,
    positions: FxHashMap<IrId, CircuitPosition>,
}

impl LoweringState<'_> {
    fn lower(&mut self, inst: &IrInstruction) -> LowerResult<()> {
        match inst {
            IrInstruction::Prop {
                dest,
                pauli,
                gadget,
            } => {
                check_width(*dest, pauli, self.data.len())?;
                if *gadget != Gadget::Transversal && self.data_records.is_some() {
                    return Err(LoweringError::DataConsumed { dest: *dest });
                }
                let records = match gadget {
                    Gadget::Ancilla => self.ancilla(pauli)?,
                    Gadget::Cat => self.cat(pauli)?,
                    Gadget::Flagged => {
                        let (value, flag) = self.flagged(pauli)?;
                        self.flags.insert(*dest, vec![flag]);
                        vec![value]
                    }
                    Gadget::Transversal => self.transversal(pauli)?,
                };
                self.define(*dest, records);
            }
            IrInstruction::Flag { dest, args } => {
                let mut records = Vec::new();
                for &arg in args {
                    if !self.records.contains_key(&arg) {
                        return Err(LoweringError::UndefinedDestination { dest: *dest, arg });
                    }
                    let flag = self
                        .flags
                        .get(&arg)
                        .ok_or(LoweringError::NotFlagged { dest: *dest, arg })?;
                    records.extend_from_slice(flag);
                }
                self.define(*dest, records);
            }
            IrInstruction::Detector { dest, args } => {
                let records = self.gather(*dest, args)?;
                let id = self.circuit.add_detector(records)?;
                self.positions.insert(*dest, CircuitPosition::Detector(id));
            }
            IrInstruction::Observable { dest, args } => {
                let records = self.gather(*dest, args)?;
                let id = self.circuit.add_observable(records)?;
                self.positions.insert(*dest, CircuitPosition::Observable(id));
            }
            IrInstruction::Control { dest, kind, .. } => {
                return Err(LoweringError::NoLoweringRule {
                    dest: *dest,
                    kind: kind.to_string(),
                });
            }
        }
        Ok(())
    }

    fn define(&mut self, dest: IrId, records: Vec<ClbitId>) {
        self.positions
            .insert(dest, CircuitPosition::Records(records.clone()));
        self.records.insert(dest, records);
    }

    fn gather(&self, dest: IrId, args: &[IrId]) -> LowerResult<Vec<ClbitId>> {
        let mut records = Vec::new();
        for &arg in args {
            let recs = self
                .records
                .get(&arg)
                .ok_or(LoweringError::UndefinedDestination { dest, arg })?;
            records.extend_from_slice(recs);
        }
        Ok(records)
    }

    fn ancillas_for(
        &mut self,
        pauli: &PauliString,
        gadget: Gadget,
        count: usize,
    ) -> LowerResult<Vec<QubitId>> {
        let key = (pauli.clone(), gadget);
        if let Some(block) = self.ancillas.get(&key) {
            return Ok(block.clone());
        }
        let width = register_width(self.ancilla_register, count)?;
        let block = self.circuit.add_qreg(self.ancilla_register, width);
        self.ancillas.insert(key, block.clone());
        Ok(block)
    }

    fn controlled_pauli(&mut self, control: QubitId, target: QubitId, op: PauliOp) -> LowerResult<()> {
        match op {
            PauliOp::X => self.circuit.cx(control, target)?,
            PauliOp::Y => self.circuit.cy(control, target)?,
            PauliOp::Z => self.circuit.cz(control, target)?,
            PauliOp::I => return Ok(()),
        };
        Ok(())
    }

    fn ancilla(&mut self, pauli: &PauliString) -> LowerResult<Vec<ClbitId>> {
        let a = self.ancillas_for(pauli, Gadget::Ancilla, 1)?[0];
        self.circuit.reset(a)?.h(a)?;
        for (q, op) in pauli.support() {
            let target = self.data[q];
            self.controlled_pauli(a, target, op)?;
        }
        self.circuit.h(a)?;
        Ok(vec![self.circuit.measure_record(a)?])
    }

    fn cat(&mut self, pauli: &PauliString) -> LowerResult<Vec<ClbitId>> {
        let block = self.ancillas_for(pauli, Gadget::Cat, pauli.weight().max(1))?;
        for &a in &block {
            self.circuit.reset(a)?;
        }
        self.circuit.h(block[0])?;
        for &a in &block[1..] {
            self.circuit.cx(block[0], a)?;
        }
        for (&a, (q, op)) in block.iter().zip(pauli.support()) {
            let target = self.data[q];
            self.controlled_pauli(a, target, op)?;
        }
        let mut records = Vec::with_capacity(block.len());
        for &a in &block {
            self.circuit.h(a)?;
            records.push(self.circuit.measure_record(a)?);
        }
        Ok(records)
    }

    fn flagged(&mut self, pauli: &PauliString) -> LowerResult<(ClbitId, ClbitId)> {
        let pair = self.ancillas_for(pauli, Gadget::Flagged, 2)?;
        let (a, f) = (pair[0], pair[1]);
        self.circuit.reset(a)?.reset(f)?.h(a)?;
        let support: Vec<_> = pauli.support().collect();
        let last = support.len().saturating_sub(1);
        for (i, &(q, op)) in support.iter().enumerate() {
            if i == 1 {
                self.circuit.cx(a, f)?;
            }
            if i == last && i >= 1 {
                self.circuit.cx(a, f)?;
            }
            let target = self.data[q];
            self.controlled_pauli(a, target, op)?;
        }
        self.circuit.h(a)?;
        let value = self.circuit.measure_record(a)?;
        let flag = self.circuit.measure_record(f)?;
        Ok((value, flag))
    }

    fn transversal(&mut self, pauli: &PauliString) -> LowerResult<Vec<ClbitId>> {
        if self.data_records.is_none() {
            let mut records = Vec::with_capacity(self.data.len());
            for (&q, &basis) in self.data.iter().zip(&self.bases) {
                match basis {
                    PauliOp::X => {
                        self.circuit.h(q)?;
                    }
                    PauliOp::Y => {
                        self.circuit.sdg(q)?.h(q)?;
                    }
                    PauliOp::I | PauliOp::Z => {}
                }
                records.push(self.circuit.measure_record(q)?);
            }
            self.data_records = Some(records);
        }
        let data_records = self.data_records.as_deref().unwrap_or_default();
        Ok(pauli.support().map(|(q, _)| data_records[q]).collect())
    }
}
