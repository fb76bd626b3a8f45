//! Stim circuit text emitter.
//!
//! Produces text the Stim toolchain can parse: one operation per line,
//! detectors and observables appended at the end with `rec[-k]` look-backs
//! into the measurement record.

use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::instruction::InstructionKind;
use crate::noise::NoiseChannel;
use crate::qubit::ClbitId;

/// Render `circuit` as Stim text.
///
/// Fails if a detector or observable references a record that no
/// measurement writes.
pub fn emit(circuit: &Circuit) -> IrResult<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut record_position: FxHashMap<ClbitId, usize> = FxHashMap::default();

    for inst in circuit.operations() {
        let targets = inst
            .qubits
            .iter()
            .map(|q| q.0.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let head = match &inst.kind {
            InstructionKind::Gate(g) => g.stim_name().to_string(),
            InstructionKind::Measure => {
                for &c in &inst.clbits {
                    let next = record_position.len();
                    record_position.insert(c, next);
                }
                "M".to_string()
            }
            InstructionKind::Reset => "R".to_string(),
            InstructionKind::Barrier => {
                lines.push("TICK".to_string());
                continue;
            }
            InstructionKind::Noise(channel) => channel_head(channel),
        };
        lines.push(format!("{head} {targets}"));
    }

    let total = record_position.len();
    let lookback = |records: &[ClbitId]| -> IrResult<String> {
        let mut parts = Vec::with_capacity(records.len());
        for clbit in records {
            let pos = record_position
                .get(clbit)
                .ok_or(IrError::UnmeasuredRecord { clbit: *clbit })?;
            parts.push(format!("rec[-{}]", total - pos));
        }
        Ok(parts.join(" "))
    };

    for detector in circuit.detectors() {
        lines.push(format!("DETECTOR {}", lookback(&detector.records)?));
    }
    for observable in circuit.observables() {
        lines.push(format!(
            "OBSERVABLE_INCLUDE({}) {}",
            observable.id.0,
            lookback(&observable.records)?
        ));
    }

    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

fn channel_head(channel: &NoiseChannel) -> String {
    match *channel {
        NoiseChannel::Depolarize1 { p } => format!("DEPOLARIZE1({p})"),
        NoiseChannel::Depolarize2 { p } => format!("DEPOLARIZE2({p})"),
        NoiseChannel::BitFlip { p } => format!("X_ERROR({p})"),
        NoiseChannel::PhaseFlip { p } => format!("Z_ERROR({p})"),
        NoiseChannel::PauliChannel1 { px, py, pz } => {
            format!("PAULI_CHANNEL_1({px}, {py}, {pz})")
        }
    }
}
