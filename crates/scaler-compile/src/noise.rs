//! Circuit-level noise model.
//!
//! [`NoiseModel::rewrite`] walks a circuit in program order and emits a
//! new circuit with noise channels attached:
//!
//! | operation        | inserted channel                      |
//! |------------------|---------------------------------------|
//! | 1-qubit gate     | single-qubit channel after the gate   |
//! | 2-qubit gate     | `DEPOLARIZE2` after the gate          |
//! | measurement      | `X_ERROR` before it (if enabled)      |
//! | reset            | `X_ERROR` after it (if enabled)       |
//!
//! Channels whose rate is zero are not inserted. Noise already present
//! in the input is kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use scaler_ir::{Circuit, Instruction, InstructionKind, NoiseChannel};

use crate::error::NoiseError;

/// Channel applied after single-qubit gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleQubitChannel {
    /// Uniform X/Y/Z with total probability `p`.
    #[default]
    Depolarizing,
    /// X with probability `p`.
    BitFlip,
    /// Z with probability `p`.
    PhaseFlip,
}

impl SingleQubitChannel {
    fn channel(self, p: f64) -> NoiseChannel {
        match self {
            SingleQubitChannel::Depolarizing => NoiseChannel::Depolarize1 { p },
            SingleQubitChannel::BitFlip => NoiseChannel::BitFlip { p },
            SingleQubitChannel::PhaseFlip => NoiseChannel::PhaseFlip { p },
        }
    }
}

/// A uniform circuit-level noise model with optional per-channel rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    error_rate: f64,
    #[serde(default)]
    has_measurement_error: bool,
    #[serde(default)]
    has_reset_error: bool,
    #[serde(default)]
    single_qubit_rate: Option<f64>,
    #[serde(default)]
    two_qubit_rate: Option<f64>,
    #[serde(default)]
    measurement_rate: Option<f64>,
    #[serde(default)]
    reset_rate: Option<f64>,
    #[serde(default)]
    single_qubit_channel: SingleQubitChannel,
}

impl NoiseModel {
    /// A model applying `error_rate` to every enabled channel.
    pub fn new(
        error_rate: f64,
        has_measurement_error: bool,
        has_reset_error: bool,
    ) -> Result<Self, NoiseError> {
        let model = Self {
            error_rate,
            has_measurement_error,
            has_reset_error,
            single_qubit_rate: None,
            two_qubit_rate: None,
            measurement_rate: None,
            reset_rate: None,
            single_qubit_channel: SingleQubitChannel::default(),
        };
        model.validate()?;
        Ok(model)
    }

    /// Override the rate after single-qubit gates.
    #[must_use]
    pub fn with_single_qubit_rate(mut self, p: f64) -> Self {
        self.single_qubit_rate = Some(p);
        self
    }

    /// Override the rate after two-qubit gates.
    #[must_use]
    pub fn with_two_qubit_rate(mut self, p: f64) -> Self {
        self.two_qubit_rate = Some(p);
        self
    }

    /// Override the measurement flip rate.
    #[must_use]
    pub fn with_measurement_rate(mut self, p: f64) -> Self {
        self.measurement_rate = Some(p);
        self
    }

    /// Override the reset flip rate.
    #[must_use]
    pub fn with_reset_rate(mut self, p: f64) -> Self {
        self.reset_rate = Some(p);
        self
    }

    /// Choose the single-qubit channel kind.
    #[must_use]
    pub fn with_single_qubit_channel(mut self, channel: SingleQubitChannel) -> Self {
        self.single_qubit_channel = channel;
        self
    }

    /// Check every rate is within `[0, 1]`.
    pub fn validate(&self) -> Result<(), NoiseError> {
        let rates = [
            ("error", Some(self.error_rate)),
            ("single-qubit", self.single_qubit_rate),
            ("two-qubit", self.two_qubit_rate),
            ("measurement", self.measurement_rate),
            ("reset", self.reset_rate),
        ];
        for (name, rate) in rates {
            if let Some(value) = rate {
                if !(0.0..=1.0).contains(&value) {
                    return Err(NoiseError::InvalidRate { name, value });
                }
            }
        }
        Ok(())
    }

    /// The base error rate.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Whether measurements are noisy.
    pub fn has_measurement_error(&self) -> bool {
        self.has_measurement_error
    }

    /// Whether resets are noisy.
    pub fn has_reset_error(&self) -> bool {
        self.has_reset_error
    }

    /// Effective rate after single-qubit gates.
    pub fn single_qubit_rate(&self) -> f64 {
        self.single_qubit_rate.unwrap_or(self.error_rate)
    }

    /// Effective rate after two-qubit gates.
    pub fn two_qubit_rate(&self) -> f64 {
        self.two_qubit_rate.unwrap_or(self.error_rate)
    }

    /// Effective measurement flip rate, zero when disabled.
    pub fn measurement_rate(&self) -> f64 {
        if self.has_measurement_error {
            self.measurement_rate.unwrap_or(self.error_rate)
        } else {
            0.0
        }
    }

    /// Effective reset flip rate, zero when disabled.
    pub fn reset_rate(&self) -> f64 {
        if self.has_reset_error {
            self.reset_rate.unwrap_or(self.error_rate)
        } else {
            0.0
        }
    }

    /// The single-qubit channel kind.
    pub fn single_qubit_channel(&self) -> SingleQubitChannel {
        self.single_qubit_channel
    }

    /// Return a noisy copy of `circuit`.
    pub fn rewrite(&self, circuit: &Circuit) -> Result<Circuit, NoiseError> {
        self.validate()?;
        let p1 = self.single_qubit_rate();
        let p2 = self.two_qubit_rate();
        let pm = self.measurement_rate();
        let pr = self.reset_rate();
        let mut inserted = 0usize;

        let noisy = circuit.rewrite_with(|inst, out| match &inst.kind {
            InstructionKind::Gate(gate) => {
                out.push(inst.clone());
                let channel = match gate.num_qubits() {
                    1 if p1 > 0.0 => self.single_qubit_channel.channel(p1),
                    2 if p2 > 0.0 => NoiseChannel::Depolarize2 { p: p2 },
                    _ => return,
                };
                out.push(Instruction::noise(channel, inst.qubits.iter().copied()));
                inserted += 1;
            }
            InstructionKind::Measure => {
                if pm > 0.0 {
                    for &q in &inst.qubits {
                        out.push(Instruction::noise(NoiseChannel::BitFlip { p: pm }, [q]));
                        inserted += 1;
                    }
                }
                out.push(inst.clone());
            }
            InstructionKind::Reset => {
                out.push(inst.clone());
                if pr > 0.0 {
                    for &q in &inst.qubits {
                        out.push(Instruction::noise(NoiseChannel::BitFlip { p: pr }, [q]));
                        inserted += 1;
                    }
                }
            }
            InstructionKind::Barrier | InstructionKind::Noise(_) => out.push(inst.clone()),
        })?;

        debug!(
            channels = inserted,
            ops = noisy.num_ops(),
            "Injected circuit-level noise"
        );
        Ok(noisy)
    }
}
