//! The simulation backend contract.

use crate::error::SimResult;
use crate::site::{NoiseRealization, NoiseSite};
use crate::syndrome::SampleRecord;

/// A backend that evaluates noise realizations on a fixed circuit.
///
/// Outcomes are reported relative to the noiseless reference, so the
/// empty realization always yields an all-zero record.
pub trait SimulationBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Number of detectors.
    fn num_detectors(&self) -> usize;

    /// Number of observables.
    fn num_observables(&self) -> usize;

    /// Noise sites in program order.
    fn noise_sites(&self) -> &[NoiseSite];

    /// Detector and observable flips caused by `realization`.
    fn simulate(&self, realization: &NoiseRealization) -> SimResult<SampleRecord>;
}
