//! Pauli-frame simulation and sampling for logical error rate estimation.
//!
//! - [`FrameSimulator`] propagates explicit fault sets through a noisy
//!   Clifford circuit and reports detector and observable flips.
//! - [`DetectorErrorModel`] records the effect of every single fault, which
//!   is enough to evaluate any fault set by XOR.
//! - [`FaultSampler`] and [`ConditionalSampler`] draw trials from the model,
//!   unconditionally or with a fixed number of effective faults.
//! - [`LookupDecoder`] maps syndromes to the most likely observable flip.
//!
//! # Example
//!
//! ```
//! use scaler_ir::{Circuit, NoiseChannel, QubitId};
//! use scaler_sim::{Decoder, DetectorErrorModel, FrameSimulator, LookupDecoder};
//!
//! // Three bit-flip sites followed by two parity checks.
//! let mut c = Circuit::with_size("rep", 3);
//! for q in 0..3 {
//!     c.noise(NoiseChannel::BitFlip { p: 0.1 }, [QubitId(q)]).unwrap();
//! }
//! let m: Vec<_> = (0..3).map(|q| c.measure_record(QubitId(q)).unwrap()).collect();
//! c.add_detector([m[0], m[1]]).unwrap();
//! c.add_detector([m[1], m[2]]).unwrap();
//! c.add_observable([m[0]]).unwrap();
//!
//! let sim = FrameSimulator::new(&c).unwrap();
//! let dem = DetectorErrorModel::from_backend(&sim).unwrap();
//! let decoder = LookupDecoder::build(&dem, 1);
//!
//! assert_eq!(dem.active_sites().len(), 3);
//! assert_eq!(decoder.decode(&dem.site(0).classes[0].effect.detectors), 1);
//! ```

pub mod backend;
pub mod decoder;
pub mod dem;
pub mod enumerate;
pub mod error;
pub mod frame;
pub mod sampler;
pub mod site;
pub mod syndrome;

pub use backend::SimulationBackend;
pub use decoder::{Decoder, LookupDecoder, DEFAULT_DECODER_PATTERNS};
pub use dem::{DetectorErrorModel, EffectClass, SiteModel};
pub use enumerate::{
    auto_weight, cumulative_pattern_count, enumerate_from, enumerate_patterns, pattern_counts,
    Pattern,
};
pub use error::{SimError, SimResult};
pub use frame::{FrameSimulator, MAX_OBSERVABLES};
pub use sampler::{ConditionalSampler, FaultSampler, GeometricSkip, WeightDistribution};
pub use site::{Fault, NoiseRealization, NoiseSite};
pub use syndrome::{SampleRecord, Syndrome};
