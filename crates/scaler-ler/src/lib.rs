//! Logical error rate estimation for stabilizer codes.
//!
//! Three estimators share one [`Experiment`] setup (noise rewrite, frame
//! simulator, detector error model, lookup decoder):
//!
//! - [`MonteCarloEstimator`]: direct sampling until enough logical errors
//!   are seen, with Wilson intervals;
//! - [`StratifiedEstimator`]: sampling conditioned on the number of
//!   effective faults, weighted by exact stratum probabilities;
//! - [`SymbolicEstimator`]: exact enumeration of low-weight fault patterns
//!   with a bound on the omitted mass.
//!
//! # Example
//!
//! ```
//! use scaler_compile::{lower, Compiler, NoiseModel, Scheme, StabilizerCode};
//! use scaler_ler::{SymbolicConfig, SymbolicEstimator};
//!
//! let code = StabilizerCode::repetition(3).unwrap();
//! let program = Compiler::new(Scheme::Standard).with_rounds(2).compile(&code).unwrap();
//! let circuit = lower(&program).unwrap().into_circuit();
//! let noise = NoiseModel::new(0.01, false, false).unwrap();
//!
//! let result = SymbolicEstimator::new(SymbolicConfig::default())
//!     .estimate(&circuit, &noise)
//!     .unwrap();
//! assert!(result.ler > 0.0 && result.ler < 0.01);
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod monte_carlo;
pub mod result;
pub mod stats;
pub mod stratified;
pub mod symbolic;

pub use config::{DEFAULT_CODE_DISTANCE, MonteCarloConfig, StratifiedConfig, SymbolicConfig};
pub use error::{ConfigError, LerError, LerResult};
pub use experiment::Experiment;
pub use monte_carlo::MonteCarloEstimator;
pub use result::{Confidence, EstimatorResult, RepeatedEstimate, StratumSummary};
pub use stratified::StratifiedEstimator;
pub use symbolic::SymbolicEstimator;
