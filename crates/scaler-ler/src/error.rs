//! Error types for estimation.

use scaler_compile::NoiseError;
use scaler_ir::IrError;
use scaler_sim::SimError;
use thiserror::Error;

/// A configuration field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for '{field}': {reason}")]
pub struct ConfigError {
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the estimators.
///
/// Running out of budget is not an error; it is reported through
/// [`Confidence::BudgetExhausted`](crate::Confidence::BudgetExhausted) on
/// the returned result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LerError {
    /// Configuration rejected before any sampling.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested exact computation is too large.
    #[error("Intractable: {reason}")]
    Intractable {
        /// Which limit was exceeded.
        reason: String,
    },

    /// A noise site fires with certainty, so no trial is error free.
    #[error("Noise site {site} always produces an effect; stratification is undefined")]
    DegenerateNoise {
        /// Site index.
        site: usize,
    },

    /// Circuit IR error.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),

    /// Simulation error.
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    /// Noise model error.
    #[error("Noise error: {0}")]
    Noise(#[from] NoiseError),
}

/// Result type for estimation.
pub type LerResult<T> = Result<T, LerError>;
