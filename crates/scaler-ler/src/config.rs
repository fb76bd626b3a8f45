//! Estimator configuration.
//!
//! Every configuration deserializes with defaults for missing fields and is
//! validated before any sampling starts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_min_logical_events() -> u64 {
    100
}

fn default_repeat() -> u32 {
    1
}

fn default_batch_size() -> u64 {
    10_000
}

fn default_max_trials() -> u64 {
    1_000_000_000
}

fn default_sample_budget() -> u64 {
    100_000
}

fn default_k_range() -> usize {
    5
}

fn default_num_subspace() -> usize {
    6
}

fn default_beta() -> f64 {
    4.0
}

fn default_sample_gap() -> u64 {
    100
}

fn default_max_sample_gap() -> u64 {
    5_000
}

fn default_max_subspace_sample() -> u64 {
    50_000
}

fn default_max_qubits() -> usize {
    64
}

fn default_max_patterns() -> u64 {
    2_000_000
}

/// Code distance assumed when a stratified configuration does not set one.
pub const DEFAULT_CODE_DISTANCE: usize = 3;

fn check(ok: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::new(field, reason))
    }
}

fn check_decoder_weight(weight: Option<usize>) -> Result<(), ConfigError> {
    check(
        weight.is_none_or(|w| w >= 1),
        "decoder_weight",
        "must be at least 1",
    )
}

/// Direct Monte Carlo sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Logical errors to observe before stopping.
    #[serde(default = "default_min_logical_events")]
    pub min_logical_events: u64,

    /// Independent runs.
    #[serde(default = "default_repeat")]
    pub repeat: u32,

    /// Trials per independently seeded block.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Trial cap per run.
    #[serde(default = "default_max_trials")]
    pub max_trials: u64,

    /// Wall-clock cap per run in seconds.
    #[serde(default)]
    pub time_budget_secs: Option<f64>,

    /// Base seed; drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Lookup decoder weight; chosen from the pattern count when absent.
    #[serde(default)]
    pub decoder_weight: Option<usize>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            min_logical_events: default_min_logical_events(),
            repeat: default_repeat(),
            batch_size: default_batch_size(),
            max_trials: default_max_trials(),
            time_budget_secs: None,
            seed: None,
            decoder_weight: None,
        }
    }
}

impl MonteCarloConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.min_logical_events > 0, "min_logical_events", "must be positive")?;
        check(self.repeat >= 1, "repeat", "must be at least 1")?;
        check(self.batch_size > 0, "batch_size", "must be positive")?;
        check(
            self.max_trials >= self.batch_size,
            "max_trials",
            "must be at least batch_size",
        )?;
        check(
            self.time_budget_secs.is_none_or(|t| t.is_finite() && t > 0.0),
            "time_budget_secs",
            "must be positive",
        )?;
        check_decoder_weight(self.decoder_weight)
    }
}

/// Adaptive sampling stratified by the number of effective faults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StratifiedConfig {
    /// Total trials across all strata.
    #[serde(default = "default_sample_budget")]
    pub sample_budget: u64,

    /// Strata refined per step.
    #[serde(default = "default_k_range")]
    pub k_range: usize,

    /// Largest stratum weight; heavier patterns form the truncated tail.
    #[serde(default = "default_num_subspace")]
    pub num_subspace: usize,

    /// Allocation exponent; larger values favour high-variance strata.
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Logical errors after which a stratum is settled.
    #[serde(default = "default_min_logical_events")]
    pub min_logical_events: u64,

    /// Trials per stratum in the initial pass.
    #[serde(default = "default_sample_gap")]
    pub sample_gap: u64,

    /// Most trials given to one stratum in one step.
    #[serde(default = "default_max_sample_gap")]
    pub max_sample_gap: u64,

    /// Most trials given to one stratum overall.
    #[serde(default = "default_max_subspace_sample")]
    pub max_subspace_sample: u64,

    /// Code distance; strata up to `(d - 1) / 2` faults with no events
    /// after the initial pass are settled. [`DEFAULT_CODE_DISTANCE`] when
    /// absent.
    #[serde(default)]
    pub code_distance: Option<usize>,

    /// Independent runs.
    #[serde(default = "default_repeat")]
    pub repeat: u32,

    /// Base seed; drawn from the OS when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Lookup decoder weight; chosen from the pattern count when absent.
    #[serde(default)]
    pub decoder_weight: Option<usize>,
}

impl Default for StratifiedConfig {
    fn default() -> Self {
        Self {
            sample_budget: default_sample_budget(),
            k_range: default_k_range(),
            num_subspace: default_num_subspace(),
            beta: default_beta(),
            min_logical_events: default_min_logical_events(),
            sample_gap: default_sample_gap(),
            max_sample_gap: default_max_sample_gap(),
            max_subspace_sample: default_max_subspace_sample(),
            code_distance: None,
            repeat: default_repeat(),
            seed: None,
            decoder_weight: None,
        }
    }
}

impl StratifiedConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.sample_budget > 0, "sample_budget", "must be positive")?;
        check(self.k_range > 0, "k_range", "must be positive")?;
        check(self.num_subspace > 0, "num_subspace", "must be positive")?;
        check(
            self.k_range <= self.num_subspace,
            "k_range",
            "must not exceed num_subspace",
        )?;
        check(
            self.beta.is_finite() && self.beta > 0.0,
            "beta",
            "must be positive and finite",
        )?;
        check(self.min_logical_events > 0, "min_logical_events", "must be positive")?;
        check(self.sample_gap > 0, "sample_gap", "must be positive")?;
        check(
            self.max_sample_gap >= self.sample_gap,
            "max_sample_gap",
            "must be at least sample_gap",
        )?;
        check(
            self.max_subspace_sample >= self.sample_gap,
            "max_subspace_sample",
            "must be at least sample_gap",
        )?;
        check(
            self.code_distance.is_none_or(|d| d > 0),
            "code_distance",
            "must be positive",
        )?;
        check(self.repeat >= 1, "repeat", "must be at least 1")?;
        check_decoder_weight(self.decoder_weight)
    }

    /// Use `distance` unless the configuration sets its own.
    #[must_use]
    pub fn or_code_distance(mut self, distance: usize) -> Self {
        self.code_distance.get_or_insert(distance);
        self
    }

    /// Faults the code corrects by construction.
    pub fn correctable_weight(&self) -> usize {
        self.code_distance
            .unwrap_or(DEFAULT_CODE_DISTANCE)
            .saturating_sub(1)
            / 2
    }
}

/// Exact enumeration of low-weight fault patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolicConfig {
    /// Largest circuit width accepted.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Largest number of patterns enumerated.
    #[serde(default = "default_max_patterns")]
    pub max_patterns: u64,

    /// Enumeration weight; the largest weight within `max_patterns` when
    /// absent.
    #[serde(default)]
    pub max_weight: Option<usize>,
}

impl Default for SymbolicConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_patterns: default_max_patterns(),
            max_weight: None,
        }
    }
}

impl SymbolicConfig {
    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.max_qubits > 0, "max_qubits", "must be positive")?;
        check(self.max_patterns > 0, "max_patterns", "must be positive")?;
        check(
            self.max_weight.is_none_or(|w| w >= 1),
            "max_weight",
            "must be at least 1",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(MonteCarloConfig::default().validate().is_ok());
        assert!(StratifiedConfig::default().validate().is_ok());
        assert!(SymbolicConfig::default().validate().is_ok());
    }

    #[test]
    fn test_monte_carlo_rejections() {
        let config = MonteCarloConfig {
            min_logical_events: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "min_logical_events");

        let config = MonteCarloConfig {
            max_trials: 10,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "max_trials");

        let config = MonteCarloConfig {
            time_budget_secs: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "time_budget_secs");
    }

    #[test]
    fn test_stratified_gap_order() {
        let config = StratifiedConfig {
            sample_gap: 200,
            max_sample_gap: 100,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.field, "max_sample_gap");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'max_sample_gap': must be at least sample_gap"
        );
    }

    #[test]
    fn test_stratified_k_range_bound() {
        let config = StratifiedConfig {
            k_range: 7,
            num_subspace: 6,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "k_range");

        let config = StratifiedConfig {
            beta: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "beta");
    }

    #[test]
    fn test_correctable_weight() {
        let config = StratifiedConfig {
            code_distance: Some(5),
            ..Default::default()
        };
        assert_eq!(config.correctable_weight(), 2);
        assert_eq!(StratifiedConfig::default().correctable_weight(), 1);
    }

    #[test]
    fn test_code_distance_from_definition() {
        let unset: StratifiedConfig = serde_yaml_ng::from_str("sample_budget: 5000\n").unwrap();
        assert_eq!(unset.code_distance, None);
        assert_eq!(unset.or_code_distance(5).correctable_weight(), 2);

        let explicit: StratifiedConfig = serde_yaml_ng::from_str("code_distance: 3\n").unwrap();
        let explicit = explicit.or_code_distance(7);
        assert_eq!(explicit.code_distance, Some(3));
        assert_eq!(explicit.correctable_weight(), 1);

        let zero = StratifiedConfig {
            code_distance: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.validate().unwrap_err().field, "code_distance");
    }

    #[test]
    fn test_symbolic_rejections() {
        let config = SymbolicConfig {
            max_weight: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field, "max_weight");
    }

    #[test]
    fn test_yaml_defaults() {
        let config: StratifiedConfig =
            serde_yaml_ng::from_str("sample_budget: 5000\nbeta: 2.5\n").unwrap();
        assert_eq!(config.sample_budget, 5000);
        assert_eq!(config.beta, 2.5);
        assert_eq!(config.max_subspace_sample, 50_000);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_json_defaults() {
        let config: MonteCarloConfig =
            serde_json::from_str(r#"{"min_logical_events": 20, "seed": 9}"#).unwrap();
        assert_eq!(config.min_logical_events, 20);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.batch_size, 10_000);
    }
}
