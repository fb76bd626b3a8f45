//! Estimate command implementation.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use scaler_compile::NoiseModel;
use scaler_ler::{
    MonteCarloConfig, MonteCarloEstimator, StratifiedConfig, StratifiedEstimator, SymbolicConfig,
    SymbolicEstimator,
};

use super::common::{
    build_circuit, load_code, load_document, print_repeated, print_result, CompileOverrides,
};
use crate::{Format, Method};

/// Arguments of the estimate command.
#[derive(Debug, Clone)]
pub struct EstimateArgs {
    pub code: PathBuf,
    pub method: Method,
    pub error_rate: f64,
    pub measurement_error: bool,
    pub reset_error: bool,
    pub config: Option<PathBuf>,
    pub min_events: Option<u64>,
    pub repeat: Option<u32>,
    pub seed: Option<u64>,
    pub format: Format,
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Execute the estimate command.
pub fn execute(args: &EstimateArgs) -> Result<()> {
    let definition = load_code(&args.code)?;
    let circuit = build_circuit(&definition, &CompileOverrides::default())?;
    let noise = NoiseModel::new(args.error_rate, args.measurement_error, args.reset_error)?;

    if args.format == Format::Table {
        println!(
            "{} Estimating LER of {} ({}, {} rounds) at p = {}",
            style("→").cyan().bold(),
            style(&definition.name).green(),
            definition.scheme,
            definition.rounds,
            style(args.error_rate).yellow()
        );
        println!(
            "  Circuit: {} qubits, {} detectors",
            circuit.num_qubits(),
            circuit.num_detectors()
        );
    }

    match args.method {
        Method::MonteCarlo => {
            let mut config: MonteCarloConfig = match &args.config {
                Some(path) => load_document(path)?,
                None => MonteCarloConfig::default(),
            };
            if let Some(n) = args.min_events {
                config.min_logical_events = n;
            }
            if let Some(n) = args.repeat {
                config.repeat = n;
            }
            if args.seed.is_some() {
                config.seed = args.seed;
            }

            let progress = spinner("Sampling (monte carlo)".into());
            let estimate = MonteCarloEstimator::new(config).estimate(&circuit, &noise);
            progress.finish_and_clear();
            let estimate = estimate?;

            match args.format {
                Format::Table => print_repeated(&estimate),
                Format::Json => println!("{}", serde_json::to_string_pretty(&estimate)?),
            }
        }

        Method::Stratified => {
            let mut config: StratifiedConfig = match &args.config {
                Some(path) => load_document(path)?,
                None => StratifiedConfig::default(),
            };
            config = config.or_code_distance(definition.d.max(1));
            if let Some(n) = args.min_events {
                config.min_logical_events = n;
            }
            if let Some(n) = args.repeat {
                config.repeat = n;
            }
            if args.seed.is_some() {
                config.seed = args.seed;
            }

            let progress = spinner("Sampling (stratified)".into());
            let estimate = StratifiedEstimator::new(config).estimate(&circuit, &noise);
            progress.finish_and_clear();
            let estimate = estimate?;

            match args.format {
                Format::Table => print_repeated(&estimate),
                Format::Json => println!("{}", serde_json::to_string_pretty(&estimate)?),
            }
        }

        Method::Symbolic => {
            if args.min_events.is_some() || args.repeat.is_some() || args.seed.is_some() {
                warn!("--min-events, --repeat and --seed have no effect on symbolic estimation");
            }
            let config: SymbolicConfig = match &args.config {
                Some(path) => load_document(path)?,
                None => SymbolicConfig::default(),
            };

            let progress = spinner("Enumerating fault patterns".into());
            let result = SymbolicEstimator::new(config).estimate(&circuit, &noise);
            progress.finish_and_clear();
            let result = result?;

            match args.format {
                Format::Table => print_result(&result),
                Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
    }

    Ok(())
}
