//! ScaLER command-line interface.
//!
//! Compiles stabilizer code definitions into noisy Clifford circuits and
//! estimates their logical error rates.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compile, estimate, version};

/// ScaLER - logical error rate estimation for stabilizer codes
#[derive(Parser)]
#[command(name = "scaler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Logical basis measured at the end of the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Basis {
    /// Logical Z memory
    Z,
    /// Logical X memory
    X,
}

/// LER estimation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Direct Monte Carlo sampling
    MonteCarlo,
    /// Sampling stratified by fault weight
    Stratified,
    /// Exact enumeration of low-weight faults
    Symbolic,
}

/// Result rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable table
    Table,
    /// JSON document
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a code definition into a circuit
    Compile {
        /// Code definition (YAML or JSON)
        code: PathBuf,

        /// Syndrome extraction scheme (Standard, Shor, Knill, Flag)
        #[arg(long)]
        scheme: Option<String>,

        /// Number of syndrome extraction rounds
        #[arg(long)]
        rounds: Option<u32>,

        /// Logical readout basis
        #[arg(long, value_enum)]
        basis: Option<Basis>,

        /// Physical error rate to attach as circuit noise
        #[arg(long)]
        noise: Option<f64>,

        /// Add measurement flips
        #[arg(long)]
        measurement_error: bool,

        /// Add reset flips
        #[arg(long)]
        reset_error: bool,

        /// Print the IR program instead of the circuit
        #[arg(long)]
        ir: bool,

        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate the logical error rate of a code
    Estimate {
        /// Code definition (YAML or JSON)
        code: PathBuf,

        /// Estimation method
        #[arg(short, long, value_enum, default_value = "monte-carlo")]
        method: Method,

        /// Physical error rate
        #[arg(short = 'p', long = "error-rate")]
        error_rate: f64,

        /// Add measurement flips
        #[arg(long)]
        measurement_error: bool,

        /// Add reset flips
        #[arg(long)]
        reset_error: bool,

        /// Estimator configuration (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Logical errors to observe before stopping
        #[arg(long)]
        min_events: Option<u64>,

        /// Independent runs
        #[arg(long)]
        repeat: Option<u32>,

        /// Base seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: Format,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compile {
            code,
            scheme,
            rounds,
            basis,
            noise,
            measurement_error,
            reset_error,
            ir,
            output,
        } => compile::execute(&compile::CompileArgs {
            code,
            scheme,
            rounds,
            basis,
            noise,
            measurement_error,
            reset_error,
            ir,
            output,
        }),

        Commands::Estimate {
            code,
            method,
            error_rate,
            measurement_error,
            reset_error,
            config,
            min_events,
            repeat,
            seed,
            format,
        } => estimate::execute(&estimate::EstimateArgs {
            code,
            method,
            error_rate,
            measurement_error,
            reset_error,
            config,
            min_events,
            repeat,
            seed,
            format,
        }),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
