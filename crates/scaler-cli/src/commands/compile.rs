//! Compile command implementation.

use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::PathBuf;

use scaler_compile::NoiseModel;
use scaler_ir::text::emit;

use super::common::{build_circuit, compile_program, load_code, CompileOverrides};
use crate::Basis;

/// Arguments of the compile command.
#[derive(Debug, Clone)]
pub struct CompileArgs {
    pub code: PathBuf,
    pub scheme: Option<String>,
    pub rounds: Option<u32>,
    pub basis: Option<Basis>,
    pub noise: Option<f64>,
    pub measurement_error: bool,
    pub reset_error: bool,
    pub ir: bool,
    pub output: Option<PathBuf>,
}

/// Execute the compile command.
pub fn execute(args: &CompileArgs) -> Result<()> {
    eprintln!(
        "{} Compiling {}",
        style("→").cyan().bold(),
        style(args.code.display()).green()
    );

    let definition = load_code(&args.code)?;
    let overrides = CompileOverrides {
        scheme: args.scheme.as_deref(),
        rounds: args.rounds,
        basis: args.basis,
    };

    let content = if args.ir {
        let program = compile_program(&definition, &overrides)?;
        eprintln!("  IR: {} instructions", program.len());
        program.to_string()
    } else {
        let mut circuit = build_circuit(&definition, &overrides)?;
        if let Some(p) = args.noise {
            let noise = NoiseModel::new(p, args.measurement_error, args.reset_error)?;
            circuit = noise.rewrite(&circuit)?;
        }
        eprintln!(
            "  Circuit: {} qubits, {} ops (depth {}), {} noise locations, {} detectors, {} observables",
            circuit.num_qubits(),
            circuit.num_ops(),
            circuit.depth(),
            circuit.num_noise_locations(),
            circuit.num_detectors(),
            circuit.num_observables()
        );
        emit(&circuit)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            eprintln!(
                "{} Output: {}",
                style("✓").green().bold(),
                style(path.display()).green()
            );
        }
        None => print!("{content}"),
    }

    Ok(())
}
