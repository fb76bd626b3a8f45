//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::de::DeserializeOwned;

use scaler_compile::{lower, CodeDefinition, Compiler, IrProgram, LogicalBasis, Scheme};
use scaler_ir::Circuit;
use scaler_ler::{EstimatorResult, RepeatedEstimate};

use crate::Basis;

/// Parse a YAML or JSON document, chosen by file extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "json" => serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
        _ => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid YAML in {}", path.display())),
    }
}

/// Load a code definition.
pub fn load_code(path: &Path) -> Result<CodeDefinition> {
    load_document(path)
}

/// Overrides applied on top of a code definition.
#[derive(Debug, Clone, Default)]
pub struct CompileOverrides<'a> {
    /// Scheme name.
    pub scheme: Option<&'a str>,
    /// Round count.
    pub rounds: Option<u32>,
    /// Readout basis.
    pub basis: Option<Basis>,
}

/// Validate `definition` and compile it into an IR program.
pub fn compile_program(definition: &CodeDefinition, overrides: &CompileOverrides<'_>) -> Result<IrProgram> {
    let code = definition
        .build()
        .with_context(|| format!("Invalid code '{}'", definition.name))?;

    let scheme = match overrides.scheme {
        Some(name) => name.parse::<Scheme>()?,
        None => definition.scheme,
    };
    let readout = match overrides.basis {
        Some(Basis::X) => LogicalBasis::X,
        Some(Basis::Z) | None => LogicalBasis::Z,
    };

    let program = Compiler::new(scheme)
        .with_rounds(overrides.rounds.unwrap_or(definition.rounds))
        .with_readout(readout)
        .compile(&code)
        .with_context(|| format!("Failed to compile '{}'", definition.name))?;
    Ok(program)
}

/// Compile and lower `definition` into a noiseless circuit.
pub fn build_circuit(definition: &CodeDefinition, overrides: &CompileOverrides<'_>) -> Result<Circuit> {
    let program = compile_program(definition, overrides)?;
    let lowered = lower(&program)
        .with_context(|| format!("Failed to lower '{}'", definition.name))?;
    Ok(lowered.into_circuit())
}

/// Print one estimator run as a table.
pub fn print_result(result: &EstimatorResult) {
    let status = if result.is_converged() {
        style("converged").green()
    } else {
        style("budget exhausted").yellow()
    };
    println!(
        "  {:<16} {}",
        "LER",
        style(format!("{:.4e}", result.ler)).cyan().bold()
    );
    println!(
        "  {:<16} [{:.4e}, {:.4e}]",
        "95% interval", result.ci_low, result.ci_high
    );
    println!("  {:<16} {:.4e}", "std error", result.std_error);
    println!(
        "  {:<16} {} / {}",
        "errors / trials", result.logical_errors, result.trials
    );
    if let Some(bound) = result.truncation_bound {
        println!("  {:<16} {:.4e}", "truncation", bound);
    }
    println!("  {:<16} {}", "status", status);
    println!("  {:<16} {:.2?}", "elapsed", result.elapsed);

    if !result.strata.is_empty() {
        println!();
        println!(
            "  {:>6} {:>12} {:>10} {:>8} {:>12}",
            "weight", "mass", "trials", "events", "rate"
        );
        for s in &result.strata {
            println!(
                "  {:>6} {:>12.4e} {:>10} {:>8} {:>12.4e}",
                s.weight, s.mass, s.trials, s.events, s.rate
            );
        }
    }
}

/// Print repeated runs as a table.
pub fn print_repeated(estimate: &RepeatedEstimate) {
    for (i, run) in estimate.runs.iter().enumerate() {
        if estimate.runs.len() > 1 {
            println!("\n{} Run {}", style("→").cyan().bold(), i + 1);
        }
        print_result(run);
    }
    if estimate.runs.len() > 1 {
        println!(
            "\n{} mean LER {:.4e}, std dev {:.4e} over {} runs",
            style("✓").green().bold(),
            estimate.mean,
            estimate.std_dev,
            estimate.runs.len()
        );
    }
}
