//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - logical error rate estimation for stabilizer codes",
        style("ScaLER").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  scaler-ir       Clifford circuit intermediate representation");
    println!("  scaler-compile  Code model, IR compiler, lowering and noise");
    println!("  scaler-sim      Pauli-frame simulation, error models and samplers");
    println!("  scaler-ler      Monte Carlo, stratified and symbolic estimators");
    println!("  scaler-cli      Command-line interface");
    println!();
    println!("License:    {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
