//! CLI parsing and end-to-end tests.
//!
//! Argument parsing is checked against a mirror of the CLI definition
//! (the CLI is a binary crate); full commands run the built binary on
//! temporary code definitions.

const REP3_YAML: &str = "\
name: rep3
n: 3
k: 1
d: 3
stabilizers: [ZZI, IZZ]
logical_z: [ZZZ]
logical_x: [XXX]
scheme: Standard
rounds: 2
";

// ============================================================================
// Code definition loading
// ============================================================================

mod definitions {
    use super::REP3_YAML;
    use scaler_compile::{CodeDefinition, Scheme};
    use std::fs;

    #[test]
    fn test_yaml_definition_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rep3.yaml");
        fs::write(&path, REP3_YAML).unwrap();

        let source = fs::read_to_string(&path).unwrap();
        let def: CodeDefinition = serde_yaml_ng::from_str(&source).unwrap();
        assert_eq!(def.name, "rep3");
        assert_eq!(def.scheme, Scheme::Standard);
        assert_eq!(def.rounds, 2);
        assert!(def.build().is_ok());
    }

    #[test]
    fn test_non_commuting_definition_rejected() {
        let yaml = REP3_YAML.replace("[ZZI, IZZ]", "[ZZI, XII]");
        let def: CodeDefinition = serde_yaml_ng::from_str(&yaml).unwrap();
        assert!(def.build().is_err());
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

mod clap_parsing {
    use clap::{Parser, Subcommand, ValueEnum};
    use std::path::PathBuf;

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "scaler")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Basis {
        Z,
        X,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Method {
        MonteCarlo,
        Stratified,
        Symbolic,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Format {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Compile {
            code: PathBuf,
            #[arg(long)]
            scheme: Option<String>,
            #[arg(long)]
            rounds: Option<u32>,
            #[arg(long, value_enum)]
            basis: Option<Basis>,
            #[arg(long)]
            noise: Option<f64>,
            #[arg(long)]
            measurement_error: bool,
            #[arg(long)]
            reset_error: bool,
            #[arg(long)]
            ir: bool,
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
        Estimate {
            code: PathBuf,
            #[arg(short, long, value_enum, default_value = "monte-carlo")]
            method: Method,
            #[arg(short = 'p', long = "error-rate")]
            error_rate: f64,
            #[arg(long)]
            measurement_error: bool,
            #[arg(long)]
            reset_error: bool,
            #[arg(short, long)]
            config: Option<PathBuf>,
            #[arg(long)]
            min_events: Option<u64>,
            #[arg(long)]
            repeat: Option<u32>,
            #[arg(long)]
            seed: Option<u64>,
            #[arg(short, long, value_enum, default_value = "table")]
            format: Format,
        },
        Version,
    }

    #[test]
    fn test_parse_compile_minimal() {
        let cli = TestCli::try_parse_from(["scaler", "compile", "rep3.yaml"]).unwrap();
        match cli.command {
            TestCommands::Compile {
                code,
                scheme,
                basis,
                ir,
                output,
                ..
            } => {
                assert_eq!(code, PathBuf::from("rep3.yaml"));
                assert!(scheme.is_none());
                assert!(basis.is_none());
                assert!(!ir);
                assert!(output.is_none());
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_parse_compile_with_all_args() {
        let cli = TestCli::try_parse_from([
            "scaler",
            "compile",
            "steane.json",
            "--scheme",
            "Flag",
            "--rounds",
            "3",
            "--basis",
            "x",
            "--noise",
            "0.001",
            "--measurement-error",
            "--reset-error",
            "-o",
            "out.stim",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Compile {
                scheme,
                rounds,
                basis,
                noise,
                measurement_error,
                reset_error,
                output,
                ..
            } => {
                assert_eq!(scheme.as_deref(), Some("Flag"));
                assert_eq!(rounds, Some(3));
                assert_eq!(basis, Some(Basis::X));
                assert_eq!(noise, Some(0.001));
                assert!(measurement_error);
                assert!(reset_error);
                assert_eq!(output, Some(PathBuf::from("out.stim")));
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_parse_estimate_defaults() {
        let cli = TestCli::try_parse_from(["scaler", "estimate", "rep3.yaml", "-p", "0.001"]).unwrap();
        match cli.command {
            TestCommands::Estimate {
                method,
                error_rate,
                format,
                min_events,
                ..
            } => {
                assert_eq!(method, Method::MonteCarlo);
                assert_eq!(error_rate, 0.001);
                assert_eq!(format, Format::Table);
                assert!(min_events.is_none());
            }
            _ => panic!("expected estimate"),
        }
    }

    #[test]
    fn test_parse_estimate_stratified_json() {
        let cli = TestCli::try_parse_from([
            "scaler",
            "estimate",
            "rep3.yaml",
            "--method",
            "stratified",
            "--error-rate",
            "0.01",
            "--min-events",
            "50",
            "--repeat",
            "2",
            "--seed",
            "7",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Estimate {
                method,
                min_events,
                repeat,
                seed,
                format,
                ..
            } => {
                assert_eq!(method, Method::Stratified);
                assert_eq!(min_events, Some(50));
                assert_eq!(repeat, Some(2));
                assert_eq!(seed, Some(7));
                assert_eq!(format, Format::Json);
            }
            _ => panic!("expected estimate"),
        }
    }

    #[test]
    fn test_parse_estimate_missing_rate() {
        assert!(TestCli::try_parse_from(["scaler", "estimate", "rep3.yaml"]).is_err());
    }

    #[test]
    fn test_parse_unknown_method() {
        let result =
            TestCli::try_parse_from(["scaler", "estimate", "c.yaml", "-p", "0.1", "-m", "exact"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_verbose_vv() {
        let cli = TestCli::try_parse_from(["scaler", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_no_subcommand() {
        assert!(TestCli::try_parse_from(["scaler"]).is_err());
    }
}

// ============================================================================
// End-to-end runs of the binary
// ============================================================================

mod binary {
    use super::REP3_YAML;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};

    fn scaler(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_scaler"))
            .args(args)
            .output()
            .unwrap()
    }

    fn write_code(dir: &Path) -> PathBuf {
        let path = dir.join("rep3.yaml");
        fs::write(&path, REP3_YAML).unwrap();
        path
    }

    #[test]
    fn test_compile_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let code = write_code(dir.path());
        let out = dir.path().join("rep3.stim");

        let output = scaler(&[
            "compile",
            code.to_str().unwrap(),
            "--noise",
            "0.001",
            "-o",
            out.to_str().unwrap(),
        ]);
        assert!(output.status.success());

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("DETECTOR")).count(), 6);
        assert_eq!(
            text.lines()
                .filter(|l| l.starts_with("OBSERVABLE_INCLUDE"))
                .count(),
            1
        );
        assert!(text.contains("DEPOLARIZE2"));
    }

    #[test]
    fn test_compile_ir_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let code = write_code(dir.path());

        let output = scaler(&["compile", code.to_str().unwrap(), "--ir"]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.starts_with("c0 = Prop ZZI"));
        assert!(stdout.contains("o0 = Parity"));
    }

    #[test]
    fn test_estimate_symbolic_json() {
        let dir = tempfile::tempdir().unwrap();
        let code = write_code(dir.path());

        let output = scaler(&[
            "estimate",
            code.to_str().unwrap(),
            "--method",
            "symbolic",
            "-p",
            "0.01",
            "--format",
            "json",
        ]);
        assert!(output.status.success());
        let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["method"], "symbolic");
        let ler = result["ler"].as_f64().unwrap();
        assert!(ler > 0.0 && ler < 0.01);
    }

    #[test]
    fn test_missing_file_fails() {
        let output = scaler(&["compile", "does-not-exist.yaml"]);
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("File not found"));
    }

    #[test]
    fn test_invalid_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let code = write_code(dir.path());
        let config = dir.path().join("strat.yaml");
        fs::write(&config, "sample_gap: 500\nmax_sample_gap: 100\n").unwrap();

        let output = scaler(&[
            "estimate",
            code.to_str().unwrap(),
            "-m",
            "stratified",
            "-p",
            "0.01",
            "-c",
            config.to_str().unwrap(),
        ]);
        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("max_sample_gap"));
    }
}
