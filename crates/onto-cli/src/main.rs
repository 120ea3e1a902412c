// ─────────────────────────────────────────────────────────────────────
// ONTO Epistemic Kernel — Command Line
// (C) 2026 The ONTO Kernel Authors. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! `onto`: evaluate prediction files, score text, print the ruleset.
//!
//! Exit status: 0 on success, 1 when the submitted records are at fault
//! (schema or join errors), 2 for configuration, I/O and usage errors.
//! Failures print exactly one `error: ...` line to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use onto_core::{parse_ground_truth, parse_predictions, Evaluator};
use onto_types::{Domain, EngineConfig, OntoError};

mod report;

use report::{EvaluationReport, TextScoreReport};

/// Deterministic epistemic-discipline scoring and compliance classification
#[derive(Parser)]
#[command(name = "onto")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level for diagnostics on stderr (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Engine configuration file (JSON); missing fields take defaults
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a prediction set against ground truth
    Evaluate {
        /// Predictions, JSON lines of {id, label, confidence}
        predictions: PathBuf,

        /// Ground truth, JSON lines of {id, label}
        ground_truth: PathBuf,

        /// Deployment domain (general, code, financial, legal, medical)
        #[arg(short, long, default_value = "general")]
        domain: Domain,

        /// Number of calibration bins
        #[arg(short, long)]
        bins: Option<usize>,

        /// Uncertainty-recall confidence threshold
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Fail when a ground-truth id has no prediction
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score free text for epistemic markers (stdin when FILE is omitted)
    ScoreText {
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the active ruleset as JSON
    Ruleset,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("error: {}", one_line(&err));
        return ExitCode::from(2);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("command failed: {err:?}");
            eprintln!("error: {}", one_line(&err));
            ExitCode::from(exit_status(&err))
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = match level.to_ascii_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        other => anyhow::bail!("invalid log level {other:?}"),
    };
    // Also installs the `log` bridge, so library records reach stderr.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("cannot initialise logging: {e}"))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Evaluate {
            predictions,
            ground_truth,
            domain,
            bins,
            threshold,
            strict,
            format,
        } => {
            if let Some(bins) = bins {
                config.n_bins = bins;
            }
            if let Some(threshold) = threshold {
                config.uncertainty_threshold = threshold;
            }
            config.strict_join |= strict;
            let evaluator = Evaluator::new(config)?;

            let preds = parse_predictions(&read_file(&predictions)?)
                .with_context(|| predictions.display().to_string())?;
            let truth = parse_ground_truth(&read_file(&ground_truth)?)
                .with_context(|| ground_truth.display().to_string())?;
            tracing::info!(
                predictions = preds.len(),
                ground_truth = truth.len(),
                %domain,
                "evaluating"
            );

            let result = evaluator.evaluate(&preds, &truth, domain)?;
            match format {
                OutputFormat::Text => println!("{}", EvaluationReport(&result)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&result.to_map())?)
                }
            }
        }

        Commands::ScoreText { file, format } => {
            let evaluator = Evaluator::new(config)?;
            let text = match file {
                Some(path) => read_file(&path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading stdin")?;
                    buf
                }
            };
            let score = evaluator.score_text(&text);
            match format {
                OutputFormat::Text => println!("{}", TextScoreReport(&score)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&score)?),
            }
        }

        Commands::Ruleset => {
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config.ruleset)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json = read_file(path)?;
            EngineConfig::from_json(&json).with_context(|| path.display().to_string())
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// 1 for record-level faults, 2 for everything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    let input_fault = err
        .chain()
        .filter_map(|e| e.downcast_ref::<OntoError>())
        .any(OntoError::is_input_error);
    if input_fault {
        1
    } else {
        2
    }
}

fn one_line(err: &anyhow::Error) -> String {
    format!("{err:#}").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_for_input_errors() {
        let err = anyhow::Error::new(OntoError::MissingGroundTruth { id: "q1".into() });
        assert_eq!(exit_status(&err), 1);
        let wrapped = anyhow::Error::new(OntoError::schema("q1", "label", "bad"))
            .context("preds.jsonl");
        assert_eq!(exit_status(&wrapped), 1);
    }

    #[test]
    fn test_exit_status_for_config_errors() {
        let err = anyhow::Error::new(OntoError::Config("n_bins must be >= 1".into()));
        assert_eq!(exit_status(&err), 2);
        assert_eq!(exit_status(&anyhow::anyhow!("cannot read x")), 2);
    }

    #[test]
    fn test_one_line_joins_context() {
        let err = anyhow::Error::new(OntoError::Config("bad\nvalue".into())).context("cfg.json");
        let line = one_line(&err);
        assert!(!line.contains('\n'));
        assert!(line.starts_with("cfg.json: "));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
