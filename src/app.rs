//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging and resolves the artifact directory
//! - loads the fitted artifacts once
//! - runs single or batch scoring
//! - prints reports and writes optional exports

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, SampleArgs, ScoreArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::ScoreConfig;
use crate::error::{AppError, EXIT_ARTIFACT, PipelineError};
use crate::report::{self, summarize};

pub mod pipeline;

use pipeline::ScoringContext;

/// Environment variable naming the artifact directory.
pub const ARTIFACTS_ENV: &str = "CREDIT_RISK_ARTIFACTS";

/// Artifact directory used when neither the flag nor the environment names one.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Entry point for the `credit-risk` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    // A local .env may carry CREDIT_RISK_ARTIFACTS.
    dotenvy::dotenv().ok();
    let artifacts_dir = resolve_artifacts_dir(cli.artifacts, std::env::var(ARTIFACTS_ENV).ok());

    match cli.command {
        Command::Score(args) => handle_score(args, artifacts_dir),
        Command::Batch(args) => handle_batch(args, &artifacts_dir),
        Command::Inspect => handle_inspect(&artifacts_dir),
        Command::Sample(args) => handle_sample(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore a second init (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Flag first, then the environment, then `./artifacts`.
pub fn resolve_artifacts_dir(flag: Option<PathBuf>, env: Option<String>) -> PathBuf {
    flag.or_else(|| env.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
}

fn handle_score(args: ScoreArgs, artifacts_dir: PathBuf) -> Result<(), AppError> {
    let config = ScoreConfig {
        artifacts_dir,
        json: args.json,
        explain: args.explain,
        debug: args.debug,
    };

    let record = args.record();
    record.validate()?;

    let ctx = ScoringContext::load(&config.artifacts_dir)?;
    let trace = ctx.trace(&record)?;

    if config.json {
        let value = report::assessment_json(&trace, config.explain);
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to serialize assessment: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", report::format_assessment(&record, &trace));
        if config.explain {
            println!("{}", report::format_explanation(&trace));
        }
    }

    if config.debug {
        let path = crate::debug::write_debug_bundle(&record, &trace, &config)?;
        eprintln!("Debug bundle: {}", path.display());
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, artifacts_dir: &Path) -> Result<(), AppError> {
    let ctx = ScoringContext::load(artifacts_dir)?;
    let ingested = crate::io::load_applicants(&args.input)?;

    let records: Vec<_> = ingested.rows.iter().map(|r| r.record.clone()).collect();
    let results = ctx.assess_batch(&records);

    let mut scored = Vec::with_capacity(results.len());
    for (row, result) in ingested.rows.iter().zip(results) {
        match result {
            Ok(assessment) => scored.push((row.clone(), assessment)),
            Err(err @ PipelineError::SchemaMismatch { .. }) => {
                return Err(AppError::new(
                    err.exit_code(),
                    format!("Batch aborted at line {}: {err}", row.line),
                ));
            }
            Err(err) => return Err(err.into()),
        }
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(EXIT_ARTIFACT, format!("Failed to create '{}': {e}", path.display()))
            })?;
            crate::io::write_results_csv(BufWriter::new(file), &scored)?;
        }
        None => crate::io::write_results_csv(std::io::stdout().lock(), &scored)?,
    }

    let summary = summarize(scored.iter().map(|(_, a)| a));
    tracing::info!(scored = summary.scored, rejected = ingested.row_errors.len(), "batch complete");
    eprint!(
        "{}",
        report::format_batch_summary(&summary, ingested.rows_read, &ingested.row_errors)
    );
    Ok(())
}

fn handle_inspect(artifacts_dir: &Path) -> Result<(), AppError> {
    let ctx = ScoringContext::load(artifacts_dir)?;
    println!(
        "{}",
        report::format_artifact_summary(&ctx, &artifacts_dir.display().to_string())
    );
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let records = generate_sample(&SampleConfig {
        count: args.count,
        seed: args.seed,
        missing_rate: args.missing_rate,
    })?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(EXIT_ARTIFACT, format!("Failed to create '{}': {e}", path.display()))
            })?;
            let mut out = BufWriter::new(file);
            crate::io::write_applicants_csv(&mut out, &records)?;
            out.flush()
                .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to flush '{}': {e}", path.display())))?;
            eprintln!("Wrote {} applicants to {}", records.len(), path.display());
        }
        None => crate::io::write_applicants_csv(std::io::stdout().lock(), &records)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_environment() {
        let dir = resolve_artifacts_dir(Some(PathBuf::from("flag")), Some("env".to_string()));
        assert_eq!(dir, PathBuf::from("flag"));
    }

    #[test]
    fn environment_wins_over_default() {
        assert_eq!(resolve_artifacts_dir(None, Some("env".to_string())), PathBuf::from("env"));
        assert_eq!(resolve_artifacts_dir(None, Some("  ".to_string())), PathBuf::from(DEFAULT_ARTIFACTS_DIR));
        assert_eq!(resolve_artifacts_dir(None, None), PathBuf::from(DEFAULT_ARTIFACTS_DIR));
    }
}
