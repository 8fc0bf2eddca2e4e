//! Command-line parsing for the credit-risk scorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ApplicantRecord;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "credit-risk", version, about = "Credit risk scoring from fitted artifacts")]
pub struct Cli {
    /// Directory holding the fitted artifacts (overrides `CREDIT_RISK_ARTIFACTS`).
    #[arg(long, global = true, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Log at debug level (`RUST_LOG` still takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score one applicant given on the command line.
    Score(ScoreArgs),
    /// Score every row of an applicant CSV.
    Batch(BatchArgs),
    /// Print the loaded artifact summary.
    Inspect,
    /// Write a synthetic applicant CSV for exercising `batch`.
    Sample(SampleArgs),
}

/// One applicant. Defaults match the scoring form.
#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Age in years (18-100).
    #[arg(long, default_value_t = 30.0)]
    pub age: f64,

    /// Monthly income.
    #[arg(long, default_value_t = 5000.0)]
    pub income: f64,

    /// Treat monthly income as missing (imputed with the fitted median).
    #[arg(long, conflicts_with = "income")]
    pub missing_income: bool,

    /// Debt ratio (monthly debt payments / monthly income).
    #[arg(long, default_value_t = 0.5)]
    pub debt_ratio: f64,

    /// Revolving utilization of unsecured lines.
    #[arg(long, default_value_t = 0.5)]
    pub utilization: f64,

    /// Number of open credit lines and loans.
    #[arg(long, default_value_t = 5)]
    pub open_lines: u32,

    /// Number of real estate loans or lines.
    #[arg(long, default_value_t = 1)]
    pub real_estate: u32,

    /// Number of dependents.
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Treat dependents as missing (imputed with the fitted mode).
    #[arg(long, conflicts_with = "dependents")]
    pub missing_dependents: bool,

    /// Times 30-59 days past due.
    #[arg(long, default_value_t = 0)]
    pub late_30_59: u32,

    /// Times 60-89 days past due.
    #[arg(long, default_value_t = 0)]
    pub late_60_89: u32,

    /// Times 90 or more days late.
    #[arg(long, default_value_t = 0)]
    pub late_90: u32,

    /// Emit JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Include the aligned and scaled feature vector.
    #[arg(long)]
    pub explain: bool,

    /// Write a Markdown debug bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

impl ScoreArgs {
    pub fn record(&self) -> ApplicantRecord {
        ApplicantRecord {
            revolving_utilization: self.utilization,
            age: self.age,
            late_30_59: self.late_30_59,
            debt_ratio: self.debt_ratio,
            monthly_income: (!self.missing_income).then_some(self.income),
            open_credit_lines: self.open_lines,
            late_90: self.late_90,
            real_estate_loans: self.real_estate,
            late_60_89: self.late_60_89,
            dependents: (!self.missing_dependents).then_some(self.dependents),
        }
    }
}

/// Options for batch scoring.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Applicant CSV using the training column names.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Results CSV (stdout when omitted).
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of applicants.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share of rows with missing income or dependents.
    #[arg(long, default_value_t = 0.2)]
    pub missing_rate: f64,

    /// Output CSV (stdout when omitted).
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}
