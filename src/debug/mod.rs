//! Debug bundle writer for inspecting one scoring request end to end.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::ScoreTrace;
use crate::domain::{ApplicantRecord, ScoreConfig, columns};
use crate::error::{AppError, EXIT_ARTIFACT};

/// Write `debug/credit_risk_debug_<timestamp>.md` for one request.
pub fn write_debug_bundle(
    record: &ApplicantRecord,
    trace: &ScoreTrace,
    config: &ScoreConfig,
) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), record, trace, config)
}

pub fn write_debug_bundle_in(
    dir: &Path,
    record: &ApplicantRecord,
    trace: &ScoreTrace,
    config: &ScoreConfig,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S%.3f");
    let path = dir.join(format!("credit_risk_debug_{ts}.md"));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to create debug file: {e}")))?;
    write_bundle(&mut file, record, trace, config)
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write debug bundle: {e}")))?;

    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

fn write_bundle(
    out: &mut impl Write,
    record: &ApplicantRecord,
    trace: &ScoreTrace,
    config: &ScoreConfig,
) -> std::io::Result<()> {
    writeln!(out, "# credit-risk debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- artifacts: {}", config.artifacts_dir.display())?;
    writeln!(out, "- probability: {:.6}", trace.assessment.probability)?;
    writeln!(out, "- band: {}", trace.assessment.band.display_name())?;

    writeln!(out, "\n## Applicant")?;
    writeln!(out, "| column | raw | imputed |")?;
    writeln!(out, "| - | - | - |")?;
    let raw = [
        (columns::REVOLVING_UTILIZATION, Some(record.revolving_utilization), trace.imputed.revolving_utilization),
        (columns::AGE, Some(record.age), trace.imputed.age),
        (columns::LATE_30_59, Some(f64::from(record.late_30_59)), f64::from(trace.imputed.late_30_59)),
        (columns::DEBT_RATIO, Some(record.debt_ratio), trace.imputed.debt_ratio),
        (columns::MONTHLY_INCOME, record.monthly_income, trace.imputed.monthly_income),
        (columns::OPEN_CREDIT_LINES, Some(f64::from(record.open_credit_lines)), f64::from(trace.imputed.open_credit_lines)),
        (columns::LATE_90, Some(f64::from(record.late_90)), f64::from(trace.imputed.late_90)),
        (columns::REAL_ESTATE_LOANS, Some(f64::from(record.real_estate_loans)), f64::from(trace.imputed.real_estate_loans)),
        (columns::LATE_60_89, Some(f64::from(record.late_60_89)), f64::from(trace.imputed.late_60_89)),
        (columns::DEPENDENTS, record.dependents.map(f64::from), trace.imputed.dependents),
    ];
    for (name, value, imputed) in raw {
        writeln!(out, "| {name} | {} | {imputed} |", fmt_opt(value))?;
    }

    let f = &trace.features;
    writeln!(out, "\n## Engineered")?;
    writeln!(out, "- {}: {}", columns::TOTAL_MISSED_PAYMENTS, f.total_missed_payments)?;
    writeln!(out, "- {}: {:.6}", columns::INCOME_DEBT_RATIO, f.income_debt_ratio)?;
    writeln!(out, "- {}: {:.6}", columns::CREDIT_BURDEN, f.credit_burden)?;
    writeln!(out, "- truncated age: {}", f.age)?;
    writeln!(out, "- AgeGroup: {}", f.age_group.map(|g| g.label()).unwrap_or("-"))?;

    writeln!(out, "\n## Feature vector")?;
    writeln!(out, "| # | column | aligned | scaled |")?;
    writeln!(out, "| - | - | - | - |")?;
    for (i, ((name, value), (_, scaled))) in trace.aligned.iter().zip(trace.scaled.iter()).enumerate() {
        writeln!(out, "| {i} | {name} | {value:.6} | {scaled:.6} |")?;
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "missing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::ScoringContext;
    use crate::io::artifacts::tests::demo_dir;

    #[test]
    fn bundle_records_imputation_and_vectors() {
        let ctx = ScoringContext::load(&demo_dir()).unwrap();
        let record = ApplicantRecord {
            dependents: None,
            ..ApplicantRecord::default()
        };
        let trace = ctx.trace(&record).unwrap();
        let config = ScoreConfig {
            artifacts_dir: demo_dir(),
            json: false,
            explain: false,
            debug: true,
        };

        let tmp = tempfile::tempdir().unwrap();
        let path = write_debug_bundle_in(tmp.path(), &record, &trace, &config).unwrap();
        let text = std::fs::read_to_string(path).unwrap();

        assert!(text.starts_with("# credit-risk debug bundle"));
        assert!(text.contains("| NumberOfDependents | missing | 0 |"));
        assert!(text.contains("| 15 | AgeGroup_Elderly |"));
    }
}
