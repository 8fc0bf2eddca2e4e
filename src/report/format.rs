//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{ScoreTrace, ScoringContext};
use crate::domain::{ApplicantRecord, columns};
use crate::io::ingest::RowError;
use crate::models::ProbabilityModel;
use crate::report::BatchSummary;
use crate::risk::{HIGH_THRESHOLD, MEDIUM_THRESHOLD};

/// Width of the text risk meter.
const METER_WIDTH: usize = 40;

/// Signals the model weighs, shown under every assessment.
pub const KEY_FACTORS: [&str; 5] = [
    "Payment History (Late Payments)",
    "Debt-to-Income Ratio",
    "Credit Utilization",
    "Number of Credit Lines",
    "Age and Dependents",
];

/// Probability as a percentage with one decimal (`0.1234` -> `12.3%`).
pub fn fmt_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Format a single assessment with its recommendation and key factors.
pub fn format_assessment(record: &ApplicantRecord, trace: &ScoreTrace) -> String {
    let a = &trace.assessment;
    let mut out = String::new();

    out.push_str("=== Credit Risk Analysis ===\n");
    out.push_str(&format!("Risk Level: {}\n", a.band.display_name()));
    out.push_str(&format!(
        "Probability of Serious Delinquency: {}\n",
        fmt_percent(a.probability)
    ));
    out.push_str(&format!("{}\n", a.recommendation));
    out.push_str(&format!("{}\n", risk_meter(a.probability, METER_WIDTH)));

    if record.monthly_income.is_none() {
        out.push_str(&format!(
            "Note: {} missing; imputed with median {:.2}\n",
            columns::MONTHLY_INCOME,
            trace.imputed.monthly_income
        ));
    }
    if record.dependents.is_none() {
        out.push_str(&format!(
            "Note: {} missing; imputed with mode {}\n",
            columns::DEPENDENTS,
            trace.imputed.dependents
        ));
    }

    out.push_str("\nKey Factors Considered:\n");
    for factor in KEY_FACTORS {
        out.push_str(&format!("- {factor}\n"));
    }

    out.push_str(&format!(
        "\nRisk levels: Low < {:.0}% <= Medium < {:.0}% <= High\n",
        MEDIUM_THRESHOLD * 100.0,
        HIGH_THRESHOLD * 100.0
    ));
    out
}

/// `[#########...............] 37.5%`
pub fn risk_meter(p: f64, width: usize) -> String {
    let filled = ((p.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        ".".repeat(width - filled),
        fmt_percent(p)
    )
}

/// Engineered, aligned, and scaled values for every schema column.
pub fn format_explanation(trace: &ScoreTrace) -> String {
    let mut out = String::new();
    let f = &trace.features;

    out.push_str("Engineered features:\n");
    out.push_str(&format!("- {}: {}\n", columns::TOTAL_MISSED_PAYMENTS, f.total_missed_payments));
    out.push_str(&format!("- {}: {:.6}\n", columns::INCOME_DEBT_RATIO, f.income_debt_ratio));
    out.push_str(&format!("- {}: {:.6}\n", columns::CREDIT_BURDEN, f.credit_burden));
    out.push_str(&format!(
        "- AgeGroup: {}\n",
        f.age_group.map(|g| g.label()).unwrap_or("(none)")
    ));

    out.push_str("\nFeature vector:\n");
    out.push_str(&format!("{:<40} {:>14} {:>12}\n", "column", "value", "scaled"));
    out.push_str(&format!("{:-<40} {:-<14} {:-<12}\n", "", "", ""));
    for ((name, value), (_, scaled)) in trace.aligned.iter().zip(trace.scaled.iter()) {
        out.push_str(&format!("{:<40} {:>14.6} {:>12.6}\n", truncate(name, 40), value, scaled));
    }
    out
}

/// Batch totals and rejected rows, written to stderr after a batch run.
pub fn format_batch_summary(summary: &BatchSummary, rows_read: usize, row_errors: &[RowError]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Rows: read={rows_read} scored={} rejected={}\n",
        summary.scored,
        row_errors.len()
    ));
    out.push_str(&format!(
        "Bands: Low={} Medium={} High={}\n",
        summary.low, summary.medium, summary.high
    ));
    out.push_str(&format!(
        "Probability: mean={} max={}\n",
        fmt_percent(summary.mean_probability),
        fmt_percent(summary.max_probability)
    ));

    if !row_errors.is_empty() {
        out.push_str("\nRejected rows:\n");
        for e in row_errors {
            let id = e.id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default();
            out.push_str(&format!("- line {}{id}: {}\n", e.line, e.message));
        }
    }
    out
}

/// Loaded artifact overview for `credit-risk inspect`.
pub fn format_artifact_summary(ctx: &ScoringContext, source: &str) -> String {
    let mut out = String::new();
    let schema = ctx.schema();
    let scaler = ctx.scaler();
    let imputation = ctx.imputation();

    out.push_str("=== credit-risk artifacts ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Imputers: {} median={:.2} | {} mode={}\n",
        columns::MONTHLY_INCOME,
        imputation.income_median.statistic(),
        columns::DEPENDENTS,
        imputation.dependents_mode.statistic()
    ));
    out.push_str(&format!(
        "Widths: schema={} scaler={} model={}\n",
        schema.len(),
        scaler.len(),
        ctx.model().num_features()
    ));
    out.push_str(&format!(
        "Ensemble: trees={} nodes={} base_score={:.4}\n",
        ctx.model().tree_count(),
        ctx.model().node_count(),
        ctx.model().base_score()
    ));

    out.push_str(&format!("\n{:>3} {:<40} {:>14} {:>14}\n", "#", "column", "mean", "scale"));
    out.push_str(&format!("{:->3} {:-<40} {:-<14} {:-<14}\n", "", "", "", ""));
    for (i, name) in schema.names().iter().enumerate() {
        let mean = scaler.mean().get(i).map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string());
        let scale = scaler
            .scale_factors()
            .get(i)
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{i:>3} {:<40} {mean:>14} {scale:>14}\n", truncate(name, 40)));
    }

    let zero_filled = schema.zero_filled_columns();
    if !zero_filled.is_empty() {
        out.push_str(&format!("\nAlways zero (no producer): {}\n", zero_filled.join(", ")));
    }
    let dropped = schema.dropped_columns();
    if !dropped.is_empty() {
        out.push_str(&format!("Dropped (not in schema): {}\n", dropped.join(", ")));
    }
    out
}

/// JSON form of an assessment, optionally with the feature vectors.
pub fn assessment_json(trace: &ScoreTrace, explain: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "probability": trace.assessment.probability,
        "band": trace.assessment.band,
        "risk_level": trace.assessment.band.display_name(),
        "recommendation": trace.assessment.recommendation,
    });
    if explain {
        let aligned: serde_json::Map<String, serde_json::Value> =
            trace.aligned.iter().map(|(k, v)| (k.to_string(), v.into())).collect();
        let scaled: serde_json::Map<String, serde_json::Value> =
            trace.scaled.iter().map(|(k, v)| (k.to_string(), v.into())).collect();
        value["imputed"] = serde_json::to_value(&trace.imputed).unwrap_or_default();
        value["features"] = serde_json::to_value(&trace.features).unwrap_or_default();
        value["aligned"] = aligned.into();
        value["scaled"] = scaled.into();
    }
    value
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::artifacts::tests::demo_dir;

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(fmt_percent(0.1234), "12.3%");
        assert_eq!(fmt_percent(1.0), "100.0%");
        assert_eq!(fmt_percent(0.0), "0.0%");
    }

    #[test]
    fn meter_fills_proportionally() {
        assert_eq!(risk_meter(0.5, 4), "[##..] 50.0%");
        assert_eq!(risk_meter(0.0, 3), "[...] 0.0%");
        assert_eq!(risk_meter(1.0, 3), "[###] 100.0%");
    }

    #[test]
    fn assessment_report_mentions_band_and_imputation() {
        let ctx = ScoringContext::load(&demo_dir()).unwrap();
        let record = ApplicantRecord {
            monthly_income: None,
            ..ApplicantRecord::default()
        };
        let trace = ctx.trace(&record).unwrap();
        let text = format_assessment(&record, &trace);
        assert!(text.contains("Risk Level: Low Risk"));
        assert!(text.contains("MonthlyIncome missing; imputed with median 5400.00"));
        assert!(text.contains("Payment History (Late Payments)"));
        assert!(!text.contains("NumberOfDependents missing"));
    }

    #[test]
    fn explanation_lists_every_schema_column() {
        let ctx = ScoringContext::load(&demo_dir()).unwrap();
        let trace = ctx.trace(&ApplicantRecord::default()).unwrap();
        let text = format_explanation(&trace);
        for name in ctx.schema().names() {
            assert!(text.contains(name.as_str()), "missing {name}");
        }

        let json = assessment_json(&trace, true);
        assert_eq!(json["aligned"].as_object().unwrap().len(), ctx.schema().len());
        assert_eq!(json["band"], "low");
    }

    #[test]
    fn artifact_summary_reports_widths() {
        let ctx = ScoringContext::load(&demo_dir()).unwrap();
        let text = format_artifact_summary(&ctx, "demo");
        assert!(text.contains("Widths: schema=16 scaler=16 model=16"));
        assert!(text.contains("AgeGroup_Elderly"));
    }
}
