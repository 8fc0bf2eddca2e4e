//! Export batch results and synthetic samples to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::io::Write;

use serde::Serialize;

use crate::domain::{ApplicantRecord, RiskAssessment, RiskBand};
use crate::error::{AppError, EXIT_ARTIFACT};
use crate::io::ingest::ApplicantRow;

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    line: usize,
    id: &'a str,
    probability: String,
    risk_band: RiskBand,
    recommendation: &'a str,
}

/// Write one result row per scored applicant.
pub fn write_results_csv<W: Write>(
    out: W,
    scored: &[(ApplicantRow, RiskAssessment)],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    for (row, assessment) in scored {
        writer
            .serialize(ResultRow {
                line: row.line,
                id: row.id.as_deref().unwrap_or(""),
                probability: format!("{:.6}", assessment.probability),
                risk_band: assessment.band,
                recommendation: &assessment.recommendation,
            })
            .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write results CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to flush results CSV: {e}")))?;
    Ok(())
}

/// Write applicants with the training column names (missing values left empty).
pub fn write_applicants_csv<W: Write>(out: W, records: &[ApplicantRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    for (i, record) in records.iter().enumerate() {
        writer
            .serialize(SampleRow::new(format!("S{:05}", i + 1), record))
            .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write sample CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

/// Applicant columns under their training names.
///
/// The CSV serializer does not support `#[serde(flatten)]`.
#[derive(Debug, Serialize)]
struct SampleRow {
    id: String,
    #[serde(rename = "RevolvingUtilizationOfUnsecuredLines")]
    revolving_utilization: f64,
    age: f64,
    #[serde(rename = "NumberOfTime30-59DaysPastDueNotWorse")]
    late_30_59: u32,
    #[serde(rename = "DebtRatio")]
    debt_ratio: f64,
    #[serde(rename = "MonthlyIncome")]
    monthly_income: Option<f64>,
    #[serde(rename = "NumberOfOpenCreditLinesAndLoans")]
    open_credit_lines: u32,
    #[serde(rename = "NumberOfTimes90DaysLate")]
    late_90: u32,
    #[serde(rename = "NumberRealEstateLoansOrLines")]
    real_estate_loans: u32,
    #[serde(rename = "NumberOfTime60-89DaysPastDueNotWorse")]
    late_60_89: u32,
    #[serde(rename = "NumberOfDependents")]
    dependents: Option<u32>,
}

impl SampleRow {
    fn new(id: String, r: &ApplicantRecord) -> Self {
        Self {
            id,
            revolving_utilization: r.revolving_utilization,
            age: r.age,
            late_30_59: r.late_30_59,
            debt_ratio: r.debt_ratio,
            monthly_income: r.monthly_income,
            open_credit_lines: r.open_credit_lines,
            late_90: r.late_90,
            real_estate_loans: r.real_estate_loans,
            late_60_89: r.late_60_89,
            dependents: r.dependents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_applicants;

    #[test]
    fn sample_csv_reads_back_through_ingest() {
        let records = vec![
            ApplicantRecord::default(),
            ApplicantRecord {
                monthly_income: None,
                dependents: None,
                age: 70.0,
                ..ApplicantRecord::default()
            },
        ];
        let mut buf = Vec::new();
        write_applicants_csv(&mut buf, &records).unwrap();

        let ingested = read_applicants(buf.as_slice()).unwrap();
        assert!(ingested.row_errors.is_empty());
        let back: Vec<_> = ingested.rows.iter().map(|r| r.record.clone()).collect();
        assert_eq!(back, records);
        assert_eq!(ingested.rows[1].id.as_deref(), Some("S00002"));
    }

    #[test]
    fn results_csv_has_header_and_band() {
        let row = ApplicantRow {
            line: 2,
            id: Some("A1".to_string()),
            record: ApplicantRecord::default(),
        };
        let assessment = crate::risk::assess(0.75).unwrap();
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &[(row, assessment)]).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("line,id,probability,risk_band,recommendation"));
        assert_eq!(
            lines.next(),
            Some("2,A1,0.750000,high,This applicant appears to be a high credit risk.")
        );
    }
}
