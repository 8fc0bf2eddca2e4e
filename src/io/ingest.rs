//! Batch CSV ingest and validation.
//!
//! This module is responsible for turning an applicant CSV (training column
//! names, any column order) into validated `ApplicantRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Missing markers** for the two imputable fields: empty, `NA`, `NaN`
//! - **Separation of concerns**: no scoring logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{ApplicantRecord, columns};
use crate::error::{AppError, EXIT_ARTIFACT, EXIT_INPUT};

/// Optional pass-through identifier column.
pub const ID_COLUMN: &str = "id";

/// Columns that must exist in the header (values may still be missing for the
/// imputable ones).
const REQUIRED: [&str; 10] = columns::RAW;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// One accepted row.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRow {
    pub line: usize,
    pub id: Option<String>,
    pub record: ApplicantRecord,
}

/// Ingest output: accepted rows + row errors.
#[derive(Debug, Clone)]
pub struct IngestedApplicants {
    pub rows: Vec<ApplicantRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load applicants from a CSV file.
pub fn load_applicants(path: &Path) -> Result<IngestedApplicants, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_applicants(file)
}

/// Load applicants from any reader (file, stdin, in-memory).
pub fn read_applicants<R: Read>(input: R) -> Result<IngestedApplicants, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = get_optional(&record, &header_map, ID_COLUMN).map(str::to_string);
        match parse_row(&record, &header_map) {
            Ok(applicant) => rows.push(ApplicantRow {
                line,
                id,
                record: applicant,
            }),
            Err(message) => {
                tracing::warn!(line, id = id.as_deref().unwrap_or(""), %message, "rejected applicant row");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("No valid applicant rows (read {rows_read}, rejected {}).", row_errors.len()),
        ));
    }

    Ok(IngestedApplicants {
        rows,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(&normalize_header_name(name)))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            EXIT_ARTIFACT,
            format!("Missing required column(s): {}", missing.join(", ")),
        ));
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ApplicantRecord, String> {
    let applicant = ApplicantRecord {
        revolving_utilization: parse_required_f64(record, header_map, columns::REVOLVING_UTILIZATION)?,
        age: parse_required_f64(record, header_map, columns::AGE)?,
        late_30_59: parse_required_count(record, header_map, columns::LATE_30_59)?,
        debt_ratio: parse_required_f64(record, header_map, columns::DEBT_RATIO)?,
        monthly_income: parse_imputable(record, header_map, columns::MONTHLY_INCOME)?,
        open_credit_lines: parse_required_count(record, header_map, columns::OPEN_CREDIT_LINES)?,
        late_90: parse_required_count(record, header_map, columns::LATE_90)?,
        real_estate_loans: parse_required_count(record, header_map, columns::REAL_ESTATE_LOANS)?,
        late_60_89: parse_required_count(record, header_map, columns::LATE_60_89)?,
        dependents: parse_imputable(record, header_map, columns::DEPENDENTS)?
            .map(|v| to_count(columns::DEPENDENTS, v))
            .transpose()?,
    };

    applicant.validate().map_err(|e| e.to_string())?;
    Ok(applicant)
}

fn parse_required_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))?;
    parse_f64(name, raw)
}

fn parse_required_count(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<u32, String> {
    let v = parse_required_f64(record, header_map, name)?;
    to_count(name, v)
}

/// `None` for an empty cell or a conventional missing marker.
fn parse_imputable(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<Option<f64>, String> {
    match get_optional(record, header_map, name) {
        None => Ok(None),
        Some(raw) if is_missing_marker(raw) => Ok(None),
        Some(raw) => parse_f64(name, raw).map(Some),
    }
}

fn is_missing_marker(s: &str) -> bool {
    s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan")
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{raw}'"))?;
    if !v.is_finite() {
        return Err(format!("Non-finite value for `{name}`: '{raw}'"));
    }
    Ok(v)
}

/// Counts may be written as `2` or `2.0`, but must be whole and non-negative.
fn to_count(name: &str, v: f64) -> Result<u32, String> {
    if v < 0.0 {
        return Err(format!("`{name}` must be >= 0, got {v}"));
    }
    if v.fract() != 0.0 {
        return Err(format!("`{name}` must be a whole count, got {v}"));
    }
    if v > f64::from(u32::MAX) {
        return Err(format!("`{name}` is too large: {v}"));
    }
    Ok(v as u32)
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}
