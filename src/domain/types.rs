//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from CLI flags or batch CSV rows
//! - passed through the scoring pipeline by reference
//! - exported to JSON/CSV alongside the assessment

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Training-time column names.
///
/// These strings are the external contract with the fitted artifacts: the
/// schema file, the scaler and the ensemble were all produced against them.
pub mod columns {
    pub const REVOLVING_UTILIZATION: &str = "RevolvingUtilizationOfUnsecuredLines";
    pub const AGE: &str = "age";
    pub const LATE_30_59: &str = "NumberOfTime30-59DaysPastDueNotWorse";
    pub const DEBT_RATIO: &str = "DebtRatio";
    pub const MONTHLY_INCOME: &str = "MonthlyIncome";
    pub const OPEN_CREDIT_LINES: &str = "NumberOfOpenCreditLinesAndLoans";
    pub const LATE_90: &str = "NumberOfTimes90DaysLate";
    pub const REAL_ESTATE_LOANS: &str = "NumberRealEstateLoansOrLines";
    pub const LATE_60_89: &str = "NumberOfTime60-89DaysPastDueNotWorse";
    pub const DEPENDENTS: &str = "NumberOfDependents";

    pub const TOTAL_MISSED_PAYMENTS: &str = "TotalMissedPayments";
    pub const INCOME_DEBT_RATIO: &str = "IncomeDebtRatio";
    pub const CREDIT_BURDEN: &str = "CreditBurden";

    /// Prefix of the one-hot `AgeGroup` indicator columns.
    pub const AGE_GROUP_PREFIX: &str = "AgeGroup_";

    /// Training label; never part of a feature vector.
    pub const LABEL: &str = "SeriousDlqin2yrs";

    /// The ten raw applicant columns, in training CSV order.
    pub const RAW: [&str; 10] = [
        REVOLVING_UTILIZATION,
        AGE,
        LATE_30_59,
        DEBT_RATIO,
        MONTHLY_INCOME,
        OPEN_CREDIT_LINES,
        LATE_90,
        REAL_ESTATE_LOANS,
        LATE_60_89,
        DEPENDENTS,
    ];
}

/// Lowest age accepted at the input boundary.
pub const MIN_AGE: f64 = 18.0;
/// Highest age accepted at the input boundary.
pub const MAX_AGE: f64 = 100.0;

/// One raw applicant, as supplied by a caller.
///
/// `monthly_income` and `dependents` may be missing; the pipeline fills them
/// from the fitted imputers. Serde names match the training columns so a
/// record can be read from or written to JSON with the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    #[serde(rename = "RevolvingUtilizationOfUnsecuredLines")]
    pub revolving_utilization: f64,
    #[serde(rename = "age")]
    pub age: f64,
    #[serde(rename = "NumberOfTime30-59DaysPastDueNotWorse")]
    pub late_30_59: u32,
    #[serde(rename = "DebtRatio")]
    pub debt_ratio: f64,
    #[serde(rename = "MonthlyIncome")]
    pub monthly_income: Option<f64>,
    #[serde(rename = "NumberOfOpenCreditLinesAndLoans")]
    pub open_credit_lines: u32,
    #[serde(rename = "NumberOfTimes90DaysLate")]
    pub late_90: u32,
    #[serde(rename = "NumberRealEstateLoansOrLines")]
    pub real_estate_loans: u32,
    #[serde(rename = "NumberOfTime60-89DaysPastDueNotWorse")]
    pub late_60_89: u32,
    #[serde(rename = "NumberOfDependents")]
    pub dependents: Option<u32>,
}

impl Default for ApplicantRecord {
    /// The starting values of the applicant entry form.
    fn default() -> Self {
        Self {
            revolving_utilization: 0.5,
            age: 30.0,
            late_30_59: 0,
            debt_ratio: 0.5,
            monthly_income: Some(5000.0),
            open_credit_lines: 5,
            late_90: 0,
            real_estate_loans: 1,
            late_60_89: 0,
            dependents: Some(0),
        }
    }
}

impl ApplicantRecord {
    /// Check caller-facing input constraints.
    ///
    /// This runs before a record enters the pipeline; the feature engineer
    /// assumes its input already passed here. Counts are unsigned by type.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.age.is_finite() || self.age < MIN_AGE || self.age > MAX_AGE {
            return Err(PipelineError::invalid(
                columns::AGE,
                format!("must be within [{MIN_AGE}, {MAX_AGE}], got {}", self.age),
            ));
        }
        non_negative(columns::REVOLVING_UTILIZATION, self.revolving_utilization)?;
        non_negative(columns::DEBT_RATIO, self.debt_ratio)?;
        if let Some(income) = self.monthly_income {
            non_negative(columns::MONTHLY_INCOME, income)?;
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), PipelineError> {
    if !value.is_finite() {
        return Err(PipelineError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(PipelineError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

/// Age bucket derived from the truncated age.
///
/// Variant order is the training-time category order; the first variant is
/// the dropped level of the one-hot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Young")]
    Young,
    #[serde(rename = "Middle-aged")]
    MiddleAged,
    #[serde(rename = "Senior")]
    Senior,
    #[serde(rename = "Elderly")]
    Elderly,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Young,
        AgeGroup::MiddleAged,
        AgeGroup::Senior,
        AgeGroup::Elderly,
    ];

    /// Category label exactly as it appeared in training data.
    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Young => "Young",
            AgeGroup::MiddleAged => "Middle-aged",
            AgeGroup::Senior => "Senior",
            AgeGroup::Elderly => "Elderly",
        }
    }

    /// Right-closed bins `(0,30] (30,50] (50,65] (65,100]`.
    ///
    /// Returns `None` outside `(0, 100]`.
    pub fn from_age(age: i64) -> Option<Self> {
        match age {
            1..=30 => Some(AgeGroup::Young),
            31..=50 => Some(AgeGroup::MiddleAged),
            51..=65 => Some(AgeGroup::Senior),
            66..=100 => Some(AgeGroup::Elderly),
            _ => None,
        }
    }
}

/// Applicant after imputation: every field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedRecord {
    pub revolving_utilization: f64,
    pub age: f64,
    pub late_30_59: u32,
    pub debt_ratio: f64,
    pub monthly_income: f64,
    pub open_credit_lines: u32,
    pub late_90: u32,
    pub real_estate_loans: u32,
    pub late_60_89: u32,
    pub dependents: f64,
}

/// Raw pass-through fields plus the derived signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineeredFeatures {
    pub revolving_utilization: f64,
    /// Truncated to a whole number of years.
    pub age: f64,
    pub late_30_59: u32,
    pub debt_ratio: f64,
    pub monthly_income: f64,
    pub open_credit_lines: u32,
    pub late_90: u32,
    pub real_estate_loans: u32,
    pub late_60_89: u32,
    pub dependents: f64,

    pub total_missed_payments: u64,
    pub income_debt_ratio: f64,
    pub credit_burden: f64,
    pub age_group: Option<AgeGroup>,
}

impl EngineeredFeatures {
    /// Numeric columns by training name (everything except the categorical group).
    pub fn numeric_columns(&self) -> [(&'static str, f64); 13] {
        [
            (columns::REVOLVING_UTILIZATION, self.revolving_utilization),
            (columns::AGE, self.age),
            (columns::LATE_30_59, f64::from(self.late_30_59)),
            (columns::DEBT_RATIO, self.debt_ratio),
            (columns::MONTHLY_INCOME, self.monthly_income),
            (columns::OPEN_CREDIT_LINES, f64::from(self.open_credit_lines)),
            (columns::LATE_90, f64::from(self.late_90)),
            (columns::REAL_ESTATE_LOANS, f64::from(self.real_estate_loans)),
            (columns::LATE_60_89, f64::from(self.late_60_89)),
            (columns::DEPENDENTS, self.dependents),
            (columns::TOTAL_MISSED_PAYMENTS, self.total_missed_payments as f64),
            (columns::INCOME_DEBT_RATIO, self.income_debt_ratio),
            (columns::CREDIT_BURDEN, self.credit_burden),
        ]
    }
}

/// Discrete risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            RiskBand::Low => "This applicant appears to be a low credit risk.",
            RiskBand::Medium => "This applicant has moderate credit risk. Further review recommended.",
            RiskBand::High => "This applicant appears to be a high credit risk.",
        }
    }
}

/// Scoring output for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub band: RiskBand,
    pub recommendation: String,
}

/// A run's configuration as understood by the app layer.
///
/// This is derived from CLI flags plus the environment.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub artifacts_dir: PathBuf,
    /// Emit JSON instead of the text report.
    pub json: bool,
    /// Include the aligned and scaled feature vectors in the output.
    pub explain: bool,
    /// Write a Markdown debug bundle for the request.
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_valid() {
        assert!(ApplicantRecord::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_age() {
        for age in [17.0, 100.5, f64::NAN] {
            let record = ApplicantRecord {
                age,
                ..ApplicantRecord::default()
            };
            let err = record.validate().unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput { field: "age", .. }));
        }
    }

    #[test]
    fn validate_rejects_negative_ratios_and_income() {
        let record = ApplicantRecord {
            debt_ratio: -0.1,
            ..ApplicantRecord::default()
        };
        assert!(matches!(
            record.validate(),
            Err(PipelineError::InvalidInput { field: columns::DEBT_RATIO, .. })
        ));

        let record = ApplicantRecord {
            monthly_income: Some(-1.0),
            ..ApplicantRecord::default()
        };
        assert!(matches!(
            record.validate(),
            Err(PipelineError::InvalidInput { field: columns::MONTHLY_INCOME, .. })
        ));
    }

    #[test]
    fn utilization_above_one_is_accepted() {
        let record = ApplicantRecord {
            revolving_utilization: 3.5,
            ..ApplicantRecord::default()
        };
        assert!(record.validate().is_ok());
    }

    #[test]
    fn age_group_bin_edges() {
        assert_eq!(AgeGroup::from_age(30), Some(AgeGroup::Young));
        assert_eq!(AgeGroup::from_age(31), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(50), Some(AgeGroup::MiddleAged));
        assert_eq!(AgeGroup::from_age(51), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(65), Some(AgeGroup::Senior));
        assert_eq!(AgeGroup::from_age(66), Some(AgeGroup::Elderly));
        assert_eq!(AgeGroup::from_age(100), Some(AgeGroup::Elderly));
        assert_eq!(AgeGroup::from_age(0), None);
        assert_eq!(AgeGroup::from_age(101), None);
    }

    #[test]
    fn record_json_uses_training_column_names() {
        let json = serde_json::to_value(ApplicantRecord::default()).unwrap();
        for name in columns::RAW {
            assert!(json.get(name).is_some(), "missing key {name}");
        }
    }
}
