//! Missing-value imputation with offline-fitted statistics.
//!
//! Only two fields can be missing on input: monthly income (filled with the
//! training median) and number of dependents (filled with the training mode).

use crate::domain::{ApplicantRecord, ImputedRecord};
use crate::error::PipelineError;

/// Which statistic an imputer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImputeStrategy {
    Median,
    Mode,
}

impl ImputeStrategy {
    pub fn name(self) -> &'static str {
        match self {
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
        }
    }
}

/// A single fitted statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Imputer {
    strategy: ImputeStrategy,
    statistic: f64,
}

impl Imputer {
    /// Build an imputer, checking the statistic is usable.
    ///
    /// `artifact` names the source so errors point at the right file.
    pub fn new(strategy: ImputeStrategy, statistic: f64, artifact: &str) -> Result<Self, PipelineError> {
        if !statistic.is_finite() || statistic < 0.0 {
            return Err(PipelineError::artifact(
                artifact,
                format!("{} statistic must be finite and >= 0, got {statistic}", strategy.name()),
            ));
        }
        if strategy == ImputeStrategy::Mode && statistic.fract() != 0.0 {
            return Err(PipelineError::artifact(
                artifact,
                format!("mode statistic must be a whole count, got {statistic}"),
            ));
        }
        Ok(Self { strategy, statistic })
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn impute(&self, value: Option<f64>) -> f64 {
        impute(value, self.statistic)
    }
}

/// Substitute `statistic` for a missing (or NaN) value, otherwise pass through.
pub fn impute(value: Option<f64>, statistic: f64) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => statistic,
    }
}

/// Both fitted imputers, loaded once and shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputationParameters {
    pub income_median: Imputer,
    pub dependents_mode: Imputer,
}

impl ImputationParameters {
    pub fn new(income_median: f64, dependents_mode: f64) -> Result<Self, PipelineError> {
        Ok(Self {
            income_median: Imputer::new(ImputeStrategy::Median, income_median, "imputer_median")?,
            dependents_mode: Imputer::new(ImputeStrategy::Mode, dependents_mode, "imputer_mode")?,
        })
    }

    /// Fill the missing fields of `record`.
    pub fn apply(&self, record: &ApplicantRecord) -> ImputedRecord {
        ImputedRecord {
            revolving_utilization: record.revolving_utilization,
            age: record.age,
            late_30_59: record.late_30_59,
            debt_ratio: record.debt_ratio,
            monthly_income: self.income_median.impute(record.monthly_income),
            open_credit_lines: record.open_credit_lines,
            late_90: record.late_90,
            real_estate_loans: record.real_estate_loans,
            late_60_89: record.late_60_89,
            dependents: self.dependents_mode.impute(record.dependents.map(f64::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impute_passes_present_values_through() {
        assert_eq!(impute(Some(1200.0), 5400.0), 1200.0);
        assert_eq!(impute(Some(0.0), 5400.0), 0.0);
        assert_eq!(impute(None, 5400.0), 5400.0);
        assert_eq!(impute(Some(f64::NAN), 5400.0), 5400.0);
    }

    #[test]
    fn apply_fills_only_missing_fields() {
        let params = ImputationParameters::new(5400.0, 0.0).unwrap();

        let record = ApplicantRecord {
            monthly_income: None,
            dependents: None,
            ..ApplicantRecord::default()
        };
        let imputed = params.apply(&record);
        assert_eq!(imputed.monthly_income, 5400.0);
        assert_eq!(imputed.dependents, 0.0);

        let record = ApplicantRecord {
            monthly_income: Some(7000.0),
            dependents: Some(2),
            ..ApplicantRecord::default()
        };
        let imputed = params.apply(&record);
        assert_eq!(imputed.monthly_income, 7000.0);
        assert_eq!(imputed.dependents, 2.0);
    }

    #[test]
    fn invalid_statistics_are_artifact_errors() {
        let err = Imputer::new(ImputeStrategy::Median, f64::NAN, "imputer_median.json").unwrap_err();
        assert!(matches!(err, PipelineError::Artifact { ref artifact, .. } if artifact == "imputer_median.json"));

        assert!(Imputer::new(ImputeStrategy::Mode, 1.5, "imputer_mode.json").is_err());
        assert!(Imputer::new(ImputeStrategy::Median, -10.0, "imputer_median.json").is_err());
        assert!(Imputer::new(ImputeStrategy::Median, 5400.5, "imputer_median.json").is_ok());
    }
}
