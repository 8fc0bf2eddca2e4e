//! Derived features computed from an imputed applicant.
//!
//! The formulas are reproduced literally from the training pipeline. In
//! particular `IncomeDebtRatio` is *not* `1 / DebtRatio`: the epsilon is added
//! after multiplying by income, and the model learned from that exact value.

use crate::domain::{AgeGroup, EngineeredFeatures, ImputedRecord};

/// Added to the `IncomeDebtRatio` denominator.
pub const INCOME_DEBT_EPS: f64 = 1e-6;

/// Sum of the three delinquency buckets.
pub fn total_missed_payments(late_30_59: u32, late_60_89: u32, late_90: u32) -> u64 {
    u64::from(late_30_59) + u64::from(late_60_89) + u64::from(late_90)
}

/// `0` when the debt ratio is zero, else `income / (debt_ratio * income + 1e-6)`.
pub fn income_debt_ratio(monthly_income: f64, debt_ratio: f64) -> f64 {
    if debt_ratio == 0.0 {
        return 0.0;
    }
    monthly_income / (debt_ratio * monthly_income + INCOME_DEBT_EPS)
}

/// Utilization spread over open lines (plus one so zero lines is defined).
pub fn credit_burden(revolving_utilization: f64, open_credit_lines: u32) -> f64 {
    revolving_utilization / (f64::from(open_credit_lines) + 1.0)
}

/// Derive every engineered signal for one applicant.
pub fn engineer(record: &ImputedRecord) -> EngineeredFeatures {
    let age = record.age.trunc();

    EngineeredFeatures {
        revolving_utilization: record.revolving_utilization,
        age,
        late_30_59: record.late_30_59,
        debt_ratio: record.debt_ratio,
        monthly_income: record.monthly_income,
        open_credit_lines: record.open_credit_lines,
        late_90: record.late_90,
        real_estate_loans: record.real_estate_loans,
        late_60_89: record.late_60_89,
        dependents: record.dependents,

        total_missed_payments: total_missed_payments(record.late_30_59, record.late_60_89, record.late_90),
        income_debt_ratio: income_debt_ratio(record.monthly_income, record.debt_ratio),
        credit_burden: credit_burden(record.revolving_utilization, record.open_credit_lines),
        age_group: AgeGroup::from_age(age as i64),
    }
}
