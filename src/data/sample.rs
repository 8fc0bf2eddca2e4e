//! Synthetic applicant generation.
//!
//! Produces plausible-looking borrowers for exercising the batch path and for
//! property-style tests. The marginals are loosely shaped like a consumer
//! credit book (most applicants have no delinquencies, incomes are
//! log-normal, a few utilizations exceed 1.0); they do not come from any
//! fitted population.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal, Poisson};

use crate::domain::{ApplicantRecord, MAX_AGE, MIN_AGE};
use crate::error::{AppError, EXIT_ARTIFACT, EXIT_INPUT};

/// Knobs for `credit-risk sample`.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Probability that income (and independently dependents) is left missing.
    pub missing_rate: f64,
}

/// Share of applicants reporting a zero debt ratio.
const ZERO_DEBT_SHARE: f64 = 0.1;
/// Share of applicants with utilization above 1.0.
const OVER_LIMIT_SHARE: f64 = 0.05;

/// Holds the fixed distributions so each draw is allocation-free.
#[derive(Debug, Clone)]
pub struct ApplicantSampler {
    missing_rate: f64,
    age: Normal<f64>,
    income: LogNormal<f64>,
    debt_ratio: LogNormal<f64>,
    open_lines: Poisson<f64>,
    real_estate: Poisson<f64>,
    dependents: Poisson<f64>,
    late_30_59: Poisson<f64>,
    late_60_89: Poisson<f64>,
    late_90: Poisson<f64>,
}

impl ApplicantSampler {
    pub fn new(missing_rate: f64) -> Result<Self, AppError> {
        if !(0.0..=1.0).contains(&missing_rate) {
            return Err(AppError::new(EXIT_INPUT, "Missing rate must be within [0, 1]."));
        }
        let dist_err = |e: &dyn std::fmt::Display| AppError::new(EXIT_ARTIFACT, format!("Sample distribution error: {e}"));

        Ok(Self {
            missing_rate,
            age: Normal::new(52.0, 15.0).map_err(|e| dist_err(&e))?,
            income: LogNormal::new(5400.0_f64.ln(), 0.6).map_err(|e| dist_err(&e))?,
            debt_ratio: LogNormal::new(0.35_f64.ln(), 0.8).map_err(|e| dist_err(&e))?,
            open_lines: Poisson::new(8.0).map_err(|e| dist_err(&e))?,
            real_estate: Poisson::new(1.0).map_err(|e| dist_err(&e))?,
            dependents: Poisson::new(0.75).map_err(|e| dist_err(&e))?,
            late_30_59: Poisson::new(0.3).map_err(|e| dist_err(&e))?,
            late_60_89: Poisson::new(0.1).map_err(|e| dist_err(&e))?,
            late_90: Poisson::new(0.1).map_err(|e| dist_err(&e))?,
        })
    }

    /// Draw one applicant that passes `ApplicantRecord::validate`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ApplicantRecord {
        let age = self.age.sample(rng).round().clamp(MIN_AGE, MAX_AGE);

        let revolving_utilization = if rng.gen_bool(OVER_LIMIT_SHARE) {
            rng.gen_range(1.0..3.0)
        } else {
            rng.gen_range(0.0..1.0)
        };

        let debt_ratio = if rng.gen_bool(ZERO_DEBT_SHARE) {
            0.0
        } else {
            self.debt_ratio.sample(rng)
        };

        let monthly_income = if rng.gen_bool(self.missing_rate) {
            None
        } else {
            Some(self.income.sample(rng).round())
        };
        let dependents = if rng.gen_bool(self.missing_rate) {
            None
        } else {
            Some(count(&self.dependents, rng))
        };

        ApplicantRecord {
            revolving_utilization,
            age,
            late_30_59: count(&self.late_30_59, rng),
            debt_ratio,
            monthly_income,
            open_credit_lines: count(&self.open_lines, rng),
            late_90: count(&self.late_90, rng),
            real_estate_loans: count(&self.real_estate, rng),
            late_60_89: count(&self.late_60_89, rng),
            dependents,
        }
    }
}

fn count<R: Rng + ?Sized>(dist: &Poisson<f64>, rng: &mut R) -> u32 {
    dist.sample(rng) as u32
}

/// Generate `config.count` applicants, reproducibly from `config.seed`.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<ApplicantRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(EXIT_INPUT, "Sample count must be > 0."));
    }
    let sampler = ApplicantSampler::new(config.missing_rate)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    Ok((0..config.count).map(|_| sampler.sample(&mut rng)).collect())
}
