//! Reporting utilities: batch summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{RiskAssessment, RiskBand};

/// Band counts and probability range over a scored batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub scored: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub mean_probability: f64,
    pub max_probability: f64,
}

/// Summarize a batch of assessments.
pub fn summarize<'a>(assessments: impl IntoIterator<Item = &'a RiskAssessment>) -> BatchSummary {
    let mut out = BatchSummary::default();
    let mut sum = 0.0;

    for a in assessments {
        out.scored += 1;
        match a.band {
            RiskBand::Low => out.low += 1,
            RiskBand::Medium => out.medium += 1,
            RiskBand::High => out.high += 1,
        }
        sum += a.probability;
        out.max_probability = out.max_probability.max(a.probability);
    }

    if out.scored > 0 {
        out.mean_probability = sum / out.scored as f64;
    }
    out
}
