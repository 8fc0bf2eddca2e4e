//! Probability -> risk band.
//!
//! | probability  | band   |
//! |--------------|--------|
//! | `[0, 0.3)`   | Low    |
//! | `[0.3, 0.7)` | Medium |
//! | `[0.7, 1.0]` | High   |

use crate::domain::{RiskAssessment, RiskBand};
use crate::error::PipelineError;

/// Lower bound (inclusive) of the Medium band.
pub const MEDIUM_THRESHOLD: f64 = 0.3;
/// Lower bound (inclusive) of the High band.
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Band and recommendation for a probability.
pub fn categorize(probability: f64) -> (RiskBand, &'static str) {
    let band = if probability < MEDIUM_THRESHOLD {
        RiskBand::Low
    } else if probability < HIGH_THRESHOLD {
        RiskBand::Medium
    } else {
        RiskBand::High
    };
    (band, band.recommendation())
}

/// Build the final assessment, refusing probabilities outside `[0, 1]`.
pub fn assess(probability: f64) -> Result<RiskAssessment, PipelineError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(PipelineError::schema(
            "classifier",
            format!("probability {probability} is outside [0, 1]"),
        ));
    }
    let (band, recommendation) = categorize(probability);
    Ok(RiskAssessment {
        probability,
        band,
        recommendation: recommendation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        let cases = [
            (0.0, RiskBand::Low),
            (0.2999999, RiskBand::Low),
            (0.3, RiskBand::Medium),
            (0.6999999, RiskBand::Medium),
            (0.7, RiskBand::High),
            (1.0, RiskBand::High),
        ];
        for (p, expected) in cases {
            assert_eq!(categorize(p).0, expected, "p={p}");
        }
    }

    #[test]
    fn recommendation_matches_band() {
        assert_eq!(categorize(0.1).1, "This applicant appears to be a low credit risk.");
        assert_eq!(
            categorize(0.5).1,
            "This applicant has moderate credit risk. Further review recommended."
        );
        assert_eq!(categorize(0.9).1, "This applicant appears to be a high credit risk.");
    }

    #[test]
    fn assess_rejects_out_of_range() {
        assert!(assess(-0.01).is_err());
        assert!(assess(1.01).is_err());
        assert!(assess(f64::NAN).is_err());

        let a = assess(0.7).unwrap();
        assert_eq!(a.band, RiskBand::High);
        assert_eq!(a.recommendation, RiskBand::High.recommendation());
    }
}
