//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - training column names (`columns`)
//! - the raw applicant record and its imputed/engineered forms
//! - scoring outputs (`RiskBand`, `RiskAssessment`)

pub mod types;

pub use types::*;
