//! Deterministic preprocessing: raw applicant -> scaled feature vector.
//!
//! Stages, in order:
//! - `impute`: fill missing income/dependents with fitted statistics
//! - `features`: derive engineered signals
//! - `schema`: one-hot + align to the training column order
//! - `scaler`: standardize with fitted parameters

pub mod features;
pub mod impute;
pub mod scaler;
pub mod schema;

pub use features::engineer;
pub use impute::{ImputationParameters, ImputeStrategy, Imputer};
pub use scaler::Scaler;
pub use schema::{FeatureSchema, FeatureVector};
