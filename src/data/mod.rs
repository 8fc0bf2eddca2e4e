//! Synthetic data for exercising the scoring pipeline.

pub mod sample;

pub use sample::{ApplicantSampler, SampleConfig, generate_sample};
