//! Classifier implementations.
//!
//! The pipeline only depends on the `ProbabilityModel` contract, so the
//! scoring context can be built around any fitted model that exposes a
//! positive-class probability.

pub mod ensemble;

pub use ensemble::{EnsembleFile, Node, Tree, TreeEnsemble};

use crate::error::PipelineError;
use crate::preprocess::FeatureVector;

/// A fitted binary classifier.
///
/// Implementations must be deterministic and must not mutate themselves when
/// scoring; they are shared read-only across concurrent requests.
pub trait ProbabilityModel: Send + Sync {
    /// Width of the feature vector the model was trained on.
    fn num_features(&self) -> usize;

    /// Probability of the positive ("serious delinquency") class, in `[0, 1]`.
    fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, PipelineError>;
}
