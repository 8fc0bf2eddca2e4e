//! Shared scoring pipeline used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! impute -> engineer -> align -> scale -> classify -> categorize
//!
//! The CLI commands can then focus on input parsing and presentation.

use std::path::Path;

use rayon::prelude::*;

use crate::domain::{ApplicantRecord, EngineeredFeatures, ImputedRecord, RiskAssessment};
use crate::error::PipelineError;
use crate::io::artifacts::{Artifacts, load_artifacts};
use crate::models::{ProbabilityModel, TreeEnsemble};
use crate::preprocess::{FeatureSchema, FeatureVector, ImputationParameters, Scaler, engineer};

/// Immutable fitted state shared by every scoring call.
///
/// Built once at startup and passed by reference; nothing in a scoring path
/// mutates it, so one context can serve concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct ScoringContext<M = TreeEnsemble> {
    schema: FeatureSchema,
    scaler: Scaler,
    imputation: ImputationParameters,
    model: M,
}

/// Every intermediate of one scoring run.
#[derive(Debug, Clone)]
pub struct ScoreTrace {
    pub imputed: ImputedRecord,
    pub features: EngineeredFeatures,
    pub aligned: FeatureVector,
    pub scaled: FeatureVector,
    pub assessment: RiskAssessment,
}

impl ScoringContext<TreeEnsemble> {
    /// Load artifacts from `dir` and build the context.
    pub fn load(dir: &Path) -> Result<Self, PipelineError> {
        load_artifacts(dir).map(Self::from_artifacts)
    }

    pub fn from_artifacts(artifacts: Artifacts) -> Self {
        Self::new(artifacts.schema, artifacts.scaler, artifacts.imputation, artifacts.model)
    }
}

impl<M: ProbabilityModel> ScoringContext<M> {
    pub fn new(schema: FeatureSchema, scaler: Scaler, imputation: ImputationParameters, model: M) -> Self {
        Self {
            schema,
            scaler,
            imputation,
            model,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn imputation(&self) -> &ImputationParameters {
        &self.imputation
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run the full pipeline and keep every intermediate.
    ///
    /// `record` is expected to have passed `ApplicantRecord::validate`.
    pub fn trace(&self, record: &ApplicantRecord) -> Result<ScoreTrace, PipelineError> {
        let imputed = self.imputation.apply(record);
        let features = engineer(&imputed);
        let aligned = self.schema.align(&features)?;
        let scaled = self.scaler.scale(&aligned)?;
        let probability = self.model.predict_probability(&scaled)?;
        let assessment = crate::risk::assess(probability)?;

        tracing::debug!(
            probability = assessment.probability,
            band = ?assessment.band,
            income_imputed = record.monthly_income.is_none(),
            dependents_imputed = record.dependents.is_none(),
            "scored applicant"
        );

        Ok(ScoreTrace {
            imputed,
            features,
            aligned,
            scaled,
            assessment,
        })
    }

    /// Score one applicant.
    pub fn assess(&self, record: &ApplicantRecord) -> Result<RiskAssessment, PipelineError> {
        self.trace(record).map(|t| t.assessment)
    }

    /// Score many applicants in parallel; results keep input order.
    pub fn assess_batch(&self, records: &[ApplicantRecord]) -> Vec<Result<RiskAssessment, PipelineError>> {
        records.par_iter().map(|r| self.assess(r)).collect()
    }
}
