//! Load the fitted artifacts from a directory.
//!
//! Expected files:
//!
//! | file                  | contents                                        |
//! |-----------------------|-------------------------------------------------|
//! | `feature_names.json`  | ordered training column names                   |
//! | `scaler.json`         | `{ mean, scale, feature_names? }`               |
//! | `imputer_median.json` | `{ statistic }` (monthly income median)         |
//! | `imputer_mode.json`   | `{ statistic }` (number-of-dependents mode)     |
//! | `model.json`          | tree ensemble (`models::EnsembleFile`)          |
//!
//! Any failure here is a startup error naming the offending file. Width
//! disagreements between the scaler/model and the schema are only logged:
//! they are rejected per request when a vector reaches the mismatched stage.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{EnsembleFile, TreeEnsemble};
use crate::preprocess::{FeatureSchema, ImputationParameters, ImputeStrategy, Imputer, Scaler};

pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const IMPUTER_MEDIAN_FILE: &str = "imputer_median.json";
pub const IMPUTER_MODE_FILE: &str = "imputer_mode.json";
pub const MODEL_FILE: &str = "model.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImputerFile {
    pub statistic: f64,
}

/// Every fitted parameter the pipeline needs.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub schema: FeatureSchema,
    pub scaler: Scaler,
    pub imputation: ImputationParameters,
    pub model: TreeEnsemble,
    /// Directory the artifacts were read from.
    pub source: PathBuf,
}

/// Load and validate all artifacts from `dir`.
pub fn load_artifacts(dir: &Path) -> Result<Artifacts, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::artifact(
            dir.display().to_string(),
            "artifact directory does not exist",
        ));
    }

    let names_path = dir.join(FEATURE_NAMES_FILE);
    let names: Vec<String> = read_json(&names_path)?;
    let schema = FeatureSchema::new(names).map_err(|e| attribute(e, &names_path))?;

    let scaler_path = dir.join(SCALER_FILE);
    let scaler_file: ScalerFile = read_json(&scaler_path)?;
    let scaler = Scaler::new(scaler_file.mean, scaler_file.scale, scaler_file.feature_names)
        .map_err(|e| attribute(e, &scaler_path))?;

    let median_path = dir.join(IMPUTER_MEDIAN_FILE);
    let median: ImputerFile = read_json(&median_path)?;
    let mode_path = dir.join(IMPUTER_MODE_FILE);
    let mode: ImputerFile = read_json(&mode_path)?;
    let imputation = ImputationParameters {
        income_median: Imputer::new(ImputeStrategy::Median, median.statistic, &display(&median_path))?,
        dependents_mode: Imputer::new(ImputeStrategy::Mode, mode.statistic, &display(&mode_path))?,
    };

    let model_path = dir.join(MODEL_FILE);
    let model_file: EnsembleFile = read_json(&model_path)?;
    let model = TreeEnsemble::from_file(model_file).map_err(|e| attribute(e, &model_path))?;

    report_consistency(&schema, &scaler, &model);

    tracing::info!(
        dir = %dir.display(),
        columns = schema.len(),
        trees = model.tree_count(),
        income_median = imputation.income_median.statistic(),
        dependents_mode = imputation.dependents_mode.statistic(),
        "loaded scoring artifacts"
    );

    Ok(Artifacts {
        schema,
        scaler,
        imputation,
        model,
        source: dir.to_path_buf(),
    })
}

fn report_consistency(schema: &FeatureSchema, scaler: &Scaler, model: &TreeEnsemble) {
    use crate::models::ProbabilityModel;

    if scaler.len() != schema.len() {
        tracing::warn!(
            schema = schema.len(),
            scaler = scaler.len(),
            "scaler width differs from schema; every request will be rejected"
        );
    }
    if model.num_features() != schema.len() {
        tracing::warn!(
            schema = schema.len(),
            model = model.num_features(),
            "model width differs from schema; every request will be rejected"
        );
    }
    let zero_filled = schema.zero_filled_columns();
    if !zero_filled.is_empty() {
        tracing::warn!(columns = ?zero_filled, "schema columns with no producer are always zero");
    }
    let dropped = schema.dropped_columns();
    if !dropped.is_empty() {
        tracing::debug!(columns = ?dropped, "engineered columns not in schema are dropped");
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::artifact(display(path), format!("failed to open: {e}")))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PipelineError::artifact(display(path), format!("invalid JSON: {e}")))
}

/// Point an artifact error at the file it came from.
fn attribute(err: PipelineError, path: &Path) -> PipelineError {
    match err {
        PipelineError::Artifact { message, .. } => PipelineError::artifact(display(path), message),
        other => other,
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
