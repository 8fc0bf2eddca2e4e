//! Standardization with fitted per-column parameters.
//!
//! `z = (x - mean) / scale`, elementwise. The parameter count is *not* forced
//! to match the schema at load time; a mismatch is reported for each request
//! that reaches the scaler so it can never be silently truncated or padded.

use nalgebra::DVector;

use crate::error::PipelineError;
use crate::preprocess::schema::FeatureVector;

const STAGE: &str = "scaler";

/// Fitted standardization parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    mean: DVector<f64>,
    scale: DVector<f64>,
    /// Column names recorded at fit time, if the artifact carried them.
    feature_names: Option<Vec<String>>,
}

impl Scaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>, feature_names: Option<Vec<String>>) -> Result<Self, PipelineError> {
        const ARTIFACT: &str = "scaler";

        if mean.is_empty() {
            return Err(PipelineError::artifact(ARTIFACT, "no parameters"));
        }
        if mean.len() != scale.len() {
            return Err(PipelineError::artifact(
                ARTIFACT,
                format!("mean has {} entries but scale has {}", mean.len(), scale.len()),
            ));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(PipelineError::artifact(ARTIFACT, format!("mean[{i}] is not finite")));
        }
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(PipelineError::artifact(
                ARTIFACT,
                format!("scale[{i}] must be finite and non-zero, got {}", scale[i]),
            ));
        }
        if let Some(names) = &feature_names {
            if names.len() != mean.len() {
                return Err(PipelineError::artifact(
                    ARTIFACT,
                    format!("{} feature names for {} parameters", names.len(), mean.len()),
                ));
            }
        }

        Ok(Self {
            mean: DVector::from_vec(mean),
            scale: DVector::from_vec(scale),
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn mean(&self) -> &[f64] {
        self.mean.as_slice()
    }

    pub fn scale_factors(&self) -> &[f64] {
        self.scale.as_slice()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Standardize an aligned vector.
    pub fn scale(&self, vector: &FeatureVector) -> Result<FeatureVector, PipelineError> {
        if vector.len() != self.len() {
            return Err(PipelineError::schema(
                STAGE,
                format!(
                    "feature vector has {} columns but scaler was fitted on {}",
                    vector.len(),
                    self.len()
                ),
            ));
        }
        if let Some(names) = &self.feature_names {
            if let Some((i, (got, want))) = vector
                .names()
                .iter()
                .zip(names)
                .enumerate()
                .find(|(_, (got, want))| got != want)
            {
                return Err(PipelineError::schema(
                    STAGE,
                    format!("column {i} is `{got}` but scaler expects `{want}`"),
                ));
            }
        }

        let x = DVector::from_column_slice(vector.values());
        let z = (x - &self.mean).component_div(&self.scale);
        vector.with_values(z.as_slice().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn vector(names: &[&str], values: Vec<f64>) -> FeatureVector {
        let names: Arc<[String]> = names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into();
        FeatureVector::new(names, values).unwrap()
    }

    #[test]
    fn scale_standardizes_elementwise() {
        let scaler = Scaler::new(vec![1.0, 10.0], vec![2.0, 5.0], None).unwrap();
        let z = scaler.scale(&vector(&["a", "b"], vec![3.0, 0.0])).unwrap();
        assert_eq!(z.values(), &[1.0, -2.0]);
        assert_eq!(z.names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn scale_rejects_width_mismatch() {
        let scaler = Scaler::new(vec![0.0; 3], vec![1.0; 3], None).unwrap();
        let err = scaler.scale(&vector(&["a", "b"], vec![1.0, 2.0])).unwrap_err();
        match err {
            PipelineError::SchemaMismatch { stage, message } => {
                assert_eq!(stage, "scaler");
                assert!(message.contains("2 columns"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scale_rejects_reordered_columns_when_names_known() {
        let scaler = Scaler::new(
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            Some(vec!["a".to_string(), "b".to_string()]),
        )
        .unwrap();
        let err = scaler.scale(&vector(&["b", "a"], vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }

    #[test]
    fn new_rejects_bad_parameters() {
        assert!(Scaler::new(vec![], vec![], None).is_err());
        assert!(Scaler::new(vec![0.0, 1.0], vec![1.0], None).is_err());
        assert!(Scaler::new(vec![0.0], vec![0.0], None).is_err());
        assert!(Scaler::new(vec![f64::NAN], vec![1.0], None).is_err());
        assert!(Scaler::new(vec![0.0], vec![1.0], Some(vec![])).is_err());
    }
}
