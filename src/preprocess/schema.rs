//! Schema alignment: engineered features -> fixed-order feature vector.
//!
//! The training schema is an ordered list of column names fixed when the
//! artifacts are loaded. Alignment is a lookup-and-fill pass into a pre-sized
//! array keyed by name:
//!
//! - the categorical `AgeGroup` is one-hot encoded with its first level
//!   (`Young`) dropped
//! - schema columns the engineer does not produce stay `0.0`
//! - produced columns the schema does not name are dropped

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{AgeGroup, EngineeredFeatures, columns};
use crate::error::PipelineError;

/// Stage name reported in alignment errors.
const STAGE: &str = "schema alignment";

/// One-hot column for an age group, or `None` for the dropped first level.
pub fn indicator_column(group: AgeGroup) -> Option<&'static str> {
    match group {
        AgeGroup::Young => None,
        AgeGroup::MiddleAged => Some("AgeGroup_Middle-aged"),
        AgeGroup::Senior => Some("AgeGroup_Senior"),
        AgeGroup::Elderly => Some("AgeGroup_Elderly"),
    }
}

/// Indicator values for every non-dropped level, in category order.
///
/// A missing group (age outside every bin) encodes as all zeros, the same as
/// the dropped level.
pub fn one_hot_age_group(group: Option<AgeGroup>) -> Vec<(&'static str, f64)> {
    AgeGroup::ALL
        .iter()
        .filter_map(|&level| {
            let column = indicator_column(level)?;
            let hot = if group == Some(level) { 1.0 } else { 0.0 };
            Some((column, hot))
        })
        .collect()
}

/// Every column name the feature engineer can produce.
pub fn produced_columns() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = vec![
        columns::REVOLVING_UTILIZATION,
        columns::AGE,
        columns::LATE_30_59,
        columns::DEBT_RATIO,
        columns::MONTHLY_INCOME,
        columns::OPEN_CREDIT_LINES,
        columns::LATE_90,
        columns::REAL_ESTATE_LOANS,
        columns::LATE_60_89,
        columns::DEPENDENTS,
        columns::TOTAL_MISSED_PAYMENTS,
        columns::INCOME_DEBT_RATIO,
        columns::CREDIT_BURDEN,
    ];
    out.extend(AgeGroup::ALL.iter().filter_map(|&g| indicator_column(g)));
    out
}

/// The training-time column list with a name index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from the fitted column list.
    ///
    /// Rejects an empty list, blank or duplicate names, and the label column.
    pub fn new(names: Vec<String>) -> Result<Self, PipelineError> {
        const ARTIFACT: &str = "feature_names";

        if names.is_empty() {
            return Err(PipelineError::artifact(ARTIFACT, "schema has no columns"));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(PipelineError::artifact(ARTIFACT, format!("column {i} has an empty name")));
            }
            if name == columns::LABEL {
                return Err(PipelineError::artifact(
                    ARTIFACT,
                    format!("schema contains the label column `{}`", columns::LABEL),
                ));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(PipelineError::artifact(ARTIFACT, format!("duplicate column `{name}`")));
            }
        }

        Ok(Self {
            names: names.into(),
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Schema columns nothing in the pipeline produces; these are always zero.
    pub fn zero_filled_columns(&self) -> Vec<&str> {
        let produced = produced_columns();
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| !produced.contains(name))
            .collect()
    }

    /// Produced columns the schema does not name; these are always dropped.
    pub fn dropped_columns(&self) -> Vec<&'static str> {
        produced_columns()
            .into_iter()
            .filter(|name| !self.index.contains_key(*name))
            .collect()
    }

    /// Align engineered features into schema order.
    pub fn align(&self, features: &EngineeredFeatures) -> Result<FeatureVector, PipelineError> {
        let mut values = vec![0.0; self.len()];

        let numeric = features.numeric_columns();
        let indicators = one_hot_age_group(features.age_group);
        for (name, value) in numeric.into_iter().chain(indicators) {
            if let Some(i) = self.position(name) {
                values[i] = value;
            }
        }

        FeatureVector::new(Arc::clone(&self.names), values)
    }
}

/// Values in schema order, carrying the column names they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair `values` with `names`; the lengths must agree.
    pub fn new(names: Arc<[String]>, values: Vec<f64>) -> Result<Self, PipelineError> {
        if names.len() != values.len() {
            return Err(PipelineError::schema(
                STAGE,
                format!("expected {} columns, found {}", names.len(), values.len()),
            ));
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == name)?;
        Some(self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    /// Same columns, new values (used by the scaler).
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Result<Self, PipelineError> {
        Self::new(Arc::clone(&self.names), values)
    }
}

/// The column list the bundled model was trained against.
pub fn training_columns() -> Vec<String> {
    produced_columns().into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImputedRecord;
    use crate::preprocess::features::engineer;

    fn features(age: f64) -> EngineeredFeatures {
        engineer(&ImputedRecord {
            revolving_utilization: 0.5,
            age,
            late_30_59: 2,
            debt_ratio: 0.5,
            monthly_income: 5000.0,
            open_credit_lines: 5,
            late_90: 0,
            real_estate_loans: 1,
            late_60_89: 1,
            dependents: 0.0,
        })
    }

    #[test]
    fn one_hot_drops_first_level() {
        let young = one_hot_age_group(Some(AgeGroup::Young));
        assert_eq!(young.len(), 3);
        assert!(young.iter().all(|(_, v)| *v == 0.0));

        let senior = one_hot_age_group(Some(AgeGroup::Senior));
        assert_eq!(
            senior,
            vec![
                ("AgeGroup_Middle-aged", 0.0),
                ("AgeGroup_Senior", 1.0),
                ("AgeGroup_Elderly", 0.0),
            ]
        );

        assert_eq!(one_hot_age_group(None), young);
    }

    #[test]
    fn indicator_names_follow_prefix_and_label() {
        for group in AgeGroup::ALL {
            if let Some(column) = indicator_column(group) {
                assert_eq!(column, format!("{}{}", columns::AGE_GROUP_PREFIX, group.label()));
            }
        }
    }

    #[test]
    fn width_and_order_are_fixed_for_every_age_group() {
        let schema = FeatureSchema::new(training_columns()).unwrap();
        for age in [25.0, 40.0, 60.0, 80.0] {
            let v = schema.align(&features(age)).unwrap();
            assert_eq!(v.len(), schema.len());
            assert_eq!(v.names(), schema.names());
        }
    }

    #[test]
    fn align_places_values_by_name() {
        // Deliberately shuffled relative to the engineer's output order.
        let names = vec![
            "AgeGroup_Elderly".to_string(),
            columns::CREDIT_BURDEN.to_string(),
            columns::AGE.to_string(),
            "AgeGroup_Middle-aged".to_string(),
            columns::TOTAL_MISSED_PAYMENTS.to_string(),
        ];
        let schema = FeatureSchema::new(names).unwrap();
        let v = schema.align(&features(45.0)).unwrap();

        assert_eq!(v.values(), &[0.0, 0.5 / 6.0, 45.0, 1.0, 3.0]);
        assert_eq!(v.get(columns::MONTHLY_INCOME), None);
    }

    #[test]
    fn unknown_schema_columns_are_zero_filled() {
        let names = vec![columns::AGE.to_string(), "AgeGroup_Unknown".to_string(), "Extra".to_string()];
        let schema = FeatureSchema::new(names).unwrap();
        let v = schema.align(&features(70.0)).unwrap();

        assert_eq!(v.values(), &[70.0, 0.0, 0.0]);
        assert_eq!(schema.zero_filled_columns(), vec!["AgeGroup_Unknown", "Extra"]);
        assert!(schema.dropped_columns().contains(&columns::MONTHLY_INCOME));
    }

    #[test]
    fn schema_rejects_label_duplicates_and_empty() {
        assert!(FeatureSchema::new(vec![]).is_err());
        assert!(FeatureSchema::new(vec![columns::AGE.to_string(), columns::AGE.to_string()]).is_err());
        assert!(FeatureSchema::new(vec![columns::LABEL.to_string(), columns::AGE.to_string()]).is_err());
        assert!(FeatureSchema::new(vec![" ".to_string()]).is_err());
    }

    #[test]
    fn feature_vector_rejects_length_mismatch() {
        let names: Arc<[String]> = training_columns().into();
        let err = FeatureVector::new(names, vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }
}
