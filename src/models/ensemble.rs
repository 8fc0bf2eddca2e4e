//! Gradient-boosted tree ensemble for binary classification.
//!
//! Each tree is a flat node array rooted at index 0. An internal node sends a
//! feature value to `yes` when `x < threshold`, to `no` otherwise, and to
//! `missing` when the value is NaN. Leaves carry additive margins:
//!
//! ```text
//! margin = logit(base_score) + Σ leaf_t
//! p      = 1 / (1 + exp(-margin))
//! ```
//!
//! Structure is validated once at load time so traversal never has to
//! bounds-check or guard against cycles.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::ProbabilityModel;
use crate::preprocess::FeatureVector;

const ARTIFACT: &str = "model";

/// One node of a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        /// Branch for NaN inputs; defaults to `yes`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f64,
    },
}

impl Node {
    pub fn split(feature: usize, threshold: f64, yes: usize, no: usize) -> Self {
        Node::Split {
            feature,
            threshold,
            yes,
            no,
            missing: None,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Node::Leaf { leaf: value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Leaf value reached by `x`.
    fn eval(&self, x: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let v = x[*feature];
                    i = if v.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if v < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }

    /// Check child/feature indices and that every node is reached at most once.
    fn validate(&self, tree_idx: usize, num_features: usize) -> Result<(), PipelineError> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(PipelineError::artifact(ARTIFACT, format!("tree {tree_idx} has no nodes")));
        }

        let mut seen = vec![false; n];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if seen[i] {
                return Err(PipelineError::artifact(
                    ARTIFACT,
                    format!("tree {tree_idx} node {i} is reachable twice (cycle or shared child)"),
                ));
            }
            seen[i] = true;

            match &self.nodes[i] {
                Node::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(PipelineError::artifact(
                            ARTIFACT,
                            format!("tree {tree_idx} node {i} has a non-finite leaf"),
                        ));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    if *feature >= num_features {
                        return Err(PipelineError::artifact(
                            ARTIFACT,
                            format!(
                                "tree {tree_idx} node {i} splits on feature {feature} but the model has {num_features}"
                            ),
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(PipelineError::artifact(
                            ARTIFACT,
                            format!("tree {tree_idx} node {i} has a NaN threshold"),
                        ));
                    }
                    for child in [*yes, *no] {
                        if child >= n || child == i {
                            return Err(PipelineError::artifact(
                                ARTIFACT,
                                format!("tree {tree_idx} node {i} has invalid child {child}"),
                            ));
                        }
                    }
                    if let Some(m) = missing {
                        if *m != *yes && *m != *no {
                            return Err(PipelineError::artifact(
                                ARTIFACT,
                                format!("tree {tree_idx} node {i} missing branch {m} is neither child"),
                            ));
                        }
                    }
                    stack.push(*no);
                    stack.push(*yes);
                }
            }
        }
        Ok(())
    }
}

/// On-disk form of the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleFile {
    pub num_features: usize,
    /// Prior probability of the positive class.
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

/// A validated ensemble, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    num_features: usize,
    base_margin: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(num_features: usize, base_score: f64, trees: Vec<Tree>) -> Result<Self, PipelineError> {
        if num_features == 0 {
            return Err(PipelineError::artifact(ARTIFACT, "num_features must be > 0"));
        }
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(PipelineError::artifact(
                ARTIFACT,
                format!("base_score must be within (0, 1), got {base_score}"),
            ));
        }
        if trees.is_empty() {
            return Err(PipelineError::artifact(ARTIFACT, "ensemble has no trees"));
        }
        for (t, tree) in trees.iter().enumerate() {
            tree.validate(t, num_features)?;
        }

        Ok(Self {
            num_features,
            base_margin: logit(base_score),
            trees,
        })
    }

    pub fn from_file(file: EnsembleFile) -> Result<Self, PipelineError> {
        Self::new(file.num_features, file.base_score, file.trees)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.nodes.len()).sum()
    }

    pub fn base_score(&self) -> f64 {
        sigmoid(self.base_margin)
    }

    /// Raw additive margin for `x` (no width check).
    fn margin(&self, x: &[f64]) -> f64 {
        self.trees.iter().fold(self.base_margin, |acc, tree| acc + tree.eval(x))
    }
}

impl ProbabilityModel for TreeEnsemble {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, PipelineError> {
        if vector.len() != self.num_features {
            return Err(PipelineError::schema(
                "classifier",
                format!(
                    "feature vector has {} columns but the model expects {}",
                    vector.len(),
                    self.num_features
                ),
            ));
        }
        Ok(sigmoid(self.margin(vector.values())))
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn vector(values: Vec<f64>) -> FeatureVector {
        let names: Arc<[String]> = (0..values.len()).map(|i| format!("f{i}")).collect::<Vec<_>>().into();
        FeatureVector::new(names, values).unwrap()
    }

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree::new(vec![Node::split(feature, threshold, 1, 2), Node::leaf(left), Node::leaf(right)])
    }

    #[test]
    fn two_tree_margin_sums_leaves() {
        let model = TreeEnsemble::new(
            2,
            0.5,
            vec![stump(0, 1.0, -1.0, 1.0), stump(1, 0.0, 0.25, -0.25)],
        )
        .unwrap();

        // 0.5 < 1.0 -> -1.0 ; 0.3 >= 0.0 -> -0.25
        let p = model.predict_probability(&vector(vec![0.5, 0.3])).unwrap();
        assert_eq!(p, sigmoid(-1.25));

        // Threshold equality goes to `no`.
        let p = model.predict_probability(&vector(vec![1.0, -1.0])).unwrap();
        assert_eq!(p, sigmoid(1.0 + 0.25));
    }

    #[test]
    fn base_score_round_trips_through_margin() {
        let model = TreeEnsemble::new(1, 0.2, vec![Tree::new(vec![Node::leaf(0.0)])]).unwrap();
        let p = model.predict_probability(&vector(vec![3.0])).unwrap();
        assert!((p - 0.2).abs() < 1e-12);
        assert!((model.base_score() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn nan_follows_missing_branch() {
        let tree = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 0.0,
                yes: 1,
                no: 2,
                missing: Some(2),
            },
            Node::leaf(-3.0),
            Node::leaf(3.0),
        ]);
        let model = TreeEnsemble::new(1, 0.5, vec![tree]).unwrap();
        let p = model.predict_probability(&vector(vec![f64::NAN])).unwrap();
        assert_eq!(p, sigmoid(3.0));
    }

    #[test]
    fn width_mismatch_is_schema_error() {
        let model = TreeEnsemble::new(3, 0.5, vec![stump(2, 0.0, 0.0, 0.0)]).unwrap();
        let err = model.predict_probability(&vector(vec![0.0, 0.0])).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { stage: "classifier", .. }));
    }

    #[test]
    fn invalid_structures_are_rejected() {
        // Feature out of range.
        assert!(TreeEnsemble::new(1, 0.5, vec![stump(1, 0.0, 0.0, 0.0)]).is_err());
        // Child out of range.
        let bad_child = Tree::new(vec![Node::split(0, 0.0, 1, 5), Node::leaf(0.0)]);
        assert!(TreeEnsemble::new(1, 0.5, vec![bad_child]).is_err());
        // Cycle back to the root.
        let cycle = Tree::new(vec![
            Node::split(0, 0.0, 1, 2),
            Node::split(0, 1.0, 0, 2),
            Node::leaf(0.0),
        ]);
        assert!(TreeEnsemble::new(1, 0.5, vec![cycle]).is_err());
        // Degenerate base score / empty ensemble.
        assert!(TreeEnsemble::new(1, 1.0, vec![stump(0, 0.0, 0.0, 0.0)]).is_err());
        assert!(TreeEnsemble::new(1, 0.5, vec![]).is_err());
    }

    #[test]
    fn node_json_is_untagged() {
        let json = r#"{"num_features":1,"base_score":0.5,"trees":[{"nodes":[
            {"feature":0,"threshold":0.5,"yes":1,"no":2},
            {"leaf":-0.1},
            {"leaf":0.1}
        ]}]}"#;
        let file: EnsembleFile = serde_json::from_str(json).unwrap();
        let model = TreeEnsemble::from_file(file).unwrap();
        assert_eq!(model.tree_count(), 1);
        assert_eq!(model.node_count(), 3);
    }
}
