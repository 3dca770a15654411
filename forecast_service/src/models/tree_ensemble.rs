//! Gradient-boosted regression tree ensemble

use crate::error::{ForecastError, Result};
use crate::models::{check_features, Regressor};
use serde::{Deserialize, Serialize};

/// Node of a regression tree stored in a flat array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `x[feature] < threshold`, otherwise to `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single tree; node 0 is the root
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Validate the node array.
    ///
    /// Children must sit after their parent in the array, which rules out
    /// cycles and bounds every traversal by the tree size.
    pub fn new(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Regression tree has no nodes".to_string(),
            ));
        }

        for (index, node) in nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(ForecastError::InvalidParameter(format!(
                            "Node {} splits on feature {} but the model has {} features",
                            index, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ForecastError::InvalidParameter(format!(
                            "Node {} has a non-finite threshold",
                            index
                        )));
                    }
                    for child in [left, right] {
                        if child <= index || child >= nodes.len() {
                            return Err(ForecastError::InvalidParameter(format!(
                                "Node {} points to invalid child {}",
                                index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ForecastError::InvalidParameter(format!(
                            "Leaf {} has a non-finite value",
                            index
                        )));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[feature] < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Boosted ensemble: `base_score + sum(tree(x))`
#[derive(Debug, Clone)]
pub struct TreeEnsembleRegressor {
    name: String,
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl TreeEnsembleRegressor {
    pub fn new(
        name: impl Into<String>,
        base_score: f64,
        trees: Vec<RegressionTree>,
        n_features: usize,
    ) -> Result<Self> {
        if !base_score.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Base score must be finite".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            base_score,
            trees,
            n_features,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for TreeEnsembleRegressor {
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_features(&self.name, self.n_features, features)?;

        let score = self
            .trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(features));

        Ok(vec![score])
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        &self.name
    }
}
