//! Random-forest regressor
//!
//! Holds the fitted trees and the impurity-based feature importances
//! computed while they were grown. A forest never changes after it is built.

use super::tree::Tree;
use thiserror::Error;

/// Forest construction errors
#[derive(Error, Debug)]
pub enum ForestError {
    #[error("Forest validation failed: {0}")]
    ValidationFailed(String),

    #[error("Expected {expected} importances, got {found}")]
    ImportanceCount { expected: usize, found: usize },
}

/// Ensemble of regression trees whose prediction is the mean tree output
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    feature_count: usize,
    importances: Vec<f64>,
}

impl Forest {
    /// Assemble a forest from grown trees.
    ///
    /// `importances` must have one entry per feature column, in training
    /// column order.
    pub fn new(
        trees: Vec<Tree>,
        feature_count: usize,
        importances: Vec<f64>,
    ) -> Result<Self, ForestError> {
        if trees.is_empty() {
            return Err(ForestError::ValidationFailed(
                "Forest must have at least one tree".to_string(),
            ));
        }
        if importances.len() != feature_count {
            return Err(ForestError::ImportanceCount {
                expected: feature_count,
                found: importances.len(),
            });
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate().map_err(|e| {
                ForestError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
            if let Some(node) = tree
                .nodes
                .iter()
                .find(|n| !n.is_leaf() && n.feature_idx as usize >= feature_count)
            {
                return Err(ForestError::ValidationFailed(format!(
                    "Tree {} splits on feature {} of {}",
                    i, node.feature_idx, feature_count
                )));
            }
        }

        Ok(Self {
            trees,
            feature_count,
            importances,
        })
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Normalized mean-decrease-in-impurity per feature column
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Predict the target for one feature row
    pub fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict the target for every row
    pub fn predict_rows(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}
