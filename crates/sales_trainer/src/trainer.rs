//! Random-forest trainer
//!
//! Grows `n_trees` CART trees, each on its own bootstrap sample, and
//! averages their impurity-based feature importances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use vgsales_core::{Forest, ForestConfig};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::tree_seed;
use crate::errors::{Result, TrainerError};

/// Random-forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Train a forest on row-major `features` and `targets`.
    ///
    /// With `seed: Some(_)` the result is fully reproducible; with `None` a
    /// seed is drawn from OS entropy for this call.
    pub fn train(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Forest> {
        let n_samples = features.len();
        if n_samples == 0 {
            return Err(TrainerError::EmptyTrainingSet);
        }
        let feature_count = features[0].len();

        let forest_seed = self
            .config
            .seed
            .unwrap_or_else(|| StdRng::from_entropy().gen());
        let tree_config = TreeConfig::from(&self.config);
        let n_trees = self.config.n_trees;

        debug!(
            "Training forest: {} trees, {} samples, {} features",
            n_trees, n_samples, feature_count
        );

        let mut trees = Vec::with_capacity(n_trees);
        let mut importances = vec![0.0; feature_count];

        for tree_idx in 0..n_trees {
            let mut rng = StdRng::seed_from_u64(tree_seed(forest_seed, tree_idx));
            let bootstrap: Vec<usize> = (0..n_samples)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();

            let grown = CartBuilder::new(features, targets, &bootstrap, &tree_config).build(&mut rng);
            for (total, imp) in importances.iter_mut().zip(&grown.importances) {
                *total += imp;
            }
            trees.push(grown.tree);

            if (tree_idx + 1) % 100 == 0 {
                debug!("Trained tree {}/{}", tree_idx + 1, n_trees);
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        let forest = Forest::new(trees, feature_count, importances)?;
        debug!("Trained {} trees (seed {})", forest.n_trees(), forest_seed);
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, ((i * 7) % 11) as f64])
            .collect();
        let targets = features.iter().map(|row| 3.0 * row[0]).collect();
        (features, targets)
    }

    fn config(n_trees: usize, seed: Option<u64>) -> ForestConfig {
        ForestConfig {
            n_trees,
            seed,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_train_simple_forest() -> anyhow::Result<()> {
        let (features, targets) = linear_data(60);
        let forest = ForestTrainer::new(config(20, Some(42))).train(&features, &targets)?;

        assert_eq!(forest.n_trees(), 20);
        assert_eq!(forest.feature_count(), 2);

        let importances = forest.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);

        let prediction = forest.predict(&[30.0, 1.0]);
        assert!((prediction - 90.0).abs() < 15.0, "prediction {prediction}");
        Ok(())
    }

    #[test]
    fn test_determinism() -> anyhow::Result<()> {
        let (features, targets) = linear_data(40);
        let a = ForestTrainer::new(config(5, Some(42))).train(&features, &targets)?;
        let b = ForestTrainer::new(config(5, Some(42))).train(&features, &targets)?;

        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_unseeded_forests_differ() -> anyhow::Result<()> {
        let (features, targets) = linear_data(40);
        let a = ForestTrainer::new(config(5, None)).train(&features, &targets)?;
        let b = ForestTrainer::new(config(5, None)).train(&features, &targets)?;

        assert_ne!(a.trees(), b.trees());
        Ok(())
    }

    #[test]
    fn test_empty_input() {
        let err = ForestTrainer::new(config(5, Some(1)))
            .train(&[], &[])
            .unwrap_err();
        assert!(matches!(err, TrainerError::EmptyTrainingSet));
    }

    #[test]
    fn test_single_row() -> anyhow::Result<()> {
        let forest = ForestTrainer::new(config(3, Some(1))).train(&[vec![1.0, 2.0]], &[4.5])?;
        assert_eq!(forest.predict(&[0.0, 0.0]), 4.5);
        assert_eq!(forest.feature_importances(), &[0.0, 0.0]);
        Ok(())
    }
}
