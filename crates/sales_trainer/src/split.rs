//! Seeded train/test split and target standardization

use tracing::info;
use vgsales_core::{EncodedTable, SplitConfig};

use crate::deterministic::shuffled_indices;
use crate::errors::{Result, TrainerError};

/// Mean/standard-deviation transform fit on one column.
///
/// Parameters are fixed at fit time; there is no way to refit an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: f64,
    std_dev: f64,
}

impl StandardScaler {
    /// Fit on `values` using the population standard deviation.
    ///
    /// A zero deviation is replaced by 1 so constant columns only get
    /// centered. Returns `None` for an empty slice.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        Some(Self {
            mean,
            std_dev: if std_dev > 0.0 { std_dev } else { 1.0 },
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.std_dev
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.std_dev + self.mean
    }
}

/// Disjoint train/test partitions with the target scaled on train statistics
#[derive(Debug, Clone)]
pub struct SplitData {
    pub train_rows: Vec<usize>,
    pub test_rows: Vec<usize>,
    pub train_features: Vec<Vec<f64>>,
    pub test_features: Vec<Vec<f64>>,
    pub train_target: Vec<f64>,
    pub test_target: Vec<f64>,
    pub scaler: StandardScaler,
}

impl SplitData {
    /// Partition `table` and standardize its target.
    ///
    /// `ceil(test_fraction * n)` rows go to the test set, picked by the seeded
    /// row order. Both partitions keep table order. Fails if either side
    /// would be empty.
    pub fn new(table: &EncodedTable, config: &SplitConfig) -> Result<Self> {
        let n = table.len();
        let n_test = (config.test_fraction * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(TrainerError::EmptyPartition {
                rows: n,
                test_fraction: config.test_fraction,
            });
        }

        let order = shuffled_indices(n, config.seed);
        let mut test_rows = order[..n_test].to_vec();
        let mut train_rows = order[n_test..].to_vec();
        test_rows.sort_unstable();
        train_rows.sort_unstable();

        let (train_features, raw_train_target) = table.select(&train_rows);
        let (test_features, raw_test_target) = table.select(&test_rows);

        let scaler = StandardScaler::fit(&raw_train_target).ok_or(TrainerError::EmptyTrainingSet)?;
        let train_target = scaler.transform_all(&raw_train_target);
        let test_target = scaler.transform_all(&raw_test_target);

        info!(
            "Split {} rows into {} train / {} test (seed {})",
            n,
            train_rows.len(),
            test_rows.len(),
            config.seed
        );

        Ok(Self {
            train_rows,
            test_rows,
            train_features,
            test_features,
            train_target,
            test_target,
            scaler,
        })
    }
}
