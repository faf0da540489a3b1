//! Pipeline configuration
//!
//! Every field has a default, so an empty TOML file is a valid configuration.
//! Environment variables override file values.

use crate::errors::{CoreError, Result};
use crate::table::TARGET_COLUMN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset: DatasetConfig,
    pub split: SplitConfig,
    pub forest: ForestConfig,
    pub drilldown: DrilldownConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Input dataset location and schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub target_column: String,
}

/// Train/test partitioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub seed: u64,
    /// Fraction of rows held out for testing, in (0, 1)
    pub test_fraction: f64,
}

/// Hyperparameters of a random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Fixed seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features per split; `None` uses every feature
    pub max_features: Option<usize>,
}

/// Per-query mini-model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrilldownConfig {
    pub n_trees: usize,
}

/// Importance thresholds for the top/bottom feature lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub top_threshold: f64,
    pub bottom_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("game_data_no_outliers.csv"),
            target_column: TARGET_COLUMN.to_string(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 1000,
            seed: Some(42),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

impl ForestConfig {
    /// Default hyperparameters with a different tree count and no fixed seed
    pub fn unseeded(n_trees: usize) -> Self {
        Self {
            n_trees,
            seed: None,
            ..Self::default()
        }
    }
}

impl Default for DrilldownConfig {
    fn default() -> Self {
        Self { n_trees: 100 }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            top_threshold: 0.03,
            bottom_threshold: 0.01,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `VGSALES_*` environment overrides
    pub fn load_from_env(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VGSALES_DATASET") {
            self.dataset.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("VGSALES_SEED") {
            let seed = parse_env("VGSALES_SEED", &val)?;
            self.split.seed = seed;
            self.forest.seed = Some(seed);
        }
        if let Ok(val) = std::env::var("VGSALES_TREES") {
            self.forest.n_trees = parse_env("VGSALES_TREES", &val)?;
        }
        if let Ok(val) = std::env::var("VGSALES_TEST_FRACTION") {
            self.split.test_fraction = parse_env("VGSALES_TEST_FRACTION", &val)?;
        }
        if let Ok(val) = std::env::var("VGSALES_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.split.test_fraction
            )));
        }
        if self.forest.n_trees == 0 || self.drilldown.n_trees == 0 {
            return Err(CoreError::InvalidConfig(
                "tree count must be positive".to_string(),
            ));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(CoreError::InvalidConfig(
                "min_samples_leaf must be positive".to_string(),
            ));
        }
        if self.forest.max_features == Some(0) {
            return Err(CoreError::InvalidConfig(
                "max_features must be positive".to_string(),
            ));
        }
        if self.metrics.top_threshold < self.metrics.bottom_threshold {
            return Err(CoreError::InvalidConfig(format!(
                "top_threshold {} is below bottom_threshold {}",
                self.metrics.top_threshold, self.metrics.bottom_threshold
            )));
        }
        if self.forest.seed.is_none() {
            warn!("Main forest has no fixed seed; results will differ between runs");
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| CoreError::InvalidConfig(format!("{key}={val:?} is not a valid value")))
}
