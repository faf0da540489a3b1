//! Video-game sales trainer
//!
//! Loads the sales CSV, trains a seeded random forest on a standardized
//! target and answers importance, metric and per-category drill-down queries
//! about it.

pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod drilldown;
pub mod errors;
pub mod pipeline;
pub mod split;
pub mod trainer;

use std::path::Path;

pub use cart::{CartBuilder, TreeConfig};
pub use dataset::{encode_records, load_csv};
pub use drilldown::{BucketAggregate, Drilldown};
pub use errors::{Result, TrainerError};
pub use pipeline::{Pipeline, SalesAnalytics};
pub use split::{SplitData, StandardScaler};
pub use trainer::ForestTrainer;

use vgsales_core::PipelineConfig;

/// Train a pipeline directly from a CSV file, overriding the configured path.
pub fn train_pipeline_from_csv(path: &Path, mut config: PipelineConfig) -> Result<Pipeline> {
    config.dataset.path = path.to_path_buf();
    Pipeline::build(config)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
