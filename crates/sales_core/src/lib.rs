//! Core types for video-game sales analytics
//!
//! Provides the category code tables, the encoded numeric table, random-forest
//! inference and the regression metrics reported about a trained model.
//!
//! Modules:
//! - `categories`: genre/theme/price-bracket codes and the `encode`/`decode` pair
//! - `table`: the encoded table and its named feature columns
//! - `forest`: regression trees and the forest regressor
//! - `metrics`: error metrics and feature-importance rankings
//! - `config`: pipeline configuration (TOML + environment)

pub mod categories;
pub mod config;
pub mod errors;
pub mod forest;
pub mod metrics;
pub mod table;

pub use categories::{decode, encode, Axis, Category, Genre, PriceBracket, Theme};
pub use config::{
    DatasetConfig, DrilldownConfig, ForestConfig, LoggingConfig, MetricsConfig, PipelineConfig,
    SplitConfig,
};
pub use errors::{CoreError, Result};
pub use forest::{Forest, ForestError, Node, Tree};
pub use metrics::{FeatureShare, MetricsSummary, ResidualPoint};
pub use table::{EncodedTable, FeatureColumns, TARGET_COLUMN};
