//! End-to-end training pipeline and its query surface
//!
//! [`Pipeline`] owns everything derived from one dataset: the encoded table,
//! the seeded split, the main forest and its held-out predictions. It is
//! built once and read-only afterwards. [`SalesAnalytics`] wraps it behind an
//! idempotent `train()`.

use once_cell::unsync::OnceCell;
use tracing::info;
use vgsales_core::metrics::{self, FeatureShare, MetricsSummary, ResidualPoint};
use vgsales_core::{EncodedTable, Forest, ForestConfig, PipelineConfig};

use crate::dataset::load_csv;
use crate::drilldown::{self, Drilldown};
use crate::errors::Result;
use crate::split::SplitData;
use crate::trainer::ForestTrainer;

/// A trained model together with the data it was fit on
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    table: EncodedTable,
    split: SplitData,
    forest: Forest,
    test_predictions: Vec<f64>,
}

impl Pipeline {
    /// Load the configured dataset and train on it
    pub fn build(config: PipelineConfig) -> Result<Self> {
        let table = load_csv(&config.dataset.path, &config.dataset.target_column)?;
        Self::from_table(table, config)
    }

    /// Split, scale and train on an already encoded table
    pub fn from_table(table: EncodedTable, config: PipelineConfig) -> Result<Self> {
        let split = SplitData::new(&table, &config.split)?;

        info!(
            "Training main forest: {} trees on {} rows",
            config.forest.n_trees,
            split.train_rows.len()
        );
        let forest = ForestTrainer::new(config.forest.clone())
            .train(&split.train_features, &split.train_target)?;
        let test_predictions = forest.predict_rows(&split.test_features);

        let pipeline = Self {
            config,
            table,
            split,
            forest,
            test_predictions,
        };
        info!(
            "Test MSE: {:.4}, R²: {:.4}",
            pipeline.mse(),
            pipeline.r_squared()
        );
        Ok(pipeline)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn table(&self) -> &EncodedTable {
        &self.table
    }

    pub fn split(&self) -> &SplitData {
        &self.split
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Held-out target after standardization
    pub fn scaled_test_target(&self) -> &[f64] {
        &self.split.test_target
    }

    /// Forest predictions for the test rows, in scaled space
    pub fn predictions(&self) -> &[f64] {
        &self.test_predictions
    }

    /// Price, genre and theme importance as percentages of the total
    pub fn feature_importance_breakdown(&self) -> Vec<FeatureShare> {
        metrics::importance_breakdown(self.table.columns(), self.forest.feature_importances())
    }

    pub fn top_features(&self) -> Vec<String> {
        metrics::features_above(
            self.table.columns(),
            self.forest.feature_importances(),
            self.config.metrics.top_threshold,
        )
    }

    pub fn bottom_features(&self) -> Vec<String> {
        metrics::features_below(
            self.table.columns(),
            self.forest.feature_importances(),
            self.config.metrics.bottom_threshold,
        )
    }

    /// Every (column name, importance) pair in column order
    pub fn importances(&self) -> Vec<(&str, f64)> {
        self.table
            .columns()
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.forest.feature_importances().iter().copied())
            .collect()
    }

    pub fn mse(&self) -> f64 {
        metrics::mean_squared_error(self.scaled_test_target(), &self.test_predictions)
    }

    pub fn r_squared(&self) -> f64 {
        metrics::r2_score(self.scaled_test_target(), &self.test_predictions)
    }

    pub fn explained_variance(&self) -> f64 {
        metrics::explained_variance_score(self.scaled_test_target(), &self.test_predictions)
    }

    pub fn residuals(&self) -> Vec<f64> {
        metrics::residuals(self.scaled_test_target(), &self.test_predictions)
    }

    /// Span of the scaled test target, bounds seeded at zero
    pub fn value_range(&self) -> f64 {
        metrics::value_range(self.scaled_test_target())
    }

    /// Residuals-vs-predictions scatter data for the test rows
    pub fn residual_points(&self) -> Vec<ResidualPoint> {
        metrics::residual_points(self.scaled_test_target(), &self.test_predictions)
    }

    pub fn summary(&self) -> MetricsSummary {
        let mse = self.mse();
        let value_range = self.value_range();
        MetricsSummary {
            test_rows: self.test_predictions.len(),
            mse,
            r_squared: self.r_squared(),
            explained_variance: self.explained_variance(),
            value_range,
            error_margin_percent: metrics::error_margin_percent(mse, value_range),
        }
    }

    /// Theme breakdown inside one genre, from a fresh unseeded mini-model
    pub fn by_genre(&self, label: &str) -> Result<Drilldown> {
        drilldown::by_genre(&self.table, label, &self.drilldown_config())
    }

    /// Genre breakdown inside one theme, from a fresh unseeded mini-model
    pub fn by_theme(&self, label: &str) -> Result<Drilldown> {
        drilldown::by_theme(&self.table, label, &self.drilldown_config())
    }

    fn drilldown_config(&self) -> ForestConfig {
        ForestConfig::unseeded(self.config.drilldown.n_trees)
    }
}

/// Lazily trained analytics facade.
///
/// The pipeline is built on the first successful `train()` and reused by
/// every later call. A failed build leaves the facade untrained.
#[derive(Debug)]
pub struct SalesAnalytics {
    config: PipelineConfig,
    pipeline: OnceCell<Pipeline>,
}

impl SalesAnalytics {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            pipeline: OnceCell::new(),
        }
    }

    /// Facade over an in-memory table; `train()` skips the CSV load
    pub fn with_table(table: EncodedTable, config: PipelineConfig) -> Result<Self> {
        let pipeline = Pipeline::from_table(table, config.clone())?;
        Ok(Self {
            config,
            pipeline: OnceCell::with_value(pipeline),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn train(&self) -> Result<&Pipeline> {
        self.pipeline
            .get_or_try_init(|| Pipeline::build(self.config.clone()))
    }

    pub fn is_trained(&self) -> bool {
        self.pipeline.get().is_some()
    }

    pub fn encode(&self, label: &str) -> Result<u8> {
        Ok(vgsales_core::encode(label)?)
    }

    pub fn decode(&self, code: u8) -> Result<&'static str> {
        Ok(vgsales_core::decode(code)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TrainerError;
    use vgsales_core::SplitConfig;

    /// Every (genre, theme) pair exactly once
    fn table() -> EncodedTable {
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..60 {
            let genre = 11 + (i % 6);
            let theme = (i / 6) % 10;
            let reviews = (i * 13 % 17) as f64;
            features.push(vec![(i % 6) as f64, genre as f64, theme as f64, reviews, 1.0]);
            targets.push(50.0 + 10.0 * reviews + genre as f64);
        }
        EncodedTable::new(
            ["Price", "Genre", "Theme", "Reviews", "Constant"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            "Copies_per_year",
            features,
            targets,
        )
        .unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            split: SplitConfig {
                seed: 42,
                test_fraction: 0.2,
            },
            forest: ForestConfig {
                n_trees: 15,
                ..ForestConfig::default()
            },
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_metrics_queries() -> anyhow::Result<()> {
        let pipeline = Pipeline::from_table(table(), config())?;

        assert_eq!(pipeline.predictions().len(), 12);
        assert!(pipeline.mse().is_finite());
        assert!(pipeline.r_squared() > 0.5, "r2 {}", pipeline.r_squared());
        assert!(pipeline.value_range() >= 0.0);

        let residuals = pipeline.residuals();
        for (i, r) in residuals.iter().enumerate() {
            let expected = pipeline.scaled_test_target()[i] - pipeline.predictions()[i];
            assert_eq!(*r, expected);
        }

        let summary = pipeline.summary();
        assert_eq!(summary.test_rows, 12);
        assert_eq!(summary.mse, pipeline.mse());
        let margin = summary.error_margin_percent.unwrap();
        assert!((margin - summary.mse / summary.value_range * 100.0).abs() < 1e-9);

        let points = pipeline.residual_points();
        assert_eq!(points.len(), 12);
        for (point, residual) in points.iter().zip(&residuals) {
            assert_eq!(point.residual, *residual);
        }
        assert_eq!(points[0].predicted, pipeline.predictions()[0]);
        Ok(())
    }

    #[test]
    fn test_importance_queries() -> anyhow::Result<()> {
        let pipeline = Pipeline::from_table(table(), config())?;

        let breakdown = pipeline.feature_importance_breakdown();
        assert_eq!(
            breakdown.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            ["Price", "Genre", "Theme"]
        );
        assert!(breakdown.iter().all(|s| (0.0..=100.0).contains(&s.percent)));

        assert_eq!(pipeline.top_features(), ["Reviews"]);
        assert_eq!(pipeline.bottom_features(), ["Constant"]);

        let importances = pipeline.importances();
        assert_eq!(importances.len(), 5);
        assert_eq!(importances[3].0, "Reviews");
        assert_eq!(importances[4], ("Constant", 0.0));
        Ok(())
    }

    #[test]
    fn test_drilldowns_use_complementary_axis() -> anyhow::Result<()> {
        let pipeline = Pipeline::from_table(table(), config())?;

        let strategy = pipeline.by_genre("Strategy")?;
        assert_eq!(strategy.buckets.len(), 10);
        assert!(strategy.buckets.iter().all(|b| b.mean_actual >= 0.0));

        let fantasy = pipeline.by_theme("Fantasy")?;
        assert_eq!(fantasy.buckets.len(), 6);
        assert!(fantasy.buckets.iter().all(|b| b.mean_actual > 0.0));

        assert!(matches!(
            pipeline.by_theme("Strategy"),
            Err(TrainerError::UnknownCategory { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_facade_with_table_is_trained() -> anyhow::Result<()> {
        let analytics = SalesAnalytics::with_table(table(), config())?;
        assert!(analytics.is_trained());

        let first = analytics.train()?;
        let second = analytics.train()?;
        assert!(std::ptr::eq(first, second));

        assert_eq!(analytics.encode("Party Games")?, 17);
        assert_eq!(analytics.decode(10)?, "Party Games");
        assert!(analytics.decode(42).is_err());
        Ok(())
    }

    #[test]
    fn test_failed_build_stays_untrained() {
        let mut config = config();
        config.dataset.path = "/nonexistent/vgsales.csv".into();
        let analytics = SalesAnalytics::new(config);

        assert!(analytics.train().is_err());
        assert!(!analytics.is_trained());
    }
}
