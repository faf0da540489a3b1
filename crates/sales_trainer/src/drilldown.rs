//! Per-category drill-downs
//!
//! A drill-down selects every row of one genre (or theme), fits a fresh
//! mini-forest on just those rows and reports, for each theme (or genre),
//! the mean actual and mean predicted target. Nothing is cached: each call
//! trains its own model on the raw, unscaled target.

use serde::Serialize;
use tracing::{debug, info};
use vgsales_core::{Axis, Category, EncodedTable, ForestConfig, Genre, Theme};

use crate::errors::{Result, TrainerError};
use crate::trainer::ForestTrainer;

/// Mean actual vs. predicted target for one complementary category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAggregate {
    pub code: u8,
    pub label: &'static str,
    pub rows: usize,
    /// 0 when the bucket is empty
    pub mean_actual: f64,
    /// 0 when the bucket is empty
    pub mean_predicted: f64,
}

/// Result of one drill-down query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drilldown {
    pub selected: Category,
    pub rows: usize,
    pub buckets: Vec<BucketAggregate>,
}

/// Theme breakdown within a genre: one bucket per theme code `0..=9`
pub fn by_genre(table: &EncodedTable, label: &str, config: &ForestConfig) -> Result<Drilldown> {
    let buckets = Theme::CORE.map(Category::Theme);
    drill(table, Axis::Genre, label, &buckets, config)
}

/// Genre breakdown within a theme: one bucket per genre code `11..=16`
pub fn by_theme(table: &EncodedTable, label: &str, config: &ForestConfig) -> Result<Drilldown> {
    let buckets = Genre::CORE.map(Category::Genre);
    drill(table, Axis::Theme, label, &buckets, config)
}

fn drill(
    table: &EncodedTable,
    axis: Axis,
    label: &str,
    buckets: &[Category],
    config: &ForestConfig,
) -> Result<Drilldown> {
    let selected = Category::on_axis(axis, label).ok_or_else(|| TrainerError::UnknownCategory {
        axis,
        label: label.to_string(),
    })?;

    let rows = table.rows_in(selected);
    if rows.is_empty() {
        return Err(TrainerError::EmptyCategory {
            axis,
            label: selected.label(),
        });
    }

    let (features, targets) = table.select(&rows);
    info!(
        "Fitting {}-tree mini-model for {} {:?} on {} rows",
        config.n_trees,
        axis,
        selected.label(),
        rows.len()
    );
    let mini_model = ForestTrainer::new(config.clone()).train(&features, &targets)?;

    let bucket_column = match axis {
        Axis::Genre => table.columns().theme(),
        Axis::Theme => table.columns().genre(),
    };

    let buckets = buckets
        .iter()
        .map(|bucket| {
            let members: Vec<usize> = features
                .iter()
                .enumerate()
                .filter(|(_, row)| row[bucket_column] as u8 == bucket.code())
                .map(|(i, _)| i)
                .collect();

            let (mean_actual, mean_predicted) = if members.is_empty() {
                (0.0, 0.0)
            } else {
                let n = members.len() as f64;
                let actual = members.iter().map(|&i| targets[i]).sum::<f64>() / n;
                let predicted = members
                    .iter()
                    .map(|&i| mini_model.predict(&features[i]))
                    .sum::<f64>()
                    / n;
                (actual, predicted)
            };
            debug!(
                "{}: {} rows, actual {:.3}, predicted {:.3}",
                bucket.label(),
                members.len(),
                mean_actual,
                mean_predicted
            );

            BucketAggregate {
                code: bucket.code(),
                label: bucket.label(),
                rows: members.len(),
                mean_actual,
                mean_predicted,
            }
        })
        .collect();

    Ok(Drilldown {
        selected,
        rows: rows.len(),
        buckets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Strategy games in Anime and Horror only, plus one Action-Adventure row
    fn table() -> EncodedTable {
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..12 {
            let theme = (i % 2) as f64;
            features.push(vec![1.0, 13.0, theme, i as f64]);
            targets.push(100.0 + 50.0 * theme + i as f64);
        }
        features.push(vec![2.0, 11.0, 3.0, 99.0]);
        targets.push(7.0);

        EncodedTable::new(
            ["Price", "Genre", "Theme", "Reviews"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            "Copies_per_year",
            features,
            targets,
        )
        .unwrap()
    }

    fn mini() -> ForestConfig {
        ForestConfig::unseeded(10)
    }

    #[test]
    fn test_by_genre_reports_every_core_theme() {
        let result = by_genre(&table(), "Strategy", &mini()).unwrap();

        assert_eq!(result.selected, Category::Genre(Genre::Strategy));
        assert_eq!(result.rows, 12);
        assert_eq!(result.buckets.len(), 10);
        assert_eq!(
            result.buckets.iter().map(|b| b.code).collect::<Vec<_>>(),
            (0..10).collect::<Vec<u8>>()
        );

        let anime = &result.buckets[0];
        assert_eq!(anime.label, "Anime");
        assert_eq!(anime.rows, 6);
        // even i in 0..12: 100 + mean(0, 2, ..., 10)
        assert!((anime.mean_actual - 105.0).abs() < 1e-9);
        assert!(anime.mean_predicted > 90.0 && anime.mean_predicted < 170.0);

        for empty in &result.buckets[2..] {
            assert_eq!(empty.rows, 0);
            assert_eq!((empty.mean_actual, empty.mean_predicted), (0.0, 0.0));
        }
    }

    #[test]
    fn test_by_theme_reports_core_genres() {
        let result = by_theme(&table(), "Science-fiction", &mini()).unwrap();

        assert_eq!(result.buckets.len(), 6);
        assert_eq!(result.buckets[0].label, "Action-Adventure");
        assert_eq!(result.buckets[0].mean_actual, 7.0);
        assert_eq!(result.buckets[0].mean_predicted, 7.0);
        assert!(result.buckets[1..].iter().all(|b| b.rows == 0));
    }

    #[test]
    fn test_unknown_and_empty_categories() {
        let table = table();
        assert!(matches!(
            by_genre(&table, "Horror", &mini()),
            Err(TrainerError::UnknownCategory { axis: Axis::Genre, .. })
        ));
        assert!(matches!(
            by_theme(&table, "Racing", &mini()),
            Err(TrainerError::UnknownCategory { axis: Axis::Theme, .. })
        ));
        assert!(matches!(
            by_genre(&table, "Visual Novels", &mini()),
            Err(TrainerError::EmptyCategory { label: "Visual Novels", .. })
        ));
    }
}
