//! Fully numeric sales table
//!
//! Rows are stored row-major as `f64` features with the target kept in a
//! separate column. Categorical columns hold their integer codes.

use crate::categories::{Axis, Category, Genre, PriceBracket, Theme};
use crate::errors::{CoreError, Result};

/// Price bracket column in the raw dataset
pub const PRICE_COLUMN: &str = "Price";
/// Genre column in the raw dataset
pub const GENRE_COLUMN: &str = "Genre";
/// Theme column in the raw dataset
pub const THEME_COLUMN: &str = "Theme";
/// Default regression target
pub const TARGET_COLUMN: &str = "Copies_per_year";

/// Named feature columns, resolved once when a table is built.
///
/// The three categorical columns form the "breakdown" set. Every other
/// feature column is "ranked" by the top/bottom importance queries.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumns {
    names: Vec<String>,
    price: usize,
    genre: usize,
    theme: usize,
}

impl FeatureColumns {
    pub fn new(names: Vec<String>) -> Result<Self> {
        let find = |wanted: &str| {
            names
                .iter()
                .position(|n| n == wanted)
                .ok_or_else(|| CoreError::MissingColumn(wanted.to_string()))
        };
        let price = find(PRICE_COLUMN)?;
        let genre = find(GENRE_COLUMN)?;
        let theme = find(THEME_COLUMN)?;

        Ok(Self {
            names,
            price,
            genre,
            theme,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn genre(&self) -> usize {
        self.genre
    }

    pub fn theme(&self) -> usize {
        self.theme
    }

    /// Column index holding codes for the given axis
    pub fn axis(&self, axis: Axis) -> usize {
        match axis {
            Axis::Genre => self.genre,
            Axis::Theme => self.theme,
        }
    }

    /// Categorical columns in (price, genre, theme) order
    pub fn breakdown(&self) -> [usize; 3] {
        [self.price, self.genre, self.theme]
    }

    /// Non-categorical feature columns in table order.
    ///
    /// Every column outside the breakdown set is ranked, however wide the
    /// dataset is, rather than a fixed positional range.
    pub fn ranked(&self) -> impl Iterator<Item = usize> + '_ {
        let breakdown = self.breakdown();
        (0..self.names.len()).filter(move |i| !breakdown.contains(i))
    }
}

/// Dataset with every categorical field replaced by its code
#[derive(Debug, Clone)]
pub struct EncodedTable {
    columns: FeatureColumns,
    target_name: String,
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl EncodedTable {
    /// Build a table from row-major features and a target column.
    ///
    /// Fails if a categorical column is missing, a row has the wrong width,
    /// a categorical cell is not a known code, or there are no rows.
    pub fn new(
        feature_names: Vec<String>,
        target_name: impl Into<String>,
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
    ) -> Result<Self> {
        let columns = FeatureColumns::new(feature_names)?;

        if features.is_empty() {
            return Err(CoreError::EmptyDataset);
        }
        if features.len() != targets.len() {
            return Err(CoreError::RowWidth {
                row: features.len().min(targets.len()) + 1,
                expected: features.len(),
                found: targets.len(),
            });
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CoreError::RowWidth {
                    row: i + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
            check_codes(&columns, i + 1, row)?;
        }

        Ok(Self {
            columns,
            target_name: target_name.into(),
            features,
            targets,
        })
    }

    pub fn columns(&self) -> &FeatureColumns {
        &self.columns
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    /// Category code stored in a row for the given axis
    pub fn code(&self, row: usize, axis: Axis) -> u8 {
        self.features[row][self.columns.axis(axis)] as u8
    }

    /// Indices of rows belonging to a category
    pub fn rows_in(&self, category: Category) -> Vec<usize> {
        let axis = category.axis();
        (0..self.len())
            .filter(|&row| self.code(row, axis) == category.code())
            .collect()
    }

    /// Copy the selected rows' features and targets
    pub fn select(&self, rows: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = rows.iter().map(|&r| self.features[r].clone()).collect();
        let targets = rows.iter().map(|&r| self.targets[r]).collect();
        (features, targets)
    }

    /// Per-column (min, max) over all rows
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); self.feature_count()];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

/// Reject categorical cells that are not integral known codes
fn check_codes(columns: &FeatureColumns, row: usize, values: &[f64]) -> Result<()> {
    let checks: [(usize, fn(u8) -> bool); 3] = [
        (columns.price, |c| PriceBracket::from_code(c).is_some()),
        (columns.genre, |c| Genre::from_code(c).is_some()),
        (columns.theme, |c| Theme::from_code(c).is_some()),
    ];

    for (col, known) in checks {
        let value = values[col];
        let integral = value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value);
        if !(integral && known(value as u8)) {
            return Err(CoreError::UnmappedCategory {
                row,
                column: columns.names[col].clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
