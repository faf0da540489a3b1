//! CSV dataset loading and categorical encoding
//!
//! Reads the raw sales CSV (header row required) and produces an
//! [`EncodedTable`]: price brackets, genre and theme abbreviations become
//! integer codes, every other cell must be a finite number.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use vgsales_core::table::{GENRE_COLUMN, PRICE_COLUMN, THEME_COLUMN};
use vgsales_core::{CoreError, EncodedTable, FeatureColumns, Genre, PriceBracket, Theme};

use crate::errors::{Result, TrainerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Price,
    Genre,
    Theme,
    Numeric,
}

impl ColumnKind {
    fn of(header: &str) -> Self {
        match header {
            PRICE_COLUMN => ColumnKind::Price,
            GENRE_COLUMN => ColumnKind::Genre,
            THEME_COLUMN => ColumnKind::Theme,
            _ => ColumnKind::Numeric,
        }
    }
}

/// Load and encode the dataset at `path`
pub fn load_csv<P: AsRef<Path>>(path: P, target_column: &str) -> Result<EncodedTable> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    let file = File::open(path).map_err(|source| TrainerError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let table = encode_records(reader, target_column)?;
    info!(
        "Loaded {} rows with {} feature columns",
        table.len(),
        table.feature_count()
    );
    for (name, (min, max)) in table.columns().names().iter().zip(table.feature_stats()) {
        debug!("  {}: min={}, max={}", name, min, max);
    }
    Ok(table)
}

/// Encode every record of an open CSV reader
pub fn encode_records<R: Read>(
    mut reader: csv::Reader<R>,
    target_column: &str,
) -> Result<EncodedTable> {
    let headers = reader.headers()?.clone();
    let target_idx = headers
        .iter()
        .position(|h| h == target_column)
        .ok_or_else(|| CoreError::MissingColumn(target_column.to_string()))?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != target_idx)
        .map(|(_, h)| h.to_string())
        .collect();
    // Fail on a missing categorical column before reading any rows
    FeatureColumns::new(feature_names.clone())?;

    let kinds: Vec<ColumnKind> = headers.iter().map(ColumnKind::of).collect();
    let mut features = Vec::new();
    let mut targets = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = row_idx + 1;
        let mut values = Vec::with_capacity(feature_names.len());

        for (col, cell) in record.iter().enumerate() {
            let value = encode_cell(kinds[col], &headers[col], cell, row)?;
            if col == target_idx {
                targets.push(value);
            } else {
                values.push(value);
            }
        }
        features.push(values);
    }
    debug!("Encoded {} records", features.len());

    Ok(EncodedTable::new(
        feature_names,
        target_column,
        features,
        targets,
    )?)
}

fn encode_cell(
    kind: ColumnKind,
    column: &str,
    cell: &str,
    row: usize,
) -> std::result::Result<f64, CoreError> {
    let unmapped = || CoreError::UnmappedCategory {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    };

    let code = match kind {
        ColumnKind::Price => PriceBracket::from_label(cell)
            .map_err(|_| unmapped())?
            .code(),
        ColumnKind::Genre => Genre::from_abbreviation(cell).ok_or_else(unmapped)?.code(),
        ColumnKind::Theme => Theme::from_abbreviation(cell).ok_or_else(unmapped)?.code(),
        ColumnKind::Numeric => {
            return cell
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CoreError::InvalidValue {
                    row,
                    column: column.to_string(),
                    value: cell.to_string(),
                })
        }
    };

    Ok(f64::from(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_and_encode() -> Result<()> {
        let file = write_csv(&[
            "Price,Genre,Theme,Reviews,Copies_per_year",
            "free,ST,SF,120,5000.5",
            "$59.99,AA,PG,80,12000",
            ">$60, VN , HR ,3,10",
        ])?;
        let table = load_csv(file.path(), "Copies_per_year")?;

        assert_eq!(table.len(), 3);
        assert_eq!(table.feature_count(), 4);
        assert_eq!(table.columns().names(), ["Price", "Genre", "Theme", "Reviews"]);
        assert_eq!(table.features()[0], vec![0.0, 13.0, 3.0, 120.0]);
        assert_eq!(table.features()[1], vec![4.0, 11.0, 10.0, 80.0]);
        assert_eq!(table.features()[2], vec![5.0, 16.0, 1.0, 3.0]);
        assert_eq!(table.targets(), [5000.5, 12000.0, 10.0]);
        Ok(())
    }

    #[test]
    fn test_target_may_sit_anywhere() -> Result<()> {
        let file = write_csv(&["Copies_per_year,Theme,Genre,Price", "7,AN,RP,<$15"])?;
        let table = load_csv(file.path(), "Copies_per_year")?;

        assert_eq!(table.columns().breakdown(), [2, 1, 0]);
        assert_eq!(table.features()[0], vec![0.0, 12.0, 1.0]);
        assert_eq!(table.targets(), [7.0]);
        Ok(())
    }

    #[test]
    fn test_unknown_genre_is_rejected() -> Result<()> {
        let file = write_csv(&[
            "Price,Genre,Theme,Copies_per_year",
            "free,ST,SF,1",
            "free,XX,SF,1",
        ])?;
        let err = load_csv(file.path(), "Copies_per_year").unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Core(CoreError::UnmappedCategory { row: 2, ref column, ref value })
                if column == "Genre" && value == "XX"
        ));
        Ok(())
    }

    #[test]
    fn test_unknown_price_bracket_is_rejected() -> Result<()> {
        let file = write_csv(&["Price,Genre,Theme,Copies_per_year", "$99,ST,SF,1"])?;
        let err = load_csv(file.path(), "Copies_per_year").unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Core(CoreError::UnmappedCategory { ref column, .. }) if column == "Price"
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_numeric_cell() -> Result<()> {
        let file = write_csv(&["Price,Genre,Theme,Reviews,Copies_per_year", "free,ST,SF,,1"])?;
        let err = load_csv(file.path(), "Copies_per_year").unwrap_err();
        assert!(matches!(
            err,
            TrainerError::Core(CoreError::InvalidValue { row: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_columns() -> Result<()> {
        let file = write_csv(&["Price,Genre,Reviews,Copies_per_year", "free,ST,1,1"])?;
        assert!(matches!(
            load_csv(file.path(), "Copies_per_year"),
            Err(TrainerError::Core(CoreError::MissingColumn(c))) if c == "Theme"
        ));

        let file = write_csv(&["Price,Genre,Theme", "free,ST,SF"])?;
        assert!(matches!(
            load_csv(file.path(), "Copies_per_year"),
            Err(TrainerError::Core(CoreError::MissingColumn(c))) if c == "Copies_per_year"
        ));
        Ok(())
    }

    #[test]
    fn test_empty_and_ragged() -> Result<()> {
        let file = write_csv(&["Price,Genre,Theme,Copies_per_year"])?;
        assert!(matches!(
            load_csv(file.path(), "Copies_per_year"),
            Err(TrainerError::Core(CoreError::EmptyDataset))
        ));

        let file = write_csv(&["Price,Genre,Theme,Copies_per_year", "free,ST,SF"])?;
        assert!(matches!(
            load_csv(file.path(), "Copies_per_year"),
            Err(TrainerError::Csv(_))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/nonexistent/sales.csv", "Copies_per_year").unwrap_err();
        assert!(matches!(err, TrainerError::Open { .. }));
    }
}
