//! Error types for the sales core crate

use thiserror::Error;

/// Errors raised while mapping categories, building tables or loading configuration
#[derive(Error, Debug)]
pub enum CoreError {
    /// Label is neither a genre nor a theme
    #[error("Unknown category label: {0:?}")]
    UnknownLabel(String),

    /// Code is outside both category code spaces
    #[error("Unknown category code: {0}")]
    UnknownCode(u8),

    /// Price bracket text is not one of the six known brackets
    #[error("Unknown price bracket: {0:?}")]
    UnknownPriceBracket(String),

    /// Required column is absent from the header
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Categorical cell has no code in its mapping table
    #[error("Unmapped {column} value {value:?} in row {row}")]
    UnmappedCategory {
        row: usize,
        column: String,
        value: String,
    },

    /// Cell could not be converted to a numeric value
    #[error("Invalid value {value:?} in row {row}, column {column}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// Row width does not match the header
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Dataset contains no data rows
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for sales core operations
pub type Result<T> = std::result::Result<T, CoreError>;
