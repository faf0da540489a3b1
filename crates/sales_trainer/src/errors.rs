use std::path::PathBuf;
use thiserror::Error;
use vgsales_core::{Axis, CoreError, ForestError};

/// Errors returned by the training pipeline and its queries.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{rows} rows cannot be split with test fraction {test_fraction}")]
    EmptyPartition { rows: usize, test_fraction: f64 },

    #[error("cannot fit a forest on zero rows")]
    EmptyTrainingSet,

    #[error("unknown {axis} {label:?}")]
    UnknownCategory { axis: Axis, label: String },

    #[error("no rows belong to {axis} {label:?}")]
    EmptyCategory { axis: Axis, label: &'static str },

    #[error("training error: {0}")]
    Training(#[from] ForestError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
