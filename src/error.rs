use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Coarse failure category of a [`TrackerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DataAccess,
    Schema,
    Config,
    Render,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column `{column}` is {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("row {row}: unparseable date {value:?} in column `{column}`")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("row {row}: {value:?} in column `{column}` is not an integer")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("table has no rows, cannot determine the latest date")]
    EmptyTable,

    #[error("config: {0}")]
    Config(String),

    #[error("rendering {chart}: {reason}")]
    Render { chart: String, reason: String },

    #[error("writing report: {0}")]
    Report(#[source] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Io { .. } | TrackerError::Malformed { .. } => ErrorKind::DataAccess,
            TrackerError::MissingColumns(_)
            | TrackerError::ColumnType { .. }
            | TrackerError::InvalidDate { .. }
            | TrackerError::InvalidNumber { .. }
            | TrackerError::EmptyTable
            | TrackerError::Arrow(_) => ErrorKind::Schema,
            TrackerError::Config(_) => ErrorKind::Config,
            TrackerError::Render { .. } | TrackerError::Report(_) => ErrorKind::Render,
        }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
