use thiserror::Error;

/// Errors raised by table access, statistics and normalization.
///
/// Loading files reports through `anyhow` instead, so that I/O, CSV,
/// Parquet and JSON failures keep their context chain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LcError {
    /// A magnitude beyond the instrument null-marker threshold.
    #[error("{column} contains values with abs() larger than 90 (row {row}: {value})")]
    InvalidMagnitude {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("band '{band}' not found in dataset")]
    BandNotFound { band: String },

    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}' already exists")]
    DuplicateColumn { column: String },
}
