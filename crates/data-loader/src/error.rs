//! Error types for the data-loader crate.
//!
//! Every failure carries enough context (file, line, offending value) to
//! point at the broken record without re-reading the input.

use thiserror::Error;

/// Errors that can occur while loading a triple file into a sparse matrix
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A record addresses a cell outside the requested matrix shape
    #[error("Record #{record} ({row}, {col}) in {file} is outside a {rows}x{cols} matrix")]
    IndexOutOfBounds {
        file: String,
        record: usize,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A field parsed but holds a value the matrix cannot store
    #[error("Invalid {field} '{value}' at line {line} in {file}")]
    InvalidValue {
        file: String,
        line: usize,
        field: String,
        value: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
