//! Error types for scoring and evaluation.

use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// The weight matrix does not cover the interaction matrix's items
    #[error("Weight matrix has {weight_items} items but the interaction matrix has {matrix_items}")]
    ShapeMismatch {
        weight_items: usize,
        matrix_items: usize,
    },

    /// The held-out test file could not be loaded
    #[error("Failed to load test data: {0}")]
    TestData(#[from] DataLoadError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
