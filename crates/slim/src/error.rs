//! Error types for the weight-learning engine.
//!
//! `TrainError` is what `train` returns. A failed column fit is reported as
//! `RegressionFailed`, keeping the underlying `SolverError` as its source so
//! callers can decide on their own retry policy.

use std::time::Duration;
use thiserror::Error;

/// Failures of a single elastic-net fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Feature matrix rows and target length disagree
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The feature matrix is stored row-major; the solver walks columns
    #[error("Feature matrix must be stored column-major (CSC)")]
    NotColumnMajor,

    /// The target or the feature matrix holds NaN or infinite values
    #[error("Non-finite value in {0}")]
    NonFiniteInput(&'static str),

    /// A coefficient overflowed during the sweeps
    #[error("Coefficient {feature} became non-finite after {iterations} sweeps")]
    NonFiniteCoefficient { feature: usize, iterations: usize },

    /// The sweep budget ran out before the duality gap fell below tolerance
    #[error(
        "Did not converge after {iterations} sweeps (duality gap {duality_gap:e}, tolerance {tolerance:e})"
    )]
    DidNotConverge {
        iterations: usize,
        duality_gap: f64,
        tolerance: f64,
    },

    /// The per-fit deadline elapsed
    #[error("Fit exceeded its deadline of {deadline:?} after {iterations} sweeps")]
    DeadlineExceeded { deadline: Duration, iterations: usize },
}

/// Errors surfaced by `train`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    /// Interaction and side-information matrices differ in shape
    #[error("Interaction matrix is {a_rows}x{a_cols} but side information is {b_rows}x{b_cols}")]
    InvalidShape {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// l1_reg + l2_reg is zero, so the mixing ratio is undefined
    #[error("Degenerate regularization: l1_reg ({l1_reg}) + l2_reg ({l2_reg}) must be positive")]
    DegenerateRegularization { l1_reg: f64, l2_reg: f64 },

    /// A penalty is negative or not finite
    #[error("Invalid regularization: l1_reg ({l1_reg}) and l2_reg ({l2_reg}) must be finite and non-negative")]
    InvalidRegularization { l1_reg: f64, l2_reg: f64 },

    /// The regression for one item failed; the whole run is aborted
    #[error("Regression for item {item_index} failed: {cause}")]
    RegressionFailed {
        item_index: usize,
        #[source]
        cause: SolverError,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, TrainError>;
