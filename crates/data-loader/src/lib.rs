//! # Data Loader Crate
//!
//! Loads tab-separated `(row, col, value)` triple files into sparse
//! matrices for the cSLIM trainer.
//!
//! ## Main Components
//!
//! - **types**: Record and shape types (Interaction, ShapeHint)
//! - **parser**: Parse triple files into records
//! - **matrix**: Build `sprs` CSR matrices from records
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{load, load_with_side_information};
//! use std::path::Path;
//!
//! // Interaction matrix with inferred shape
//! let a = load(Path::new("data/train_100.tsv"), None, None)?;
//!
//! // Side information padded to the interaction matrix's shape
//! let b = load(Path::new("data/item_side_information_100.tsv"), Some(a.rows()), Some(a.cols()))?;
//!
//! // Or both at once, parsed in parallel
//! let (a, b) = load_with_side_information(
//!     Path::new("data/train_100.tsv"),
//!     Path::new("data/item_side_information_100.tsv"),
//! )?;
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod matrix;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use matrix::{build_matrix, load, load_with_side_information};
pub use types::{Interaction, ItemIndex, ShapeHint, UserIndex};
