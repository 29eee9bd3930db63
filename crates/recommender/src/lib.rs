//! Recommendation scoring and evaluation for learned SLIM weights.
//!
//! This crate provides:
//! - `recommend`: top-N unseen items per user from `A · W`
//! - `precision` / `precision_from_file`: precision@N against held-out data
//!
//! ## Example Usage
//! ```ignore
//! use recommender::{recommend, precision_from_file};
//!
//! let w = slim::train(&a, &b, 0.001, 0.0001)?;
//! let recommendations = recommend(&a, &w, 10)?;
//! let p = precision_from_file(&recommendations, Path::new("data/test_100.tsv"))?;
//! ```

pub mod error;
pub mod metrics;
pub mod scoring;

// Re-export main types
pub use error::{RecommendError, Result};
pub use metrics::{PrecisionReport, evaluate, precision, precision_from_file};
pub use scoring::{RecommendationList, ScoredItem, UserRecommendations, recommend};
