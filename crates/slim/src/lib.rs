//! # SLIM Crate
//!
//! Learns item-item weight matrices for a Sparse Linear Method (SLIM)
//! recommender extended with side information (cSLIM).
//!
//! ## Components
//!
//! - **config**: `TrainConfig` (penalties, solver budgets, parallelism)
//! - **solver**: coordinate-descent elastic net without intercept
//! - **stacked**: the stacked training matrix `[A; sqrt(alpha) · B]` and
//!   its leave-one-out column mask
//! - **trainer**: the per-item training loop
//! - **weights**: the learned `WeightMatrix`
//!
//! ## Example Usage
//!
//! ```ignore
//! use slim::{train, SlimTrainer, TrainConfig};
//!
//! // Default solver settings
//! let w = train(&a, &b, 0.001, 0.0001)?;
//!
//! // Seeded coordinate order, single-threaded
//! let trainer = SlimTrainer::new(
//!     TrainConfig::new(0.001, 0.0001)
//!         .with_seed(7)
//!         .with_parallel(false),
//! );
//! let w = trainer.train(&a, &b)?;
//!
//! for (item, weights) in w.iter().enumerate() {
//!     println!("item {} has {} neighbours", item, weights.iter().filter(|&&v| v > 0.0).count());
//! }
//! ```

pub mod config;
pub mod error;
pub mod solver;
pub mod stacked;
pub mod trainer;
pub mod weights;

// Re-export main types
pub use config::{Penalty, TrainConfig};
pub use error::{Result, SolverError, TrainError};
pub use solver::{ElasticNet, FitOutcome};
pub use trainer::{SlimTrainer, train};
pub use weights::WeightMatrix;
