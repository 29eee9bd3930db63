//! cSLIM training: one leave-one-out elastic-net regression per item.
//!
//! ## Algorithm
//! 1. Derive `alpha = l1_reg + l2_reg` and `l1_ratio = l1_reg / alpha`
//! 2. Stack `Mline = [A; sqrt(alpha) · B]`
//! 3. For every item `j`:
//!    a. take column `j` of `Mline` as the target and zero it
//!    b. fit the elastic net (no intercept) on the masked `Mline`
//!    c. restore column `j`
//!    d. clamp negative coefficients to zero
//! 4. Collect the per-item vectors in item order
//!
//! Items are independent, so by default they are fitted on the rayon pool.
//! Each worker owns its own clone of `Mline`, which keeps one item's zeroed
//! column invisible to every other fit.

use crate::config::TrainConfig;
use crate::error::{Result, TrainError};
use crate::solver::ElasticNet;
use crate::stacked::StackedMatrix;
use crate::weights::WeightMatrix;
use rayon::prelude::*;
use sprs::CsMat;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Learn the cSLIM weight matrix with default solver settings.
///
/// `a` is the users × items interaction matrix, `b` the side-information
/// matrix of the same shape.
pub fn train(a: &CsMat<f64>, b: &CsMat<f64>, l1_reg: f64, l2_reg: f64) -> Result<WeightMatrix> {
    SlimTrainer::new(TrainConfig::new(l1_reg, l2_reg)).train(a, b)
}

/// Configurable cSLIM trainer.
#[derive(Debug, Clone, Default)]
pub struct SlimTrainer {
    config: TrainConfig,
}

impl SlimTrainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Learn one non-negative weight vector per item.
    ///
    /// # Errors
    /// * `InvalidShape` - `a` and `b` differ in shape
    /// * `InvalidRegularization` / `DegenerateRegularization` - bad penalties
    /// * `RegressionFailed` - any single item's fit failed; no partial result
    #[instrument(skip_all, fields(users = a.rows(), items = a.cols(), parallel = self.config.parallel))]
    pub fn train(&self, a: &CsMat<f64>, b: &CsMat<f64>) -> Result<WeightMatrix> {
        if a.shape() != b.shape() {
            return Err(TrainError::InvalidShape {
                a_rows: a.rows(),
                a_cols: a.cols(),
                b_rows: b.rows(),
                b_cols: b.cols(),
            });
        }
        let penalty = self.config.penalty()?;
        let solver = ElasticNet::from_config(&self.config, penalty);

        let stacked = StackedMatrix::build(a, b, penalty.side_information_scale());
        let n_items = stacked.n_items();
        debug!(
            "Stacked training matrix: {}x{} ({} nnz), alpha {}, l1_ratio {}",
            stacked.n_rows(),
            n_items,
            stacked.nnz(),
            penalty.alpha,
            penalty.l1_ratio
        );

        let start = Instant::now();
        let weights: Vec<Vec<f64>> = if self.config.parallel {
            (0..n_items)
                .into_par_iter()
                .map_init(
                    || stacked.clone(),
                    |local, item| fit_item(local, &solver, item),
                )
                .collect::<Result<_>>()?
        } else {
            let mut stacked = stacked;
            (0..n_items)
                .map(|item| fit_item(&mut stacked, &solver, item))
                .collect::<Result<_>>()?
        };

        let weights = WeightMatrix::from_items(weights);
        info!(
            "Trained {} item weight vectors in {:?} ({} non-zero weights, density {:.4})",
            weights.n_items(),
            start.elapsed(),
            weights.nnz(),
            weights.density()
        );
        Ok(weights)
    }
}

/// Fit the weight vector of a single item against the masked stacked matrix.
fn fit_item(stacked: &mut StackedMatrix, solver: &ElasticNet, item: usize) -> Result<Vec<f64>> {
    let outcome = {
        let masked = stacked.mask_column(item);
        solver.fit(masked.features(), masked.target())
    }
    .map_err(|cause| TrainError::RegressionFailed {
        item_index: item,
        cause,
    })?;

    let mut weights = outcome.coefficients;
    clamp_negative(&mut weights);

    debug!(
        "Item {}: converged in {} sweeps, {} non-zero weights",
        item,
        outcome.iterations,
        weights.iter().filter(|&&w| w > 0.0).count()
    );
    Ok(weights)
}

/// Replace every negative coordinate with zero.
pub fn clamp_negative(weights: &mut [f64]) {
    for w in weights.iter_mut() {
        if *w < 0.0 {
            *w = 0.0;
        }
    }
}
