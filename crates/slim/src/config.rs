//! Training configuration.
//!
//! `TrainConfig` carries the two penalties plus solver settings. It is
//! `serde`-friendly so the CLI can read it from a JSON file and override
//! individual fields from flags.

use crate::error::{Result, TrainError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default L1 penalty
pub const DEFAULT_L1_REG: f64 = 0.001;
/// Default L2 penalty
pub const DEFAULT_L2_REG: f64 = 0.0001;
/// Default sweep budget per column fit
pub const DEFAULT_MAX_ITER: usize = 10_000;
/// Default duality-gap tolerance, relative to the squared norm of the target
pub const DEFAULT_TOL: f64 = 1e-4;

/// Configuration for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Sparsity-inducing penalty strength
    pub l1_reg: f64,
    /// Shrinkage-inducing penalty strength
    pub l2_reg: f64,
    /// Maximum coordinate-descent sweeps per item
    pub max_iter: usize,
    /// A fit has converged once its duality gap is at most `tol · ‖y‖²`
    pub tol: f64,
    /// Shuffle the coordinate order each sweep with this seed; `None` is cyclic
    pub seed: Option<u64>,
    /// Fit items on the rayon pool instead of one after another
    pub parallel: bool,
    /// Upper bound on the wall time of a single item's fit
    pub fit_deadline_ms: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            l1_reg: DEFAULT_L1_REG,
            l2_reg: DEFAULT_L2_REG,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            seed: None,
            parallel: true,
            fit_deadline_ms: None,
        }
    }
}

impl TrainConfig {
    /// Create a config with the given penalties and default solver settings
    pub fn new(l1_reg: f64, l2_reg: f64) -> Self {
        Self {
            l1_reg,
            l2_reg,
            ..Self::default()
        }
    }

    /// Configure the sweep budget (default: 10000)
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Configure the relative duality-gap tolerance (default: 1e-4)
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Use a seeded random coordinate order
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Toggle parallel training across items (default: true)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Bound the wall time of each item's fit
    pub fn with_fit_deadline(mut self, deadline: Duration) -> Self {
        self.fit_deadline_ms = Some(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn fit_deadline(&self) -> Option<Duration> {
        self.fit_deadline_ms.map(Duration::from_millis)
    }

    /// Validate the penalties and derive `(alpha, l1_ratio)`.
    ///
    /// `alpha = l1_reg + l2_reg` is the combined penalty strength and
    /// `l1_ratio = l1_reg / alpha` the L1 share of it.
    pub fn penalty(&self) -> Result<Penalty> {
        let (l1_reg, l2_reg) = (self.l1_reg, self.l2_reg);
        if !l1_reg.is_finite() || !l2_reg.is_finite() || l1_reg < 0.0 || l2_reg < 0.0 {
            return Err(TrainError::InvalidRegularization { l1_reg, l2_reg });
        }

        let alpha = l1_reg + l2_reg;
        if alpha == 0.0 {
            return Err(TrainError::DegenerateRegularization { l1_reg, l2_reg });
        }

        Ok(Penalty {
            alpha,
            l1_ratio: l1_reg / alpha,
        })
    }
}

/// Elastic-net penalty in `(alpha, l1_ratio)` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    pub alpha: f64,
    pub l1_ratio: f64,
}

impl Penalty {
    /// Weight applied to the L1 norm
    pub fn l1(&self) -> f64 {
        self.alpha * self.l1_ratio
    }

    /// Weight applied to the squared L2 norm
    pub fn l2(&self) -> f64 {
        self.alpha * (1.0 - self.l1_ratio)
    }

    /// Scale factor for the side-information block of the stacked matrix
    pub fn side_information_scale(&self) -> f64 {
        self.alpha.sqrt()
    }
}
