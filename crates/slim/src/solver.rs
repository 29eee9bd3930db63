//! Elastic-net linear regression without intercept, solved by coordinate descent.
//!
//! Minimizes
//!
//! ```text
//! ‖y − Xw‖² + alpha · (l1_ratio · ‖w‖₁ + (1 − l1_ratio) · ‖w‖₂²)
//! ```
//!
//! over `w`. The model passes through the origin: there is no intercept and
//! no centering of `X` or `y`.
//!
//! ## Algorithm
//! Keep the residual `r = y − Xw` up to date and update one coordinate at a
//! time in closed form:
//!
//! ```text
//! rho_k = x_kᵀ r + ‖x_k‖² w_k
//! w_k  <- soft_threshold(rho_k, alpha · l1_ratio / 2) / (‖x_k‖² + alpha · (1 − l1_ratio))
//! ```
//!
//! A sweep visits every coordinate once. Every few sweeps the last iterates
//! are combined by Anderson extrapolation, and the combined point replaces
//! the current one when it has a lower objective. Wide, nearly collinear
//! designs converge slowly along flat directions otherwise.
//!
//! ## Stopping rule
//! Once the largest update in a sweep is small relative to the largest
//! coefficient, the duality gap of the halved objective
//! `½‖y − Xw‖² + l1/2 · ‖w‖₁ + l2/2 · ‖w‖₂²` is evaluated. The fit has
//! converged when the gap is at most `tol · ‖y‖²`. The gap bounds the
//! distance to the optimal objective, so the check holds however slowly the
//! coefficients themselves settle.

use crate::config::{Penalty, TrainConfig};
use crate::error::SolverError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use sprs::CsMat;
use std::time::{Duration, Instant};

/// Number of sweep differences combined by one extrapolation step
const ANDERSON_DEPTH: usize = 5;

/// Coefficients of a converged fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub coefficients: Vec<f64>,
    /// Sweeps taken until convergence
    pub iterations: usize,
}

/// Coordinate-descent elastic-net solver.
#[derive(Debug, Clone)]
pub struct ElasticNet {
    penalty: Penalty,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
    deadline: Option<Duration>,
}

impl ElasticNet {
    /// Create a solver with cyclic coordinate order and default budgets
    pub fn new(penalty: Penalty) -> Self {
        let defaults = TrainConfig::default();
        Self {
            penalty,
            max_iter: defaults.max_iter,
            tol: defaults.tol,
            seed: None,
            deadline: None,
        }
    }

    /// Build a solver from a validated training config
    pub fn from_config(config: &TrainConfig, penalty: Penalty) -> Self {
        Self {
            penalty,
            max_iter: config.max_iter,
            tol: config.tol,
            seed: config.seed,
            deadline: config.fit_deadline(),
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Relative duality-gap tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Shuffle the coordinate order every sweep, deterministically per seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fit `y ≈ Xw`.
    ///
    /// `x` must be column-major (CSC) with `x.rows() == y.len()`.
    pub fn fit(&self, x: &CsMat<f64>, y: &[f64]) -> Result<FitOutcome, SolverError> {
        if !x.is_csc() {
            return Err(SolverError::NotColumnMajor);
        }
        if x.rows() != y.len() {
            return Err(SolverError::DimensionMismatch(format!(
                "feature matrix has {} rows but target has length {}",
                x.rows(),
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFiniteInput("target"));
        }
        if x.data().iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFiniteInput("feature matrix"));
        }

        let n_features = x.cols();
        let col_norms_sq: Vec<f64> = x
            .outer_iterator()
            .map(|column| column.iter().map(|(_, &v)| v * v).sum())
            .collect();

        // The 1/2 comes from differentiating the unscaled squared loss.
        let l1 = self.penalty.l1() / 2.0;
        let l2 = self.penalty.l2();
        let gap_tol = self.tol * dot(y, y);

        let mut coefficients = vec![0.0; n_features];
        let mut residual = y.to_vec();
        let mut order: Vec<usize> = (0..n_features).collect();
        let mut rng = self.seed.map(StdRng::seed_from_u64);
        let mut anderson = Anderson::new(ANDERSON_DEPTH);

        let start = Instant::now();
        let mut gap = f64::INFINITY;

        for iteration in 1..=self.max_iter {
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }

            let mut max_change: f64 = 0.0;
            for &k in &order {
                let norm_sq = col_norms_sq[k];
                if norm_sq == 0.0 {
                    continue;
                }
                let Some(column) = x.outer_view(k) else {
                    continue;
                };

                let old = coefficients[k];
                let mut rho = norm_sq * old;
                for (row, &value) in column.iter() {
                    rho += value * residual[row];
                }

                let new = soft_threshold(rho, l1) / (norm_sq + l2);
                if !new.is_finite() {
                    return Err(SolverError::NonFiniteCoefficient {
                        feature: k,
                        iterations: iteration,
                    });
                }

                let delta = new - old;
                if delta != 0.0 {
                    for (row, &value) in column.iter() {
                        residual[row] -= value * delta;
                    }
                    coefficients[k] = new;
                    max_change = max_change.max(delta.abs());
                }
            }

            if let Some((extrapolated, extrapolated_residual)) =
                anderson.push(&coefficients, &residual)
            {
                if objective(&extrapolated, &extrapolated_residual, l1, l2)
                    < objective(&coefficients, &residual, l1, l2)
                {
                    coefficients = extrapolated;
                    residual = extrapolated_residual;
                }
            }

            let max_coef = coefficients.iter().fold(0.0_f64, |m, w| m.max(w.abs()));
            if max_coef == 0.0 || max_change <= self.tol * max_coef || iteration == self.max_iter {
                gap = duality_gap(x, y, &coefficients, &residual, l1, l2);
                if gap <= gap_tol {
                    return Ok(FitOutcome {
                        coefficients,
                        iterations: iteration,
                    });
                }
            }

            if let Some(deadline) = self.deadline {
                if start.elapsed() >= deadline {
                    return Err(SolverError::DeadlineExceeded {
                        deadline,
                        iterations: iteration,
                    });
                }
            }
        }

        Err(SolverError::DidNotConverge {
            iterations: self.max_iter,
            duality_gap: gap,
            tolerance: gap_tol,
        })
    }
}

/// Proximal operator of `threshold · |x|`.
pub fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `½‖r‖² + l1 · ‖w‖₁ + l2/2 · ‖w‖²`
fn objective(coefficients: &[f64], residual: &[f64], l1: f64, l2: f64) -> f64 {
    let l1_norm: f64 = coefficients.iter().map(|w| w.abs()).sum();
    0.5 * dot(residual, residual) + l1 * l1_norm + 0.5 * l2 * dot(coefficients, coefficients)
}

/// Duality gap of the halved objective at `w`, given `r = y − Xw`.
///
/// The dual point is the residual rescaled into the feasible set
/// `‖Xᵀθ − l2 · w‖∞ ≤ l1`.
fn duality_gap(
    x: &CsMat<f64>,
    y: &[f64],
    coefficients: &[f64],
    residual: &[f64],
    l1: f64,
    l2: f64,
) -> f64 {
    let dual_norm = x
        .outer_iterator()
        .zip(coefficients)
        .map(|(column, &w)| {
            let correlation: f64 = column.iter().map(|(row, &v)| v * residual[row]).sum();
            (correlation - l2 * w).abs()
        })
        .fold(0.0_f64, f64::max);

    let r_norm_sq = dot(residual, residual);
    let (scale, mut gap) = if dual_norm > l1 {
        let scale = l1 / dual_norm;
        (scale, 0.5 * r_norm_sq * (1.0 + scale * scale))
    } else {
        (1.0, r_norm_sq)
    };

    let l1_norm: f64 = coefficients.iter().map(|w| w.abs()).sum();
    gap += l1 * l1_norm - scale * dot(residual, y)
        + 0.5 * l2 * (1.0 + scale * scale) * dot(coefficients, coefficients);
    gap
}

/// Anderson extrapolation over consecutive sweeps.
///
/// Collects `depth + 1` iterates, then returns the affine combination
/// `Σ c_i w_i` (with `Σ c_i = 1`) that minimizes the norm of the combined
/// sweep differences. The residual is linear in `w`, so it is combined with
/// the same weights.
struct Anderson {
    depth: usize,
    coefficients: Vec<Vec<f64>>,
    residuals: Vec<Vec<f64>>,
}

impl Anderson {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            coefficients: Vec::with_capacity(depth + 1),
            residuals: Vec::with_capacity(depth + 1),
        }
    }

    /// Record one iterate; every `depth + 1` calls, return the extrapolated point.
    fn push(&mut self, coefficients: &[f64], residual: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
        self.coefficients.push(coefficients.to_vec());
        self.residuals.push(residual.to_vec());
        if self.coefficients.len() <= self.depth {
            return None;
        }

        let coefficients = std::mem::take(&mut self.coefficients);
        let residuals = std::mem::take(&mut self.residuals);
        let weights = mixing_weights(&coefficients)?;
        let extrapolated = combine(&coefficients[1..], &weights);
        if extrapolated.iter().any(|w| !w.is_finite()) {
            return None;
        }
        Some((extrapolated, combine(&residuals[1..], &weights)))
    }
}

/// Solve `min ‖Σ c_i Δ_i‖` subject to `Σ c_i = 1`, where `Δ_i = w_{i+1} − w_i`.
fn mixing_weights(iterates: &[Vec<f64>]) -> Option<Vec<f64>> {
    let diffs: Vec<Vec<f64>> = iterates
        .windows(2)
        .map(|pair| pair[1].iter().zip(&pair[0]).map(|(b, a)| b - a).collect())
        .collect();
    let gram: Vec<Vec<f64>> = diffs
        .iter()
        .map(|u| diffs.iter().map(|v| dot(u, v)).collect())
        .collect();

    let z = solve_linear(gram, vec![1.0; diffs.len()])?;
    let total: f64 = z.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return None;
    }
    Some(z.into_iter().map(|v| v / total).collect())
}

fn combine(iterates: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; iterates.first().map_or(0, Vec::len)];
    for (iterate, &c) in iterates.iter().zip(weights) {
        for (o, &v) in out.iter_mut().zip(iterate) {
            *o += c * v;
        }
    }
    out
}

/// Solve `(A + εI) z = b` by Gaussian elimination with partial pivoting.
///
/// The Gram matrices fed in here turn nearly singular once the sweeps move
/// along a single slow direction, so a ridge of `1e-10 · trace(A)` keeps the
/// system solvable. `None` only for an all-zero or non-finite matrix.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let trace: f64 = (0..n).map(|i| a[i][i]).sum();
    if trace <= 0.0 || !trace.is_finite() {
        return None;
    }
    for (i, row) in a.iter_mut().enumerate() {
        row[i] += 1e-10 * trace;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col] == 0.0 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let pivot_row = a[col].clone();
        let pivot_rhs = b[col];
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col] / pivot_row[col];
            if factor == 0.0 {
                continue;
            }
            for (entry, &p) in a[row].iter_mut().zip(&pivot_row).skip(col) {
                *entry -= factor * p;
            }
            b[row] -= factor * pivot_rhs;
        }
    }

    let solution: Vec<f64> = (0..n).map(|i| b[i] / a[i][i]).collect();
    solution.iter().all(|v| v.is_finite()).then_some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sprs::TriMat;

    fn csc(rows: &[&[f64]]) -> CsMat<f64> {
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut tri = TriMat::new((rows.len(), n_cols));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    tri.add_triplet(i, j, v);
                }
            }
        }
        tri.to_csc()
    }

    fn penalty(l1: f64, l2: f64) -> Penalty {
        TrainConfig::new(l1, l2).penalty().unwrap()
    }

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(3.0, 1.0), 2.0);
        assert_eq!(soft_threshold(-3.0, 1.0), -2.0);
        assert_eq!(soft_threshold(0.5, 1.0), 0.0);
        assert_eq!(soft_threshold(-1.0, 1.0), 0.0);
    }

    #[test]
    fn test_recovers_sparse_linear_model() {
        // Orthogonal columns, y = 2·x0 + 1·x2
        let x = csc(&[
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
            &[1.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0],
        ]);
        let y = [2.0, 0.0, 1.0, 2.0, 0.0, 1.0];

        let fit = ElasticNet::new(penalty(1e-4, 1e-5)).fit(&x, &y).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], 2.0, epsilon = 1e-3);
        assert_eq!(fit.coefficients[1], 0.0);
        assert_abs_diff_eq!(fit.coefficients[2], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_closed_form_single_feature() {
        // One column x = [1, 1], y = [1, 1]:
        // w = (2 − l1/2) / (2 + l2)
        let x = csc(&[&[1.0], &[1.0]]);
        let fit = ElasticNet::new(penalty(0.2, 0.3)).fit(&x, &[1.0, 1.0]).unwrap();
        assert_abs_diff_eq!(fit.coefficients[0], (2.0 - 0.1) / 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_strong_l1_zeroes_everything() {
        let x = csc(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let fit = ElasticNet::new(penalty(10.0, 0.0)).fit(&x, &[1.0, 1.0]).unwrap();
        assert_eq!(fit.coefficients, vec![0.0, 0.0]);
    }

    #[test]
    fn test_zero_target_gives_zero_coefficients() {
        let x = csc(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let fit = ElasticNet::new(penalty(0.01, 0.01)).fit(&x, &[0.0, 0.0]).unwrap();
        assert_eq!(fit.coefficients, vec![0.0, 0.0]);
        assert_eq!(fit.iterations, 1);
    }

    #[test]
    fn test_zero_columns_keep_zero_coefficient() {
        let x = csc(&[&[1.0, 0.0], &[1.0, 0.0]]);
        let fit = ElasticNet::new(penalty(0.01, 0.01)).fit(&x, &[1.0, 1.0]).unwrap();
        assert!(fit.coefficients[0] > 0.0);
        assert_eq!(fit.coefficients[1], 0.0);
    }

    #[test]
    fn test_correlated_features_converge() {
        let x = csc(&[
            &[1.0, 0.9, 0.0],
            &[1.0, 1.0, 0.1],
            &[0.0, 0.1, 1.0],
            &[0.5, 0.4, 0.0],
        ]);
        let y = [1.0, 1.0, 0.0, 0.5];
        let fit = ElasticNet::new(penalty(1e-3, 1e-4)).fit(&x, &y).unwrap();
        let prediction: f64 = fit.coefficients[0] + 0.9 * fit.coefficients[1];
        assert_abs_diff_eq!(prediction, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_wide_design_with_duplicate_columns_converges() {
        // 6 rows, 15 columns: every column pattern appears several times,
        // so the optimum spreads weight across exact duplicates.
        let rows: Vec<Vec<f64>> = (0..6)
            .map(|i| {
                (0..15)
                    .map(|j| if (i * 7 + j * 3) % 5 < 2 { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect();
        let row_refs: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let x = csc(&row_refs);
        let y = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

        let fit = ElasticNet::new(penalty(1e-3, 1e-4)).fit(&x, &y).unwrap();
        assert!(fit.iterations < TrainConfig::default().max_iter);

        let l1 = 1e-3 / 2.0;
        let residual: Vec<f64> = (0..6)
            .map(|i| y[i] - dot(&rows[i], &fit.coefficients))
            .collect();
        let gap = duality_gap(&x, &y, &fit.coefficients, &residual, l1, 1e-4);
        assert!(gap <= 1e-4 * dot(&y, &y));
        for (i, r) in residual.iter().enumerate() {
            assert!(r.abs() < 1e-2, "row {} residual {}", i, r);
        }
    }

    #[test]
    fn test_duality_gap_vanishes_at_optimum() {
        // Single column x = [1, 1], y = [1, 1]; optimum (2 − l1/2) / (2 + l2)
        let x = csc(&[&[1.0], &[1.0]]);
        let y = [1.0, 1.0];
        let (l1, l2) = (0.1, 0.3);
        let w = (2.0 - l1) / (2.0 + l2);
        let residual = [1.0 - w, 1.0 - w];

        assert_abs_diff_eq!(duality_gap(&x, &y, &[w], &residual, l1, l2), 0.0, epsilon = 1e-12);
        assert!(duality_gap(&x, &y, &[0.0], &y, l1, l2) > 0.1);
    }

    #[test]
    fn test_anderson_extrapolates_after_full_history() {
        let mut anderson = Anderson::new(2);
        assert!(anderson.push(&[1.0, 0.0, 0.0], &[0.0]).is_none());
        assert!(anderson.push(&[0.0, 1.0, 0.0], &[1.0]).is_none());

        // Differences (−1, 1, 0) and (0, −1, 1) mix with equal weight
        let (coefficients, residual) = anderson.push(&[0.0, 0.0, 1.0], &[2.0]).unwrap();
        assert_abs_diff_eq!(coefficients[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coefficients[1], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(coefficients[2], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(residual[0], 1.5, epsilon = 1e-9);

        // History starts over
        assert!(anderson.push(&[0.0, 0.0, 1.0], &[2.0]).is_none());
    }

    #[test]
    fn test_solve_linear() {
        let z = solve_linear(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
        assert_abs_diff_eq!(z[0], 0.8, epsilon = 1e-8);
        assert_abs_diff_eq!(z[1], 1.4, epsilon = 1e-8);

        // Rank-deficient systems are ridged rather than rejected
        assert!(solve_linear(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 1.0]).is_some());
        assert!(solve_linear(vec![vec![0.0, 0.0], vec![0.0, 0.0]], vec![1.0, 1.0]).is_none());
    }

    #[test]
    fn test_seeded_order_is_deterministic() {
        let x = csc(&[&[1.0, 0.5, 0.2], &[0.3, 1.0, 0.0], &[0.0, 0.4, 1.0]]);
        let y = [1.0, 0.5, 0.25];
        let solver = ElasticNet::new(penalty(1e-3, 1e-3)).with_seed(42);
        let first = solver.fit(&x, &y).unwrap();
        let second = solver.fit(&x, &y).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reports_non_convergence() {
        let x = csc(&[&[1.0, 0.5], &[0.5, 1.0]]);
        let err = ElasticNet::new(penalty(1e-3, 1e-3))
            .with_max_iter(1)
            .fit(&x, &[1.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::DidNotConverge { iterations: 1, .. }));
    }

    #[test]
    fn test_zero_deadline_is_exceeded() {
        let x = csc(&[&[1.0, 0.5], &[0.5, 1.0]]);
        let err = ElasticNet::new(penalty(1e-3, 1e-3))
            .with_deadline(Duration::ZERO)
            .fit(&x, &[1.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::DeadlineExceeded { iterations: 1, .. }));
    }

    #[test]
    fn test_rejects_mismatched_target() {
        let x = csc(&[&[1.0], &[1.0]]);
        let err = ElasticNet::new(penalty(0.1, 0.1)).fit(&x, &[1.0]).unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch(_)));
    }

    #[test]
    fn test_rejects_row_major_matrix() {
        let mut tri = TriMat::new((2, 1));
        tri.add_triplet(0, 0, 1.0);
        tri.add_triplet(1, 0, 1.0);
        let x: CsMat<f64> = tri.to_csr();
        let err = ElasticNet::new(penalty(0.1, 0.1)).fit(&x, &[1.0, 1.0]).unwrap_err();
        assert_eq!(err, SolverError::NotColumnMajor);
    }

    #[test]
    fn test_rejects_non_finite_target() {
        let x = csc(&[&[1.0], &[1.0]]);
        let err = ElasticNet::new(penalty(0.1, 0.1))
            .fit(&x, &[1.0, f64::INFINITY])
            .unwrap_err();
        assert_eq!(err, SolverError::NonFiniteInput("target"));
    }
}
