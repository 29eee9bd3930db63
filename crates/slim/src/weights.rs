//! The learned item-item weight matrix.

use serde::Serialize;

/// One non-negative weight vector per item, in item order.
///
/// `item(j)[i]` is the influence of item `i` on item `j`'s score, so the
/// score of item `j` for a user row `a_u` is `a_u · item(j)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightMatrix {
    weights: Vec<Vec<f64>>,
}

impl WeightMatrix {
    /// Build a weight matrix from per-item vectors.
    ///
    /// Returns `None` unless there is one vector of length `n` per item and
    /// every entry is finite and non-negative.
    pub fn new(weights: Vec<Vec<f64>>) -> Option<Self> {
        let n = weights.len();
        let valid = weights
            .iter()
            .all(|w| w.len() == n && w.iter().all(|v| v.is_finite() && *v >= 0.0));
        valid.then(|| Self { weights })
    }

    /// Assemble a weight matrix from per-item vectors.
    ///
    /// Every vector must have one coordinate per item.
    pub(crate) fn from_items(weights: Vec<Vec<f64>>) -> Self {
        debug_assert!(weights.iter().all(|w| w.len() == weights.len()));
        Self { weights }
    }

    /// Number of items (and length of every weight vector)
    pub fn n_items(&self) -> usize {
        self.weights.len()
    }

    /// Weight vector for item `j`
    pub fn item(&self, j: usize) -> Option<&[f64]> {
        self.weights.get(j).map(Vec::as_slice)
    }

    /// Single entry: influence of `source` on `target`
    pub fn get(&self, source: usize, target: usize) -> Option<f64> {
        self.weights.get(target)?.get(source).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.weights.iter().map(Vec::as_slice)
    }

    /// Count of strictly positive weights
    pub fn nnz(&self) -> usize {
        self.weights
            .iter()
            .map(|w| w.iter().filter(|&&v| v > 0.0).count())
            .sum()
    }

    /// Fraction of entries that are non-zero
    pub fn density(&self) -> f64 {
        let n = self.n_items();
        if n == 0 {
            return 0.0;
        }
        self.nnz() as f64 / (n * n) as f64
    }

    /// Largest weight, 0.0 for an empty or all-zero matrix
    pub fn max_weight(&self) -> f64 {
        self.weights
            .iter()
            .flat_map(|w| w.iter().copied())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightMatrix {
        WeightMatrix::from_items(vec![
            vec![0.0, 0.0, 0.5],
            vec![0.0, 0.0, 0.0],
            vec![0.25, 0.0, 0.0],
        ])
    }

    #[test]
    fn test_accessors() {
        let w = sample();
        assert_eq!(w.n_items(), 3);
        assert_eq!(w.item(0), Some(&[0.0, 0.0, 0.5][..]));
        assert_eq!(w.item(3), None);
        assert_eq!(w.get(2, 0), Some(0.5));
        assert_eq!(w.get(0, 2), Some(0.25));
        assert_eq!(w.get(0, 9), None);
    }

    #[test]
    fn test_statistics() {
        let w = sample();
        assert_eq!(w.nnz(), 2);
        assert!((w.density() - 2.0 / 9.0).abs() < 1e-12);
        assert_eq!(w.max_weight(), 0.5);
    }

    #[test]
    fn test_new_validates() {
        assert!(WeightMatrix::new(vec![vec![0.0, 1.0], vec![0.5, 0.0]]).is_some());
        assert!(WeightMatrix::new(vec![vec![0.0, 1.0]]).is_none());
        assert!(WeightMatrix::new(vec![vec![0.0, -1.0], vec![0.5, 0.0]]).is_none());
        assert!(WeightMatrix::new(vec![vec![0.0, f64::NAN], vec![0.5, 0.0]]).is_none());
    }

    #[test]
    fn test_empty_matrix() {
        let w = WeightMatrix::from_items(Vec::new());
        assert_eq!(w.n_items(), 0);
        assert_eq!(w.density(), 0.0);
        assert_eq!(w.max_weight(), 0.0);
    }
}
