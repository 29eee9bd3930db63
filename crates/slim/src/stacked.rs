//! The stacked training matrix `Mline = [A; sqrt(alpha) · B]`.
//!
//! Stored column-major, since every regression walks feature columns. The
//! column ranges into the value buffer are kept alongside the matrix so a
//! single column can be zeroed and restored in place without touching the
//! sparsity structure.

use sprs::CsMat;
use std::ops::Range;

/// Column-major `(2U) × I` working buffer for one training run.
#[derive(Debug, Clone)]
pub struct StackedMatrix {
    matrix: CsMat<f64>,
    column_ranges: Vec<Range<usize>>,
}

impl StackedMatrix {
    /// Stack `a` on top of `side_scale · b`.
    ///
    /// `a` and `b` must share their shape; the caller checks this.
    pub fn build(a: &CsMat<f64>, b: &CsMat<f64>, side_scale: f64) -> Self {
        let n_users = a.rows();
        let n_items = a.cols();

        let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_items];
        for (&value, (row, col)) in a.iter() {
            if value != 0.0 {
                columns[col].push((row, value));
            }
        }
        for (&value, (row, col)) in b.iter() {
            let scaled = side_scale * value;
            if scaled != 0.0 {
                columns[col].push((n_users + row, scaled));
            }
        }

        let nnz = columns.iter().map(Vec::len).sum();
        let mut indptr = Vec::with_capacity(n_items + 1);
        let mut indices = Vec::with_capacity(nnz);
        let mut data = Vec::with_capacity(nnz);
        let mut column_ranges = Vec::with_capacity(n_items);

        indptr.push(0);
        for mut column in columns {
            column.sort_unstable_by_key(|&(row, _)| row);
            let start = indices.len();
            for (row, value) in column {
                indices.push(row);
                data.push(value);
            }
            column_ranges.push(start..indices.len());
            indptr.push(indices.len());
        }

        Self {
            matrix: CsMat::new_csc((2 * n_users, n_items), indptr, indices, data),
            column_ranges,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn n_items(&self) -> usize {
        self.matrix.cols()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    pub fn matrix(&self) -> &CsMat<f64> {
        &self.matrix
    }

    /// Dense copy of column `j`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_rows()];
        if let Some(column) = self.matrix.outer_view(j) {
            for (row, &value) in column.iter() {
                dense[row] = value;
            }
        }
        dense
    }

    /// Zero column `j` until the returned guard is dropped.
    ///
    /// The guard captures the column as the regression target first, and
    /// restores the original values on drop, whichever way the fit ends.
    pub fn mask_column(&mut self, j: usize) -> MaskedColumn<'_> {
        let target = self.column(j);
        let range = self.column_ranges[j].clone();
        let saved = self.matrix.data()[range.clone()].to_vec();
        self.matrix.data_mut()[range.clone()].fill(0.0);

        MaskedColumn {
            stacked: self,
            range,
            saved,
            target,
        }
    }
}

/// Scoped leave-one-out view: one column of the stacked matrix is zeroed.
pub struct MaskedColumn<'a> {
    stacked: &'a mut StackedMatrix,
    range: Range<usize>,
    saved: Vec<f64>,
    target: Vec<f64>,
}

impl MaskedColumn<'_> {
    /// Feature matrix with the masked column zeroed
    pub fn features(&self) -> &CsMat<f64> {
        &self.stacked.matrix
    }

    /// The masked column's original values
    pub fn target(&self) -> &[f64] {
        &self.target
    }
}

impl Drop for MaskedColumn<'_> {
    fn drop(&mut self) {
        self.stacked.matrix.data_mut()[self.range.clone()].copy_from_slice(&self.saved);
    }
}
