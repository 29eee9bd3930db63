//! Sparse matrix construction from parsed triples.
//!
//! The loader always returns row-major (CSR) matrices: rows are users, so
//! per-user scans during scoring are contiguous. Consumers that need a
//! column-major layout convert on their side.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{Interaction, ShapeHint};
use sprs::{CsMat, TriMat};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load a triple file into a sparse matrix.
///
/// ## Shape
/// - `rows`/`cols` left as `None` are inferred as `max index + 1`
/// - provided dimensions pad the matrix; records outside them are rejected
///
/// Duplicate `(row, col)` records are summed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path, rows: Option<usize>, cols: Option<usize>) -> Result<CsMat<f64>> {
    let records = parser::parse_triples(path)?;
    let file = path.display().to_string();
    build_matrix(&records, ShapeHint { rows, cols }, &file)
}

/// Load the interaction matrix and a side-information matrix of the same shape.
///
/// ## Algorithm
/// 1. Parse both files in parallel (`rayon::join`)
/// 2. Build `A`, inferring its shape from the interaction records
/// 3. Build `B` padded to exactly `A`'s shape
///
/// Side-information records outside `A`'s shape are an error, since the
/// engine requires both matrices to describe the same users and items.
#[instrument(skip_all, fields(train = %train_path.display(), side = %side_path.display()))]
pub fn load_with_side_information(
    train_path: &Path,
    side_path: &Path,
) -> Result<(CsMat<f64>, CsMat<f64>)> {
    let (train, side) = rayon::join(
        || parser::parse_triples(train_path),
        || parser::parse_triples(side_path),
    );
    let train = train?;
    let side = side?;

    let a = build_matrix(&train, ShapeHint::infer(), &train_path.display().to_string())?;
    let b = build_matrix(
        &side,
        ShapeHint::exact(a.rows(), a.cols()),
        &side_path.display().to_string(),
    )?;

    info!(
        "Loaded {}x{} interaction matrix ({} nnz) and side information ({} nnz)",
        a.rows(),
        a.cols(),
        a.nnz(),
        b.nnz()
    );
    Ok((a, b))
}

/// Build a CSR matrix from records under a shape hint.
///
/// `file` labels bound errors.
pub fn build_matrix(records: &[Interaction], hint: ShapeHint, file: &str) -> Result<CsMat<f64>> {
    let (rows, cols) = hint.resolve(records);

    let mut triplets = TriMat::with_capacity((rows, cols), records.len());
    for (idx, record) in records.iter().enumerate() {
        if record.row >= rows || record.col >= cols {
            return Err(DataLoadError::IndexOutOfBounds {
                file: file.to_string(),
                record: idx + 1,
                row: record.row,
                col: record.col,
                rows,
                cols,
            });
        }
        triplets.add_triplet(record.row, record.col, record.value);
    }

    let matrix: CsMat<f64> = triplets.to_csr();
    debug!(
        "Built {}x{} matrix from {} records ({} nnz)",
        rows,
        cols,
        records.len(),
        matrix.nnz()
    );
    Ok(matrix)
}
