//! Core record types for interaction and side-information files.
//!
//! Both file kinds share one layout: a zero-based row index (the user),
//! a zero-based column index (the item) and a numeric signal.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Zero-based row index of a matrix (a user)
pub type UserIndex = usize;

/// Zero-based column index of a matrix (an item)
pub type ItemIndex = usize;

// =============================================================================
// Records
// =============================================================================

/// One `row<TAB>col<TAB>value` record.
///
/// For interaction files the value is the feedback signal (binary or a
/// count); for side-information files it is the auxiliary signal about the
/// same user-item pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub row: UserIndex,
    pub col: ItemIndex,
    pub value: f64,
}

impl Interaction {
    pub fn new(row: UserIndex, col: ItemIndex, value: f64) -> Self {
        Self { row, col, value }
    }
}

/// Requested dimensions of a loaded matrix.
///
/// A `None` dimension is inferred from the largest index present in the
/// data; a `Some` dimension pads the matrix to exactly that size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeHint {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
}

impl ShapeHint {
    /// Infer both dimensions from the data
    pub fn infer() -> Self {
        Self::default()
    }

    /// Force both dimensions, e.g. to match an already loaded matrix
    pub fn exact(rows: usize, cols: usize) -> Self {
        Self {
            rows: Some(rows),
            cols: Some(cols),
        }
    }

    /// Resolve the final `(rows, cols)` for a set of records.
    pub fn resolve(&self, records: &[Interaction]) -> (usize, usize) {
        let inferred_rows = records.iter().map(|r| r.row + 1).max().unwrap_or(0);
        let inferred_cols = records.iter().map(|r| r.col + 1).max().unwrap_or(0);
        (
            self.rows.unwrap_or(inferred_rows),
            self.cols.unwrap_or(inferred_cols),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_infers_from_max_index() {
        let records = vec![Interaction::new(0, 4, 1.0), Interaction::new(2, 1, 1.0)];
        assert_eq!(ShapeHint::infer().resolve(&records), (3, 5));
    }

    #[test]
    fn test_resolve_keeps_explicit_dimensions() {
        let records = vec![Interaction::new(0, 1, 1.0)];
        assert_eq!(ShapeHint::exact(10, 20).resolve(&records), (10, 20));

        let partial = ShapeHint {
            rows: Some(7),
            cols: None,
        };
        assert_eq!(partial.resolve(&records), (7, 2));
    }

    #[test]
    fn test_resolve_empty_records() {
        assert_eq!(ShapeHint::infer().resolve(&[]), (0, 0));
    }
}
