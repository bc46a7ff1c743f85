//! Column-subset extraction driven by a chromosome mask.

use crate::{chromosome::Chromosome, matrix::Matrix};

/// Ascending column indices selected by `mask` in a matrix of `feature_count` columns.
///
/// Bits at or above `feature_count` are ignored.
#[must_use]
pub fn selected_columns(mask: &Chromosome, feature_count: usize) -> Vec<usize> {
    mask.selected_indices(feature_count).collect()
}

/// Copies the columns selected by `mask` into a new matrix.
///
/// The output keeps the row count and row order of `matrix`. Its column count is the
/// popcount of `mask` restricted to `0..matrix.column_count()`, which may be zero.
///
/// # Examples
///
/// ```
/// use featsel_data::{chromosome::Chromosome, matrix::Matrix, projection};
///
/// let m = Matrix::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
/// let p = projection::project(&m, &Chromosome::new(0b101, 64));
/// assert_eq!(p.row(1), &[4.0, 6.0]);
///
/// let empty = projection::project(&m, &Chromosome::zeros(64));
/// assert_eq!(empty.row_count(), 2);
/// assert_eq!(empty.column_count(), 0);
/// ```
#[must_use]
pub fn project(matrix: &Matrix, mask: &Chromosome) -> Matrix {
    let columns = selected_columns(mask, matrix.column_count());
    matrix.select_columns(&columns)
}
