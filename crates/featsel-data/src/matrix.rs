//! Dense row-major matrix.
//!
//! Unlike a `Vec<Vec<f64>>`, a [`Matrix`] keeps its row count even when it has no
//! columns. Projecting a dataset through an all-zero mask therefore still yields one
//! (empty) row per sample, which keeps targets and inputs aligned.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::DataError;

/// Row-major matrix of `f64` values with a fixed column count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix by calling `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Builds a matrix from row slices.
    ///
    /// The first row fixes the column count. An empty iterator gives a `0 x 0` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RaggedRow`] if any row length differs from the first.
    ///
    /// # Examples
    ///
    /// ```
    /// use featsel_data::matrix::Matrix;
    ///
    /// let m = Matrix::from_rows([[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(m.row(1), &[3.0, 4.0]);
    /// assert!(Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).is_err());
    /// ```
    pub fn from_rows<I, R>(rows: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut cols = None;
        let mut row_count = 0;
        let mut data = vec![];
        for (i, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let expected = *cols.get_or_insert(row.len());
            if row.len() != expected {
                return Err(DataError::RaggedRow {
                    row: i,
                    expected,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
            row_count += 1;
        }
        Ok(Self {
            rows: row_count,
            cols: cols.unwrap_or(0),
            data,
        })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns row `i` as a slice (empty for zero-column matrices).
    ///
    /// # Panics
    ///
    /// Panics if `i >= row_count()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row {i} out of bounds ({} rows)", self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        (0..self.rows).map(|i| self.row(i))
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.cols);
        self.row(row)[col]
    }

    /// Iterates over the values of column `col`, top to bottom.
    pub fn column(&self, col: usize) -> impl ExactSizeIterator<Item = f64> + '_ {
        assert!(col < self.cols);
        (0..self.rows).map(move |r| self.data[r * self.cols + col])
    }

    /// Copies a contiguous range of rows into a new matrix.
    #[must_use]
    pub fn row_range(&self, range: Range<usize>) -> Self {
        assert!(range.end <= self.rows);
        Self {
            rows: range.len(),
            cols: self.cols,
            data: self.data[range.start * self.cols..range.end * self.cols].to_vec(),
        }
    }

    /// Copies the given rows, in the given order, into a new matrix.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            rows: indices.len(),
            cols: self.cols,
            data,
        }
    }

    /// Copies the given columns, in the given order, into a new matrix.
    #[must_use]
    pub fn select_columns(&self, columns: &[usize]) -> Self {
        Self::from_fn(self.rows, columns.len(), |r, c| self.get(r, columns[c]))
    }

    /// Returns a new matrix with `f` applied to every cell along with its column index.
    #[must_use]
    pub fn map_columns<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, f64) -> f64,
    {
        Self::from_fn(self.rows, self.cols, |r, c| f(c, self.get(r, c)))
    }
}
