//! Per-column standardization.
//!
//! Statistics are fitted on the training partition only and then applied unchanged to
//! both partitions, so validation data never leaks into the fit.
//!
//! ```text
//! x' = (x - mean[col]) / std_dev[col]
//! ```
//!
//! Columns with zero spread (and any other non-finite result) map to `0.0` instead of
//! producing `NaN`/`inf`.

use serde::{Deserialize, Serialize};

use crate::{DataError, matrix::Matrix};

/// Fitted per-column mean and standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardization {
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl Standardization {
    /// Fits mean and sample standard deviation (`n - 1` denominator) for every column.
    ///
    /// With fewer than two rows the standard deviation is 0, so every applied value
    /// becomes 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use featsel_data::{matrix::Matrix, normalization::Standardization};
    ///
    /// let train = Matrix::from_rows([[1.0, 5.0], [3.0, 5.0]]).unwrap();
    /// let stats = Standardization::fit(&train);
    /// assert_eq!(stats.means, vec![2.0, 5.0]);
    ///
    /// let normalized = stats.apply(&train).unwrap();
    /// assert!(normalized.row(0)[0] < 0.0);
    /// assert_eq!(normalized.row(0)[1], 0.0); // zero-variance column
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(train: &Matrix) -> Self {
        let n = train.row_count();
        let (means, std_devs) = (0..train.column_count())
            .map(|col| {
                if n == 0 {
                    return (0.0, 0.0);
                }
                let mean = train.column(col).sum::<f64>() / n as f64;
                if n < 2 {
                    return (mean, 0.0);
                }
                let variance = train
                    .column(col)
                    .map(|v| (v - mean).powi(2))
                    .sum::<f64>()
                    / (n - 1) as f64;
                (mean, variance.sqrt())
            })
            .unzip();
        Self { means, std_devs }
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.means.len()
    }

    /// Standardizes a single value of column `col`.
    #[must_use]
    pub fn standardize(&self, col: usize, value: f64) -> f64 {
        let std_dev = self.std_devs[col];
        if std_dev == 0.0 {
            return 0.0;
        }
        let z = (value - self.means[col]) / std_dev;
        if z.is_finite() { z } else { 0.0 }
    }

    /// Returns a standardized copy of `matrix`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ColumnCountMismatch`] if `matrix` has a different column count
    /// than the fitted data.
    pub fn apply(&self, matrix: &Matrix) -> Result<Matrix, DataError> {
        if matrix.column_count() != self.column_count() {
            return Err(DataError::ColumnCountMismatch {
                expected: self.column_count(),
                actual: matrix.column_count(),
            });
        }
        Ok(matrix.map_columns(|col, value| self.standardize(col, value)))
    }
}
