//! Train/validation partition.
//!
//! The split is positional: callers shuffle rows beforehand if they want a random
//! partition. With `R` rows and a train fraction `f`:
//!
//! ```text
//! train_count = floor((R - 1) * f)
//! rows 0 .. train_count            -> training
//! row  train_count                 -> dropped (boundary row)
//! rows train_count + 1 .. R        -> validation
//! ```
//!
//! Exactly one row is left out, so the two partitions together cover `R - 1` rows.
//! Because `f < 1`, the validation partition always has at least one row. The
//! training partition may be empty (e.g. `R = 2`).

use crate::{
    DataError,
    matrix::Matrix,
    normalization::Standardization,
};

/// Default share of rows (minus the boundary row) used for training.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.66;

/// Paired train and validation partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDataset {
    pub train_features: Matrix,
    pub train_targets: Matrix,
    pub valid_features: Matrix,
    pub valid_targets: Matrix,
}

/// Number of training and validation rows for `rows` input rows.
///
/// # Errors
///
/// Returns [`DataError::TooFewRows`] for fewer than 2 rows and
/// [`DataError::InvalidTrainFraction`] if `train_fraction` is not in `(0, 1)`.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn partition_sizes(rows: usize, train_fraction: f64) -> Result<(usize, usize), DataError> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(DataError::InvalidTrainFraction {
            fraction: train_fraction,
        });
    }
    if rows < 2 {
        return Err(DataError::TooFewRows { rows });
    }
    let train = (((rows - 1) as f64) * train_fraction).floor() as usize;
    let valid = rows - (train + 1);
    Ok((train, valid))
}

/// Splits paired feature and target matrices into train and validation partitions.
///
/// Input matrices are not modified.
///
/// # Errors
///
/// Returns [`DataError::RowCountMismatch`] if the matrices have different row counts,
/// plus the errors of [`partition_sizes`].
pub fn split(
    features: &Matrix,
    targets: &Matrix,
    train_fraction: f64,
) -> Result<SplitDataset, DataError> {
    if features.row_count() != targets.row_count() {
        return Err(DataError::RowCountMismatch {
            features: features.row_count(),
            targets: targets.row_count(),
        });
    }
    let rows = features.row_count();
    let (train, _valid) = partition_sizes(rows, train_fraction)?;
    let train_range = 0..train;
    let valid_range = train + 1..rows;
    Ok(SplitDataset {
        train_features: features.row_range(train_range.clone()),
        train_targets: targets.row_range(train_range),
        valid_features: features.row_range(valid_range.clone()),
        valid_targets: targets.row_range(valid_range),
    })
}

impl SplitDataset {
    /// Builds a dataset from partitions that were split elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if a feature/target pair has different row counts, or if the two
    /// partitions disagree on feature or class column counts.
    pub fn from_parts(
        train_features: Matrix,
        train_targets: Matrix,
        valid_features: Matrix,
        valid_targets: Matrix,
    ) -> Result<Self, DataError> {
        for (features, targets) in [
            (&train_features, &train_targets),
            (&valid_features, &valid_targets),
        ] {
            if features.row_count() != targets.row_count() {
                return Err(DataError::RowCountMismatch {
                    features: features.row_count(),
                    targets: targets.row_count(),
                });
            }
        }
        if train_features.column_count() != valid_features.column_count() {
            return Err(DataError::ColumnCountMismatch {
                expected: train_features.column_count(),
                actual: valid_features.column_count(),
            });
        }
        if train_targets.column_count() != valid_targets.column_count() {
            return Err(DataError::ColumnCountMismatch {
                expected: train_targets.column_count(),
                actual: valid_targets.column_count(),
            });
        }
        Ok(Self {
            train_features,
            train_targets,
            valid_features,
            valid_targets,
        })
    }

    /// Number of feature columns (`D`).
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.train_features.column_count()
    }

    /// Number of target columns (`C`).
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.train_targets.column_count()
    }

    /// Standardizes both partitions with statistics fitted on the training features.
    ///
    /// Returns the normalized dataset together with the fitted statistics.
    pub fn standardized(&self) -> Result<(Self, Standardization), DataError> {
        let stats = Standardization::fit(&self.train_features);
        let dataset = Self {
            train_features: stats.apply(&self.train_features)?,
            train_targets: self.train_targets.clone(),
            valid_features: stats.apply(&self.valid_features)?,
            valid_targets: self.valid_targets.clone(),
        };
        Ok((dataset, stats))
    }
}
