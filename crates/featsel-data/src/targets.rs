//! One-hot target encoding with configurable margins.
//!
//! Targets are not 0/1: the positive class is encoded with a positive margin and the
//! other classes with a negative margin, chosen to sit inside the output range of the
//! network's bipolar activation.

use serde::{Deserialize, Serialize};

use crate::{DataError, matrix::Matrix};

/// Values used for the positive class and for every other class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetMargins {
    pub positive: f64,
    pub negative: f64,
}

impl Default for TargetMargins {
    fn default() -> Self {
        Self {
            positive: 0.6,
            negative: -0.6,
        }
    }
}

impl TargetMargins {
    /// Encodes class labels as margin-valued one-hot rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::LabelOutOfRange`] if a label is not below `classes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use featsel_data::targets::TargetMargins;
    ///
    /// let targets = TargetMargins::default().encode(&[1, 0], 3).unwrap();
    /// assert_eq!(targets.row(0), &[-0.6, 0.6, -0.6]);
    /// assert_eq!(targets.row(1), &[0.6, -0.6, -0.6]);
    /// ```
    pub fn encode(&self, labels: &[usize], classes: usize) -> Result<Matrix, DataError> {
        if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
            return Err(DataError::LabelOutOfRange { label, classes });
        }
        Ok(Matrix::from_fn(labels.len(), classes, |r, c| {
            if labels[r] == c {
                self.positive
            } else {
                self.negative
            }
        }))
    }

    /// Checks that every row holds exactly one positive margin value.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTargetRow`] for the first offending row.
    #[allow(clippy::float_cmp)]
    pub fn validate(&self, targets: &Matrix) -> Result<(), DataError> {
        for (row, values) in targets.rows().enumerate() {
            let positives = values.iter().filter(|&&v| v == self.positive).count();
            if positives != 1 {
                return Err(DataError::InvalidTargetRow { row, positives });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_and_validate() {
        let margins = TargetMargins::default();
        let targets = margins.encode(&[0, 2, 1, 2], 3).unwrap();
        assert_eq!(targets.row_count(), 4);
        assert_eq!(targets.row(1), &[-0.6, -0.6, 0.6]);
        assert!(margins.validate(&targets).is_ok());
    }

    #[test]
    fn test_label_out_of_range() {
        assert_eq!(
            TargetMargins::default().encode(&[0, 3], 3),
            Err(DataError::LabelOutOfRange {
                label: 3,
                classes: 3
            })
        );
    }

    #[test]
    fn test_validate_rejects_malformed_rows() {
        let margins = TargetMargins::default();
        let none = Matrix::from_rows([[-0.6, -0.6]]).unwrap();
        assert_eq!(
            margins.validate(&none),
            Err(DataError::InvalidTargetRow {
                row: 0,
                positives: 0
            })
        );
        let two = Matrix::from_rows([[0.6, -0.6], [0.6, 0.6]]).unwrap();
        assert_eq!(
            margins.validate(&two),
            Err(DataError::InvalidTargetRow {
                row: 1,
                positives: 2
            })
        );
    }

    #[test]
    fn test_custom_margins() {
        let margins = TargetMargins {
            positive: 1.0,
            negative: 0.0,
        };
        let targets = margins.encode(&[1], 2).unwrap();
        assert_eq!(targets.row(0), &[0.0, 1.0]);
        assert!(TargetMargins::default().validate(&targets).is_err());
    }
}
