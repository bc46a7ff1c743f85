//! Dataset plumbing for genetic feature selection.
//!
//! This crate holds everything that happens to the data before a network ever sees it:
//!
//! - [`matrix`] - Row-major `f64` matrix that may have zero columns
//! - [`targets`] - One-hot target encoding with configurable margins
//! - [`split`] - Train/validation partition with a dropped boundary row
//! - [`normalization`] - Per-column standardization fit on training data only
//! - [`chromosome`] - Fixed-width bit vector used as a feature mask
//! - [`projection`] - Column-subset extraction driven by a chromosome
//!
//! # Pipeline
//!
//! ```text
//! features, targets
//!     ↓ split (once)
//! train / validation partitions
//!     ↓ standardize (once, stats from train only)
//! normalized partitions
//!     ↓ project (once per chromosome evaluation)
//! selected-column matrices
//! ```
//!
//! # Example
//!
//! ```
//! use featsel_data::{chromosome::Chromosome, matrix::Matrix, projection, split};
//!
//! let features = Matrix::from_rows([[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]).unwrap();
//! let targets = Matrix::from_rows([[0.6, -0.6], [-0.6, 0.6], [0.6, -0.6]]).unwrap();
//!
//! let dataset = split::split(&features, &targets, 0.66).unwrap();
//! assert_eq!(dataset.train_features.row_count(), 1);
//! assert_eq!(dataset.valid_features.row_count(), 1);
//!
//! let mask = Chromosome::new(0b10, 64);
//! let projected = projection::project(&dataset.train_features, &mask);
//! assert_eq!(projected.column_count(), 1);
//! ```

pub mod chromosome;
pub mod matrix;
pub mod normalization;
pub mod projection;
pub mod split;
pub mod targets;

/// Errors raised when input matrices cannot be used together.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DataError {
    #[display("feature rows ({features}) and target rows ({targets}) differ")]
    RowCountMismatch { features: usize, targets: usize },
    #[display("at least 2 rows are needed to split, got {rows}")]
    TooFewRows { rows: usize },
    #[display("train fraction must be in (0, 1), got {fraction}")]
    InvalidTrainFraction { fraction: f64 },
    #[display("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("matrix has {actual} columns, expected {expected}")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[display("target row {row} must hold exactly one positive value, found {positives}")]
    InvalidTargetRow { row: usize, positives: usize },
    #[display("class label {label} is out of range for {classes} classes")]
    LabelOutOfRange { label: usize, classes: usize },
}
