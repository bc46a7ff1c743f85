//! Text record parsing.
//!
//! Each non-empty line holds comma-separated numeric features followed by an integer
//! class label, e.g. `0,1,6,15,12,1,0,0,...,0`. Features are rescaled with
//! `(x - offset) / scale` while parsing.

use std::{fs, path::Path};

use anyhow::Context;
use featsel_data::matrix::Matrix;
use rand::{Rng, seq::SliceRandom as _};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseRecordError {
    #[display("no records found")]
    Empty,
    #[display("line {line}: missing class label")]
    MissingLabel { line: usize },
    #[display("line {line}: invalid class label {value:?}")]
    InvalidLabel { line: usize, value: String },
    #[display("line {line}, field {field}: invalid number {value:?}")]
    InvalidNumber {
        line: usize,
        field: usize,
        value: String,
    },
    #[display("line {line}: expected {expected} features, found {actual}")]
    FieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// Affine transform applied to every feature value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordFormat {
    pub offset: f64,
    pub scale: f64,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }
}

impl RecordFormat {
    fn transform(self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }
}

/// Parsed feature rows with one class label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Records {
    pub features: Matrix,
    pub labels: Vec<usize>,
}

impl Records {
    pub fn open<P>(path: P, format: RecordFormat) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;
        let records = Self::parse(&text, format)
            .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
        Ok(records)
    }

    pub fn parse(text: &str, format: RecordFormat) -> Result<Self, ParseRecordError> {
        let mut data = vec![];
        let mut labels = vec![];
        let mut width = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (fields, label) = line
                .rsplit_once(',')
                .ok_or(ParseRecordError::MissingLabel { line: line_no })?;
            let label = label.trim();
            let label = label
                .parse::<usize>()
                .map_err(|_| ParseRecordError::InvalidLabel {
                    line: line_no,
                    value: label.to_owned(),
                })?;

            let start = data.len();
            for (field, value) in fields.split(',').enumerate() {
                let value = value.trim();
                let x = value
                    .parse::<f64>()
                    .map_err(|_| ParseRecordError::InvalidNumber {
                        line: line_no,
                        field,
                        value: value.to_owned(),
                    })?;
                data.push(format.transform(x));
            }

            let actual = data.len() - start;
            let expected = *width.get_or_insert(actual);
            if actual != expected {
                return Err(ParseRecordError::FieldCount {
                    line: line_no,
                    expected,
                    actual,
                });
            }
            labels.push(label);
        }

        let Some(cols) = width else {
            return Err(ParseRecordError::Empty);
        };
        let features = Matrix::from_fn(labels.len(), cols, |r, c| data[r * cols + c]);
        Ok(Self { features, labels })
    }

    /// `max label + 1`.
    pub fn class_count(&self) -> usize {
        self.labels.iter().max().map_or(0, |&max| max + 1)
    }

    /// Shuffles rows, keeping each feature row with its label.
    pub fn shuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut order = (0..self.labels.len()).collect::<Vec<_>>();
        order.shuffle(rng);
        self.features = self.features.select_rows(&order);
        self.labels = order.iter().map(|&i| self.labels[i]).collect();
    }
}
