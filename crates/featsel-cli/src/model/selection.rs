use std::path::PathBuf;

use chrono::{DateTime, Utc};
use featsel_data::chromosome::Chromosome;
use featsel_training::{config::SelectorConfig, genetic::GenerationSummary, selector::Selection};
use serde::{Deserialize, Serialize};

/// Saved result of a `select` run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionRecord {
    pub selected_at: DateTime<Utc>,
    pub data_file: PathBuf,
    pub best: Chromosome,
    pub feature_count: usize,
    pub selected_features: Vec<usize>,
    /// Validation accuracy recorded during the search
    pub fitness: f64,
    /// Accuracies of the best mask, scored with the search's randomness. In seeded
    /// runs `valid_accuracy` equals `fitness`; unseeded, they come from an independent
    /// training run.
    pub train_accuracy: Option<f64>,
    pub valid_accuracy: Option<f64>,
    pub ancestor: Chromosome,
    pub cancelled: bool,
    pub config: SelectorConfig,
    pub generations: Vec<GenerationSummary>,
}

impl SelectionRecord {
    pub fn new(data_file: PathBuf, config: SelectorConfig, selection: Selection) -> Self {
        Self {
            selected_at: Utc::now(),
            data_file,
            best: selection.best,
            feature_count: selection.feature_count,
            selected_features: selection.selected_features(),
            fitness: selection.fitness,
            train_accuracy: None,
            valid_accuracy: None,
            ancestor: selection.ancestor,
            cancelled: selection.cancelled,
            config,
            generations: selection.generations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_bitstrings() {
        let selection = Selection {
            best: Chromosome::new(0b101, 4),
            fitness: 75.0,
            feature_count: 3,
            ancestor: Chromosome::new(0b001, 4),
            generations: vec![],
            cancelled: false,
        };
        let record = SelectionRecord::new("data.txt".into(), SelectorConfig::default(), selection);
        assert_eq!(record.selected_features, vec![0, 2]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["best"], "1010");
        assert_eq!(json["ancestor"], "1000");

        let back: SelectionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.best, record.best);
    }
}
