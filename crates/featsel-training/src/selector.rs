//! Feature selection facade.
//!
//! [`FeatureSelector`] prepares the data once (validate, split, standardize) and then
//! runs the genetic search with a [`NeuralNetFitness`] over the prepared partitions.

use std::sync::atomic::AtomicBool;

use featsel_data::{
    DataError, chromosome::Chromosome, matrix::Matrix, normalization::Standardization, split,
    split::SplitDataset,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::{
    config::{ConfigError, SelectorConfig},
    fitness::NeuralNetFitness,
    genetic::{
        EliteSelection, GenerationSummary, GeneticEngine, Population, PopulationEvolver,
        SelectionMethod,
    },
};

/// Errors raised while preparing a selector.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SelectorError {
    #[display("invalid configuration: {_0}")]
    Config(ConfigError),
    #[display("invalid input data: {_0}")]
    Data(DataError),
}

/// Outcome of a feature selection run.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// Best chromosome of the final generation
    pub best: Chromosome,
    /// Fitness of `best` (validation accuracy in percent)
    pub fitness: f64,
    /// Number of feature columns; bits at or above this are meaningless
    pub feature_count: usize,
    /// Chromosome the initial population was seeded with
    pub ancestor: Chromosome,
    pub generations: Vec<GenerationSummary>,
    pub cancelled: bool,
}

impl Selection {
    /// Full-length bitstring of the best chromosome, bit 0 first.
    #[must_use]
    pub fn bitstring(&self) -> String {
        self.best.to_string()
    }

    /// Bitstring restricted to the real feature columns.
    #[must_use]
    pub fn feature_bitstring(&self) -> String {
        self.bitstring().chars().take(self.feature_count).collect()
    }

    /// Ascending indices of the selected feature columns.
    #[must_use]
    pub fn selected_features(&self) -> Vec<usize> {
        self.best.selected_indices(self.feature_count).collect()
    }
}

/// Genetic feature selection over one dataset.
///
/// # Example
///
/// ```
/// use featsel_data::{matrix::Matrix, targets::TargetMargins};
/// use featsel_training::{config::SelectorConfig, selector::FeatureSelector};
///
/// let features = Matrix::from_fn(12, 3, |r, c| ((r * (c + 1)) % 5) as f64);
/// let labels: Vec<usize> = (0..12).map(|r| r % 2).collect();
/// let targets = TargetMargins::default().encode(&labels, 2).unwrap();
///
/// let mut config = SelectorConfig::default();
/// config.genetic.population_size = 2;
/// config.genetic.generations = 2;
/// config.seed = Some(0);
///
/// let selection = FeatureSelector::new(&features, &targets, config).unwrap().select();
/// assert_eq!(selection.bitstring().len(), 64);
/// assert!((0.0..=100.0).contains(&selection.fitness));
/// ```
#[derive(Debug)]
pub struct FeatureSelector {
    config: SelectorConfig,
    fitness: NeuralNetFitness,
    standardization: Option<Standardization>,
    selection: Box<dyn SelectionMethod>,
    ancestor: Option<Chromosome>,
}

impl FeatureSelector {
    /// Validates the inputs, splits them and standardizes both partitions.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration values, malformed targets, or inputs
    /// that cannot be split.
    pub fn new(
        features: &Matrix,
        targets: &Matrix,
        config: SelectorConfig,
    ) -> Result<Self, SelectorError> {
        config.margins.validate(targets)?;
        let dataset = split::split(features, targets, config.train_fraction)?;
        let (dataset, standardization) = dataset.standardized()?;
        let mut this = Self::from_split(dataset, config)?;
        this.standardization = Some(standardization);
        Ok(this)
    }

    /// Uses partitions prepared elsewhere as-is (no standardization).
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration values or malformed targets.
    pub fn from_split(dataset: SplitDataset, config: SelectorConfig) -> Result<Self, SelectorError> {
        config.validate()?;
        config.validate_feature_count(dataset.feature_count())?;
        config.margins.validate(&dataset.train_targets)?;
        config.margins.validate(&dataset.valid_targets)?;

        log::info!(
            "prepared {} training rows and {} validation rows with {} features",
            dataset.train_features.row_count(),
            dataset.valid_features.row_count(),
            dataset.feature_count()
        );
        let fitness = NeuralNetFitness::new(dataset, config.network.clone(), config.margins.positive)
            .with_seed(config.seed);
        Ok(Self {
            config,
            fitness,
            standardization: None,
            selection: Box::new(EliteSelection::default()),
            ancestor: None,
        })
    }

    /// Replaces the default [`EliteSelection`].
    #[must_use]
    pub fn with_selection_method(mut self, selection: Box<dyn SelectionMethod>) -> Self {
        self.selection = selection;
        self
    }

    /// Seeds the initial population with `ancestor` instead of a random chromosome.
    ///
    /// # Panics
    ///
    /// Panics if `ancestor` has a different length than the configured chromosomes.
    #[must_use]
    pub fn with_ancestor(mut self, ancestor: Chromosome) -> Self {
        assert_eq!(ancestor.len(), self.config.genetic.chromosome_len);
        self.ancestor = Some(ancestor);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Statistics used to standardize the data, if this selector standardized it.
    #[must_use]
    pub fn standardization(&self) -> Option<&Standardization> {
        self.standardization.as_ref()
    }

    #[must_use]
    pub fn fitness(&self) -> &NeuralNetFitness {
        &self.fitness
    }

    /// Runs the search to completion.
    #[must_use]
    pub fn select(&self) -> Selection {
        self.run(None)
    }

    /// Runs the search, stopping after the current generation once `cancel` is set.
    #[must_use]
    pub fn select_with_cancel(&self, cancel: &AtomicBool) -> Selection {
        self.run(Some(cancel))
    }

    fn run(&self, cancel: Option<&AtomicBool>) -> Selection {
        let genetic = &self.config.genetic;
        let mut rng = match self.config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        let ancestor = self
            .ancestor
            .unwrap_or_else(|| Chromosome::random(genetic.chromosome_len, &mut rng));
        log::info!("initial chromosome {ancestor}");

        let population = Population::seeded(ancestor, genetic.population_size, &mut rng);
        let engine = GeneticEngine::new(
            &self.fitness,
            self.selection.as_ref(),
            PopulationEvolver {
                crossover_rate: genetic.crossover_rate,
                mutation_rate: genetic.mutation_rate,
            },
            genetic.generations,
        );
        let outcome = engine.run(population, &mut rng, cancel);

        let best = outcome
            .population
            .best()
            .expect("population size is validated to be positive");
        Selection {
            best: best.chromosome(),
            fitness: best.fitness().unwrap_or(0.0),
            feature_count: self.fitness.dataset().feature_count(),
            ancestor,
            generations: outcome.history,
            cancelled: outcome.cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use featsel_data::targets::TargetMargins;

    use crate::genetic::RankSelection;

    use super::*;

    fn small_config() -> SelectorConfig {
        let mut config = SelectorConfig::default();
        config.genetic.population_size = 4;
        config.genetic.generations = 3;
        config.network.max_epochs = 5;
        config.seed = Some(42);
        config
    }

    fn data(rows: usize) -> (Matrix, Matrix) {
        #[expect(clippy::cast_precision_loss)]
        let features = Matrix::from_fn(rows, 4, |r, c| ((r * 7 + c * 3) % 11) as f64);
        let labels: Vec<usize> = (0..rows).map(|r| r % 3).collect();
        let targets = TargetMargins::default().encode(&labels, 3).unwrap();
        (features, targets)
    }

    #[test]
    fn test_rejects_malformed_targets() {
        let (features, _) = data(10);
        let targets = Matrix::zeros(10, 3);
        assert!(matches!(
            FeatureSelector::new(&features, &targets, small_config()),
            Err(SelectorError::Data(DataError::InvalidTargetRow { row: 0, .. }))
        ));
    }

    #[test]
    fn test_rejects_too_few_rows() {
        let (features, targets) = data(1);
        assert_eq!(
            FeatureSelector::new(&features, &targets, small_config()).unwrap_err(),
            SelectorError::Data(DataError::TooFewRows { rows: 1 })
        );
    }

    #[test]
    fn test_rejects_invalid_config() {
        let (features, targets) = data(10);
        let mut config = small_config();
        config.genetic.generations = 0;
        assert_eq!(
            FeatureSelector::new(&features, &targets, config).unwrap_err(),
            SelectorError::Config(ConfigError::NoGenerations)
        );

        let mut config = small_config();
        config.genetic.chromosome_len = 3;
        assert!(matches!(
            FeatureSelector::new(&features, &targets, config),
            Err(SelectorError::Config(ConfigError::ChromosomeTooShort { .. }))
        ));
    }

    #[test]
    fn test_select_reports_every_generation() {
        let (features, targets) = data(30);
        let selector = FeatureSelector::new(&features, &targets, small_config()).unwrap();
        assert!(selector.standardization().is_some());
        let selection = selector.select();
        // initial population plus 3 bred generations
        assert_eq!(selection.generations.len(), 4);
        assert_eq!(selection.feature_count, 4);
        assert_eq!(selection.feature_bitstring().len(), 4);
        assert!(selection.selected_features().iter().all(|&i| i < 4));
        assert!((0.0..=100.0).contains(&selection.fitness));
        assert!(!selection.cancelled);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let (features, targets) = data(30);
        let a = FeatureSelector::new(&features, &targets, small_config())
            .unwrap()
            .select();
        let b = FeatureSelector::new(&features, &targets, small_config())
            .unwrap()
            .select();
        assert_eq!(a.best, b.best);
        assert_eq!(a.fitness, b.fitness);
    }

    #[test]
    fn test_rank_selection_runs() {
        let (features, targets) = data(30);
        let selection = FeatureSelector::new(&features, &targets, small_config())
            .unwrap()
            .with_selection_method(Box::new(RankSelection))
            .select();
        assert_eq!(selection.generations.len(), 4);
    }

    #[test]
    fn test_cancel_before_start_returns_first_generation() {
        let (features, targets) = data(30);
        let selector = FeatureSelector::new(&features, &targets, small_config()).unwrap();
        let selection = selector.select_with_cancel(&AtomicBool::new(true));
        assert!(selection.cancelled);
        assert_eq!(selection.generations.len(), 1);
    }

    #[test]
    fn test_from_split_skips_standardization() {
        let (features, targets) = data(30);
        let dataset = split::split(&features, &targets, 0.5).unwrap();
        let selector = FeatureSelector::from_split(dataset.clone(), small_config()).unwrap();
        assert!(selector.standardization().is_none());
        assert_eq!(selector.fitness().dataset(), &dataset);
    }
}
