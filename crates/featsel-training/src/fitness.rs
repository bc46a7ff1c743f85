//! Fitness functions for feature masks.
//!
//! [`NeuralNetFitness`] scores a chromosome by training a fresh network on the selected
//! feature columns and measuring validation accuracy:
//!
//! ```text
//! fitness = 100 - validation_error_rate        (in [0, 100])
//! ```
//!
//! # Correctness Rule
//!
//! For each row the predicted class is the index `k` of the largest network output
//! (first one wins on ties). The row counts as correct when `target[k]` equals the
//! positive margin. The target's own argmax is never computed; for well-formed one-hot
//! targets both rules agree.
//!
//! # Noise
//!
//! Without a seed, every evaluation draws a new random initialization, so evaluating
//! the same mask twice usually gives different scores. With a seed, the RNG is derived
//! from the seed and the effective mask (bits below the feature count), so equal
//! effective masks always score equally.

use std::fmt;

use featsel_data::{chromosome::Chromosome, matrix::Matrix, projection, split::SplitDataset};
use featsel_network::{
    NetworkError,
    network::Network,
    trainer::{NetworkConfig, NetworkTrainer, TrainingReport},
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64;

/// Scores a chromosome. Higher is better.
///
/// Used by the genetic engine for every individual of every generation, possibly from
/// several threads at once.
pub trait FitnessFunction: fmt::Debug + Send + Sync {
    fn evaluate(&self, chromosome: &Chromosome) -> f64;
}

/// Outcome of one network evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Number of feature columns the network was trained on
    pub selected_features: usize,
    /// Training-set accuracy in percent
    pub train_accuracy: f64,
    /// Validation-set accuracy in percent; this is the fitness
    pub valid_accuracy: f64,
    pub report: TrainingReport,
}

/// Fitness from the validation accuracy of a network trained on the selected features.
#[derive(Debug, Clone)]
pub struct NeuralNetFitness {
    dataset: SplitDataset,
    trainer: NetworkTrainer,
    positive_margin: f64,
    seed: Option<u64>,
}

impl NeuralNetFitness {
    /// Creates a fitness function over an already split (and usually normalized) dataset.
    #[must_use]
    pub fn new(dataset: SplitDataset, network: NetworkConfig, positive_margin: f64) -> Self {
        Self {
            dataset,
            trainer: NetworkTrainer::new(network),
            positive_margin,
            seed: None,
        }
    }

    /// Derives every evaluation's RNG from `seed` and the evaluated mask.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn dataset(&self) -> &SplitDataset {
        &self.dataset
    }

    /// Trains and scores a network for `chromosome` using `rng` for initialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset shapes do not fit together.
    pub fn evaluate_with<R>(
        &self,
        chromosome: &Chromosome,
        rng: &mut R,
    ) -> Result<Evaluation, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let dataset = &self.dataset;
        let train_inputs = projection::project(&dataset.train_features, chromosome);
        let valid_inputs = projection::project(&dataset.valid_features, chromosome);
        if train_inputs.column_count() == 0 {
            log::debug!("evaluating empty feature mask");
        }

        let (network, report) = self
            .trainer
            .train(&train_inputs, &dataset.train_targets, rng)?;

        let train_error = error_rate(
            &network,
            &train_inputs,
            &dataset.train_targets,
            self.positive_margin,
        )?;
        let valid_error = error_rate(
            &network,
            &valid_inputs,
            &dataset.valid_targets,
            self.positive_margin,
        )?;

        Ok(Evaluation {
            selected_features: train_inputs.column_count(),
            train_accuracy: 100.0 - train_error,
            valid_accuracy: 100.0 - valid_error,
            report,
        })
    }

    /// Trains and scores a network for `chromosome` with the same randomness
    /// [`FitnessFunction::evaluate`] uses.
    ///
    /// With a seed this reproduces the score the search saw for the same mask;
    /// without one it is an independent training run.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset shapes do not fit together.
    pub fn evaluate_detailed(&self, chromosome: &Chromosome) -> Result<Evaluation, NetworkError> {
        match self.rng_for(chromosome) {
            Some(mut rng) => self.evaluate_with(chromosome, &mut rng),
            None => self.evaluate_with(chromosome, &mut rand::rng()),
        }
    }

    fn rng_for(&self, chromosome: &Chromosome) -> Option<Pcg64> {
        let seed = self.seed?;
        let feature_count = self.dataset.feature_count();
        let effective = chromosome
            .selected_indices(feature_count)
            .fold(0_u64, |bits, i| bits | (1 << i));
        Some(Pcg64::seed_from_u64(
            seed ^ effective.wrapping_mul(0x9e37_79b9_7f4a_7c15),
        ))
    }
}

impl FitnessFunction for NeuralNetFitness {
    fn evaluate(&self, chromosome: &Chromosome) -> f64 {
        match self.evaluate_detailed(chromosome) {
            Ok(eval) => {
                log::debug!(
                    "{chromosome}: {} features, train {:.2}%, validation {:.2}%",
                    eval.selected_features,
                    eval.train_accuracy,
                    eval.valid_accuracy
                );
                eval.valid_accuracy.clamp(0.0, 100.0)
            }
            Err(e) => {
                log::warn!("evaluation of {chromosome} failed, scoring 0: {e}");
                0.0
            }
        }
    }
}

/// Index of the first maximum value.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Percentage of rows whose predicted class is not marked positive in the target.
///
/// An empty matrix has error rate 0.
#[expect(clippy::cast_precision_loss)]
#[allow(clippy::float_cmp)]
fn error_rate(
    network: &Network,
    inputs: &Matrix,
    targets: &Matrix,
    positive_margin: f64,
) -> Result<f64, NetworkError> {
    if inputs.is_empty() {
        return Ok(0.0);
    }
    let mut incorrect = 0_usize;
    for (input, target) in inputs.rows().zip(targets.rows()) {
        let output = network.predict(input)?;
        let correct = argmax(&output).is_some_and(|k| target[k] == positive_margin);
        if !correct {
            incorrect += 1;
        }
    }
    Ok(incorrect as f64 * 100.0 / inputs.row_count() as f64)
}
