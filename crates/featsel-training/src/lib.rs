//! Genetic feature selection with a neural-network fitness signal.
//!
//! This crate searches the space of feature subsets of a tabular dataset. Each candidate
//! subset is a bit mask ([`Chromosome`](featsel_data::chromosome::Chromosome)); its
//! fitness is the validation accuracy of a small network trained on only the selected
//! columns.
//!
//! # How Selection Works
//!
//! 1. **Prepare** - Split the rows into train/validation and standardize (once)
//! 2. **Seed** - Create a population around one ancestor chromosome
//! 3. **Evaluate** - Train a fresh network per individual, score validation accuracy
//! 4. **Select** - Keep the elite, choose parents
//! 5. **Reproduce** - Crossover and mutation build the next generation
//! 6. **Repeat** - For a fixed number of generations, then report the best mask
//!
//! # Architecture
//!
//! ```text
//! FeatureSelector
//!     ↓ owns
//! NeuralNetFitness (split + standardized data)
//!     ↓ scores individuals of
//! GeneticEngine (Population, SelectionMethod, PopulationEvolver)
//!     ↓ produces
//! Selection (best mask, fitness, per-generation history)
//! ```
//!
//! # Modules
//!
//! - [`config`] - Run configuration and validation
//! - [`fitness`] - Fitness trait and the network-based fitness
//! - [`genetic`] - Population, selection strategies and the generation loop
//! - [`statistics`] - Fitness summaries per generation
//! - [`selector`] - The [`FeatureSelector`](selector::FeatureSelector) facade
//!
//! # Current Limitations
//!
//! - **No convergence stop**: runs always last the configured number of generations
//! - **Noisy fitness**: unseeded runs re-initialize networks randomly, so the same mask
//!   can score differently between evaluations
//! - **Up to 64 features**: chromosomes are stored in a `u64`

pub mod config;
pub mod fitness;
pub mod genetic;
pub mod selector;
pub mod statistics;
