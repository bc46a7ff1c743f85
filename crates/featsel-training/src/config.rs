//! Run configuration.
//!
//! Every field has a default, and the whole tree deserializes with `#[serde(default)]`,
//! so a JSON config file only needs the values it changes:
//!
//! ```
//! use featsel_training::config::SelectorConfig;
//!
//! let config: SelectorConfig =
//!     serde_json::from_str(r#"{ "genetic": { "population_size": 4 } }"#).unwrap();
//! assert_eq!(config.genetic.population_size, 4);
//! assert_eq!(config.genetic.generations, 20);
//! assert_eq!(config.network.hidden_width, 20);
//! ```

use featsel_data::{chromosome, split::DEFAULT_TRAIN_FRACTION, targets::TargetMargins};
use featsel_network::trainer::NetworkConfig;
use serde::{Deserialize, Serialize};

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("generation count must be at least 1")]
    NoGenerations,
    #[display("{name} must be in [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[display("{name} must be finite and non-negative, got {value}")]
    InvalidValue { name: &'static str, value: f64 },
    #[display("chromosome length must be in 1..=64, got {len}")]
    ChromosomeLength { len: usize },
    #[display("chromosome length {len} cannot cover {features} features")]
    ChromosomeTooShort { len: usize, features: usize },
    #[display("hidden layer width must be at least 1")]
    NoHiddenNeurons,
}

/// Genetic search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Per-bit flip probability applied to every offspring
    pub mutation_rate: f64,
    /// Probability that a parent pair exchanges tails
    pub crossover_rate: f64,
    /// Bits per chromosome; must cover every feature column
    pub chromosome_len: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            generations: 20,
            mutation_rate: 0.1,
            crossover_rate: 0.75,
            chromosome_len: chromosome::DEFAULT_LEN,
        }
    }
}

/// Complete configuration of a feature selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub genetic: GeneticConfig,
    pub network: NetworkConfig,
    /// Share of rows (minus one boundary row) used for training
    pub train_fraction: f64,
    /// Target encoding; `margins.positive` is also the value checked when scoring
    pub margins: TargetMargins,
    /// Makes every evaluation and the genetic operators deterministic when set
    pub seed: Option<u64>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            genetic: GeneticConfig::default(),
            network: NetworkConfig::default(),
            train_fraction: DEFAULT_TRAIN_FRACTION,
            margins: TargetMargins::default(),
            seed: None,
        }
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { name, value })
    }
}

impl SelectorConfig {
    /// Checks value ranges. The train fraction is checked when the data is split.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let genetic = &self.genetic;
        if genetic.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if genetic.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(1..=chromosome::MAX_LEN).contains(&genetic.chromosome_len) {
            return Err(ConfigError::ChromosomeLength {
                len: genetic.chromosome_len,
            });
        }
        check_rate("mutation rate", genetic.mutation_rate)?;
        check_rate("crossover rate", genetic.crossover_rate)?;

        let network = &self.network;
        if network.hidden_width == 0 {
            return Err(ConfigError::NoHiddenNeurons);
        }
        check_rate("momentum", network.momentum)?;
        check_non_negative("learning rate", network.learning_rate)?;
        check_non_negative("weight standard deviation", network.weight_std_dev)?;
        Ok(())
    }

    /// Checks that the chromosome can address every one of `features` columns.
    pub fn validate_feature_count(&self, features: usize) -> Result<(), ConfigError> {
        let len = self.genetic.chromosome_len;
        if features > len {
            return Err(ConfigError::ChromosomeTooShort { len, features });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SelectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.genetic.population_size, 10);
        assert_eq!(config.genetic.generations, 20);
        assert_eq!(config.genetic.chromosome_len, 64);
        assert!((config.genetic.mutation_rate - 0.1).abs() < f64::EPSILON);
        assert!((config.train_fraction - 0.66).abs() < f64::EPSILON);
        assert_eq!(config.network.max_epochs, 15);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = SelectorConfig::default();
        config.genetic.population_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));

        let mut config = SelectorConfig::default();
        config.genetic.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RateOutOfRange {
                name: "mutation rate",
                ..
            })
        ));

        let mut config = SelectorConfig::default();
        config.genetic.chromosome_len = 65;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ChromosomeLength { len: 65 })
        );

        let mut config = SelectorConfig::default();
        config.network.weight_std_dev = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_feature_count_must_fit() {
        let mut config = SelectorConfig::default();
        config.genetic.chromosome_len = 8;
        assert!(config.validate_feature_count(8).is_ok());
        assert_eq!(
            config.validate_feature_count(9),
            Err(ConfigError::ChromosomeTooShort {
                len: 8,
                features: 9
            })
        );
    }

    #[test]
    fn test_json_round_trip_keeps_seed() {
        let config = SelectorConfig {
            seed: Some(7),
            ..SelectorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SelectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
