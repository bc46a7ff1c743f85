//! Fixed-topology feedforward network used as the fitness signal of the feature search.
//!
//! The network always has three layers:
//!
//! ```text
//! input (selected features, may be 0) -> hidden (H) -> output (C classes)
//! ```
//!
//! Every neuron uses a bipolar sigmoid whose `(-1, 1)` range matches the `±0.6`
//! target margins. Networks are cheap, short-lived values: one is created, trained,
//! scored and dropped for every chromosome evaluation.
//!
//! # Modules
//!
//! - [`activation`] - Bipolar sigmoid and its derivative
//! - [`network`] - Layers, Gaussian initialization and forward pass
//! - [`trainer`] - Online backpropagation with momentum and the training loop
//!
//! # Example
//!
//! ```
//! use featsel_data::matrix::Matrix;
//! use featsel_network::trainer::{NetworkConfig, NetworkTrainer};
//! use rand::SeedableRng as _;
//!
//! let inputs = Matrix::from_rows([[1.0], [-1.0]]).unwrap();
//! let targets = Matrix::from_rows([[0.6, -0.6], [-0.6, 0.6]]).unwrap();
//!
//! let trainer = NetworkTrainer::new(NetworkConfig::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let (network, report) = trainer.train(&inputs, &targets, &mut rng).unwrap();
//!
//! assert_eq!(report.epochs, 15);
//! assert_eq!(network.predict(&[1.0]).unwrap().len(), 2);
//! ```

pub mod activation;
pub mod network;
pub mod trainer;

/// Errors raised when data does not fit the network's shape.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("input has {actual} values, network expects {expected}")]
    InputWidth { expected: usize, actual: usize },
    #[display("target has {actual} values, network has {expected} outputs")]
    TargetWidth { expected: usize, actual: usize },
    #[display("{inputs} input rows but {targets} target rows")]
    SampleCountMismatch { inputs: usize, targets: usize },
    #[display("weight standard deviation must be finite and non-negative, got {std_dev}")]
    InvalidStdDev { std_dev: f64 },
}
