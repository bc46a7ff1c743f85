//! Network layers and forward propagation.

use rand::Rng;
use rand_distr::Normal;

use crate::{NetworkError, activation::BipolarSigmoid};

/// Fully connected layer.
///
/// `weights` is row-major with one row per neuron (`outputs x inputs`). A layer with
/// zero inputs is valid: each neuron's output then depends on its threshold only.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    inputs: usize,
    weights: Vec<f64>,
    thresholds: Vec<f64>,
}

impl Layer {
    /// Creates a layer whose weights and thresholds are drawn from `distr`.
    pub fn random<R>(inputs: usize, outputs: usize, distr: Normal<f64>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = (0..inputs * outputs).map(|_| rng.sample(distr)).collect();
        let thresholds = (0..outputs).map(|_| rng.sample(distr)).collect();
        Self {
            inputs,
            weights,
            thresholds,
        }
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn output_width(&self) -> usize {
        self.thresholds.len()
    }

    /// Weights feeding neuron `neuron`.
    #[must_use]
    pub fn neuron_weights(&self, neuron: usize) -> &[f64] {
        &self.weights[neuron * self.inputs..(neuron + 1) * self.inputs]
    }

    pub(crate) fn neuron_weights_mut(&mut self, neuron: usize) -> &mut [f64] {
        &mut self.weights[neuron * self.inputs..(neuron + 1) * self.inputs]
    }

    pub(crate) fn thresholds_mut(&mut self) -> &mut [f64] {
        &mut self.thresholds
    }

    /// Computes activations for `input` into `out`.
    pub(crate) fn compute(&self, input: &[f64], activation: BipolarSigmoid, out: &mut Vec<f64>) {
        debug_assert_eq!(input.len(), self.inputs);
        out.clear();
        out.extend((0..self.output_width()).map(|n| {
            let sum = self
                .neuron_weights(n)
                .iter()
                .zip(input)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + self.thresholds[n];
            activation.apply(sum)
        }));
    }
}

/// Three-layer feedforward network: input, one hidden layer, output.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    activation: BipolarSigmoid,
    pub(crate) hidden: Layer,
    pub(crate) output: Layer,
}

/// Per-sample activations kept for backpropagation.
#[derive(Debug, Default)]
pub(crate) struct Activations {
    pub(crate) hidden: Vec<f64>,
    pub(crate) output: Vec<f64>,
}

impl Network {
    /// Creates a network with every weight and threshold drawn from `N(0, std_dev)`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidStdDev`] if `std_dev` is negative or not finite.
    pub fn random<R>(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        activation: BipolarSigmoid,
        std_dev: f64,
        rng: &mut R,
    ) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        if !(std_dev.is_finite() && std_dev >= 0.0) {
            return Err(NetworkError::InvalidStdDev { std_dev });
        }
        let distr =
            Normal::new(0.0, std_dev).map_err(|_| NetworkError::InvalidStdDev { std_dev })?;
        Ok(Self {
            activation,
            hidden: Layer::random(inputs, hidden, distr, rng),
            output: Layer::random(hidden, outputs, distr, rng),
        })
    }

    #[must_use]
    pub fn activation(&self) -> BipolarSigmoid {
        self.activation
    }

    #[must_use]
    pub fn input_width(&self) -> usize {
        self.hidden.input_width()
    }

    #[must_use]
    pub fn hidden_width(&self) -> usize {
        self.hidden.output_width()
    }

    #[must_use]
    pub fn output_width(&self) -> usize {
        self.output.output_width()
    }

    #[must_use]
    pub fn hidden_layer(&self) -> &Layer {
        &self.hidden
    }

    #[must_use]
    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    pub(crate) fn forward(&self, input: &[f64], acts: &mut Activations) {
        self.hidden.compute(input, self.activation, &mut acts.hidden);
        self.output
            .compute(&acts.hidden, self.activation, &mut acts.output);
    }

    /// Computes the network output for one input row.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputWidth`] if `input` does not match the input layer.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.input_width() {
            return Err(NetworkError::InputWidth {
                expected: self.input_width(),
                actual: input.len(),
            });
        }
        let mut acts = Activations::default();
        self.forward(input, &mut acts);
        Ok(acts.output)
    }
}
