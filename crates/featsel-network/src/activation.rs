use serde::{Deserialize, Serialize};

/// Bipolar sigmoid `f(x) = 2 / (1 + e^(-αx)) - 1`, ranging over `(-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BipolarSigmoid {
    pub alpha: f64,
}

impl Default for BipolarSigmoid {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl BipolarSigmoid {
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        2.0 / (1.0 + (-self.alpha * x).exp()) - 1.0
    }

    /// Derivative expressed in terms of the function's output `y = f(x)`.
    #[inline]
    #[must_use]
    pub fn derivative_from_output(self, y: f64) -> f64 {
        self.alpha * (1.0 - y * y) / 2.0
    }
}
