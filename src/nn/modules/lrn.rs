//! # Local Response Normalization Module

use crate::nn::functional as F;
use crate::nn::Module;
use crate::tensor::{Tensor, TensorData, TensorError};
use std::collections::BTreeMap;

/// Applies Local Response Normalization over a 4-D input `(N, C, H, W)`.
///
/// `y = x / (bias + alpha * local_sum)^beta`, where `local_sum` is the
/// sum of squared activations over a clamped window of neighboring
/// channels (see [`F::local_response_norm`] for the exact window rule).
///
/// The configuration is fixed at construction and the forward pass is a
/// pure function of the input; the layer has no parameters and no
/// train/eval distinction.
#[derive(Debug, Clone)]
pub struct LocalResponseNorm {
    radius: usize,
    bias: TensorData,
    alpha: TensorData,
    beta: TensorData,
}

impl LocalResponseNorm {
    /// Creates a new LocalResponseNorm layer.
    ///
    /// # Arguments
    /// * `radius`: window extent; the channel window is
    ///   `[c - radius/2, c + radius/2 + 1)` clamped to the tensor.
    /// * `bias`: additive constant, must be positive so the scale term
    ///   can never reach zero.
    /// * `alpha`: scale coefficient for the squared sum, must be
    ///   non-negative for the same reason.
    /// * `beta`: exponent applied to the scale term.
    pub fn new(
        radius: usize,
        bias: TensorData,
        alpha: TensorData,
        beta: TensorData,
    ) -> Result<Self, TensorError> {
        if bias <= 0.0 {
            return Err(TensorError::InvalidConfig(format!(
                "LRN bias must be positive, got {bias}"
            )));
        }
        if alpha < 0.0 {
            return Err(TensorError::InvalidConfig(format!(
                "LRN alpha must be non-negative, got {alpha}"
            )));
        }
        Ok(LocalResponseNorm {
            radius,
            bias,
            alpha,
            beta,
        })
    }

    /// Creates a layer with the classic AlexNet constants:
    /// radius 5, bias 1.0, alpha 1e-4, beta 0.75.
    pub fn with_defaults() -> Self {
        LocalResponseNorm {
            radius: 5,
            bias: 1.0,
            alpha: 1e-4,
            beta: 0.75,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn bias(&self) -> TensorData {
        self.bias
    }

    pub fn alpha(&self) -> TensorData {
        self.alpha
    }

    pub fn beta(&self) -> TensorData {
        self.beta
    }
}

impl Module for LocalResponseNorm {
    fn forward(&self, input: &Tensor) -> Result<Tensor, TensorError> {
        F::local_response_norm(input, self.radius, self.bias, self.alpha, self.beta)
    }

    /// LRN has no learnable parameters.
    fn parameters(&self) -> BTreeMap<String, Tensor> {
        BTreeMap::new()
    }

    // No state, so the default train/eval no-ops apply.
}
