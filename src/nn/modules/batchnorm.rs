//! # Batch Normalization Module

use crate::nn::functional as F;
use crate::nn::Module;
use crate::tensor::{Tensor, TensorData, TensorError};
use ndarray::{ArrayD, IxDyn};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Parameters and buffers of an initialized [`BatchNorm`] layer.
///
/// All four arrays share the feature shape (the input shape minus its
/// leading batch axis).
#[derive(Debug, Clone)]
struct State {
    gamma: Tensor,
    beta: Tensor,
    running_mean: Tensor,
    running_var: Tensor,
}

impl State {
    fn with_feature_shape(feature: &[usize]) -> Self {
        State {
            gamma: ArrayD::ones(IxDyn(feature)),
            beta: ArrayD::zeros(IxDyn(feature)),
            running_mean: ArrayD::zeros(IxDyn(feature)),
            running_var: ArrayD::ones(IxDyn(feature)),
        }
    }
}

/// Applies Batch Normalization over the leading (batch) axis of an
/// N-dimensional input.
///
/// `y = gamma * (x - mean) / sqrt(variance + eps) + beta`
///
/// In training mode the mean and population variance of the current
/// batch are used and the running statistics are updated with
/// `running = momentum * running + (1 - momentum) * batch`; in
/// evaluation mode the running statistics are used unchanged.
///
/// Parameters and buffers are materialized lazily on the first forward
/// call, once the feature shape is known from the input: gamma and the
/// running variance start at ones, beta and the running mean at zeros.
/// After that the feature shape is fixed for the lifetime of the layer;
/// an input with different trailing dimensions is rejected, never
/// silently reshaped.
///
/// Mode and state live behind `Cell`/`RefCell` so the layer can be
/// driven through a shared reference; as a consequence it is not `Sync`,
/// and sharing one instance across threads requires external locking.
#[derive(Debug, Clone)]
pub struct BatchNorm {
    eps: TensorData,
    momentum: TensorData,
    state: RefCell<Option<State>>,
    is_training: Cell<bool>,
}

impl BatchNorm {
    /// Creates a new BatchNorm layer, in training mode, with no state
    /// allocated yet.
    ///
    /// # Arguments
    /// * `eps`: small positive constant added to the variance before the
    ///   square root.
    /// * `momentum`: weight of the previous running statistics in the
    ///   exponential moving average, in `[0, 1]`.
    pub fn new(eps: TensorData, momentum: TensorData) -> Result<Self, TensorError> {
        if eps <= 0.0 {
            return Err(TensorError::InvalidConfig(format!(
                "BatchNorm eps must be positive, got {eps}"
            )));
        }
        if !(0.0..=1.0).contains(&momentum) {
            return Err(TensorError::InvalidConfig(format!(
                "BatchNorm momentum must be in [0, 1], got {momentum}"
            )));
        }
        Ok(BatchNorm {
            eps,
            momentum,
            state: RefCell::new(None),
            is_training: Cell::new(true),
        })
    }

    /// Creates a layer with eps 1e-5 and momentum 0.9.
    pub fn with_defaults() -> Self {
        BatchNorm {
            eps: 1e-5,
            momentum: 0.9,
            state: RefCell::new(None),
            is_training: Cell::new(true),
        }
    }

    pub fn eps(&self) -> TensorData {
        self.eps
    }

    pub fn momentum(&self) -> TensorData {
        self.momentum
    }

    pub fn is_training(&self) -> bool {
        self.is_training.get()
    }

    /// The feature shape observed on the first forward call, or `None`
    /// while the layer is uninitialized.
    pub fn feature_shape(&self) -> Option<Vec<usize>> {
        self.state
            .borrow()
            .as_ref()
            .map(|s| s.running_mean.shape().to_vec())
    }

    /// Clones of the running mean and variance, or `None` while the
    /// layer is uninitialized.
    pub fn running_stats(&self) -> Option<(Tensor, Tensor)> {
        self.state
            .borrow()
            .as_ref()
            .map(|s| (s.running_mean.clone(), s.running_var.clone()))
    }

    /// Replaces the scale (gamma) and shift (beta) parameters in place.
    ///
    /// On an uninitialized layer this materializes the full state from
    /// the provided arrays, with the running mean at zeros and the
    /// running variance at ones of the same shape. `gamma` and `beta`
    /// must agree in shape with each other, and with the feature shape
    /// if one has already been observed.
    pub fn update_params(&self, gamma: Tensor, beta: Tensor) -> Result<(), TensorError> {
        if gamma.shape() != beta.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: gamma.shape().to_vec(),
                got: beta.shape().to_vec(),
            });
        }
        let mut slot = self.state.borrow_mut();
        match slot.as_mut() {
            Some(state) => {
                if state.running_mean.shape() != gamma.shape() {
                    return Err(TensorError::ShapeMismatch {
                        expected: state.running_mean.shape().to_vec(),
                        got: gamma.shape().to_vec(),
                    });
                }
                state.gamma = gamma;
                state.beta = beta;
            }
            None => {
                *slot = Some(State {
                    running_mean: ArrayD::zeros(gamma.raw_dim()),
                    running_var: ArrayD::ones(gamma.raw_dim()),
                    gamma,
                    beta,
                });
            }
        }
        Ok(())
    }
}

impl Module for BatchNorm {
    /// Normalizes `input` along its batch axis.
    ///
    /// The first call fixes the feature shape and allocates parameters
    /// and running statistics. In training mode the call also updates
    /// the running statistics as a documented side effect.
    fn forward(&self, input: &Tensor) -> Result<Tensor, TensorError> {
        if input.ndim() < 2 {
            return Err(TensorError::Dimensionality {
                expected: "at least 2 (batch axis plus feature axes)",
                got: input.ndim(),
            });
        }
        let mut slot = self.state.borrow_mut();
        match slot.as_mut() {
            Some(state) => F::batch_norm(
                input,
                &mut state.running_mean,
                &mut state.running_var,
                &state.gamma,
                &state.beta,
                self.is_training.get(),
                self.momentum,
                self.eps,
            ),
            None => {
                // First call: materialize state from the observed feature
                // shape, but only commit it if the pass succeeds.
                let mut state = State::with_feature_shape(&input.shape()[1..]);
                let output = F::batch_norm(
                    input,
                    &mut state.running_mean,
                    &mut state.running_var,
                    &state.gamma,
                    &state.beta,
                    self.is_training.get(),
                    self.momentum,
                    self.eps,
                )?;
                *slot = Some(state);
                Ok(output)
            }
        }
    }

    /// Gamma ("weight") and beta ("bias"); empty until the first forward
    /// call has materialized them.
    fn parameters(&self) -> BTreeMap<String, Tensor> {
        let mut params = BTreeMap::new();
        if let Some(state) = self.state.borrow().as_ref() {
            params.insert("weight".to_string(), state.gamma.clone());
            params.insert("bias".to_string(), state.beta.clone());
        }
        params
    }

    /// Parameters plus the running-statistics buffers.
    fn tensors(&self) -> BTreeMap<String, Tensor> {
        let mut tensors = self.parameters();
        if let Some(state) = self.state.borrow().as_ref() {
            tensors.insert("running_mean".to_string(), state.running_mean.clone());
            tensors.insert("running_var".to_string(), state.running_var.clone());
        }
        tensors
    }

    fn train(&self) {
        self.is_training.set(true);
    }

    fn eval(&self) {
        self.is_training.set(false);
    }
}
