//! # Neural Network Module (`nn`)
//!
//! Provides the normalization layers and the trait they implement,
//! similar in shape to `torch.nn`: stateless math lives in
//! [`functional`], stateful layer types live in [`modules`].

use crate::tensor::{Tensor, TensorError};
use std::collections::BTreeMap;
use std::fmt::Debug;

pub mod functional;
pub mod modules;

pub use modules::{BatchNorm, LocalResponseNorm};

/// Base trait for neural network modules.
///
/// A module owns its configuration (and possibly state) and exposes a
/// single `forward` transform. Modules with mode-dependent behavior
/// (BatchNorm) toggle between training and evaluation through
/// `train`/`eval`; both take `&self` and rely on interior mutability so
/// that a module can be driven through a shared reference.
pub trait Module: Debug {
    /// Performs the forward pass of the module.
    fn forward(&self, input: &Tensor) -> Result<Tensor, TensorError>;

    /// Returns the module's learnable parameters keyed by name.
    ///
    /// Uses `BTreeMap` for deterministic iteration order.
    fn parameters(&self) -> BTreeMap<String, Tensor>;

    /// Returns all tensors held by the module: parameters plus buffers.
    ///
    /// Buffers are state that is not learned, e.g. the running
    /// mean/variance of BatchNorm. The default is parameters only.
    fn tensors(&self) -> BTreeMap<String, Tensor> {
        self.parameters()
    }

    /// Sets the module to training mode. No-op for stateless modules.
    fn train(&self) {}

    /// Sets the module to evaluation mode. No-op for stateless modules.
    fn eval(&self) {}
}
