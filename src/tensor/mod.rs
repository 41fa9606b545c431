//! # Tensor Module
//!
//! Defines the tensor storage used across the crate together with the
//! crate-wide error type and a few construction helpers.
//!
//! Normalization layers are plain value-in/value-out transforms with no
//! gradient tracking, so a [`Tensor`] here is simply a dynamic-dimension
//! `ndarray` array rather than a wrapper struct.

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;

/// Element type used by every tensor in the crate.
pub type TensorData = f32;

/// Dynamic-dimension array of [`TensorData`].
pub type Tensor = ArrayD<TensorData>;

/// Errors produced by tensor-shaped contracts across the crate.
#[derive(thiserror::Error, Debug)]
pub enum TensorError {
    #[error("expected {expected} input dimensions, got {got}")]
    Dimensionality {
        expected: &'static str,
        got: usize,
    },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("batch axis is empty")]
    EmptyBatch,
    #[error("ndarray error: {0}")]
    Ndarray(#[from] ndarray::ShapeError),
}

/// Creates a tensor filled with zeros.
pub fn zeros(shape: &[usize]) -> Tensor {
    ArrayD::zeros(IxDyn(shape))
}

/// Creates a tensor filled with ones.
pub fn ones(shape: &[usize]) -> Tensor {
    ArrayD::ones(IxDyn(shape))
}

/// Creates a tensor with values drawn uniformly from `[0, 1)`.
pub fn rand(shape: &[usize]) -> Tensor {
    ArrayD::random(IxDyn(shape), Uniform::new(0.0, 1.0))
}

/// Creates a tensor with values drawn from the standard normal distribution.
pub fn randn(shape: &[usize]) -> Tensor {
    ArrayD::random(IxDyn(shape), StandardNormal)
}

/// Like [`randn`], but drawing from the given generator. Useful for
/// reproducible inputs in tests and benchmarks.
pub fn randn_using<R: rand::Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Tensor {
    ArrayD::random_using(IxDyn(shape), StandardNormal, rng)
}
