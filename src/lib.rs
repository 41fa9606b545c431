//! # rnorm
//!
//! Reference implementations of neural-network normalization layers:
//! Local Response Normalization and Batch Normalization. Each layer is a
//! plain value-in/value-out transform over [`ndarray`] arrays, with the
//! numeric semantics of the mainstream framework implementations they
//! mirror (clamped channel windows for LRN, population batch statistics
//! and exponentially-smoothed running statistics for BatchNorm).

pub mod nn;
pub mod tensor;

pub use nn::{BatchNorm, LocalResponseNorm, Module};
pub use tensor::{Tensor, TensorData, TensorError};
