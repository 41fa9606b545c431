//! # Neural Network Functional Interface (`nn::functional`)
//!
//! Stateless implementations of the normalization transforms, mirroring
//! `torch.nn.functional`. The module layer in [`crate::nn::modules`]
//! wraps these with configuration and state; the math lives here.

use crate::tensor::{Tensor, TensorData, TensorError};
use ndarray::{s, Array4, Axis, Ix4};

/// Applies Local Response Normalization over a 4-D input `(N, C, H, W)`.
///
/// For each element, the squared activations of a clamped window of
/// neighboring channels are summed and the element is divided by
/// `(bias + alpha * local_sum).powf(beta)`:
///
/// `y[n, c, h, w] = x[n, c, h, w] / (bias + alpha * sum(x[n, c', h, w]^2))^beta`
///
/// where `c'` ranges over `[max(0, c - radius/2), min(C, c + radius/2 + 1))`
/// (integer floor division on `radius / 2`). The window is truncated at
/// the channel boundaries, never wrapped or padded, so edge channels see
/// an asymmetric neighborhood. `radius = 0` reduces the window to the
/// current channel alone.
///
/// # Errors
/// Returns [`TensorError::Dimensionality`] if `input` is not 4-D.
pub fn local_response_norm(
    input: &Tensor,
    radius: usize,
    bias: TensorData,
    alpha: TensorData,
    beta: TensorData,
) -> Result<Tensor, TensorError> {
    if input.ndim() != 4 {
        return Err(TensorError::Dimensionality {
            expected: "exactly 4 (batch, channel, height, width)",
            got: input.ndim(),
        });
    }
    let x = input.view().into_dimensionality::<Ix4>()?;
    let (batch, channels, _, _) = x.dim();
    let half = radius / 2;

    // Square once up front; every window sum below slices into this.
    let squared = x.mapv(|v| v * v);

    let mut output = Array4::<TensorData>::zeros(x.raw_dim());
    for n in 0..batch {
        for c in 0..channels {
            let start = c.saturating_sub(half);
            let end = (c + half + 1).min(channels);
            // local_sum[h, w] = sum of squares over the channel window
            let local_sum = squared.slice(s![n, start..end, .., ..]).sum_axis(Axis(0));
            let scale = local_sum.mapv(|sum| (bias + alpha * sum).powf(beta));
            let normalized = &x.slice(s![n, c, .., ..]) / &scale;
            output.slice_mut(s![n, c, .., ..]).assign(&normalized);
        }
    }
    Ok(output.into_dyn())
}

/// Applies Batch Normalization over the leading (batch) axis.
///
/// `input` has shape `(N, feature...)`; `running_mean`, `running_var`,
/// `gamma` and `beta` all have the feature shape `input.shape()[1..]`.
///
/// With `training = true`, the batch mean and population variance
/// (divisor `N`, no Bessel correction) are computed along axis 0, the
/// input is normalized with them, and the running statistics are updated
/// in place:
///
/// `running = momentum * running + (1 - momentum) * batch`
///
/// With `training = false`, the running statistics are used unchanged.
/// Both paths finish with the affine step `gamma * x_norm + beta`,
/// broadcast over the batch axis.
///
/// # Errors
/// * [`TensorError::Dimensionality`] if `input` has fewer than 2 axes.
/// * [`TensorError::ShapeMismatch`] if the running statistics do not
///   match the input's feature shape.
/// * [`TensorError::EmptyBatch`] on a training pass over a zero-length
///   batch axis (batch statistics are undefined there).
#[allow(clippy::too_many_arguments)]
pub fn batch_norm(
    input: &Tensor,
    running_mean: &mut Tensor,
    running_var: &mut Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    training: bool,
    momentum: TensorData,
    eps: TensorData,
) -> Result<Tensor, TensorError> {
    if input.ndim() < 2 {
        return Err(TensorError::Dimensionality {
            expected: "at least 2 (batch axis plus feature axes)",
            got: input.ndim(),
        });
    }
    let feature = &input.shape()[1..];
    if running_mean.shape() != feature || running_var.shape() != feature {
        return Err(TensorError::ShapeMismatch {
            expected: running_mean.shape().to_vec(),
            got: feature.to_vec(),
        });
    }

    let x_norm = if training {
        if input.shape()[0] == 0 {
            return Err(TensorError::EmptyBatch);
        }
        let batch_mean = input.mean_axis(Axis(0)).ok_or(TensorError::EmptyBatch)?;
        // Population variance: divisor N, not N - 1.
        let batch_var = input.var_axis(Axis(0), 0.0);
        let denom = batch_var.mapv(|v| (v + eps).sqrt());
        let x_norm = (input - &batch_mean) / &denom;

        *running_mean = &*running_mean * momentum + &batch_mean * (1.0 - momentum);
        *running_var = &*running_var * momentum + &batch_var * (1.0 - momentum);
        x_norm
    } else {
        let denom = running_var.mapv(|v| (v + eps).sqrt());
        (input - &*running_mean) / &denom
    };

    Ok(x_norm * gamma + beta)
}
