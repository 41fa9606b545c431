//! End-to-end tests driving the normalization layers through the
//! public API.

use ndarray::{ArrayD, IxDyn};
use rnorm::{tensor, BatchNorm, LocalResponseNorm, Module, Tensor, TensorData};

fn tensor_from(values: &[TensorData], shape: &[usize]) -> Tensor {
    ArrayD::from_shape_vec(IxDyn(shape), values.to_vec()).unwrap()
}

#[test]
fn layers_work_through_the_module_trait() {
    let layers: Vec<Box<dyn Module>> = vec![
        Box::new(LocalResponseNorm::with_defaults()),
        Box::new(BatchNorm::with_defaults()),
    ];
    let x = tensor::randn(&[2, 3, 4, 4]);
    for layer in &layers {
        let y = layer.forward(&x).unwrap();
        assert_eq!(y.shape(), x.shape());
    }
}

#[test]
fn inference_is_deterministic_until_the_next_training_pass() {
    let bn = BatchNorm::with_defaults();
    bn.forward(&tensor::randn(&[32, 6])).unwrap();
    bn.eval();

    let x = tensor::randn(&[8, 6]);
    let y1 = bn.forward(&x).unwrap();
    let y2 = bn.forward(&x).unwrap();
    assert_eq!(y1, y2);

    // A training pass in between moves the running statistics, so a
    // subsequent inference pass sees different normalization.
    bn.train();
    bn.forward(&tensor::randn(&[32, 6])).unwrap();
    bn.eval();
    let y3 = bn.forward(&x).unwrap();
    assert!(y1
        .iter()
        .zip(y3.iter())
        .any(|(a, b)| (a - b).abs() > 1e-6));
}

#[test]
fn updated_parameters_are_used_exactly_in_the_affine_step() {
    let bn = BatchNorm::with_defaults();
    bn.forward(&tensor::randn(&[16, 3])).unwrap();
    bn.eval();

    let gamma = tensor_from(&[1.5, -2.0, 0.25], &[3]);
    let beta = tensor_from(&[0.0, 1.0, -1.0], &[3]);
    bn.update_params(gamma.clone(), beta.clone()).unwrap();

    let x = tensor::randn(&[5, 3]);
    let y = bn.forward(&x).unwrap();
    let (rm, rv) = bn.running_stats().unwrap();
    for n in 0..5 {
        for f in 0..3 {
            let x_norm = (x[[n, f]] - rm[[f]]) / (rv[[f]] + bn.eps()).sqrt();
            let expected = gamma[[f]] * x_norm + beta[[f]];
            assert!(
                (y[[n, f]] - expected).abs() < 1e-5,
                "({n},{f}): got {}, expected {expected}",
                y[[n, f]]
            );
        }
    }
}

#[test]
fn lrn_and_batch_norm_do_not_interact() {
    // Two independent transforms: running one never touches the other's
    // configuration or state.
    let lrn = LocalResponseNorm::with_defaults();
    let bn = BatchNorm::with_defaults();

    let x = tensor::randn(&[2, 4, 3, 3]);
    let lrn_before = lrn.forward(&x).unwrap();
    bn.forward(&x).unwrap();
    let lrn_after = lrn.forward(&x).unwrap();
    assert_eq!(lrn_before, lrn_after);
    assert_eq!(bn.feature_shape().unwrap(), vec![4, 3, 3]);
}
