/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : batch_normalize 层单元测试（训练/推理、滑动平均）
 */

use crate::assert_err;
use crate::nn::layer::{BN_DECAY, BN_EPSILON, BatchNormOptions, batch_normalize};
use crate::nn::{DynamicShape, Graph, GraphError, Init};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

/// 两个通道：通道 0 为 1..4（均值 2.5，方差 1.25），通道 1 为 10..40（均值 25，方差 125）
fn two_channel_batch() -> Tensor {
    Tensor::new(&[1., 10., 2., 20., 3., 30., 4., 40.], &[4, 2])
}

#[test]
fn test_batch_norm_constants() {
    assert_abs_diff_eq!(BN_DECAY, 0.5);
    assert_abs_diff_eq!(BN_EPSILON, 1e-3);
}

#[test]
fn test_batch_norm_training_uses_batch_statistics() {
    let graph = Graph::new();
    let x = graph.input(&two_channel_batch()).unwrap();
    let train = graph.training_flag(true).unwrap();
    let y = batch_normalize(&graph, &x, &train, &BatchNormOptions::default()).unwrap();
    assert_eq!(y.expected_shape().unwrap(), DynamicShape::fixed(&[4, 2]));

    let out = y.forward_value().unwrap().to_vec();
    let std0 = (1.25f32 + BN_EPSILON).sqrt();
    let std1 = (125.0f32 + BN_EPSILON).sqrt();
    let expected = [
        -1.5 / std0,
        -15.0 / std1,
        -0.5 / std0,
        -5.0 / std1,
        0.5 / std0,
        5.0 / std1,
        1.5 / std0,
        15.0 / std1,
    ];
    assert_abs_diff_eq!(&out[..], &expected[..], epsilon = 1e-5);

    // 滑动平均从 0 开始：0.5 * 0 + 0.5 * batch
    let (mean, variance) = graph.moving_statistics(&y).unwrap();
    assert_abs_diff_eq!(mean.data_as_slice().unwrap(), &[1.25, 12.5][..], epsilon = 1e-5);
    assert_abs_diff_eq!(variance.data_as_slice().unwrap(), &[0.625, 62.5][..], epsilon = 1e-4);

    // 每次训练前向都会继续更新
    y.forward().unwrap();
    let (mean, _) = graph.moving_statistics(&y).unwrap();
    assert_abs_diff_eq!(mean.data_as_slice().unwrap(), &[1.875, 18.75][..], epsilon = 1e-5);
}

#[test]
fn test_batch_norm_inference_uses_moving_statistics() {
    let graph = Graph::new();
    let x = graph.input(&two_channel_batch()).unwrap();
    let train = graph.training_flag(true).unwrap();
    let y = batch_normalize(&graph, &x, &train, &BatchNormOptions::default()).unwrap();

    let trained = y.forward_value().unwrap();
    train.set_flag(false).unwrap();
    let inferred = y.forward_value().unwrap();
    assert_ne!(trained, inferred);

    // 推理不更新滑动平均
    let (mean, variance) = graph.moving_statistics(&y).unwrap();
    assert_abs_diff_eq!(mean.data_as_slice().unwrap(), &[1.25, 12.5][..], epsilon = 1e-5);
    let out = inferred.to_vec();
    let expected0 = (1.0 - 1.25) / (0.625f32 + BN_EPSILON).sqrt();
    let expected1 = (10.0 - 12.5) / (62.5f32 + BN_EPSILON).sqrt();
    assert_abs_diff_eq!(out[0], expected0, epsilon = 1e-5);
    assert_abs_diff_eq!(out[1], expected1, epsilon = 1e-5);
    assert_eq!(variance.shape(), &[2]);
}

#[test]
fn test_batch_norm_nhwc_and_gamma_beta() {
    let graph = Graph::new();
    let x = graph
        .placeholder(&[None, Some(2), Some(2), Some(1)], Some("x"))
        .unwrap();
    let train = graph.training_flag(true).unwrap();
    let beta = graph.get_variable("my_beta", &[1], &Init::Constant(3.0)).unwrap();
    let gamma = graph.get_variable("my_gamma", &[1], &Init::Constant(2.0)).unwrap();
    let opts = BatchNormOptions::default().beta(beta).gamma(gamma);
    let y = batch_normalize(&graph, &x, &train, &opts).unwrap();

    // 统计量跨 batch、H、W 计算
    x.set_value(&Tensor::new(&[1., 2., 3., 4., 5., 6., 7., 8.], &[2, 2, 2, 1]))
        .unwrap();
    let out = y.forward_value().unwrap();
    assert_eq!(out.shape(), &[2, 2, 2, 1]);
    let values = out.to_vec();
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    assert_abs_diff_eq!(mean, 3.0, epsilon = 1e-5);
    // 方差 5.25，gamma = 2
    let expected_first = (1.0 - 4.5) / (5.25f32 + BN_EPSILON).sqrt() * 2.0 + 3.0;
    assert_abs_diff_eq!(values[0], expected_first, epsilon = 1e-5);

    // 提供了 beta/gamma 时不再新建参数
    let names: Vec<String> = graph
        .trainable_variables()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["my_beta", "my_gamma"]);
}

#[test]
fn test_batch_norm_params_are_fresh_per_call() {
    let graph = Graph::new();
    let x = graph.input(&two_channel_batch()).unwrap();
    let train = graph.training_flag(true).unwrap();
    let a = batch_normalize(&graph, &x, &train, &BatchNormOptions::default()).unwrap();
    let b = batch_normalize(&graph, &a, &train, &BatchNormOptions::default()).unwrap();
    assert_ne!(a.node_id(), b.node_id());
    assert_eq!(
        graph.trainable_variables(),
        vec![
            ("BatchNorm/beta".to_string(), vec![2]),
            ("BatchNorm/gamma".to_string(), vec![2]),
            ("BatchNorm_1/beta".to_string(), vec![2]),
            ("BatchNorm_1/gamma".to_string(), vec![2]),
        ]
    );
    let groups: Vec<String> = graph.layer_groups().into_iter().map(|g| g.name).collect();
    assert_eq!(groups, vec!["BatchNorm", "BatchNorm_1"]);
}

#[test]
fn test_batch_norm_errors() {
    let graph = Graph::new();
    let train = graph.training_flag(true).unwrap();
    let unknown = graph.placeholder(&[None, None], Some("unknown")).unwrap();
    assert_err!(
        batch_normalize(&graph, &unknown, &train, &BatchNormOptions::default()),
        GraphError::UnknownDimension(_)
    );

    let x = graph.input(&two_channel_batch()).unwrap();
    let not_scalar = graph.input(&Tensor::ones(&[2])).unwrap();
    assert_err!(
        batch_normalize(&graph, &x, &not_scalar, &BatchNormOptions::default()),
        GraphError::InvalidOperation(msg) if msg.contains("标量")
    );

    let wrong_beta = graph.get_variable("wrong_beta", &[3], &Init::Zeros).unwrap();
    assert_err!(
        batch_normalize(
            &graph,
            &x,
            &train,
            &BatchNormOptions::default().beta(wrong_beta)
        ),
        GraphError::ShapeMismatch { .. }
    );

    let other = Graph::new();
    let other_flag = other.training_flag(false).unwrap();
    assert_err!(
        batch_normalize(&graph, &x, &other_flag, &BatchNormOptions::default()),
        GraphError::InvalidOperation(_)
    );
}
