/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : one_hot 层单元测试
 */

use crate::assert_err;
use crate::nn::layer::one_hot;
use crate::nn::{DynamicShape, Graph, GraphError};
use crate::tensor::Tensor;

#[test]
fn test_one_hot() {
    let graph = Graph::new();
    let labels = graph.input(&Tensor::new(&[0.0, 2.0], &[2])).unwrap();
    let encoded = one_hot(&graph, &labels, 3).unwrap();
    assert_eq!(encoded.expected_shape().unwrap(), DynamicShape::fixed(&[2, 3]));
    let out = encoded.forward_value().unwrap();
    assert_eq!(out.shape(), &[2, 3]);
    assert_eq!(out.to_vec(), vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_one_hot_dynamic_batch() {
    let graph = Graph::new();
    let labels = graph.placeholder(&[None], Some("labels")).unwrap();
    let encoded = one_hot(&graph, &labels, 4).unwrap();
    assert_eq!(
        encoded.expected_shape().unwrap(),
        DynamicShape::new(&[None, Some(4)])
    );

    labels.set_value(&Tensor::new(&[3.0, 1.0, 1.0], &[3])).unwrap();
    let out = encoded.forward_value().unwrap();
    assert_eq!(out.shape(), &[3, 4]);
    // 每行恰好一个 1
    for row in out.to_vec().chunks(4) {
        assert_eq!(row.iter().sum::<f32>(), 1.0);
    }
    assert_eq!(&out.to_vec()[..4], &[0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_one_hot_invalid_labels() {
    let graph = Graph::new();
    let labels = graph.placeholder(&[Some(2)], Some("labels")).unwrap();
    let encoded = one_hot(&graph, &labels, 3).unwrap();

    labels.set_value(&Tensor::new(&[0.0, 3.0], &[2])).unwrap();
    assert_err!(
        encoded.forward(),
        GraphError::ComputationError(msg) if msg.contains("超出类别范围")
    );

    labels.set_value(&Tensor::new(&[0.5, 1.0], &[2])).unwrap();
    assert_err!(
        encoded.forward(),
        GraphError::ComputationError(msg) if msg.contains("不是非负整数")
    );

    labels.set_value(&Tensor::new(&[-1.0, 1.0], &[2])).unwrap();
    assert_err!(encoded.forward(), GraphError::ComputationError(_));
}

#[test]
fn test_one_hot_construction_errors() {
    let graph = Graph::new();
    let labels = graph.input(&Tensor::new(&[0.0, 1.0], &[2])).unwrap();
    assert_err!(
        one_hot(&graph, &labels, 0),
        GraphError::InvalidOperation(_)
    );
    let matrix = graph.input(&Tensor::zeros(&[2, 2])).unwrap();
    assert_err!(
        one_hot(&graph, &matrix, 3),
        GraphError::DimensionMismatch { expected: 1, got: 2, .. }
    );
}
