use crate::assert_err;
use crate::nn::{DynamicShape, GraphError, GraphInner, Init, NodeId, Padding};
use crate::tensor::Tensor;

fn input(graph: &mut GraphInner, data: &Tensor, name: &str) -> NodeId {
    let id = graph
        .new_input_node(&DynamicShape::fixed(data.shape()), Some(name))
        .unwrap();
    graph.set_node_value(id, Some(data)).unwrap();
    id
}

fn forward_value(graph: &mut GraphInner, id: NodeId) -> Tensor {
    graph.forward(id).unwrap();
    graph.get_node_value(id).unwrap().unwrap().clone()
}

#[test]
fn test_pad2d() {
    let mut graph = GraphInner::new();
    let x = input(&mut graph, &Tensor::new(&[1.0, 2.0], &[1, 1, 2, 1]), "x");
    let padded = graph.new_pad2d_node(x, 1, Some("padded")).unwrap();
    let out = forward_value(&mut graph, padded);
    assert_eq!(out.shape(), &[1, 3, 4, 1]);
    #[rustfmt::skip]
    let expected = vec![
        0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 2.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ];
    assert_eq!(out.to_vec(), expected);

    // 补零 0 等价于恒等
    let same = graph.new_pad2d_node(x, 0, None).unwrap();
    assert_eq!(forward_value(&mut graph, same).to_vec(), vec![1.0, 2.0]);
}

#[test]
fn test_bias_add_shapes() {
    let mut graph = GraphInner::new();
    let x = input(&mut graph, &Tensor::zeros(&[2, 3]), "x");
    let good = graph.get_variable("b3", &[3], &Init::Ones).unwrap();
    let bad = graph.get_variable("b4", &[4], &Init::Ones).unwrap();
    let matrix = graph.get_variable("m", &[3, 1], &Init::Ones).unwrap();

    let y = graph.new_bias_add_node(x, good, None).unwrap();
    assert_eq!(forward_value(&mut graph, y).to_vec(), vec![1.0; 6]);

    assert_err!(
        graph.new_bias_add_node(x, bad, None),
        GraphError::ShapeMismatch([3], [4], "偏置长度必须等于输入的最后一维")
    );
    assert_err!(
        graph.new_bias_add_node(x, matrix, None),
        GraphError::DimensionMismatch { expected: 1, got: 2, .. }
    );
}

#[test]
fn test_mat_mul() {
    let mut graph = GraphInner::new();
    let a = input(&mut graph, &Tensor::new(&[1., 2., 3., 4.], &[2, 2]), "a");
    let b = input(&mut graph, &Tensor::new(&[1., 0., 0., 2.], &[2, 2]), "b");
    let c = input(&mut graph, &Tensor::zeros(&[3, 1]), "c");
    let ab = graph.new_mat_mul_node(a, b, Some("ab")).unwrap();
    assert_eq!(forward_value(&mut graph, ab).to_vec(), vec![1., 4., 3., 8.]);
    assert_err!(
        graph.new_mat_mul_node(a, c, None),
        GraphError::ShapeMismatch { .. }
    );
}

#[test]
fn test_flatten_and_relu() {
    let mut graph = GraphInner::new();
    let x = input(
        &mut graph,
        &Tensor::new(&[-1., 2., -3., 4., -5., 6., -7., 8.], &[2, 2, 2]),
        "x",
    );
    let flat = graph.new_flatten_node(x, None).unwrap();
    let relu = graph.new_relu_node(flat, None).unwrap();
    let out = forward_value(&mut graph, relu);
    assert_eq!(out.shape(), &[2, 4]);
    assert_eq!(out.to_vec(), vec![0., 2., 0., 4., 0., 6., 0., 8.]);

    let dynamic = graph
        .new_input_node(&DynamicShape::new(&[None, Some(2), None]), Some("dynamic"))
        .unwrap();
    assert_err!(
        graph.new_flatten_node(dynamic, None),
        GraphError::UnknownDimension(_)
    );
}

#[test]
fn test_conv2d_node_checks() {
    let mut graph = GraphInner::new();
    let x = input(&mut graph, &Tensor::zeros(&[1, 4, 4, 3]), "x");
    let kernel = graph.get_variable("k", &[3, 3, 2, 4], &Init::Zeros).unwrap();
    assert_err!(
        graph.new_conv2d_node(x, kernel, 1, Padding::Same, None),
        GraphError::ShapeMismatch { .. }
    );
    let flat_kernel = graph.get_variable("k2", &[9, 4], &Init::Zeros).unwrap();
    assert_err!(
        graph.new_conv2d_node(x, flat_kernel, 1, Padding::Same, None),
        GraphError::DimensionMismatch { expected: 4, got: 2, .. }
    );
}

#[test]
fn test_conv2d_transpose_node() {
    let mut graph = GraphInner::new();
    let x = graph
        .new_input_node(&DynamicShape::fixed(&[1, 2, 2, 1]), Some("x"))
        .unwrap();
    let kernel = graph.get_variable("k", &[1, 1, 2, 1], &Init::Ones).unwrap();
    let out = graph
        .new_conv2d_transpose_node(x, kernel, [1, 2, 2, 2], 1, Padding::Same, None)
        .unwrap();
    assert_eq!(
        graph.get_node_value(out).unwrap(),
        None,
        "前向之前运算节点没有值"
    );
    graph
        .set_node_value(x, Some(&Tensor::new(&[1., 2., 3., 4.], &[1, 2, 2, 1])))
        .unwrap();
    assert_eq!(
        forward_value(&mut graph, out).to_vec(),
        vec![1., 1., 2., 2., 3., 3., 4., 4.]
    );
}
