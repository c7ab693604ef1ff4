/*
 * @Author       : 老董
 * @Date         : 2026-03-08
 * @Description  : 小型编码器-解码器网络集成测试
 *                 验证：所有层函数可以串联成一张图，构图期形状推断与前向结果一致，
 *                 批归一化在训练/推理两种模式下都能运行，参数可保存并加载到新图
 */

use graph_layers::nn::layer::{
    BatchNormOptions, ConvOptions, FcOptions, batch_normalize, conv2d_relu, conv2d_relu_with_pad,
    conv2d_transpose_relu, fully_connected, fully_connected_relu, max_pool2d, one_hot,
};
use graph_layers::nn::{DynamicShape, Graph, GraphError, Padding, Var};
use graph_layers::tensor::Tensor;

struct Net {
    graph: Graph,
    images: Var,
    labels: Var,
    train: Var,
    logits: Var,
    targets: Var,
    reconstruction: Var,
}

/// 网络结构：
/// ```text
/// images [?, 8, 8, 1]
///     ↓
/// conv1 (1→4, 3x3, SAME) → ReLU → [?, 8, 8, 4]
///     ↓
/// conv2 (pad 1, 4→8, 3x3, VALID) → ReLU → [?, 8, 8, 8]
///     ↓
/// batch_norm → pool1 (2x2, s2) → [?, 4, 4, 8]
///     ├── fc1 (128 → 16) → ReLU → fc2 (16 → 3)  → logits [?, 3]
///     └── deconv1 (8→1, 2x2, s2) → ReLU         → reconstruction [2, 8, 8, 1]
/// ```
fn build_net(seed: u64, batch: usize) -> Result<Net, GraphError> {
    let graph = Graph::new_with_seed(seed);
    let images = graph.placeholder(&[None, Some(8), Some(8), Some(1)], Some("images"))?;
    let labels = graph.placeholder(&[None], Some("labels"))?;
    let train = graph.training_flag(true)?;

    let h = conv2d_relu(&graph, "conv1", &images, 3, 1, 4, &ConvOptions::default())?;
    let h = conv2d_relu_with_pad(&graph, "conv2", &h, 3, 1, 8, 1, &ConvOptions::valid())?;
    let h = batch_normalize(&graph, &h, &train, &BatchNormOptions::default())?;
    let pooled = max_pool2d(&graph, "pool1", &h, 2, 2, Padding::Same)?;

    let features = fully_connected_relu(&graph, "fc1", &pooled, 16, &FcOptions::default())?;
    let logits = fully_connected(&graph, "fc2", &features, 3, &FcOptions::default())?;
    let targets = one_hot(&graph, &labels, 3)?;

    // 反卷积需要已知的 batch 维，单独接一个固定 batch 的分支
    let fixed = graph.placeholder(&[Some(batch), Some(4), Some(4), Some(8)], Some("fixed"))?;
    let reconstruction =
        conv2d_transpose_relu(&graph, "deconv1", &fixed, 2, 2, 1, &ConvOptions::default())?;

    Ok(Net {
        graph,
        images,
        labels,
        train,
        logits,
        targets,
        reconstruction,
    })
}

fn batch_images(batch: usize) -> Tensor {
    let data: Vec<f32> = (0..batch * 64).map(|i| ((i % 17) as f32) / 17.0).collect();
    Tensor::new(&data, &[batch, 8, 8, 1])
}

#[test]
fn test_small_cnn_forward() -> Result<(), GraphError> {
    let net = build_net(42, 2)?;
    assert_eq!(
        net.logits.expected_shape()?,
        DynamicShape::new(&[None, Some(3)])
    );

    net.images.set_value(&batch_images(2))?;
    net.labels.set_value(&Tensor::new(&[0.0, 2.0], &[2]))?;

    let logits = net.logits.forward_value()?;
    assert_eq!(logits.shape(), &[2, 3]);
    assert!(logits.to_vec().iter().all(|v| v.is_finite()));

    let targets = net.targets.forward_value()?;
    assert_eq!(targets.to_vec(), vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);

    // 推理模式
    net.train.set_flag(false)?;
    let inferred = net.logits.forward_value()?;
    assert_eq!(inferred.shape(), &[2, 3]);

    // 反卷积分支：把池化结果喂给固定 batch 的占位符
    net.train.set_flag(true)?;
    let pooled_id = net
        .graph
        .inner()
        .get_node_id_by_name("pool1/max_pool2d_1")
        .expect("pool1 节点应存在");
    let pooled = net.graph.wrap_node_id(pooled_id).forward_value()?;
    let fixed_id = net
        .graph
        .inner()
        .get_node_id_by_name("fixed")
        .expect("fixed 节点应存在");
    net.graph.wrap_node_id(fixed_id).set_value(&pooled)?;
    let reconstruction = net.reconstruction.forward_value()?;
    assert_eq!(reconstruction.shape(), &[2, 8, 8, 1]);
    assert!(reconstruction.to_vec().iter().all(|&v| v >= 0.0));

    let names: Vec<String> = net
        .graph
        .layer_groups()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(
        names,
        vec!["conv1", "conv2", "BatchNorm", "pool1", "fc1", "fc2", "deconv1"]
    );
    Ok(())
}

#[test]
fn test_small_cnn_params_round_trip() -> Result<(), GraphError> {
    let path = std::env::temp_dir().join(format!(
        "graph_layers_small_cnn_{}.bin",
        std::process::id()
    ));

    let a = build_net(1, 3)?;
    a.images.set_value(&batch_images(3))?;
    a.logits.forward()?;
    a.graph.save_params(&path)?;

    let b = build_net(2, 3)?;
    b.graph.load_params(&path)?;
    std::fs::remove_file(&path).ok();

    assert_eq!(
        a.graph.trainable_variables(),
        b.graph.trainable_variables()
    );
    a.train.set_flag(false)?;
    b.train.set_flag(false)?;
    b.images.set_value(&batch_images(3))?;
    assert_eq!(a.logits.forward_value()?, b.logits.forward_value()?);
    Ok(())
}
