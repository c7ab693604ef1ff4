use super::arange;
use crate::assert_err;
use crate::nn::layer::{BatchNormOptions, FcOptions, batch_normalize, fully_connected};
use crate::nn::{Graph, GraphError, Var};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("graph_layers_{name}_{}.bin", std::process::id()))
}

/// x[2, 3] → fc(4) → batch_norm
fn build(seed: u64) -> (Graph, Var, Var, Var) {
    let graph = Graph::new_with_seed(seed);
    let x = graph.input(&arange(&[2, 3])).unwrap();
    let train = graph.training_flag(true).unwrap();
    let h = fully_connected(&graph, "fc", &x, 4, &FcOptions::default()).unwrap();
    let y = batch_normalize(&graph, &h, &train, &BatchNormOptions::default()).unwrap();
    (graph, train, h, y)
}

#[test]
fn test_save_and_load_params() {
    let path = temp_path("params");
    let (g1, train1, h1, y1) = build(1);
    y1.forward().unwrap();
    g1.save_params(&path).unwrap();

    let (g2, train2, h2, y2) = build(2);
    assert_ne!(h1.forward_value().unwrap(), h2.forward_value().unwrap());

    g2.load_params(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(h1.forward_value().unwrap(), h2.forward_value().unwrap());
    assert_eq!(g1.moving_statistics(&y1).unwrap(), g2.moving_statistics(&y2).unwrap());

    train1.set_flag(false).unwrap();
    train2.set_flag(false).unwrap();
    assert_eq!(y1.forward_value().unwrap(), y2.forward_value().unwrap());
}

#[test]
fn test_load_params_into_different_graph() {
    let path = temp_path("mismatch");
    let (g1, _, _, _) = build(1);
    g1.save_params(&path).unwrap();

    // 缺少同名节点
    let other = Graph::new();
    let result = other.load_params(&path);
    std::fs::remove_file(&path).ok();
    assert_err!(
        result,
        GraphError::ComputationError(msg) if msg.contains("在图中不存在")
    );
}

#[test]
fn test_load_params_rejects_bad_files() {
    let graph = Graph::new();
    assert_err!(
        graph.load_params(temp_path("missing_file_never_created")),
        GraphError::ComputationError(msg) if msg.contains("无法打开参数文件")
    );

    let path = temp_path("garbage");
    std::fs::write(&path, b"not a checkpoint at all").unwrap();
    let result = graph.load_params(&path);
    std::fs::remove_file(&path).ok();
    assert_err!(result, GraphError::ComputationError(_));
}

#[test]
fn test_failed_load_leaves_graph_untouched() {
    let path = temp_path("partial");
    let (g1, _, _, y1) = build(1);
    y1.forward().unwrap();
    g1.save_params(&path).unwrap();

    // 只有同名的 fc 层，缺少批归一化部分
    let graph = Graph::new_with_seed(2);
    let x = graph.input(&arange(&[2, 3])).unwrap();
    let h = fully_connected(&graph, "fc", &x, 4, &FcOptions::default()).unwrap();
    let before = h.forward_value().unwrap();

    let result = graph.load_params(&path);
    std::fs::remove_file(&path).ok();
    assert_err!(result, GraphError::ComputationError(_));
    assert_eq!(h.forward_value().unwrap(), before);
}

#[test]
fn test_load_params_rejects_shape_mismatch() {
    let path = temp_path("shape");
    let (g1, _, _, _) = build(1);
    g1.save_params(&path).unwrap();

    let graph = Graph::new_with_seed(2);
    let x = graph.input(&arange(&[2, 3])).unwrap();
    let h = fully_connected(&graph, "fc", &x, 5, &FcOptions::default()).unwrap();
    let before = h.forward_value().unwrap();

    let result = graph.load_params(&path);
    std::fs::remove_file(&path).ok();
    assert_err!(
        result,
        GraphError::ShapeMismatch([3, 4], [3, 5], "参数文件中的fc/weights与图中参数形状不一致")
    );
    assert_eq!(h.forward_value().unwrap(), before);
}
