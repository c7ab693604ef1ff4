mod layer_batch_norm;
mod layer_one_hot;
mod node_ops;
mod save_load;
mod variable_scope;

use crate::nn::{Graph, Var};
use crate::tensor::Tensor;

/// 按全名取出参数节点的句柄，找不到时直接 panic（仅测试用）
fn param(graph: &Graph, full_name: &str) -> Var {
    let id = graph
        .inner()
        .get_node_id_by_name(full_name)
        .unwrap_or_else(|| panic!("参数{full_name}不存在"));
    graph.wrap_node_id(id)
}

/// 形状为`shape`、元素为 1, 2, 3... 的张量
fn arange(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    let data: Vec<f32> = (1..=n).map(|x| x as f32).collect();
    Tensor::new(&data, shape)
}
