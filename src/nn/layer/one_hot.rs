/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 独热编码
 */

use super::{input_shape, require_positive};
use crate::nn::{Graph, GraphError, Var};

/// 把 1 维整数标签 [batch] 编码为 [batch, num_classes]，每行恰好一个 1
///
/// 标签不是 [0, num_classes) 内的整数时，`forward`报`ComputationError`。
///
/// ```ignore
/// let labels = graph.input(&Tensor::new(&[0.0, 2.0], &[2]))?;
/// let encoded = one_hot(&graph, &labels, 3)?.forward_value()?;
/// // [[1, 0, 0], [0, 0, 1]]
/// ```
pub fn one_hot(graph: &Graph, labels: &Var, num_classes: usize) -> Result<Var, GraphError> {
    require_positive("OneHot", &[("num_classes", num_classes)])?;
    input_shape(graph, labels, "OneHot")?;
    let id = graph
        .inner_mut()
        .new_one_hot_node(labels.node_id(), num_classes, None)?;
    Ok(graph.wrap_node_id(id))
}
