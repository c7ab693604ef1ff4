/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 全连接层
 *
 * 输入 [batch, d1, d2, ...] 先展平成 [batch, d1*d2*...]（已是 2 维时不展平），
 * 再做 x @ weights + biases，输出 [batch, output_dim]。
 *
 * 参数（位于作用域`name`下）：
 * - weights: [flat_dim, output_dim]
 * - biases:  [output_dim]（bias_term 为 true 时）
 */

use super::{FcOptions, input_shape, require_positive, with_relu};
use crate::nn::{Graph, GraphError, Var};

/// 全连接层
///
/// 同名（同作用域）再次调用且输出维度相同时，复用同一组参数：
/// ```ignore
/// let a = fully_connected(&graph, "fc", &x1, 10, &FcOptions::default())?;
/// let b = fully_connected(&graph, "fc", &x2, 10, &FcOptions::default())?; // 共享 fc/weights
/// ```
pub fn fully_connected(
    graph: &Graph,
    name: &str,
    input: &Var,
    output_dim: usize,
    options: &FcOptions,
) -> Result<Var, GraphError> {
    require_positive("FullyConnected", &[("output_dim", output_dim)])?;
    let shape = input_shape(graph, input, "FullyConnected")?;
    if shape.ndim() < 2 {
        return Err(GraphError::DimensionMismatch {
            expected: 2,
            got: shape.ndim(),
            message: format!("全连接层的输入至少需要 2 维 [batch, ...]，得到{shape}"),
        });
    }
    let flat_dim = shape.feature_size().ok_or_else(|| {
        GraphError::UnknownDimension(format!(
            "全连接层输入除 batch 外的维度在构图时必须已知（{shape}）"
        ))
    })?;

    graph.variable_scope(name, |g| {
        let mut node_ids = Vec::new();
        let flat_id = if shape.ndim() > 2 {
            let id = g.inner_mut().new_flatten_node(input.node_id(), None)?;
            node_ids.push(id);
            id
        } else {
            input.node_id()
        };

        let weights = g.get_variable(
            "weights",
            &[flat_dim, output_dim],
            &options.weights_initializer,
        )?;
        let xw_id = g
            .inner_mut()
            .new_mat_mul_node(flat_id, weights.node_id(), None)?;
        node_ids.extend([weights.node_id(), xw_id]);

        let output_id = if options.bias_term {
            let biases = g.get_variable("biases", &[output_dim], &options.biases_initializer)?;
            let out_id = g
                .inner_mut()
                .new_bias_add_node(xw_id, biases.node_id(), None)?;
            node_ids.extend([biases.node_id(), out_id]);
            out_id
        } else {
            xw_id
        };

        let scope = g.current_scope();
        g.inner_mut().register_layer_group(
            &scope,
            "FullyConnected",
            &format!("{flat_dim}→{output_dim}"),
            node_ids,
        );
        Ok(g.wrap_node_id(output_id))
    })
}

/// 全连接 + ReLU
pub fn fully_connected_relu(
    graph: &Graph,
    name: &str,
    input: &Var,
    output_dim: usize,
    options: &FcOptions,
) -> Result<Var, GraphError> {
    with_relu(&fully_connected(graph, name, input, output_dim, options)?)
}
