/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 2D 最大池化层（NHWC），无可学习参数
 *
 * 输出尺寸：
 * - Same:  ceil(H / stride)
 * - Valid: (H - kernel_size) / stride + 1
 */

use super::{input_shape, require_positive};
use crate::nn::{Graph, GraphError, Padding, Var};

/// 最大池化层
///
/// ```ignore
/// let pooled = max_pool2d(&graph, "pool1", &h, 2, 2, Padding::Same)?;
/// ```
pub fn max_pool2d(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    padding: Padding,
) -> Result<Var, GraphError> {
    require_positive(
        "MaxPool2d",
        &[("kernel_size", kernel_size), ("stride", stride)],
    )?;
    input_shape(graph, input, "MaxPool2d")?;

    graph.variable_scope(name, |g| {
        let pool_id = g.inner_mut().new_max_pool2d_node(
            input.node_id(),
            kernel_size,
            stride,
            padding,
            None,
        )?;
        let scope = g.current_scope();
        g.inner_mut().register_layer_group(
            &scope,
            "MaxPool2d",
            &format!("{kernel_size}×{kernel_size}, s{stride}, {padding}"),
            vec![pool_id],
        );
        Ok(g.wrap_node_id(pool_id))
    })
}
