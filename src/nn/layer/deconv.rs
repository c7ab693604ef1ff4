/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 2D 转置卷积（反卷积）层（NHWC）
 *
 * 输出形状 = [batch, H * stride, W * stride, output_dim]，需要在构图时显式给出，
 * 因此输入的 batch、H、W、C 四个维度都必须已知。
 *
 * 参数（位于作用域`name`下）：
 * - weights: [k, k, output_dim, in_channels]（注意通道顺序与普通卷积相反）
 * - biases:  [output_dim]
 */

use super::{ConvOptions, input_shape, nhwc_channels, require_positive, with_relu};
use crate::nn::{Graph, GraphError, Var};

/// 反卷积层，常用于上采样
///
/// ```ignore
/// let x = graph.placeholder(&[Some(2), Some(4), Some(4), Some(8)], None)?;
/// let up = conv2d_transpose(&graph, "deconv1", &x, 4, 2, 3, &ConvOptions::default())?;
/// // up: [2, 8, 8, 3]
/// ```
pub fn conv2d_transpose(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    require_positive(
        "Conv2dTranspose",
        &[
            ("kernel_size", kernel_size),
            ("stride", stride),
            ("output_dim", output_dim),
        ],
    )?;
    let shape = input_shape(graph, input, "Conv2dTranspose")?;
    let in_channels = nhwc_channels(&shape, "Conv2dTranspose")?;
    let known = |axis: usize, what: &str| {
        shape.dim(axis).ok_or_else(|| {
            GraphError::UnknownDimension(format!(
                "反卷积需要显式的输出形状，输入的{what}在构图时必须已知（{shape}）"
            ))
        })
    };
    let batch = known(0, "batch 维")?;
    let in_h = known(1, "高度")?;
    let in_w = known(2, "宽度")?;
    let output_shape = [batch, in_h * stride, in_w * stride, output_dim];

    graph.variable_scope(name, |g| {
        let weights = g.get_variable(
            "weights",
            &[kernel_size, kernel_size, output_dim, in_channels],
            &options.weights_initializer,
        )?;
        let deconv_id = g.inner_mut().new_conv2d_transpose_node(
            input.node_id(),
            weights.node_id(),
            output_shape,
            stride,
            options.padding,
            None,
        )?;

        let mut node_ids = vec![weights.node_id(), deconv_id];
        let output_id = if options.bias_term {
            let biases = g.get_variable("biases", &[output_dim], &options.biases_initializer)?;
            let out_id = g
                .inner_mut()
                .new_bias_add_node(deconv_id, biases.node_id(), None)?;
            node_ids.extend([biases.node_id(), out_id]);
            out_id
        } else {
            deconv_id
        };

        let scope = g.current_scope();
        g.inner_mut().register_layer_group(
            &scope,
            "Conv2dTranspose",
            &format!(
                "{in_channels}→{output_dim}, {kernel_size}×{kernel_size}, s{stride}, {}",
                options.padding
            ),
            node_ids,
        );
        Ok(g.wrap_node_id(output_id))
    })
}

/// 反卷积 + ReLU
pub fn conv2d_transpose_relu(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    with_relu(&conv2d_transpose(
        graph,
        name,
        input,
        kernel_size,
        stride,
        output_dim,
        options,
    )?)
}
