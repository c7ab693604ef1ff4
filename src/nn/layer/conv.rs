/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : 2D 卷积层（NHWC）
 *
 * 参数（位于作用域`name`下）：
 * - weights: [k, k, in_channels, output_dim]
 * - biases:  [output_dim]（bias_term 为 true 时）
 *
 * output = conv2d(input, weights, stride, padding) + biases
 */

use super::{ConvOptions, input_shape, nhwc_channels, require_positive, with_relu};
use crate::nn::{Graph, GraphError, NodeId, Var};

/// 卷积层
///
/// # 参数
/// - `name`: 层名（变量作用域名），同名再次调用会复用同一组参数
/// - `input`: [batch, H, W, C]，通道数在构图时必须已知
/// - `kernel_size`/`stride`/`output_dim`: 均须为正数
///
/// # 示例
/// ```ignore
/// let h = conv2d(&graph, "conv1", &images, 3, 1, 16, &ConvOptions::default())?;
/// // h: [?, 28, 28, 16]，参数 conv1/weights [3, 3, 1, 16]、conv1/biases [16]
/// ```
pub fn conv2d(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    let in_channels = check_conv_input(graph, input, kernel_size, stride, output_dim)?;
    graph.variable_scope(name, |g| {
        conv2d_in_scope(g, input, in_channels, kernel_size, stride, output_dim, options, &[])
    })
}

/// 卷积 + ReLU
pub fn conv2d_relu(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    with_relu(&conv2d(graph, name, input, kernel_size, stride, output_dim, options)?)
}

/// 先在 H、W 两维前后各补`pad_size`个 0，再做卷积
///
/// 通常与`ConvOptions::valid()`配合使用。补零节点同样位于作用域`name`下。
#[allow(clippy::too_many_arguments)]
pub fn conv2d_with_pad(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    pad_size: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    let in_channels = check_conv_input(graph, input, kernel_size, stride, output_dim)?;
    graph.variable_scope(name, |g| {
        let padded_id = g.inner_mut().new_pad2d_node(input.node_id(), pad_size, None)?;
        let padded = g.wrap_node_id(padded_id);
        conv2d_in_scope(
            g,
            &padded,
            in_channels,
            kernel_size,
            stride,
            output_dim,
            options,
            &[padded_id],
        )
    })
}

/// 补零卷积 + ReLU
#[allow(clippy::too_many_arguments)]
pub fn conv2d_relu_with_pad(
    graph: &Graph,
    name: &str,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    pad_size: usize,
    options: &ConvOptions,
) -> Result<Var, GraphError> {
    with_relu(&conv2d_with_pad(
        graph,
        name,
        input,
        kernel_size,
        stride,
        output_dim,
        pad_size,
        options,
    )?)
}

fn check_conv_input(
    graph: &Graph,
    input: &Var,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
) -> Result<usize, GraphError> {
    require_positive(
        "Conv2d",
        &[
            ("kernel_size", kernel_size),
            ("stride", stride),
            ("output_dim", output_dim),
        ],
    )?;
    nhwc_channels(&input_shape(graph, input, "Conv2d")?, "Conv2d")
}

/// 已处于层作用域内：创建参数和卷积（+偏置）节点，并登记层分组
#[allow(clippy::too_many_arguments)]
fn conv2d_in_scope(
    g: &Graph,
    input: &Var,
    in_channels: usize,
    kernel_size: usize,
    stride: usize,
    output_dim: usize,
    options: &ConvOptions,
    extra_nodes: &[NodeId],
) -> Result<Var, GraphError> {
    let weights = g.get_variable(
        "weights",
        &[kernel_size, kernel_size, in_channels, output_dim],
        &options.weights_initializer,
    )?;
    let conv_id = g.inner_mut().new_conv2d_node(
        input.node_id(),
        weights.node_id(),
        stride,
        options.padding,
        None,
    )?;

    let mut node_ids = extra_nodes.to_vec();
    node_ids.extend([weights.node_id(), conv_id]);
    let output_id = if options.bias_term {
        let biases = g.get_variable("biases", &[output_dim], &options.biases_initializer)?;
        let out_id = g
            .inner_mut()
            .new_bias_add_node(conv_id, biases.node_id(), None)?;
        node_ids.extend([biases.node_id(), out_id]);
        out_id
    } else {
        conv_id
    };

    let scope = g.current_scope();
    g.inner_mut().register_layer_group(
        &scope,
        "Conv2d",
        &format!(
            "{in_channels}→{output_dim}, {kernel_size}×{kernel_size}, s{stride}, {}{}",
            options.padding,
            if options.bias_term { "" } else { " (no bias)" }
        ),
        node_ids,
    );
    Ok(g.wrap_node_id(output_id))
}
