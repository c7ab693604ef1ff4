/*
 * @Author       : 老董
 * @Date         : 2026-03-07
 * @Description  : Layer 模块 - 在计算图上搭建常见网络层的便捷函数
 *
 * Layer 不是新的抽象层，只是语法糖：每个函数进入以层名命名的变量作用域，
 * 创建（或复用）该作用域下的 weights/biases 参数，调用一个图算子，返回输出 Var。
 * 所有函数都显式接收构图上下文`&Graph`，不持有任何状态。
 */

mod activation;
mod batch_norm;
mod conv;
mod deconv;
mod fc;
mod one_hot;
mod options;
mod pooling;

pub use activation::with_relu;
pub use batch_norm::{BN_DECAY, BN_EPSILON, batch_normalize};
pub use conv::{conv2d, conv2d_relu, conv2d_relu_with_pad, conv2d_with_pad};
pub use deconv::{conv2d_transpose, conv2d_transpose_relu};
pub use fc::{fully_connected, fully_connected_relu};
pub use one_hot::one_hot;
pub use options::{BatchNormOptions, ConvOptions, FcOptions};
pub use pooling::max_pool2d;

use crate::nn::{DynamicShape, Graph, GraphError, Var};

/// 校验输入属于`graph`，返回其构图期形状
fn input_shape(graph: &Graph, input: &Var, layer: &str) -> Result<DynamicShape, GraphError> {
    if !graph.owns(input) {
        return Err(GraphError::InvalidOperation(format!(
            "{layer}的输入来自另一张计算图"
        )));
    }
    input.expected_shape()
}

/// 超参数必须为正数
fn require_positive(layer: &str, params: &[(&str, usize)]) -> Result<(), GraphError> {
    match params.iter().find(|(_, value)| *value == 0) {
        Some((param, _)) => Err(GraphError::InvalidOperation(format!(
            "{layer}的{param}必须为正数"
        ))),
        None => Ok(()),
    }
}

/// NHWC 输入：要求 4 维，返回构图时已知的通道数
fn nhwc_channels(shape: &DynamicShape, layer: &str) -> Result<usize, GraphError> {
    if shape.ndim() != 4 {
        return Err(GraphError::DimensionMismatch {
            expected: 4,
            got: shape.ndim(),
            message: format!("{layer}的输入必须是 [batch, H, W, C]，得到{shape}"),
        });
    }
    shape.last_dim().ok_or_else(|| {
        GraphError::UnknownDimension(format!("{layer}的输入通道数在构图时未知（{shape}）"))
    })
}
