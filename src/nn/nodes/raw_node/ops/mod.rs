/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : 运算节点。图像类算子统一采用 NHWC 布局：[batch, H, W, C]
 */

mod batch_norm;
mod bias_add;
mod conv2d;
mod conv2d_transpose;
mod flatten;
mod mat_mul;
mod max_pool2d;
mod one_hot;
mod pad2d;
mod relu;

pub(crate) use batch_norm::BatchNorm;
pub(crate) use bias_add::BiasAdd;
pub(crate) use conv2d::Conv2d;
pub(crate) use conv2d_transpose::Conv2dTranspose;
pub(crate) use flatten::Flatten;
pub(crate) use mat_mul::MatMul;
pub(crate) use max_pool2d::MaxPool2d;
pub(crate) use one_hot::OneHot;
pub(crate) use pad2d::Pad2d;
pub(crate) use relu::ReLU;

use crate::nn::GraphError;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;
use ndarray::{ArrayView4, Ix4};

/// 校验父节点个数
fn expect_parents(
    parents: &[&NodeHandle],
    count: usize,
    node_type: &str,
) -> Result<(), GraphError> {
    if parents.len() != count {
        return Err(GraphError::InvalidOperation(format!(
            "{node_type}节点需要{count}个父节点，实际得到{}个",
            parents.len()
        )));
    }
    Ok(())
}

/// 以 4 维视图访问 NHWC 张量
fn view4<'a>(tensor: &'a Tensor, node_type: &str) -> Result<ArrayView4<'a, f32>, GraphError> {
    tensor.view().into_dimensionality::<Ix4>().map_err(|_| {
        GraphError::ComputationError(format!(
            "{node_type}需要 4 维 NHWC 张量，得到形状{:?}",
            tensor.shape()
        ))
    })
}

/// 卷积核的形状必须在构图时完全确定
fn fixed_kernel_shape(
    kernel: &NodeHandle,
    node_type: &str,
) -> Result<[usize; 4], GraphError> {
    let dims = kernel.expected_shape().to_vec_fixed().ok_or_else(|| {
        GraphError::UnknownDimension(format!(
            "{node_type}的卷积核形状{}含未知维度",
            kernel.expected_shape()
        ))
    })?;
    <[usize; 4]>::try_from(dims.as_slice()).map_err(|_| GraphError::DimensionMismatch {
        expected: 4,
        got: dims.len(),
        message: format!("{node_type}的卷积核必须是 4 维，得到{dims:?}"),
    })
}

/// 把每个样本各自算出的结果按 batch 顺序拼成一个张量
fn stack_samples(samples: Vec<Vec<f32>>, shape: &[usize]) -> Result<Tensor, GraphError> {
    let data: Vec<f32> = samples.into_iter().flatten().collect();
    Ok(Tensor::try_new(&data, shape)?)
}
