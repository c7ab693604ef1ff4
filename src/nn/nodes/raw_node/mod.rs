/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 原始节点：每种节点只关心自己的形状推断和取值计算，
 *                 ID、名称、拓扑关系都由 NodeHandle / GraphInner 负责
 */

mod input;
mod ops;
mod parameter;

pub(crate) use input::Input;
pub(crate) use ops::*;
pub(crate) use parameter::Parameter;

use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
#[derive(Clone)]
pub(crate) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    Conv2d(Conv2d),
    Conv2dTranspose(Conv2dTranspose),
    Pad2d(Pad2d),
    BiasAdd(BiasAdd),
    MaxPool2d(MaxPool2d),
    Flatten(Flatten),
    MatMul(MatMul),
    ReLU(ReLU),
    OneHot(OneHot),
    BatchNorm(BatchNorm),
}

#[enum_dispatch(NodeType)]
pub(crate) trait TraitNode {
    /// 节点类型名（用于自动命名和摘要）
    fn type_name(&self) -> &'static str;

    /// 构图时推断出的输出形状（可能含动态维度）
    fn expected_shape(&self) -> &DynamicShape;

    fn value(&self) -> Option<&Tensor>;

    fn set_value(&mut self, _value: Option<&Tensor>) -> Result<(), GraphError> {
        Err(GraphError::InvalidOperation(format!(
            "{}节点的值只能由父节点计算得出，不能手动设置",
            self.type_name()
        )))
    }

    // 根据父节点的值计算本节点的值（调用时所有父节点的值都已计算好，顺序与建图时的父节点顺序一致）
    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError>;

    fn descriptor(&self) -> NodeTypeDescriptor;
}

/// 取第`index`个父节点的值，并校验其阶数
pub(in crate::nn::nodes::raw_node) fn parent_of_rank<'a>(
    parents: &[&'a Tensor],
    index: usize,
    rank: usize,
    node_type: &str,
) -> Result<&'a Tensor, GraphError> {
    let parent = parents.get(index).copied().ok_or_else(|| {
        GraphError::ComputationError(format!("{node_type}缺少第{index}个父节点的值"))
    })?;
    if parent.dimension() != rank {
        return Err(GraphError::DimensionMismatch {
            expected: rank,
            got: parent.dimension(),
            message: format!("{node_type}的第{index}个父节点形状为{:?}", parent.shape()),
        });
    }
    Ok(parent)
}

/// 构图期校验：输入必须是`rank`维
pub(in crate::nn::nodes::raw_node) fn expect_rank(
    shape: &DynamicShape,
    rank: usize,
    what: &str,
) -> Result<(), GraphError> {
    if shape.ndim() != rank {
        return Err(GraphError::DimensionMismatch {
            expected: rank,
            got: shape.ndim(),
            message: format!("{what}，得到{shape}"),
        });
    }
    Ok(())
}
