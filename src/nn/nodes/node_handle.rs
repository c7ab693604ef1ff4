/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : 节点句柄：统一持有节点 ID、名称、前向传播标记和具体的原始节点
 */

use super::raw_node::{NodeType, TraitNode};
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    /// 最后一次参与计算的前向传播 id（同一次前向传播中每个节点只计算一次）
    last_forward_pass_id: u64,
}

impl NodeHandle {
    pub(crate) fn new<T: Into<NodeType>>(id: NodeId, name: &str, raw_node: T) -> Self {
        Self {
            id,
            name: name.to_string(),
            raw_node: raw_node.into(),
            last_forward_pass_id: 0,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) const fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(crate) fn node_type_mut(&mut self) -> &mut NodeType {
        &mut self.raw_node
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.raw_node.type_name()
    }

    /// 输入和参数节点的值由外部设置，不依赖父节点
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.raw_node, NodeType::Input(_) | NodeType::Parameter(_))
    }

    pub(crate) fn expected_shape(&self) -> &DynamicShape {
        self.raw_node.expected_shape()
    }

    pub(crate) fn value(&self) -> Option<&Tensor> {
        self.raw_node.value()
    }

    pub(crate) fn has_value(&self) -> bool {
        self.raw_node.value().is_some()
    }

    pub(crate) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.raw_node
            .set_value(value)
            .map_err(|e| Self::with_node_context(e, &self.name))
    }

    pub(crate) fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        self.raw_node
            .calc_value_by_parents(parents)
            .map_err(|e| Self::with_node_context(e, &self.name))
    }

    pub(crate) fn descriptor(&self) -> NodeTypeDescriptor {
        self.raw_node.descriptor()
    }

    pub(crate) const fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    pub(crate) const fn set_last_forward_pass_id(&mut self, id: u64) {
        self.last_forward_pass_id = id;
    }

    // 计算期错误补上节点名，方便定位
    fn with_node_context(e: GraphError, name: &str) -> GraphError {
        match e {
            GraphError::ComputationError(msg) => {
                GraphError::ComputationError(format!("节点{name}：{msg}"))
            }
            other => other,
        }
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id,
            self.name,
            self.type_name()
        )
    }
}
