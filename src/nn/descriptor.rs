/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 图描述符（Graph Descriptor）
 *                 统一的中间表示，用于 JSON 序列化、摘要输出和调试
 */

use crate::nn::Padding;
use serde::{Deserialize, Serialize};

/// 图的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    pub name: String,
    pub nodes: Vec<NodeDescriptor>,
}

/// 节点描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: u64,
    pub name: String,
    pub node_type: NodeTypeDescriptor,
    /// 构图期推断的输出形状，None 表示动态维度
    pub output_shape: Vec<Option<usize>>,
    /// 父节点 ID 列表（定义拓扑，顺序即父节点顺序）
    pub parents: Vec<u64>,
    /// 参数数量（仅 Parameter 类型有意义）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub param_count: Option<usize>,
}

/// 节点类型描述（包含类型特定参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeTypeDescriptor {
    Input,
    Parameter,
    Conv2d {
        stride: usize,
        padding: Padding,
    },
    Conv2dTranspose {
        stride: usize,
        padding: Padding,
        output_shape: Vec<usize>,
    },
    Pad2d {
        pad_size: usize,
    },
    BiasAdd,
    MaxPool2d {
        kernel_size: usize,
        stride: usize,
        padding: Padding,
    },
    Flatten,
    MatMul,
    ReLU,
    OneHot {
        num_classes: usize,
    },
    BatchNorm {
        decay: f32,
        epsilon: f32,
    },
}

impl GraphDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeDescriptor) {
        self.nodes.push(node);
    }

    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.nodes.iter().filter_map(|n| n.param_count).sum()
    }

    /// 按名称查找节点描述
    pub fn node_by_name(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl NodeDescriptor {
    pub fn new(
        id: u64,
        name: &str,
        node_type: NodeTypeDescriptor,
        output_shape: Vec<Option<usize>>,
        parents: Vec<u64>,
    ) -> Self {
        // 参数节点的形状总是完全确定的
        let param_count = if matches!(node_type, NodeTypeDescriptor::Parameter) {
            output_shape
                .iter()
                .try_fold(1usize, |acc, d| d.map(|n| acc * n))
        } else {
            None
        };

        Self {
            id,
            name: name.to_string(),
            node_type,
            output_shape,
            parents,
            param_count,
        }
    }

    /// 形状的可读形式，如 "[?, 28, 28, 1]"
    pub fn shape_string(&self) -> String {
        let dims: Vec<String> = self
            .output_shape
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |n| n.to_string()))
            .collect();
        format!("[{}]", dims.join(", "))
    }

    /// 类型名（摘要表格里的"类型"列）
    pub fn type_name(&self) -> &'static str {
        match &self.node_type {
            NodeTypeDescriptor::Input => "Input",
            NodeTypeDescriptor::Parameter => "Parameter",
            NodeTypeDescriptor::Conv2d { .. } => "Conv2d",
            NodeTypeDescriptor::Conv2dTranspose { .. } => "Conv2dTranspose",
            NodeTypeDescriptor::Pad2d { .. } => "Pad2d",
            NodeTypeDescriptor::BiasAdd => "BiasAdd",
            NodeTypeDescriptor::MaxPool2d { .. } => "MaxPool2d",
            NodeTypeDescriptor::Flatten => "Flatten",
            NodeTypeDescriptor::MatMul => "MatMul",
            NodeTypeDescriptor::ReLU => "ReLU",
            NodeTypeDescriptor::OneHot { .. } => "OneHot",
            NodeTypeDescriptor::BatchNorm { .. } => "BatchNorm",
        }
    }
}
