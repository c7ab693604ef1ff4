/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner 节点构建方法（new_*_node）
 *
 * 命名规则：
 * - 显式给出的名称会加上当前作用域前缀，且在图内必须唯一
 * - 未给名称时自动生成"作用域/类型_序号"，如 "conv1/conv2d_1"
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::nodes::raw_node::{
    BatchNorm, BiasAdd, Conv2d, Conv2dTranspose, Flatten, Input, MatMul, MaxPool2d, OneHot,
    Pad2d, Parameter, ReLU,
};
use crate::nn::nodes::{NodeHandle, NodeType};
use crate::nn::{DynamicShape, NodeId, Padding};
use crate::tensor::Tensor;

impl GraphInner {
    /// 添加节点到列表（名称按上面的规则解析）
    pub(in crate::nn::graph) fn add_node_to_list<T: Into<NodeType>>(
        &mut self,
        raw_node: T,
        name: Option<&str>,
        node_type: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let node_name = match name {
            Some(name) => self.scoped_name(name),
            None => self.generate_valid_new_node_name(node_type),
        };
        self.insert_node(raw_node, &node_name, parents)
    }

    /// 以给定的全名插入节点（不再加作用域前缀）
    pub(in crate::nn::graph) fn insert_node<T: Into<NodeType>>(
        &mut self,
        raw_node: T,
        full_name: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.check_duplicate_node_name(full_name)?;
        let node_id = self.generate_valid_node_id();

        for &parent_id in parents {
            self.forward_edges
                .entry(parent_id)
                .or_default()
                .push(node_id);
        }
        self.backward_edges
            .entry(node_id)
            .or_default()
            .extend(parents);

        self.node_names.insert(full_name.to_string(), node_id);
        self.nodes
            .insert(node_id, NodeHandle::new(node_id, full_name, raw_node));
        Ok(node_id)
    }

    fn generate_valid_node_id(&mut self) -> NodeId {
        // 先递增再返回，所以第一个节点 ID 是 1
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(in crate::nn::graph) fn check_duplicate_node_name(&self, name: &str) -> Result<(), GraphError> {
        if self.node_names.contains_key(name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    fn generate_valid_new_node_name(&self, node_type: &str) -> String {
        let mut counter = 1;
        loop {
            let name = self.scoped_name(&format!("{node_type}_{counter}"));
            if !self.node_names.contains_key(&name) {
                return name;
            }
            counter += 1;
        }
    }

    /// 返回形如`base`、`base_1`、`base_2`...中第一个未被占用的名称（不加作用域前缀），
    /// 供需要自动编号的作用域名使用（如 "BatchNorm" → "BatchNorm_1"）
    pub(in crate::nn) fn unique_scope_name(&self, base: &str) -> String {
        let taken = |candidate: &str| {
            let full = self.scoped_name(candidate);
            let prefix = format!("{full}/");
            self.node_names
                .keys()
                .any(|n| *n == full || n.starts_with(&prefix))
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}_{counter}");
            if !taken(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    // ========== 叶子节点 ==========

    /// 创建输入节点（形状可含未知维度，值稍后喂入）
    pub fn new_input_node(
        &mut self,
        shape: &DynamicShape,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.add_node_to_list(Input::new(shape.clone()), name, "input", &[])
    }

    /// 创建参数节点（以全名注册，值即初始值）
    pub(in crate::nn::graph) fn new_parameter_node(
        &mut self,
        init_value: Tensor,
        full_name: &str,
    ) -> Result<NodeId, GraphError> {
        self.insert_node(Parameter::new(init_value), full_name, &[])
    }

    // ========== 运算节点 ==========

    pub fn new_conv2d_node(
        &mut self,
        input_id: NodeId,
        kernel_id: NodeId,
        stride: usize,
        padding: Padding,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let parents = [input_id, kernel_id];
        let node = Conv2d::new(&self.get_nodes(&parents)?, stride, padding)?;
        self.add_node_to_list(node, name, "conv2d", &parents)
    }

    pub fn new_conv2d_transpose_node(
        &mut self,
        input_id: NodeId,
        kernel_id: NodeId,
        output_shape: [usize; 4],
        stride: usize,
        padding: Padding,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let parents = [input_id, kernel_id];
        let node = Conv2dTranspose::new(&self.get_nodes(&parents)?, output_shape, stride, padding)?;
        self.add_node_to_list(node, name, "conv2d_transpose", &parents)
    }

    pub fn new_pad2d_node(
        &mut self,
        input_id: NodeId,
        pad_size: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Pad2d::new(&self.get_nodes(&[input_id])?, pad_size)?;
        self.add_node_to_list(node, name, "pad2d", &[input_id])
    }

    pub fn new_bias_add_node(
        &mut self,
        input_id: NodeId,
        bias_id: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let parents = [input_id, bias_id];
        let node = BiasAdd::new(&self.get_nodes(&parents)?)?;
        self.add_node_to_list(node, name, "bias_add", &parents)
    }

    pub fn new_max_pool2d_node(
        &mut self,
        input_id: NodeId,
        kernel_size: usize,
        stride: usize,
        padding: Padding,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = MaxPool2d::new(&self.get_nodes(&[input_id])?, kernel_size, stride, padding)?;
        self.add_node_to_list(node, name, "max_pool2d", &[input_id])
    }

    pub fn new_flatten_node(
        &mut self,
        input_id: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = Flatten::new(&self.get_nodes(&[input_id])?)?;
        self.add_node_to_list(node, name, "flatten", &[input_id])
    }

    pub fn new_mat_mul_node(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let parents = [left_id, right_id];
        let node = MatMul::new(&self.get_nodes(&parents)?)?;
        self.add_node_to_list(node, name, "mat_mul", &parents)
    }

    pub fn new_relu_node(
        &mut self,
        input_id: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = ReLU::new(&self.get_nodes(&[input_id])?)?;
        self.add_node_to_list(node, name, "relu", &[input_id])
    }

    pub fn new_one_hot_node(
        &mut self,
        labels_id: NodeId,
        num_classes: usize,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = OneHot::new(&self.get_nodes(&[labels_id])?, num_classes)?;
        self.add_node_to_list(node, name, "one_hot", &[labels_id])
    }

    /// 父节点顺序：[输入, beta, gamma, 训练标志]
    pub fn new_batch_norm_node(
        &mut self,
        parents: [NodeId; 4],
        decay: f32,
        epsilon: f32,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = BatchNorm::new(&self.get_nodes(&parents)?, decay, epsilon)?;
        self.add_node_to_list(node, name, "batch_norm", &parents)
    }
}
