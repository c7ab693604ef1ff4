/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner 核心操作 + 前向传播
 */

use super::super::error::GraphError;
use super::super::types::LayerGroup;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的计算图（参数初始化可复现）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::new();
        graph.set_seed(seed);
        graph
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            forward_edges: HashMap::new(),
            backward_edges: HashMap::new(),
            node_names: HashMap::new(),
            next_id: 0,
            last_forward_pass_id: 0,
            rng: None,
            scope_stack: Vec::new(),
            variables: HashMap::new(),
            layer_groups: Vec::new(),
        }
    }

    // ========== 基础访问器 ==========

    #[cfg(test)]
    pub(in crate::nn) const fn last_forward_pass_id(&self) -> u64 {
        self.last_forward_pass_id
    }

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    pub const fn has_seed(&self) -> bool {
        self.rng.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 所有节点 ID（按创建顺序）
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_nodes(&self, ids: &[NodeId]) -> Result<Vec<&NodeHandle>, GraphError> {
        ids.iter().map(|id| self.get_node(*id)).collect()
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.get_node(id)?;
        Ok(self.backward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_children(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.get_node(id)?;
        Ok(self.forward_edges.get(&id).cloned().unwrap_or_default())
    }

    /// 按全名查找节点
    pub fn get_node_id_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn set_node_value(&mut self, id: NodeId, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    // ========== 层分组相关 ==========

    pub fn layer_groups(&self) -> &[LayerGroup] {
        &self.layer_groups
    }

    /// 注册一个层分组
    ///
    /// 同名层再次调用（复用参数）时，类型和描述保留第一次的，
    /// 本次新建的节点追加到原分组中。
    pub fn register_layer_group(
        &mut self,
        name: &str,
        layer_type: &str,
        description: &str,
        node_ids: Vec<NodeId>,
    ) {
        if let Some(group) = self.layer_groups.iter_mut().find(|g| g.name == name) {
            for id in node_ids {
                if !group.node_ids.contains(&id) {
                    group.node_ids.push(id);
                }
            }
            return;
        }
        self.layer_groups.push(LayerGroup {
            name: name.to_string(),
            layer_type: layer_type.to_string(),
            description: description.to_string(),
            node_ids,
        });
    }

    // ========== 前向传播 ==========

    /// 计算`node_id`的值：先递归计算所有祖先，同一次传播中每个节点只计算一次
    pub fn forward(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        let new_graph_forward_pass_id = self.last_forward_pass_id + 1;
        self.forward_node_internal(node_id, new_graph_forward_pass_id)?;
        self.last_forward_pass_id = new_graph_forward_pass_id;
        Ok(())
    }

    fn forward_node_internal(
        &mut self,
        node_id: NodeId,
        new_graph_forward_pass_id: u64,
    ) -> Result<(), GraphError> {
        let node = self.get_node_mut(node_id)?;
        if node.is_leaf() {
            if node.has_value() {
                node.set_last_forward_pass_id(new_graph_forward_pass_id);
                return Ok(());
            }
            return Err(GraphError::InvalidOperation(format!(
                "{node}没有值，请先通过 set_value 喂入数据"
            )));
        }
        if node.last_forward_pass_id() == new_graph_forward_pass_id {
            return Ok(());
        }

        let parents_ids = self.get_node_parents(node_id)?;
        for parent_id in &parents_ids {
            self.forward_node_internal(*parent_id, new_graph_forward_pass_id)?;
        }

        // 暂时取出本节点，以便同时借用父节点的值
        let mut node = self
            .nodes
            .remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let result = parents_ids
            .iter()
            .map(|id| {
                let parent = self.get_node(*id)?;
                parent.value().ok_or_else(|| {
                    GraphError::ComputationError(format!("{parent}没有值"))
                })
            })
            .collect::<Result<Vec<&Tensor>, GraphError>>()
            .and_then(|values| node.calc_value_by_parents(&values));
        if result.is_ok() {
            node.set_last_forward_pass_id(new_graph_forward_pass_id);
        }
        self.nodes.insert(node_id, node);
        result
    }
}
