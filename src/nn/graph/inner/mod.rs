/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 创建、基础访问器 + forward
 * - node_builders.rs: new_*_node
 * - scope.rs: 变量作用域 + 参数注册表（get_variable）
 * - describe.rs: describe/summary
 * - serialization.rs: save_params/load_params
 */

mod core;
mod describe;
mod node_builders;
mod scope;
mod serialization;

use super::types::{LayerGroup, ParamEntry};
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// 图的完整定义（核心实现）
///
/// 用户通常通过`Graph`句柄使用此结构，需要直接操作节点时可通过`graph.inner_mut()`访问。
pub struct GraphInner {
    pub(in crate::nn::graph) name: String,
    pub(in crate::nn::graph) nodes: HashMap<NodeId, NodeHandle>,
    /// 正向边：parent_id -> child_ids（父节点指向子节点）
    pub(in crate::nn::graph) forward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 反向边：child_id -> parent_ids（子节点指向父节点，顺序即父节点顺序）
    pub(in crate::nn::graph) backward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 节点全名 -> 节点 ID（名称在图内唯一）
    pub(in crate::nn::graph) node_names: HashMap<String, NodeId>,
    pub(in crate::nn::graph) next_id: u64,
    /// 最后一次前向传播的 id
    pub(in crate::nn::graph) last_forward_pass_id: u64,
    /// 图级别的随机数生成器（用于参数初始化）
    /// None 表示每次初始化都使用系统熵（非确定性）
    pub(in crate::nn::graph) rng: Option<StdRng>,
    /// 当前作用域栈，如 ["block1", "conv1"]
    pub(in crate::nn::graph) scope_stack: Vec<String>,
    /// 参数注册表：全名（如 "block1/conv1/weights"）-> 参数记录
    pub(in crate::nn::graph) variables: HashMap<String, ParamEntry>,
    /// 层分组信息（用于摘要）
    pub(in crate::nn::graph) layer_groups: Vec<LayerGroup>,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
