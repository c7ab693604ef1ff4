/*
 * @Author       : 老董
 * @Date         : 2026-03-04
 * @Description  : Graph 模块的类型定义
 */

use crate::nn::{Init, NodeId};

/// 层分组信息（用于摘要输出时将属于同一层的节点归在一起）
#[derive(Debug, Clone)]
pub struct LayerGroup {
    /// 带作用域的层名称（如 "block1/conv1"）
    pub name: String,
    /// 层类型（如 "Conv2d", "FullyConnected"）
    pub layer_type: String,
    /// 层的描述信息（如 "3→16, 3×3, s1, SAME"）
    pub description: String,
    /// 属于该层的节点 ID 列表
    pub node_ids: Vec<NodeId>,
}

/// 变量表中的一条记录：全名 → 参数节点
///
/// 同一全名再次声明时，形状和初始化方式都必须与这里记录的一致。
#[derive(Debug, Clone)]
pub struct ParamEntry {
    pub node_id: NodeId,
    pub shape: Vec<usize>,
    pub init: Init,
}
