/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : GraphInner 变量作用域与参数注册表
 *
 * 参数按"作用域/名称"形式的全名登记。同一全名再次声明时，
 * 形状和初始化方式都一致就复用原节点，否则报 ParameterConflict。
 */

use super::super::error::GraphError;
use super::super::types::ParamEntry;
use super::GraphInner;
use crate::nn::nodes::NodeType;
use crate::nn::{Init, NodeId};
use crate::tensor::Tensor;

impl GraphInner {
    // ========== 作用域 ==========

    pub(in crate::nn::graph) fn push_scope(&mut self, name: &str) -> Result<(), GraphError> {
        if name.is_empty() || name.split('/').any(str::is_empty) {
            return Err(GraphError::InvalidOperation(format!(
                "作用域名\"{name}\"不合法：不能为空，也不能包含空的路径段"
            )));
        }
        self.scope_stack.push(name.to_string());
        Ok(())
    }

    pub(in crate::nn::graph) fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// 当前作用域路径，如 "block1/conv1"；顶层为空串
    pub fn current_scope(&self) -> String {
        self.scope_stack.join("/")
    }

    /// 给`name`加上当前作用域前缀
    pub fn scoped_name(&self, name: &str) -> String {
        if self.scope_stack.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.current_scope())
        }
    }

    // ========== 参数注册表 ==========

    /// 在当前作用域下获取或创建名为`name`的参数
    ///
    /// - 首次声明：按`init`生成初始值，创建参数节点
    /// - 再次声明且形状、初始化方式都相同：返回原节点
    /// - 再次声明但形状或初始化方式不同：`ParameterConflict`
    /// - 初始化参数含非有限值：`InvalidOperation`
    pub fn get_variable(
        &mut self,
        name: &str,
        shape: &[usize],
        init: &Init,
    ) -> Result<NodeId, GraphError> {
        let full_name = self.scoped_name(name);
        if let Some(entry) = self.variables.get(&full_name) {
            if entry.shape != shape {
                return Err(GraphError::ParameterConflict(format!(
                    "参数{full_name}已以形状{:?}声明，不能再以形状{shape:?}声明",
                    entry.shape
                )));
            }
            if entry.init != *init {
                return Err(GraphError::ParameterConflict(format!(
                    "参数{full_name}已以初始化方式{:?}声明，不能再以{init:?}声明",
                    entry.init
                )));
            }
            return Ok(entry.node_id);
        }

        if shape.is_empty() || shape.contains(&0) {
            return Err(GraphError::InvalidOperation(format!(
                "参数{full_name}的形状{shape:?}不合法：每一维都必须为正数"
            )));
        }
        init.validate()?;
        let init_value = match self.rng.as_mut() {
            Some(rng) => init.generate_with_rng(shape, rng),
            None => init.generate(shape),
        };
        let node_id = self.new_parameter_node(init_value, &full_name)?;
        self.variables.insert(
            full_name,
            ParamEntry {
                node_id,
                shape: shape.to_vec(),
                init: init.clone(),
            },
        );
        Ok(node_id)
    }

    /// 所有参数的（全名，形状），按创建顺序
    pub fn trainable_variables(&self) -> Vec<(String, Vec<usize>)> {
        let mut entries: Vec<(&String, &ParamEntry)> = self.variables.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.node_id);
        entries
            .into_iter()
            .map(|(name, entry)| (name.clone(), entry.shape.clone()))
            .collect()
    }

    // ========== 批归一化滑动平均 ==========

    /// 读取批归一化节点当前的（滑动均值，滑动方差）
    pub fn moving_statistics(&self, node_id: NodeId) -> Result<(Tensor, Tensor), GraphError> {
        let node = self.get_node(node_id)?;
        match node.node_type() {
            NodeType::BatchNorm(bn) => {
                Ok((bn.moving_mean().clone(), bn.moving_variance().clone()))
            }
            _ => Err(GraphError::InvalidOperation(format!(
                "{node}不是批归一化节点"
            ))),
        }
    }
}
