/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : Graph 句柄（用户级 API），即层函数所需的构图上下文
 */

use super::error::GraphError;
use super::inner::GraphInner;
use super::types::LayerGroup;
use crate::nn::descriptor::GraphDescriptor;
use crate::nn::var::{Init, Var};
use crate::nn::{Dim, DynamicShape, NodeId};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Graph - 计算图句柄
///
/// # 设计原则
/// - 是`Rc<RefCell<GraphInner>>`的薄封装，Clone 后多个句柄指向同一张图
/// - 创建的 Var 自动持有图引用
/// - 作用域栈、参数注册表都挂在图上，而不是全局状态
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（参数初始化可复现）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    pub fn with_name(name: &str) -> Self {
        Self::from_inner(GraphInner::with_name(name))
    }

    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    /// 检查`var`是否属于本图
    pub fn owns(&self, var: &Var) -> bool {
        var.same_graph(&self.wrap_node_id(var.node_id()))
    }

    pub fn set_seed(&self, seed: u64) {
        self.inner.borrow_mut().set_seed(seed);
    }

    pub fn nodes_count(&self) -> usize {
        self.inner.borrow().nodes_count()
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据（形状完全由数据决定）
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        self.input_with(data, None)
    }

    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        self.input_with(data, Some(name))
    }

    fn input_with(&self, data: &Tensor, name: Option<&str>) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let node_id = g.new_input_node(&DynamicShape::fixed(data.shape()), name)?;
        g.set_node_value(node_id, Some(data))?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建占位输入节点：形状可含未知维度（None），值稍后通过`Var::set_value`喂入
    ///
    /// ```ignore
    /// let images = graph.placeholder(&[None, Some(28), Some(28), Some(1)], Some("images"))?;
    /// ```
    pub fn placeholder(&self, shape: &[Dim], name: Option<&str>) -> Result<Var, GraphError> {
        let node_id = self
            .inner
            .borrow_mut()
            .new_input_node(&DynamicShape::new(shape), name)?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    /// 创建标量训练标志（批归一化用），之后可用`Var::set_flag`切换
    pub fn training_flag(&self, training: bool) -> Result<Var, GraphError> {
        let flag = self.placeholder(&[], None)?;
        flag.set_flag(training)?;
        Ok(flag)
    }

    /// 在当前作用域下创建（或复用）参数，等价于`get_variable(name, shape, &init)`
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        self.get_variable(name, shape, &init)
    }

    /// 在当前作用域下获取或创建参数，规则见`GraphInner::get_variable`
    pub fn get_variable(&self, name: &str, shape: &[usize], init: &Init) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().get_variable(name, shape, init)?;
        Ok(Var::new(node_id, Rc::clone(&self.inner)))
    }

    // ==================== 作用域 ====================

    /// 在名为`name`的子作用域中执行`f`，结束后（无论成功与否）恢复原作用域
    ///
    /// ```ignore
    /// graph.variable_scope("block1", |g| conv2d(g, "conv1", &x, 3, 1, 16, &opts))?;
    /// // 权重名为 "block1/conv1/weights"
    /// ```
    pub fn variable_scope<F, R>(&self, name: &str, f: F) -> Result<R, GraphError>
    where
        F: FnOnce(&Self) -> Result<R, GraphError>,
    {
        self.inner.borrow_mut().push_scope(name)?;
        let result = f(self);
        self.inner.borrow_mut().pop_scope();
        result
    }

    pub fn current_scope(&self) -> String {
        self.inner.borrow().current_scope()
    }

    /// 所有参数的（全名，形状），按创建顺序
    pub fn trainable_variables(&self) -> Vec<(String, Vec<usize>)> {
        self.inner.borrow().trainable_variables()
    }

    pub fn layer_groups(&self) -> Vec<LayerGroup> {
        self.inner.borrow().layer_groups().to_vec()
    }

    /// 读取批归一化输出节点的（滑动均值，滑动方差）
    pub fn moving_statistics(&self, bn_output: &Var) -> Result<(Tensor, Tensor), GraphError> {
        self.inner.borrow().moving_statistics(bn_output.node_id())
    }

    // ==================== 执行 ====================

    pub fn forward(&self, output: &Var) -> Result<(), GraphError> {
        self.inner.borrow_mut().forward(output.node_id())
    }

    // ==================== 诊断与持久化 ====================

    pub fn describe(&self) -> GraphDescriptor {
        self.inner.borrow().describe()
    }

    pub fn summary(&self) {
        self.inner.borrow().summary();
    }

    pub fn summary_string(&self) -> String {
        self.inner.borrow().summary_string()
    }

    pub fn summary_markdown(&self) -> String {
        self.inner.borrow().summary_markdown()
    }

    pub fn save_summary<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow().save_summary(path)
    }

    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow().save_params(path)
    }

    pub fn load_params<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        self.inner.borrow_mut().load_params(path)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
