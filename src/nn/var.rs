/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : Var - 张量句柄（节点 ID + 图引用），以及参数初始化策略 Init
 */

use super::graph::{Graph, GraphInner};
use super::{DynamicShape, GraphError, NodeId};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
///
/// 同一个参数名重复声明时，初始化策略也参与一致性检查，因此实现了`PartialEq`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// [low, high) 均匀分布
    Uniform { low: f32, high: f32 },
    /// Kaiming/He 初始化（适用于`ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化
    Xavier,
}

impl Init {
    /// 检查初始化参数：所有数值都必须是有限值
    pub fn validate(&self) -> Result<(), GraphError> {
        let values: &[f32] = match self {
            Self::Constant(v) => &[*v],
            Self::Normal { mean, std } => &[*mean, *std],
            Self::Uniform { low, high } => &[*low, *high],
            Self::Zeros | Self::Ones | Self::Kaiming | Self::Xavier => &[],
        };
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "初始化方式{self:?}不合法：参数必须是有限值"
            )))
        }
    }

    /// 生成初始化后的 Tensor（使用线程 RNG）
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        let mut rng = <StdRng as rand::SeedableRng>::from_entropy();
        self.generate_with_rng(shape, &mut rng)
    }

    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Uniform { low, high } => Tensor::uniform_with_rng(*low, *high, shape, rng),
            Self::Kaiming => {
                let (fan_in, _) = fans(shape);
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = fans(shape);
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

/// (fan_in, fan_out)。卷积核 [kH, kW, in, out] 的感受野是前两维之积
fn fans(shape: &[usize]) -> (usize, usize) {
    match shape {
        [] => (1, 1),
        [n] => (*n, *n),
        [rest @ .., fan_in, fan_out] => {
            let receptive: usize = rest.iter().product();
            ((fan_in * receptive).max(1), (fan_out * receptive).max(1))
        }
    }
}

// ==================== Var 结构 ====================

/// 张量句柄：指向图中某个节点，携带图引用
///
/// Clone 开销极低（只克隆 Rc）。层函数的输入和输出都是 Var。
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new_with_seed(42);
/// let x = graph.placeholder(&[None, Some(28), Some(28), Some(1)], Some("images"))?;
/// let h = conv2d_relu(&graph, "conv1", &x, 5, 1, 32, &ConvOptions::default())?;
/// x.set_value(&images)?;
/// let out = h.forward_value()?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 节点的全名（含作用域前缀）
    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node(self.id)?.name().to_string())
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph 句柄（即使原 Graph 句柄已 drop 也有效）
    pub fn get_graph(&self) -> Graph {
        Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 构图期推断的形状（未知维度为 None）
    pub fn expected_shape(&self) -> Result<DynamicShape, GraphError> {
        Ok(self.graph.borrow().get_node(self.id)?.expected_shape().clone())
    }

    // ==================== 执行 ====================

    pub fn forward(&self) -> Result<(), GraphError> {
        self.graph.borrow_mut().forward(self.id)
    }

    /// 获取节点当前的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.cloned())
    }

    /// 先前向传播再取值
    pub fn forward_value(&self) -> Result<Tensor, GraphError> {
        let mut g = self.graph.borrow_mut();
        g.forward(self.id)?;
        g.get_node_value(self.id)?
            .cloned()
            .ok_or_else(|| GraphError::ComputationError(format!("节点{}前向传播后仍没有值", self.id)))
    }

    /// 设置节点的值（只对输入和参数节点有效）
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, Some(value))
    }

    /// 设置标量标志（如批归一化的训练标志）：true → 1.0，false → 0.0
    pub fn set_flag(&self, flag: bool) -> Result<(), GraphError> {
        let value = if flag { 1.0 } else { 0.0 };
        self.set_value(&Tensor::new(&[value], &[]))
    }

    // ==================== 算子 ====================

    pub fn relu(&self) -> Result<Self, GraphError> {
        let id = self.graph.borrow_mut().new_relu_node(self.id, None)?;
        Ok(Self::new(id, Rc::clone(&self.graph)))
    }
}
