/*
 * DynamicShape: 支持动态维度的形状系统
 *
 * 构图时节点的形状可能只部分已知：batch 维度通常要到真正喂数据时才确定，
 * 所以用 None 表示"任意值"。层函数依赖其中一部分维度（如通道数）必须已知，
 * 其余维度照原样传递到输出。
 *
 * # 示例
 * ```
 * use graph_layers::nn::DynamicShape;
 *
 * let images = DynamicShape::new(&[None, Some(28), Some(28), Some(1)]);
 * assert_eq!(images.to_string(), "[?, 28, 28, 1]");
 * assert_eq!(images.last_dim(), Some(1));
 * assert_eq!(images.feature_size(), Some(784));
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// 维度值：Some(n) 表示固定值 n，None 表示动态（任意值）
pub type Dim = Option<usize>;

/// 动态形状：支持动态维度的形状表示
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicShape {
    dims: Vec<Dim>,
}

impl DynamicShape {
    /// 创建一个动态形状
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// 从固定形状创建（所有维度都是确定的）
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Some(d)).collect(),
        }
    }

    /// 创建一个动态 batch 的形状：第一维是 None（动态），其余维度固定
    ///
    /// ```
    /// use graph_layers::nn::DynamicShape;
    ///
    /// let shape = DynamicShape::with_dynamic_batch(&[4, 4, 3]);
    /// assert_eq!(shape.to_string(), "[?, 4, 4, 3]");
    /// ```
    pub fn with_dynamic_batch(feature_dims: &[usize]) -> Self {
        let mut dims = vec![None];
        dims.extend(feature_dims.iter().map(|&d| Some(d)));
        Self { dims }
    }

    /// 获取维度数量
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// 获取指定维度的值：Some(n) 如果维度固定，None 如果维度动态（或越界）
    pub fn dim(&self, index: usize) -> Dim {
        self.dims.get(index).copied().flatten()
    }

    /// 最后一维（NHWC 下即通道数）
    pub fn last_dim(&self) -> Dim {
        self.dims.last().copied().flatten()
    }

    /// 检查指定维度是否是动态的
    pub fn is_dynamic(&self, index: usize) -> bool {
        self.dims.get(index).is_some_and(|d| d.is_none())
    }

    /// 检查是否有任何动态维度
    pub fn has_dynamic_dims(&self) -> bool {
        self.dims.iter().any(|d| d.is_none())
    }

    /// 除 batch 外所有维度的乘积；任一非 batch 维度动态时返回 None
    pub fn feature_size(&self) -> Option<usize> {
        self.dims
            .iter()
            .skip(1)
            .try_fold(1usize, |acc, d| d.map(|n| acc * n))
    }

    /// 返回把第`index`维替换为`dim`后的新形状
    pub fn with_dim(&self, index: usize, dim: Dim) -> Self {
        let mut dims = self.dims.clone();
        if let Some(slot) = dims.get_mut(index) {
            *slot = dim;
        }
        Self { dims }
    }

    /// 检查此形状是否与实际张量形状兼容：维数相同，且每个固定维度都相等
    ///
    /// ```
    /// use graph_layers::nn::DynamicShape;
    ///
    /// let shape = DynamicShape::new(&[None, Some(128)]);
    /// assert!(shape.is_compatible_with_tensor(&[32, 128]));
    /// assert!(!shape.is_compatible_with_tensor(&[32, 64]));
    /// assert!(!shape.is_compatible_with_tensor(&[32, 128, 10]));
    /// ```
    pub fn is_compatible_with_tensor(&self, tensor_shape: &[usize]) -> bool {
        if self.dims.len() != tensor_shape.len() {
            return false;
        }
        self.dims
            .iter()
            .zip(tensor_shape.iter())
            .all(|(expected, &actual)| match expected {
                None => true,
                Some(n) => *n == actual,
            })
    }

    /// 转换为固定形状向量（如果所有维度都是固定的），否则返回 None
    pub fn to_vec_fixed(&self) -> Option<Vec<usize>> {
        self.dims.iter().copied().collect()
    }

    /// 获取内部维度数组的引用
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }
}

impl fmt::Display for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .dims
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "?".to_string(),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<&[usize]> for DynamicShape {
    fn from(shape: &[usize]) -> Self {
        Self::fixed(shape)
    }
}
