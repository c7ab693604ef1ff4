/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 图算子用到的少量张量运算：重塑、逐元素映射、标量乘
 */

use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Array, Array2, IxDyn};
use std::ops::Mul;

impl Tensor {
    /// 按行优先顺序重塑为新形状，元素总数必须一致
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        if shape.iter().product::<usize>() != self.size() {
            return Err(TensorError::IncompatibleReshape {
                from: self.shape().to_vec(),
                to: shape.to_vec(),
            });
        }
        Self::try_new(&self.to_vec(), shape)
    }

    /// 把最后一维之外的所有维度合并，得到`[N, cols]`矩阵
    pub(crate) fn to_matrix(&self, cols: usize) -> Result<Array2<f32>, TensorError> {
        let rows = if cols == 0 { 0 } else { self.size() / cols };
        if rows * cols != self.size() {
            return Err(TensorError::IncompatibleReshape {
                from: self.shape().to_vec(),
                to: vec![rows, cols],
            });
        }
        Array2::from_shape_vec((rows, cols), self.to_vec()).map_err(|_| {
            TensorError::IncompatibleReshape {
                from: self.shape().to_vec(),
                to: vec![rows, cols],
            }
        })
    }

    /// 逐元素映射，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self::from_array(self.view().mapv(f))
    }

    pub fn relu(&self) -> Self {
        self.map(|x| x.max(0.0))
    }

    /// 所有元素都是非负整数时，以`usize`形式返回；否则返回出错的那个值
    pub(crate) fn to_indices(&self) -> Result<Vec<usize>, f32> {
        self.view()
            .iter()
            .map(|&x| {
                if x >= 0.0 && x.fract() == 0.0 && x.is_finite() {
                    Ok(x as usize)
                } else {
                    Err(x)
                }
            })
            .collect()
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, rhs: f32) -> Tensor {
        self.map(|x| x * rhs)
    }
}

impl From<Array<f32, IxDyn>> for Tensor {
    fn from(data: Array<f32, IxDyn>) -> Self {
        Self::from_array(data)
    }
}
