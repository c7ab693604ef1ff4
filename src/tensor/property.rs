/*
 * @Author       : 老董
 * @Date         : 2026-03-02
 * @Description  : 本文件仅包含一些属性方法，不包含任何运算方法，所以不会需要用到mut
 */

use super::Tensor;
use ndarray::ArrayViewD;

impl Tensor {
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的维（dim）数、阶（rank）数
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 计算张量中所有元素的数量
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 判断张量是否为标量
    pub fn is_scalar(&self) -> bool {
        self.shape().is_empty() || self.shape().iter().all(|x| *x == 1)
    }

    /// 转化为纯数（number）。若为标量，则返回Some(number)，否则返回None
    pub fn number(&self) -> Option<f32> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// 以逻辑（行优先）顺序拷贝出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 以行优先顺序返回底层数据切片；若内部数组不是标准布局则返回None
    pub fn data_as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}
