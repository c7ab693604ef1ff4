use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::errors::TensorError;

mod ops;
mod print;
mod property;


/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通过Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
///
/// 图像类张量统一使用 NHWC 布局：`[batch, height, width, channels]`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]...
    /// `data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    /// 需要拿到错误而不是panic时请用[`Tensor::try_new`]。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        match Self::try_new(data, shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    /// 同[`Tensor::new`]，但以`Result`返回形状与数据长度不一致的错误
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(TensorError::DataLengthMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
                expected,
            });
        }
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataLengthMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
                expected,
            }
        })?;
        Ok(Self { data })
    }

    /// 由`ndarray`数组直接构造（内部算子使用）
    pub fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 创建所有元素都为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// 创建一个服从正态分布的随机张量（使用指定的RNG，确保可复现）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        Self::normal_from(mean, std_dev, shape, rng)
    }

    /// 创建一个在[low, high)区间均匀分布的随机张量（使用指定的RNG）
    pub fn uniform_with_rng(low: f32, high: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        Self::uniform_from(low, high, shape, rng)
    }

    // Box-Muller 变换
    fn normal_from<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    fn uniform_from<R: Rng>(low: f32, high: f32, shape: &[usize], rng: &mut R) -> Self {
        if low >= high {
            return Self::full(low, shape);
        }
        let dist = Uniform::new(low, high);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| dist.sample(rng))
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }
}
