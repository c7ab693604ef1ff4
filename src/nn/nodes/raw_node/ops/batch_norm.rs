/*
 * @Author       : 老董
 * @Date         : 2026-03-06
 * @Description  : 批归一化节点（有状态）
 *
 * 父节点：
 * - parents[0]: 输入 [..., C]，统计量按最后一维（通道）分别计算，在其余所有轴上求均值/方差
 * - parents[1]: beta  [C]
 * - parents[2]: gamma [C]
 * - parents[3]: 训练标志（标量，1 表示训练，0 表示推理）
 *
 * 训练时：先用本批次的均值/方差更新滑动平均
 *   moving = decay * moving + (1 - decay) * batch
 * 再用本批次统计量做归一化；推理时直接用滑动平均。
 * 滑动平均初始为 0，不做偏差修正。
 *   y = (x - mean) / sqrt(var + epsilon) * gamma + beta
 */

use super::super::{TraitNode, parent_of_rank};
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;
use ndarray::{Array1, Axis};

#[derive(Clone)]
pub(crate) struct BatchNorm {
    shape: DynamicShape,
    value: Option<Tensor>,
    decay: f32,
    epsilon: f32,
    moving_mean: Tensor,
    moving_variance: Tensor,
}

impl BatchNorm {
    pub(crate) fn new(
        parents: &[&NodeHandle],
        decay: f32,
        epsilon: f32,
    ) -> Result<Self, GraphError> {
        expect_parents(parents, 4, "BatchNorm")?;
        let input_shape = parents[0].expected_shape();
        let channels = input_shape.last_dim().ok_or_else(|| {
            GraphError::UnknownDimension(format!(
                "批归一化输入的通道维（最后一维）在构图时必须已知，得到{input_shape}"
            ))
        })?;
        for (index, what) in [(1, "beta"), (2, "gamma")] {
            let shape = parents[index].expected_shape();
            if shape.dims() != [Some(channels)] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![channels],
                    got: shape.dims().iter().map(|d| d.unwrap_or(0)).collect(),
                    message: format!("{what}的形状必须是[通道数]"),
                });
            }
        }
        let flag_is_scalar = parents[3]
            .expected_shape()
            .to_vec_fixed()
            .is_some_and(|dims| dims.iter().product::<usize>() == 1);
        if !flag_is_scalar {
            return Err(GraphError::InvalidOperation(format!(
                "训练标志必须是标量，得到{}",
                parents[3].expected_shape()
            )));
        }

        Ok(Self {
            shape: input_shape.clone(),
            value: None,
            decay,
            epsilon,
            moving_mean: Tensor::zeros(&[channels]),
            moving_variance: Tensor::zeros(&[channels]),
        })
    }

    pub(crate) const fn moving_mean(&self) -> &Tensor {
        &self.moving_mean
    }

    pub(crate) const fn moving_variance(&self) -> &Tensor {
        &self.moving_variance
    }

    /// 覆盖滑动平均（加载检查点时使用）
    pub(crate) fn set_moving_statistics(
        &mut self,
        mean: &Tensor,
        variance: &Tensor,
    ) -> Result<(), GraphError> {
        for (new, old) in [(mean, &self.moving_mean), (variance, &self.moving_variance)] {
            if new.shape() != old.shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: old.shape().to_vec(),
                    got: new.shape().to_vec(),
                    message: "滑动平均的形状必须与通道数一致".to_string(),
                });
            }
        }
        self.moving_mean = mean.clone();
        self.moving_variance = variance.clone();
        Ok(())
    }

    fn update_moving(&self, moving: &Tensor, batch: &Array1<f32>) -> Tensor {
        let blended = &moving.view() * self.decay + &(batch * (1.0 - self.decay)).into_dyn();
        Tensor::from_array(blended)
    }
}

impl TraitNode for BatchNorm {
    fn type_name(&self) -> &'static str {
        "BatchNorm"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = parents.first().copied().ok_or_else(|| {
            GraphError::ComputationError("BatchNorm 缺少输入值".to_string())
        })?;
        let beta = parent_of_rank(parents, 1, 1, "BatchNorm")?;
        let gamma = parent_of_rank(parents, 2, 1, "BatchNorm")?;
        let training = parents
            .get(3)
            .and_then(|flag| flag.number())
            .ok_or_else(|| GraphError::ComputationError("训练标志必须是标量".to_string()))?
            >= 0.5;

        let channels = self.moving_mean.size();
        let rows = input.to_matrix(channels)?;

        let (mean, variance) = if training {
            let mean = rows.mean_axis(Axis(0)).ok_or_else(|| {
                GraphError::ComputationError("训练模式下批次不能为空".to_string())
            })?;
            // 总体方差（除以 N），与滑动平均的统计口径一致
            let variance = rows.var_axis(Axis(0), 0.0);
            self.moving_mean = self.update_moving(&self.moving_mean, &mean);
            self.moving_variance = self.update_moving(&self.moving_variance, &variance);
            (mean, variance)
        } else {
            let to_array1 = |t: &Tensor| Array1::from(t.to_vec());
            (to_array1(&self.moving_mean), to_array1(&self.moving_variance))
        };

        let scale = Array1::from(gamma.to_vec()) / variance.mapv(|v| (v + self.epsilon).sqrt());
        let shift = Array1::from(beta.to_vec()) - &mean * &scale;
        let normalized = &rows * &scale + &shift;
        let normalized = Tensor::from_array(normalized.into_dyn()).reshape(input.shape())?;
        self.value = Some(normalized);
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::BatchNorm {
            decay: self.decay,
            epsilon: self.epsilon,
        }
    }
}
