/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : Flatten 节点：保留 batch 维，其余维度展平成一维特征，
 *                 即 [batch, d1, d2, ...] → [batch, d1*d2*...]，用于卷积层与全连接层之间
 */

use super::super::TraitNode;
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct Flatten {
    shape: DynamicShape,
    value: Option<Tensor>,
    features: usize,
}

impl Flatten {
    pub(crate) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        expect_parents(parents, 1, "Flatten")?;
        let input_shape = parents[0].expected_shape();
        if input_shape.ndim() < 2 {
            return Err(GraphError::DimensionMismatch {
                expected: 2,
                got: input_shape.ndim(),
                message: format!("Flatten 的输入至少需要 2 维，得到{input_shape}"),
            });
        }
        let features = input_shape.feature_size().ok_or_else(|| {
            GraphError::UnknownDimension(format!(
                "展平时除 batch 外的维度必须都已知，得到{input_shape}"
            ))
        })?;
        Ok(Self {
            shape: DynamicShape::new(&[input_shape.dim(0), Some(features)]),
            value: None,
            features,
        })
    }
}

impl TraitNode for Flatten {
    fn type_name(&self) -> &'static str {
        "Flatten"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = parents.first().copied().ok_or_else(|| {
            GraphError::ComputationError("Flatten 缺少输入值".to_string())
        })?;
        let batch = input.shape().first().copied().unwrap_or(1);
        self.value = Some(input.reshape(&[batch, self.features])?);
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::Flatten
    }
}
