/*
 * @Author       : 老董
 * @Date         : 2026-03-05
 * @Description  : ReLU 节点：y = max(0, x)，形状不变
 */

use super::super::TraitNode;
use super::expect_parents;
use crate::nn::descriptor::NodeTypeDescriptor;
use crate::nn::nodes::NodeHandle;
use crate::nn::{DynamicShape, GraphError};
use crate::tensor::Tensor;

#[derive(Clone)]
pub(crate) struct ReLU {
    shape: DynamicShape,
    value: Option<Tensor>,
}

impl ReLU {
    pub(crate) fn new(parents: &[&NodeHandle]) -> Result<Self, GraphError> {
        expect_parents(parents, 1, "ReLU")?;
        Ok(Self {
            shape: parents[0].expected_shape().clone(),
            value: None,
        })
    }
}

impl TraitNode for ReLU {
    fn type_name(&self) -> &'static str {
        "ReLU"
    }

    fn expected_shape(&self) -> &DynamicShape {
        &self.shape
    }

    fn value(&self) -> Option<&Tensor> {
        self.value.as_ref()
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<(), GraphError> {
        let input = parents.first().copied().ok_or_else(|| {
            GraphError::ComputationError("ReLU 缺少输入值".to_string())
        })?;
        self.value = Some(input.relu());
        Ok(())
    }

    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::ReLU
    }
}
